// hud-feed: headless HUD widgets fed by the telemetry server

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use hud_telemetry::core::schema::SchemaError;
use hud_telemetry::feed::config::Config;
use hud_telemetry::feed::logging::init_logging;
use hud_telemetry::feed::websocket::TelemetryClient;
use hud_telemetry::feed::widgets::{
    run, GearRpmWidget, InputsWidget, LeaderboardWidget, RollingStartWidget, StandingsWidget,
    Widget, WidgetRunner,
};

/// CLI arguments for `hud-feed`.
#[derive(Parser)]
#[command(name = "hud-feed", about = "Render HUD widgets from live telemetry", version)]
struct Cli {
    /// Config file (defaults to hud_telemetry.toml next to the binary)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ask the server for preview data
    #[arg(long)]
    preview: bool,
    /// Stop after this many seconds
    #[arg(long)]
    duration_secs: Option<u64>,
    #[command(subcommand)]
    widget: WidgetCommand,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum WidgetCommand {
    /// Pedal bars and input traces
    Inputs,
    /// Distance-to-start countdown
    RollingStart,
    /// Shift lights, gear and speed
    GearRpm,
    /// Class standings board
    Standings,
    /// Overall positions with iRating and license
    Positions,
    /// Overall positions fitted to the viewport height
    Leaderboard,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("hud-feed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if cli.preview {
        config.server.preview = true;
    }

    init_logging(&config.logging, config.log_file_path(&config_path));
    info!(
        widget = ?cli.widget,
        server = %config.server.url,
        preview = config.server.preview,
        "[HUD] Starting"
    );

    let duration = cli.duration_secs.map(Duration::from_secs);
    let result = match cli.widget {
        WidgetCommand::Inputs => start(InputsWidget::new(&config), &config, duration),
        WidgetCommand::RollingStart => start(RollingStartWidget::new(&config), &config, duration),
        WidgetCommand::GearRpm => start(GearRpmWidget::new(&config), &config, duration),
        WidgetCommand::Standings => start(StandingsWidget::new(&config), &config, duration),
        WidgetCommand::Positions => start(LeaderboardWidget::positions(), &config, duration),
        WidgetCommand::Leaderboard => start(LeaderboardWidget::fitted(&config), &config, duration),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "[HUD] Invalid widget schema");
            ExitCode::FAILURE
        }
    }
}

fn start<W: Widget>(
    widget: W,
    config: &Config,
    duration: Option<Duration>,
) -> Result<(), SchemaError> {
    let mut runner = WidgetRunner::new(widget)?;
    let keys = runner.session().keys().to_vec();
    let mut client = TelemetryClient::new(config.server.clone(), keys);
    client.connect();
    run(&mut runner, &mut client, duration);
    client.disconnect();
    info!("[HUD] Stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_widget_and_flags() {
        let cli = Cli::parse_from(["hud-feed", "--preview", "--config", "hud.toml", "gear-rpm"]);
        assert!(cli.preview);
        assert_eq!(cli.config, Some(PathBuf::from("hud.toml")));
        assert_eq!(cli.widget, WidgetCommand::GearRpm);
    }

    #[test]
    fn test_parse_rolling_start_defaults() {
        let cli = Cli::parse_from(["hud-feed", "rolling-start"]);
        assert!(!cli.preview);
        assert_eq!(cli.duration_secs, None);
        assert_eq!(cli.widget, WidgetCommand::RollingStart);
    }

    #[test]
    fn test_parse_leaderboard_widgets() {
        let cli = Cli::parse_from(["hud-feed", "--duration-secs", "30", "leaderboard"]);
        assert_eq!(cli.duration_secs, Some(30));
        assert_eq!(cli.widget, WidgetCommand::Leaderboard);
        let cli = Cli::parse_from(["hud-feed", "positions"]);
        assert_eq!(cli.widget, WidgetCommand::Positions);
    }
}
