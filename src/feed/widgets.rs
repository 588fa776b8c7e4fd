//! Widgets driven by a feed session
//!
//! A widget owns the state a view does not carry (trace history, blink
//! clock, layout settings) and renders the current view to lines.
//! `WidgetRunner` ties one widget to a session and decides when to emit.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::config::Config;
use crate::core::constants::{FEED_LOOP_TICK, RENDER_INTERVAL};
use crate::core::io_traits::FeedEventReceiver;
use crate::core::leaderboard::leaderboard_rows;
use crate::core::render::{
    render_gear_rpm, render_inputs, render_leaderboard, render_rolling_start, render_standings,
    Line, StandingsTheme, TraceColors,
};
use crate::core::schema::SchemaError;
use crate::core::session::{FeedSession, SessionEvent};
use crate::core::standings::{LayoutMetrics, StandingsBoard};
use crate::core::traces::{next_sample_time, sample_period, InputTraces};
use crate::core::validate::TelemetryView;
use crate::core::views::{GearRpm, InputTelemetry, LeaderboardFeed, RollingStart, StandingsFeed};

pub trait Widget {
    type View: TelemetryView;

    /// Called with every new valid view
    fn on_view(&mut self, _view: &Self::View) {}

    /// Called every loop iteration with the time since start
    fn tick(&mut self, _elapsed: Duration) {}

    fn render(&self, view: Option<&Self::View>, elapsed: Duration) -> Vec<Line>;
}

// =============================================================================
// WIDGETS
// =============================================================================

pub struct InputsWidget {
    traces: InputTraces,
    colors: TraceColors,
    period: Duration,
    next_sample: Duration,
}

impl InputsWidget {
    pub fn new(config: &Config) -> Self {
        Self {
            traces: InputTraces::new(config.traces.channels(), config.traces.history()),
            colors: config.traces.colors(),
            period: sample_period(config.traces.sample_hz),
            next_sample: Duration::ZERO,
        }
    }

    pub fn traces(&self) -> &InputTraces {
        &self.traces
    }
}

impl Widget for InputsWidget {
    type View = InputTelemetry;

    fn on_view(&mut self, view: &InputTelemetry) {
        let rt = &view.realtime;
        self.traces.set_input(
            rt.throttle,
            rt.brake,
            rt.clutch,
            Some(rt.steering_angle_pct),
            rt.abs_active,
        );
    }

    fn tick(&mut self, elapsed: Duration) {
        // Catch up on missed periods with a single sample
        if elapsed >= self.next_sample {
            self.traces.sample(elapsed.as_secs_f64());
            self.next_sample = next_sample_time(self.next_sample, elapsed, self.period);
        }
    }

    fn render(&self, view: Option<&InputTelemetry>, elapsed: Duration) -> Vec<Line> {
        view.map(|v| render_inputs(v, &self.traces, &self.colors, elapsed))
            .unwrap_or_default()
    }
}

pub struct GearRpmWidget {
    blink_interval: Duration,
    steering_limit: f64,
}

impl GearRpmWidget {
    pub fn new(config: &Config) -> Self {
        Self {
            blink_interval: config.gauges.blink_interval(),
            steering_limit: config.gauges.steering_limit,
        }
    }
}

impl Widget for GearRpmWidget {
    type View = GearRpm;

    fn render(&self, view: Option<&GearRpm>, elapsed: Duration) -> Vec<Line> {
        view.map(|v| render_gear_rpm(v, elapsed, self.blink_interval, self.steering_limit))
            .unwrap_or_default()
    }
}

pub struct RollingStartWidget {
    preview: bool,
    min_distance_meters: f64,
    bar_range_meters: f64,
}

impl RollingStartWidget {
    pub fn new(config: &Config) -> Self {
        Self {
            preview: config.server.preview,
            min_distance_meters: config.rolling_start.min_distance_meters,
            bar_range_meters: config.rolling_start.bar_range_meters,
        }
    }
}

impl Widget for RollingStartWidget {
    type View = RollingStart;

    fn render(&self, view: Option<&RollingStart>, _elapsed: Duration) -> Vec<Line> {
        render_rolling_start(
            view,
            self.preview,
            self.min_distance_meters,
            self.bar_range_meters,
        )
    }
}

pub struct StandingsWidget {
    show_top_n: usize,
    section_height: u32,
    metrics: LayoutMetrics,
    theme: StandingsTheme,
}

impl StandingsWidget {
    pub fn new(config: &Config) -> Self {
        Self {
            show_top_n: config.standings.show_top_n,
            section_height: config.standings.section_height,
            metrics: config.standings.layout,
            theme: config.standings.theme(),
        }
    }
}

impl Widget for StandingsWidget {
    type View = StandingsFeed;

    fn render(&self, view: Option<&StandingsFeed>, _elapsed: Duration) -> Vec<Line> {
        let Some(feed) = view else {
            return Vec::new();
        };
        let board = StandingsBoard::new(feed, self.show_top_n, self.metrics);
        render_standings(&feed.session, &board.layout(self.section_height), &self.theme)
    }
}

/// Leaderboard by overall position
///
/// Without a viewport every classified driver is listed; with one the rows
/// are fitted around the selected car.
pub struct LeaderboardWidget {
    viewport_height: Option<u32>,
}

impl LeaderboardWidget {
    /// Full field, highlighting the spectated car
    pub fn positions() -> Self {
        Self {
            viewport_height: None,
        }
    }

    /// Rows fitted to the configured viewport
    pub fn fitted(config: &Config) -> Self {
        Self {
            viewport_height: Some(config.leaderboard.viewport_height),
        }
    }
}

impl Widget for LeaderboardWidget {
    type View = LeaderboardFeed;

    fn render(&self, view: Option<&LeaderboardFeed>, _elapsed: Duration) -> Vec<Line> {
        view.map(|feed| render_leaderboard(&leaderboard_rows(feed, self.viewport_height)))
            .unwrap_or_default()
    }
}

// =============================================================================
// RUNNER
// =============================================================================

pub struct WidgetRunner<W: Widget> {
    widget: W,
    session: FeedSession<W::View>,
    last_lines: Vec<Line>,
    last_emit: Option<Duration>,
}

impl<W: Widget> WidgetRunner<W> {
    pub fn new(widget: W) -> Result<Self, SchemaError> {
        Ok(Self {
            widget,
            session: FeedSession::new()?,
            last_lines: Vec::new(),
            last_emit: None,
        })
    }

    pub fn session(&self) -> &FeedSession<W::View> {
        &self.session
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Drain the feed, advance the widget and render
    ///
    /// Returns the lines when they changed and the last emit is at least
    /// `RENDER_INTERVAL` old.
    pub fn step<R: FeedEventReceiver>(
        &mut self,
        feed: &mut R,
        elapsed: Duration,
    ) -> Option<Vec<Line>> {
        for event in self.session.update(feed) {
            match event {
                SessionEvent::ConnectionChanged(status) => {
                    info!(status = status.label(), "[HUD] Connection status");
                }
                SessionEvent::ViewUpdated => {
                    if let Some(view) = self.session.view() {
                        self.widget.on_view(view);
                    }
                }
                SessionEvent::ViewWithheld => info!("[HUD] Waiting for complete telemetry"),
                SessionEvent::FeedError(_) => {}
            }
        }
        self.widget.tick(elapsed);

        if let Some(last) = self.last_emit {
            if elapsed.saturating_sub(last) < RENDER_INTERVAL {
                return None;
            }
        }
        let lines = self.widget.render(self.session.view(), elapsed);
        if self.last_emit.is_some() && lines == self.last_lines {
            return None;
        }
        self.last_emit = Some(elapsed);
        self.last_lines = lines.clone();
        Some(lines)
    }
}

/// Run a widget against a feed until `duration` elapses (forever if `None`)
pub fn run<W, R>(runner: &mut WidgetRunner<W>, feed: &mut R, duration: Option<Duration>)
where
    W: Widget,
    R: FeedEventReceiver,
{
    let start = Instant::now();
    loop {
        let elapsed = start.elapsed();
        if duration.is_some_and(|limit| elapsed >= limit) {
            break;
        }
        if let Some(lines) = runner.step(feed, elapsed) {
            log_lines(&lines);
        }
        std::thread::sleep(FEED_LOOP_TICK);
    }
    if let Some(error) = runner.session().last_error() {
        warn!(error = %error, "[HUD] Last feed error");
    }
}

fn log_lines(lines: &[Line]) {
    if lines.is_empty() {
        info!("[HUD] (nothing to show)");
        return;
    }
    for line in lines {
        match &line.color {
            Some(color) => info!(color = %color, "{}", line.text),
            None => info!("{}", line.text),
        }
    }
}
