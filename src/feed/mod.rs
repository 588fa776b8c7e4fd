//! Feed module - networked side of the HUD
//!
//! This module contains the code that talks to the outside world:
//! - Configuration loading
//! - Logging setup
//! - WebSocket client for the telemetry server
//! - Widget runners driving a feed session

pub mod config;
pub mod logging;
pub mod websocket;
pub mod widgets;

pub use config::{Config, ConfigError};
pub use websocket::TelemetryClient;
