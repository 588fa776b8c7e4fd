//! Core module - platform-independent telemetry pipeline and widget logic

pub mod color;
pub mod constants;
pub mod field;
pub mod format;
pub mod gauges;
pub mod io_traits;
pub mod leaderboard;
pub mod pipeline;
pub mod protocol;
pub mod render;
pub mod schema;
pub mod session;
pub mod snapshot;
pub mod standings;
pub mod traces;
pub mod validate;
pub mod views;

pub use color::parse_hex_color;
pub use field::{FieldKey, FieldKind, FieldSpec};
pub use io_traits::{ConnectionStatus, FeedEvent, FeedEventReceiver};
pub use pipeline::Pipeline;
pub use protocol::{FeedMessage, Inbound};
pub use schema::{Schema, SchemaError};
pub use session::{FeedSession, SessionEvent};
pub use snapshot::Snapshot;
pub use standings::{BoardLayout, LayoutMetrics, StandingsBoard};
pub use validate::{project, validate, TelemetryView};
