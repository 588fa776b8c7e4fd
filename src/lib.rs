// HUD telemetry core and feed client

pub mod core;
pub mod feed;
