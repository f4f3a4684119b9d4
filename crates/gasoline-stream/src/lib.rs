//! Push-notification stream: turns fired alerts into MCP
//! `notifications/message` payloads, gated by throttle, a per-minute
//! rate cap, and short-window dedup.

pub mod config;
pub mod notification;
pub mod state;

pub use config::StreamConfig;
pub use state::{StreamState, StreamStatus};
