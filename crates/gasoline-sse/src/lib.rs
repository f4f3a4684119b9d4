//! SSE connection registry.

pub mod registry;

pub use registry::{new_session_id, SseError, SseRegistry};
