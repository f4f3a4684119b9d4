//! Ring-buffered capture pipeline: ingest endpoints, rate limiting and
//! cursor-based reads for the four (plus performance) telemetry
//! streams (spec §4.3).

pub mod config;
pub mod ingest;
pub mod pipeline;
pub mod rate_limit;

pub use config::CaptureConfig;
pub use pipeline::{BufferPositions, CapturePipeline};
pub use rate_limit::IngestRateLimiter;
