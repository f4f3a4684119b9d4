//! Alert buffer, dedup/correlate/sort pipeline, CI webhook handling,
//! and the anomaly/regression detectors (spec §4.6).

pub mod alert;
pub mod anomaly;
pub mod buffer;
pub mod ci;
pub mod drain;
pub mod regression;

pub use alert::{Alert, Category, Severity, CATEGORY_ORDER};
pub use anomaly::AnomalyDetector;
pub use buffer::{AlertBuffer, MAX_CI_RESULTS, MAX_PENDING_ALERTS};
pub use ci::{CiResult, CiStatus, MAX_CI_BODY_BYTES};
pub use drain::{correlate, dedupe, drain as drain_alerts, sort, summary_line};
pub use regression::RegressionDetector;
