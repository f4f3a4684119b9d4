//! CI webhook handling (spec §4.6 / §6 `/api/ci/webhook`).

use crate::alert::{Alert, Category, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_CI_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiStatus {
    Success,
    Failure,
    Error,
    Pending,
}

impl CiStatus {
    #[must_use]
    pub fn is_failing(&self) -> bool {
        matches!(self, Self::Failure | Self::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiResult {
    pub commit: String,
    pub status: CiStatus,
    #[serde(default)]
    pub pipeline: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl CiResult {
    /// Build the corresponding alert: `error` severity for
    /// failure/error statuses, `info` otherwise.
    #[must_use]
    pub fn to_alert(&self) -> Alert {
        let severity = if self.status.is_failing() { Severity::Error } else { Severity::Info };
        let pipeline = self.pipeline.as_deref().unwrap_or("CI");
        Alert {
            severity,
            category: Category::Ci,
            title: format!("{pipeline}: {:?}", self.status),
            detail: format!("commit {}", self.commit),
            timestamp: self.timestamp,
            source: "ci_webhook".to_string(),
            count: 1,
            delivered_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_status_yields_error_severity() {
        let result = CiResult {
            commit: "abc123".into(),
            status: CiStatus::Failure,
            pipeline: Some("build".into()),
            url: None,
            timestamp: Utc::now(),
        };
        assert_eq!(result.to_alert().severity, Severity::Error);
    }

    #[test]
    fn success_status_yields_info_severity() {
        let result = CiResult {
            commit: "abc123".into(),
            status: CiStatus::Success,
            pipeline: None,
            url: None,
            timestamp: Utc::now(),
        };
        assert_eq!(result.to_alert().severity, Severity::Info);
    }
}
