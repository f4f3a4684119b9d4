//! The `Alert` entity (spec §3/§4.6).

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// info=1, warning=2, error=3 (spec §4.6 sort rank).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Info => 1,
            Self::Warning => 2,
            Self::Error => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Regression,
    Anomaly,
    Ci,
    Noise,
    Threshold,
}

/// Fixed display order for the alert-count summary line (spec §4.6).
pub const CATEGORY_ORDER: [Category; 5] =
    [Category::Regression, Category::Anomaly, Category::Ci, Category::Threshold, Category::Noise];

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub severity: Severity,
    pub category: Category,
    pub title: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    /// Merge count; `0` means "not merged, don't show a badge" per the
    /// drain pipeline's dedup step.
    pub count: u32,
    /// Set once this alert has been included in a diff response, so
    /// later polls below the watermark skip it (spec §4.6).
    pub delivered_at: Option<u64>,
}

impl Alert {
    #[must_use]
    pub fn new(severity: Severity, category: Category, title: impl Into<String>, detail: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            title: title.into(),
            detail: detail.into(),
            timestamp: Utc::now(),
            source: source.into(),
            count: 1,
            delivered_at: None,
        }
    }
}
