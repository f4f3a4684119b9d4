//! Configuration for the push-notification stream.

use gasoline_alerts::Alert;
use serde::{Deserialize, Serialize};

use crate::notification;

fn default_events() -> Vec<String> {
    vec!["all".to_string()]
}

fn default_throttle_seconds() -> u64 {
    5
}

fn default_severity_min() -> String {
    "warning".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub enabled: bool,
    #[serde(default = "default_events")]
    pub events: Vec<String>,
    #[serde(default = "default_throttle_seconds")]
    pub throttle_seconds: u64,
    pub url_filter: Option<String>,
    #[serde(default = "default_severity_min")]
    pub severity_min: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            events: default_events(),
            throttle_seconds: default_throttle_seconds(),
            url_filter: None,
            severity_min: default_severity_min(),
        }
    }
}

impl StreamConfig {
    #[must_use]
    pub fn severity_rank(&self) -> u8 {
        match self.severity_min.as_str() {
            "info" => 1,
            "error" => 3,
            _ => 2,
        }
    }

    #[must_use]
    pub fn accepts_event(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == "all" || e == event)
    }

    /// Whether this config's subscribed events admit `alert`, per the
    /// category<->event mapping in `notification::satisfied_events`.
    /// The `all` wildcard is checked up front so categories with no
    /// named event (`Noise`) still pass under a blanket subscription.
    #[must_use]
    pub fn accepts_alert(&self, alert: &Alert) -> bool {
        if self.events.iter().any(|e| e == "all") {
            return true;
        }
        notification::satisfied_events(alert).iter().any(|event| self.accepts_event(event))
    }
}
