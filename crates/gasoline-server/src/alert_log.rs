//! Bridges `gasoline-alerts`' ephemeral pending queue with the
//! checkpoint engine's `alert_watermark` field: `AlertBuffer` is
//! drained (and therefore emptied) every time the stream poller runs,
//! so a durable, sequence-numbered history is kept here for
//! checkpoint diffs to query against (spec §4.4/§4.6, scenario S6:
//! "includes any pending regression alerts not yet delivered").

use gasoline_alerts::Alert;
use parking_lot::Mutex;

pub struct AlertLog {
    entries: Mutex<Vec<Alert>>,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertLog {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Mutex::new(Vec::new()) }
    }

    /// Append a freshly-drained batch (already deduped/correlated/
    /// sorted by `gasoline_alerts::drain_alerts`), returning the
    /// watermark after appending.
    pub fn append(&self, alerts: Vec<Alert>) -> u64 {
        let mut entries = self.entries.lock();
        entries.extend(alerts);
        entries.len() as u64
    }

    /// The current watermark, usable as a new checkpoint's
    /// `alert_watermark`.
    #[must_use]
    pub fn watermark(&self) -> u64 {
        self.entries.lock().len() as u64
    }

    /// Alerts appended since `watermark`, oldest first.
    #[must_use]
    pub fn since(&self, watermark: u64) -> Vec<Alert> {
        let entries = self.entries.lock();
        let start = (watermark as usize).min(entries.len());
        entries[start..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasoline_alerts::{Category, Severity};

    fn alert(title: &str) -> Alert {
        Alert::new(Severity::Warning, Category::Regression, title, "d", "s")
    }

    #[test]
    fn since_returns_only_entries_past_the_watermark() {
        let log = AlertLog::new();
        log.append(vec![alert("a"), alert("b")]);
        let watermark = log.watermark();
        log.append(vec![alert("c")]);
        let fresh = log.since(watermark);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].title, "c");
    }
}
