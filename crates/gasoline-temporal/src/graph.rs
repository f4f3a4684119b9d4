//! Append-only JSONL-backed event graph: one owning file handle
//! behind a mutex, with an in-memory fingerprint index for error
//! dedup.

use crate::event::{EventType, NewEvent, Status, TemporalEvent};
use chrono::{Duration as ChronoDuration, Utc};
use gasoline_core::{fingerprint::verify_fingerprint, GasolineError, GasolineResult};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

const RETENTION_DAYS: i64 = 90;

struct Inner {
    events: Vec<TemporalEvent>,
    /// fingerprint -> index into `events`, error-type events only.
    error_index: HashMap<String, usize>,
    file: File,
    path: PathBuf,
    dirty: bool,
}

pub struct TemporalGraph {
    inner: Mutex<Inner>,
}

fn fingerprint_key(event_type: EventType, source: &str, description: &str) -> String {
    format!("{event_type:?}|{source}|{}", verify_fingerprint(description))
}

fn new_event_id() -> String {
    let unix_ms = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..10000);
    format!("evt_{unix_ms}_{suffix:04}")
}

impl TemporalGraph {
    /// Open (creating if absent) `<project_root>/history/events.jsonl`,
    /// loading all events and evicting anything older than 90 days
    /// whose timestamp parses. Unparseable timestamps are kept.
    pub fn open(project_root: &Path) -> GasolineResult<Self> {
        let dir = project_root.join("history");
        std::fs::create_dir_all(&dir).map_err(GasolineError::internal)?;
        let path = dir.join("events.jsonl");

        let mut events = Vec::new();
        if path.exists() {
            let file = File::open(&path).map_err(GasolineError::internal)?;
            for line in BufReader::new(file).lines() {
                let line = line.map_err(GasolineError::internal)?;
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str::<TemporalEvent>(trimmed) {
                    Ok(event) => events.push(event),
                    Err(err) => tracing::warn!(%err, "skipping unreadable temporal event line"),
                }
            }
        }

        let cutoff = Utc::now() - ChronoDuration::days(RETENTION_DAYS);
        let before = events.len();
        events.retain(|event| event.parsed_timestamp().is_none_or(|ts| ts >= cutoff));
        let evicted = before - events.len();

        let mut error_index = HashMap::new();
        for (idx, event) in events.iter().enumerate() {
            if event.event_type == EventType::Error {
                error_index.insert(fingerprint_key(event.event_type, &event.source, &event.description), idx);
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path).map_err(GasolineError::internal)?;
        let graph = Self { inner: Mutex::new(Inner { events, error_index, file, path, dirty: false }) };
        if evicted > 0 {
            graph.rewrite()?;
        }
        Ok(graph)
    }

    /// Record an event. For error-type events whose
    /// `type|source|normalizedMessage` fingerprint already exists, the
    /// matching event's occurrence count is bumped and its timestamp
    /// refreshed in memory instead of appending a new line; the file
    /// is only brought back in sync on the next `flush`/`close`. All
    /// other events are appended immediately.
    pub fn record(&self, input: NewEvent) -> GasolineResult<TemporalEvent> {
        let mut inner = self.inner.lock();
        let now = Utc::now().to_rfc3339();

        if input.event_type == EventType::Error {
            let key = fingerprint_key(input.event_type, &input.source, &input.description);
            if let Some(&idx) = inner.error_index.get(&key) {
                let event = &mut inner.events[idx];
                event.occurrence_count += 1;
                event.timestamp = now;
                let updated = event.clone();
                inner.dirty = true;
                return Ok(updated);
            }
        }

        let event = TemporalEvent {
            id: new_event_id(),
            event_type: input.event_type,
            timestamp: now,
            description: input.description,
            source: input.source,
            origin: input.origin,
            agent: input.agent,
            status: Status::Active,
            links: input.links,
            occurrence_count: 1,
        };

        let line = serde_json::to_string(&event).map_err(GasolineError::internal)?;
        writeln!(inner.file, "{line}").map_err(GasolineError::internal)?;
        inner.file.flush().map_err(GasolineError::internal)?;

        if event.event_type == EventType::Error {
            let key = fingerprint_key(event.event_type, &event.source, &event.description);
            inner.error_index.insert(key, inner.events.len());
        }
        inner.events.push(event.clone());
        Ok(event)
    }

    /// Rewrite the whole file from the in-memory event list,
    /// persisting occurrence-count bumps and retention eviction.
    pub fn flush(&self) -> GasolineResult<()> {
        let mut inner = self.inner.lock();
        if !inner.dirty {
            return Ok(());
        }
        Self::rewrite_inner(&mut inner)?;
        inner.dirty = false;
        Ok(())
    }

    fn rewrite(&self) -> GasolineResult<()> {
        let mut inner = self.inner.lock();
        Self::rewrite_inner(&mut inner)
    }

    fn rewrite_inner(inner: &mut Inner) -> GasolineResult<()> {
        let mut contents = String::new();
        for event in &inner.events {
            let line = serde_json::to_string(event).map_err(GasolineError::internal)?;
            contents.push_str(&line);
            contents.push('\n');
        }
        std::fs::write(&inner.path, contents).map_err(GasolineError::internal)?;
        inner.file = OpenOptions::new().create(true).append(true).open(&inner.path).map_err(GasolineError::internal)?;
        Ok(())
    }

    #[must_use]
    pub fn query(&self, query: &EventQuery) -> QueryResult {
        let inner = self.inner.lock();
        let window = query.since_window.as_deref().unwrap_or("7d");
        let cutoff = parse_window(window).map(|dur| Utc::now() - dur);

        let matches: Vec<TemporalEvent> = inner
            .events
            .iter()
            .filter(|e| query.event_type.is_none_or(|t| e.event_type == t))
            .filter(|e| cutoff.is_none_or(|c| e.parsed_timestamp().is_none_or(|ts| ts >= c)))
            .filter(|e| query.contains.as_deref().is_none_or(|needle| e.description.contains(needle)))
            .filter(|e| {
                query.links_to.as_deref().is_none_or(|target| e.links.iter().any(|l| l.target_id == target))
            })
            .cloned()
            .collect();

        let total = matches.len();
        let summary = if total == 0 {
            format!("no events in the last {window}")
        } else {
            format!("{total} event(s) in the last {window}")
        };
        QueryResult { events: matches, total, window: window.to_string(), summary }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_window(window: &str) -> Option<ChronoDuration> {
    let (num, unit) = window.split_at(window.len().saturating_sub(1));
    let n: i64 = num.parse().ok()?;
    match unit {
        "h" => Some(ChronoDuration::hours(n)),
        "d" => Some(ChronoDuration::days(n)),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub event_type: Option<EventType>,
    pub since_window: Option<String>,
    pub contains: Option<String>,
    pub links_to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QueryResult {
    pub events: Vec<TemporalEvent>,
    pub total: usize,
    pub window: String,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Origin;

    fn input(event_type: EventType, source: &str, description: &str) -> NewEvent {
        NewEvent { event_type, description: description.into(), source: source.into(), origin: Origin::System, agent: None, links: vec![] }
    }

    #[test]
    fn error_events_dedupe_by_fingerprint_and_bump_count() {
        let dir = tempfile::tempdir().unwrap();
        let graph = TemporalGraph::open(dir.path()).unwrap();
        let first = graph.record(input(EventType::Error, "browser", "TypeError: x is undefined at app.js:42")).unwrap();
        let second = graph.record(input(EventType::Error, "browser", "TypeError: x is undefined at app.js:99")).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.occurrence_count, 2);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn non_error_events_never_dedupe() {
        let dir = tempfile::tempdir().unwrap();
        let graph = TemporalGraph::open(dir.path()).unwrap();
        graph.record(input(EventType::Deploy, "ci", "deployed v1")).unwrap();
        graph.record(input(EventType::Deploy, "ci", "deployed v1")).unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn query_filters_by_type_and_substring() {
        let dir = tempfile::tempdir().unwrap();
        let graph = TemporalGraph::open(dir.path()).unwrap();
        graph.record(input(EventType::Error, "browser", "network failure on /api/widgets")).unwrap();
        graph.record(input(EventType::Deploy, "ci", "deployed v2")).unwrap();

        let result = graph.query(&EventQuery { event_type: Some(EventType::Error), since_window: None, contains: Some("widgets".into()), links_to: None });
        assert_eq!(result.total, 1);
        assert_eq!(result.window, "7d");
    }

    #[test]
    fn flush_persists_bumped_occurrence_count_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let graph = TemporalGraph::open(dir.path()).unwrap();
            graph.record(input(EventType::Error, "browser", "boom at app.js:1")).unwrap();
            graph.record(input(EventType::Error, "browser", "boom at app.js:2")).unwrap();
            graph.flush().unwrap();
        }
        let reopened = TemporalGraph::open(dir.path()).unwrap();
        assert_eq!(reopened.len(), 1);
        let result = reopened.query(&EventQuery::default());
        assert_eq!(result.events[0].occurrence_count, 2);
    }
}
