//! Append-only temporal event graph.

pub mod event;
pub mod graph;

pub use event::{EventType, Link, NewEvent, Origin, Status, TemporalEvent};
pub use graph::{EventQuery, QueryResult, TemporalGraph};
