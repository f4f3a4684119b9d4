//! Capacity-bounded FIFO with a monotone `total_added` counter.
//!
//! Cursor-based ring buffers replace position peeking (design note:
//! "Cursor-based ring buffers replace position peeking"): consumers
//! never see the backing storage directly, only `(total_added,
//! added_at[])`, which keeps readers decoupled from writers without
//! sharing internal slices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A reader's last-seen `total_added` on a [`RingBuffer`].
///
/// Invariant: `position <= current_total_added` for the buffer it was
/// read from; violating that would mean the reader has seen items
/// that were never added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferCursor {
    pub position: u64,
}

impl BufferCursor {
    #[must_use]
    pub const fn new(position: u64) -> Self {
        Self { position }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self { position: 0 }
    }
}

/// Result of reading a [`RingBuffer`] against a [`BufferCursor`].
pub struct CursorRead<'a, T> {
    /// Items newer than the cursor, oldest first.
    pub items: Vec<&'a T>,
    /// Number of entries that were evicted before the reader caught
    /// up, i.e. lost to capacity pressure. Zero when nothing was lost.
    pub gap: u64,
    /// The cursor the caller should persist for its next read.
    pub advanced: BufferCursor,
}

/// Capacity-bounded FIFO with a monotonically increasing `total_added`
/// counter and a parallel `added_at` timestamp slice.
///
/// Invariants (see spec §3 / testable property 4):
/// - `len(buf) <= capacity`
/// - `total_added >= len(buf)`
/// - `added_at` is the same length as the buffer and non-decreasing.
#[derive(Debug)]
pub struct RingBuffer<T> {
    capacity: usize,
    items: VecDeque<T>,
    added_at: VecDeque<DateTime<Utc>>,
    total_added: u64,
}

impl<T> RingBuffer<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be positive");
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
            added_at: VecDeque::with_capacity(capacity),
            total_added: 0,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn total_added(&self) -> u64 {
        self.total_added
    }

    /// `total_added` at the time the oldest retained item was added,
    /// i.e. the lowest position a cursor can read from without a gap.
    #[must_use]
    pub fn oldest_position(&self) -> u64 {
        self.total_added - self.items.len() as u64
    }

    /// Append one item, evicting the oldest entry if at capacity.
    pub fn push(&mut self, item: T, added_at: DateTime<Utc>) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
            self.added_at.pop_front();
        }
        self.items.push_back(item);
        self.added_at.push_back(added_at);
        self.total_added += 1;
    }

    /// Append a batch, preserving order within the batch (ingest
    /// contract: "order inside a request is preserved").
    pub fn push_many(&mut self, items: impl IntoIterator<Item = T>, added_at: DateTime<Utc>) {
        for item in items {
            self.push(item, added_at);
        }
    }

    /// All items currently retained, oldest first.
    #[must_use]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }

    /// Read everything newer than `cursor`.
    ///
    /// New items = `min(len(buf), total_added - cursor.position)`.
    /// If the oldest retained entry's `total_added` exceeds the
    /// cursor's position, the gap is `total_added - position -
    /// len(buf)` entries known to have been lost to eviction.
    #[must_use]
    pub fn read_since(&self, cursor: BufferCursor) -> CursorRead<'_, T> {
        let position = cursor.position.min(self.total_added);
        let available = self.total_added.saturating_sub(position);
        let new_count = available.min(self.items.len() as u64) as usize;
        let gap = self.total_added.saturating_sub(position + self.items.len() as u64);

        let skip = self.items.len() - new_count;
        let items = self.items.iter().skip(skip).collect();

        CursorRead {
            items,
            gap,
            advanced: BufferCursor::new(self.total_added),
        }
    }

    /// Binary-search `added_at` for the `total_added` position
    /// corresponding to the first item strictly after `t`.
    ///
    /// Clamped at zero; result may exceed `oldest_position()` and
    /// `total_added()` at the two extremes.
    #[must_use]
    pub fn position_after(&self, t: DateTime<Utc>) -> u64 {
        // partition_point finds the first index where `added_at > t`.
        let idx = self.added_at.partition_point(|ts| *ts <= t);
        let from_end = self.added_at.len() - idx;
        self.total_added.saturating_sub(from_end as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn ts(offset_secs: i64) -> DateTime<Utc> {
        Utc::now() + ChronoDuration::seconds(offset_secs)
    }

    #[test]
    fn invariants_hold_after_overflow_push() {
        let mut buf: RingBuffer<i32> = RingBuffer::new(3);
        for i in 0..10 {
            buf.push(i, ts(i));
        }
        assert_eq!(buf.total_added(), 10);
        assert_eq!(buf.len(), 3);
        assert!(buf.len() <= buf.capacity());
        assert!(buf.total_added() >= buf.len() as u64);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![7, 8, 9]);
    }

    #[test]
    fn read_since_reports_gap_when_cursor_fell_behind_eviction() {
        let mut buf: RingBuffer<i32> = RingBuffer::new(3);
        for i in 0..10 {
            buf.push(i, ts(i));
        }
        // Cursor at position 2 (saw items 0,1); but only items 7,8,9
        // (positions 7..10) remain, so 5 entries (positions 2..7) were
        // lost to eviction.
        let read = buf.read_since(BufferCursor::new(2));
        assert_eq!(read.gap, 5);
        assert_eq!(read.items, vec![&7, &8, &9]);
        assert_eq!(read.advanced.position, 10);
    }

    #[test]
    fn read_since_with_no_gap_returns_only_new_items() {
        let mut buf: RingBuffer<i32> = RingBuffer::new(10);
        for i in 0..5 {
            buf.push(i, ts(i));
        }
        let cursor = buf.read_since(BufferCursor::zero()).advanced;
        buf.push(5, ts(5));
        buf.push(6, ts(6));
        let read = buf.read_since(cursor);
        assert_eq!(read.gap, 0);
        assert_eq!(read.items, vec![&5, &6]);
    }

    #[test]
    fn position_after_binary_search_is_monotone() {
        let mut buf: RingBuffer<i32> = RingBuffer::new(100);
        let base = Utc::now();
        for i in 0..20 {
            buf.push(i, base + ChronoDuration::seconds(i));
        }
        let mid = base + ChronoDuration::seconds(10);
        let pos = buf.position_after(mid);
        // Items 0..=10 are at or before `mid`; position 11 is first new.
        assert_eq!(pos, 11);
        assert!(buf.position_after(base - ChronoDuration::seconds(1)) <= pos);
    }
}
