//! Bounded, append-only history buffer.
//!
//! Used for focus events, rule executions, snap records and tiling runs.
//! Once the capacity is exceeded the oldest entries are dropped one at a
//! time, so the buffer always holds the most recent `capacity` entries.

use std::collections::VecDeque;

use serde::Serialize;

/// Fixed-capacity history that drops its oldest entries when full.
#[derive(Debug, Clone, Serialize)]
pub struct BoundedHistory<T> {
    entries: VecDeque<T>,
    capacity: usize,
    #[serde(skip)]
    total_recorded: u64,
}

impl<T> BoundedHistory<T> {
    /// Creates an empty history with the given capacity (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            total_recorded: 0,
        }
    }

    /// Appends an entry, dropping the oldest ones beyond capacity.
    pub fn push(&mut self, entry: T) {
        self.entries.push_back(entry);
        self.total_recorded += 1;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Returns `true` if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Maximum number of retained entries.
    #[must_use]
    pub const fn capacity(&self) -> usize { self.capacity }

    /// Number of entries ever recorded, including dropped ones.
    #[must_use]
    pub const fn total_recorded(&self) -> u64 { self.total_recorded }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    /// The most recently recorded entry.
    #[must_use]
    pub fn latest(&self) -> Option<&T> { self.entries.back() }

    /// The `n` most recent entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    /// Removes every entry.
    pub fn clear(&mut self) { self.entries.clear(); }

    /// Keeps only the entries matching the predicate.
    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) { self.entries.retain(f); }
}

impl<T: Clone> BoundedHistory<T> {
    /// Clones the retained entries into a vector, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> { self.entries.iter().cloned().collect() }
}
