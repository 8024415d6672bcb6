//! Bounded, newest-first event history.
//!
//! The log keeps at most [`MAX_EVENTS`] entries. Pushing past the bound
//! evicts from the back, so the entries retained are always the most
//! recent ones in creation order. Eviction is the only way an entry ever
//! leaves the log.

use std::collections::VecDeque;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::structs::LogEvent;

/// Maximum number of entries the event log retains.
pub const MAX_EVENTS: usize = 100;

/// Newest-first event history with a fixed upper bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    entries: VecDeque<LogEvent>,
    limit: usize,
}

impl EventLog {
    /// Create an empty log bounded at [`MAX_EVENTS`].
    pub fn new() -> Self {
        Self::with_limit(MAX_EVENTS)
    }

    /// Create an empty log with a custom bound. A bound of zero is raised
    /// to one so the log can always hold the latest entry.
    fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Record a new entry at the front, evicting the oldest if the bound is
    /// exceeded.
    pub fn push(&mut self, event: LogEvent) {
        self.entries.push_front(event);
        self.entries.truncate(self.limit);
    }

    /// Iterate entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEvent> {
        self.entries.iter()
    }

    /// The most recently recorded entry.
    pub fn latest(&self) -> Option<&LogEvent> {
        self.entries.front()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured bound.
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a LogEvent;
    type IntoIter = std::collections::vec_deque::Iter<'a, LogEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// The wire form is a plain newest-first array; the bound is a process
// setting, not data.
impl Serialize for EventLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

impl<'de> Deserialize<'de> for EventLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<LogEvent>::deserialize(deserializer)?;
        let mut log = Self::new();
        for event in entries.into_iter().rev() {
            log.push(event);
        }
        Ok(log)
    }
}
