use std::collections::VecDeque;
use std::fmt;

/// Number of entries the history keeps
pub const HISTORY_CAPACITY: usize = 10;

/// A past prediction; immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    label: String,
    timestamp_millis: i64,
}

impl HistoryEntry {
    /// Creates an entry with an explicit timestamp
    pub fn new(label: impl Into<String>, timestamp_millis: i64) -> Self {
        Self {
            label: label.into(),
            timestamp_millis,
        }
    }

    /// Stamps the entry with the current wall-clock time
    pub fn now(label: impl Into<String>) -> Self {
        Self::new(label, chrono::Utc::now().timestamp_millis())
    }

    /// The recorded label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Milliseconds since the Unix epoch
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.label, self.timestamp_millis)
    }
}

/// Most-recent-first log of past results, capped at [`HISTORY_CAPACITY`].
///
/// Appending past capacity silently drops the oldest entries.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Puts `entry` in front, then truncates to capacity
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// Ordered snapshot, newest first
    pub fn current(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Iterates newest first without cloning
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Number of stored entries, never above the capacity
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first append
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept
    pub fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }
}
