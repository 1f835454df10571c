//! Bounded, deduplicated clipboard history
//!
//! Most-recent-first list of copied texts. Two entries never carry the same text: recording a
//! text that is already present removes the old entry and inserts a fresh one at the front.
//! Length never exceeds [`HISTORY_CAPACITY`]; overflow drops from the tail.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// Maximum number of entries kept in the history
pub const HISTORY_CAPACITY: usize = 10;

/// A single captured clipboard text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipboardEntry {
    text: String,
    captured_at: DateTime<Utc>,
}

impl ClipboardEntry {
    /// Captured text (never empty)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Wall-clock time the text was captured
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Relative age for display, e.g. "Just now" or "3 minutes ago"
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let age = now.signed_duration_since(self.captured_at);
        let (count, unit) = if age.num_days() > 0 {
            (age.num_days(), "day")
        } else if age.num_hours() > 0 {
            (age.num_hours(), "hour")
        } else if age.num_minutes() > 0 {
            (age.num_minutes(), "minute")
        } else {
            return "Just now".to_string();
        };
        let plural = if count == 1 { "" } else { "s" };
        format!("{count} {unit}{plural} ago")
    }
}

/// Clipboard history, most recent first
#[derive(Debug, Clone, Default)]
pub struct ClipboardHistory {
    entries: VecDeque<ClipboardEntry>,
}

impl ClipboardHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// Record `text` captured at `captured_at`.
    ///
    /// Returns `false` (and leaves the history untouched) for empty text.
    pub fn record(&mut self, text: String, captured_at: DateTime<Utc>) -> bool {
        if text.is_empty() {
            return false;
        }

        self.entries.retain(|entry| entry.text != text);
        self.entries.push_front(ClipboardEntry { text, captured_at });
        self.entries.truncate(HISTORY_CAPACITY);

        debug_assert!(self.entries.len() <= HISTORY_CAPACITY);
        true
    }

    /// Entries, most recent first
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &ClipboardEntry> {
        self.entries.iter()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&ClipboardEntry> {
        self.entries.front()
    }

    /// Whether an entry with exactly this text exists
    pub fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|entry| entry.text == text)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned copy of the entries for handing to the renderer
    pub fn snapshot(&self) -> Vec<ClipboardEntry> {
        self.entries.iter().cloned().collect()
    }
}
