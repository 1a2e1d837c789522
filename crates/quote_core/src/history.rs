use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Number of past quotes kept for duplicate detection.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// A quote that was published. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub text: String,
    /// Insertion-order key; smaller means older.
    pub sequence: u64,
    /// RFC3339 timestamp, when the recorder knows it.
    #[serde(default)]
    pub posted_at: Option<String>,
}

/// Bounded, most-recent-first window of published quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    capacity: usize,
    next_sequence: u64,
    records: VecDeque<QuoteRecord>,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryWindow {
    /// A zero capacity is bumped to one so the latest post is always remembered.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            next_sequence: 1,
            records: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts `text` as the most recent entry and returns the evicted record, if any.
    ///
    /// Duplicate texts are stored as separate entries.
    pub fn record(
        &mut self,
        text: impl Into<String>,
        posted_at: Option<String>,
    ) -> Option<QuoteRecord> {
        let record = QuoteRecord {
            text: text.into(),
            sequence: self.next_sequence,
            posted_at,
        };
        self.next_sequence += 1;
        self.records.push_front(record);
        self.evict_overflow()
    }

    /// Up to `limit` texts, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<String> {
        self.records
            .iter()
            .take(limit)
            .map(|record| record.text.clone())
            .collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &QuoteRecord> {
        self.records.iter()
    }

    /// Re-applies a (possibly smaller) capacity, e.g. after loading a persisted window.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        while self.records.len() > self.capacity {
            self.evict_overflow();
        }
        self
    }

    fn evict_overflow(&mut self) -> Option<QuoteRecord> {
        if self.records.len() <= self.capacity {
            return None;
        }
        // Records are kept in sequence order, so the back is always the oldest.
        self.records.pop_back()
    }
}
