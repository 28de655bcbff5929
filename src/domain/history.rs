use crate::domain::market_data::StockCode;
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub code: StockCode,
    pub name: String,
}

/// Recently viewed instruments, newest first, unique by code
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStore {
    /// Capacity is clamped to `1..=DEFAULT_HISTORY_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, DEFAULT_HISTORY_CAPACITY);
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    /// Moves `code` to the head with the latest name, evicting the oldest
    /// entry when full.
    pub fn record(&mut self, code: StockCode, name: impl Into<String>) {
        self.entries.retain(|entry| entry.code != code);
        self.entries.push_front(HistoryEntry { code, name: name.into() });
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.code.value()).collect()
    }

    pub fn get(&self, code: &StockCode) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| &entry.code == code)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
