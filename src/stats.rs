use crate::models::{MangaRecord, Status};
use rustc_hash::FxHashMap;

/// Header key for a status label: lower-cased with all whitespace removed
/// (and the hyphen of "On-Hold" dropped, matching `user_total_onhold`).
pub fn normalize_status_key(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Per-status record counts for the `<myinfo>` header.
#[derive(Debug, Clone)]
pub struct StatusCounts {
    counts: FxHashMap<String, u64>,
    total: u64,
}

impl Default for StatusCounts {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCounts {
    pub fn new() -> Self {
        let counts = Status::ALL
            .iter()
            .map(|s| (normalize_status_key(s.label()), 0))
            .collect();
        Self { counts, total: 0 }
    }

    /// Counts one record. A label outside the canonical set is counted as
    /// "Plan to Read", the same fallback the mapper applies.
    pub fn inc(&mut self, label: &str) {
        let key = normalize_status_key(label);
        let key = if self.counts.contains_key(&key) {
            key
        } else {
            normalize_status_key(Status::PlanToRead.label())
        };
        *self.counts.entry(key).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn get(&self, status: Status) -> u64 {
        self.counts
            .get(&normalize_status_key(status.label()))
            .copied()
            .unwrap_or(0)
    }

    /// Count by normalized key (`reading`, `completed`, `onhold`, `dropped`, `plantoread`).
    pub fn get_key(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Single pass over all records.
pub fn aggregate(records: &[MangaRecord]) -> StatusCounts {
    let mut counts = StatusCounts::new();
    for record in records {
        counts.inc(&record.my_status);
    }
    counts
}
