use std::collections::HashMap;

use parking_lot::Mutex;

use crate::{JournalStore, LedgerResult};

/// Zero-pad width used for document identifiers like `GJ-000001`.
pub const DEFAULT_SEQUENCE_WIDTH: usize = 6;

/// Per-prefix monotonic id generator. An issued id is not tied to the record
/// it names; a caller that fails after requesting one simply burns it.
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    counters: Mutex<HashMap<String, u64>>,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds counters so the next issued value continues after `last`.
    pub fn with_seed<I>(seed: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        Self {
            counters: Mutex::new(seed.into_iter().collect()),
        }
    }

    /// Bootstraps the journal counter from the highest persisted journal id.
    pub fn bootstrap<S>(store: &S, prefix: &str) -> LedgerResult<Self>
    where
        S: JournalStore + ?Sized,
    {
        let last = store.latest_journal_number(prefix)?.unwrap_or(0);
        Ok(Self::with_seed([(prefix.to_string(), last)]))
    }

    /// Returns the next id for `prefix`, e.g. `GJ-000002`.
    pub fn next(&self, prefix: &str) -> String {
        self.next_with_width(prefix, DEFAULT_SEQUENCE_WIDTH)
    }

    pub fn next_with_width(&self, prefix: &str, width: usize) -> String {
        let mut counters = self.counters.lock();
        let counter = counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{prefix}-{:0width$}", counter)
    }
}
