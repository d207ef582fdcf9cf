use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Result, bail};

use super::EventStore;
use crate::model::EventRecord;

/// In-process contact log.
///
/// Clones share the same records, so a test (or a demo feeder) can keep one
/// handle to append contacts while the refresh worker owns another.
/// [`MemoryEventStore::set_unavailable`] makes every query fail, which is how
/// transient store outages are simulated.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    records: Arc<Mutex<Vec<EventRecord>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = EventRecord>) -> Self {
        let store = Self::new();
        store.extend(records);
        store
    }

    pub fn push(&self, record: EventRecord) {
        self.extend([record]);
    }

    pub fn extend(&self, records: impl IntoIterator<Item = EventRecord>) {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        guard.extend(records);
        guard.sort_by_key(|record| record.timestamp);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn snapshot(&self) -> Result<Vec<EventRecord>> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("event store unavailable");
        }
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }
}

impl EventStore for MemoryEventStore {
    fn latest_event(&self) -> Result<Option<EventRecord>> {
        Ok(self.snapshot()?.pop())
    }

    fn scan(&self) -> Result<Vec<EventRecord>> {
        self.snapshot()
    }
}
