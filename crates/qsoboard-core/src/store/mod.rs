//! Read access to the contact log.
//!
//! The aggregator only needs four queries from the store. Any of them may fail
//! transiently (database locked, file not created yet); callers treat a failure
//! as "no update this cycle".

mod memory;
mod sqlite;

use std::collections::BTreeMap;

use anyhow::Result;
pub use memory::MemoryEventStore;
pub use sqlite::SqliteEventStore;

use crate::model::{EventRecord, Timestamp};

/// Number of contacts on one band inside one fixed-width time bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketCount {
    /// Bucket start, aligned to a multiple of the bucket width.
    pub bucket_start: Timestamp,
    /// Raw band label.
    pub band: String,
    pub count: u64,
}

pub trait EventStore {
    /// Most recent contact, or `None` when the log is empty.
    fn latest_event(&self) -> Result<Option<EventRecord>>;

    fn latest_timestamp(&self) -> Result<Option<Timestamp>> {
        Ok(self.latest_event()?.map(|record| record.timestamp))
    }

    /// Every contact, oldest first.
    fn scan(&self) -> Result<Vec<EventRecord>>;

    /// Contacts with `start <= timestamp <= end`, oldest first.
    fn scan_window(&self, start: Timestamp, end: Timestamp) -> Result<Vec<EventRecord>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|record| (start..=end).contains(&record.timestamp))
            .collect())
    }

    /// Per-band counts grouped into `bucket_secs` wide buckets, ordered by
    /// bucket start then band. Only non-empty groups are returned.
    fn scan_bucketed(&self, bucket_secs: i64) -> Result<Vec<BucketCount>> {
        anyhow::ensure!(bucket_secs > 0, "bucket width must be positive");
        let mut groups: BTreeMap<(Timestamp, String), u64> = BTreeMap::new();
        for record in self.scan()? {
            let start = record.timestamp.div_euclid(bucket_secs) * bucket_secs;
            *groups.entry((start, record.band)).or_default() += 1;
        }
        Ok(groups
            .into_iter()
            .map(|((bucket_start, band), count)| BucketCount {
                bucket_start,
                band,
                count,
            })
            .collect())
    }
}

impl<S: EventStore + ?Sized> EventStore for Box<S> {
    fn latest_event(&self) -> Result<Option<EventRecord>> {
        (**self).latest_event()
    }

    fn scan(&self) -> Result<Vec<EventRecord>> {
        (**self).scan()
    }

    fn scan_window(&self, start: Timestamp, end: Timestamp) -> Result<Vec<EventRecord>> {
        (**self).scan_window(start, end)
    }

    fn scan_bucketed(&self, bucket_secs: i64) -> Result<Vec<BucketCount>> {
        (**self).scan_bucketed(bucket_secs)
    }
}
