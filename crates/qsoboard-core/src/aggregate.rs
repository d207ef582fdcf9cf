//! One aggregation pass over the contact log.
//!
//! Every view in [`SummaryViews`] is derived from the same pass and tagged
//! with the timestamp of the newest contact it covers.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use enum_map::EnumMap;
use tracing::debug;

use crate::config::AggregationConfig;
use crate::model::{Band, EventRecord, ModeClass, ModeTable, Timestamp};
use crate::store::{BucketCount, EventStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub operator: String,
    /// Contacts per hour over the trailing window.
    pub rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorRates {
    pub rows: Vec<RateRow>,
    /// Sum of the listed rows.
    pub total: f64,
}

/// Contact counts by band and mode class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BandModeTable(EnumMap<Band, EnumMap<ModeClass, u64>>);

impl BandModeTable {
    pub fn get(&self, band: Band, mode: ModeClass) -> u64 {
        self.0[band][mode]
    }

    pub fn increment(&mut self, band: Band, mode: ModeClass) {
        self.0[band][mode] += 1;
    }

    pub fn band_total(&self, band: Band) -> u64 {
        self.0[band].values().sum()
    }

    pub fn mode_total(&self, mode: ModeClass) -> u64 {
        self.0.values().map(|modes| modes[mode]).sum()
    }

    pub fn total(&self) -> u64 {
        self.0.values().flat_map(|modes| modes.values()).sum()
    }
}

/// Per-band hourly rates for one time bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBucket {
    pub start: Timestamp,
    pub rates: EnumMap<Band, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryViews {
    pub last_event_timestamp: Timestamp,
    /// Descending by count, ties by name.
    pub operators: Vec<CategoryCount>,
    /// Descending by count, ties by name.
    pub stations: Vec<CategoryCount>,
    pub band_modes: BandModeTable,
    pub operator_rates: OperatorRates,
    /// Only buckets holding contacts on a known band, oldest first.
    pub band_series: Vec<SeriesBucket>,
    /// Ascending by section. Contacts logged without one count under `""`.
    pub sections: Vec<CategoryCount>,
}

impl SummaryViews {
    /// Runs every query of one pass. Any query error aborts the whole pass.
    pub fn compute<S>(
        store: &S,
        settings: &AggregationConfig,
        modes: &ModeTable,
        last_event_timestamp: Timestamp,
    ) -> Result<Self>
    where
        S: EventStore + ?Sized,
    {
        let records = store.scan().context("scan contacts")?;

        let window_secs = i64::from(settings.rate_window_minutes) * 60;
        let window = store
            .scan_window(last_event_timestamp - window_secs, last_event_timestamp)
            .context("scan rate window")?;

        let bucket_secs = i64::from(settings.bucket_minutes) * 60;
        let buckets = store
            .scan_bucketed(bucket_secs)
            .context("scan bucketed counts")?;

        Ok(Self {
            last_event_timestamp,
            operators: ranked_counts(records.iter().map(|r| r.operator.as_str())),
            stations: ranked_counts(records.iter().map(|r| r.station.as_str())),
            band_modes: band_mode_table(&records, modes),
            operator_rates: operator_rates(&window, settings),
            band_series: band_series(&buckets, settings.bucket_minutes),
            sections: section_counts(&records),
        })
    }
}

fn ranked_counts<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let mut ranked: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(key, count)| CategoryCount {
            key: key.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    ranked
}

fn section_counts(records: &[EventRecord]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(record.section.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(key, count)| CategoryCount {
            key: key.to_string(),
            count,
        })
        .collect()
}

fn band_mode_table(records: &[EventRecord], modes: &ModeTable) -> BandModeTable {
    let mut table = BandModeTable::default();
    for record in records {
        let Some(band) = Band::from_label(&record.band) else {
            debug!(band = %record.band, timestamp = record.timestamp, "skipping contact on unknown band");
            continue;
        };
        let Some(mode) = modes.classify(&record.mode) else {
            debug!(mode = %record.mode, timestamp = record.timestamp, "skipping contact with unknown mode");
            continue;
        };
        table.increment(band, mode);
    }
    table
}

fn operator_rates(window: &[EventRecord], settings: &AggregationConfig) -> OperatorRates {
    let per_hour = 60.0 / f64::from(settings.rate_window_minutes);
    let mut rows: Vec<RateRow> = ranked_counts(window.iter().map(|r| r.operator.as_str()))
        .into_iter()
        .map(|CategoryCount { key, count }| RateRow {
            operator: key,
            rate: count as f64 * per_hour,
        })
        .collect();
    rows.truncate(settings.top_rates);
    let total = rows.iter().map(|row| row.rate).sum();
    OperatorRates { rows, total }
}

fn band_series(buckets: &[BucketCount], bucket_minutes: u32) -> Vec<SeriesBucket> {
    let per_hour = 60.0 / f64::from(bucket_minutes);
    let mut series: Vec<SeriesBucket> = Vec::new();
    for bucket in buckets {
        let Some(band) = Band::from_label(&bucket.band) else {
            debug!(band = %bucket.band, start = bucket.bucket_start, "skipping bucket on unknown band");
            continue;
        };
        let rate = bucket.count as f64 * per_hour;
        match series.last_mut() {
            Some(last) if last.start == bucket.bucket_start => last.rates[band] += rate,
            _ => {
                let mut rates = EnumMap::default();
                rates[band] = rate;
                series.push(SeriesBucket {
                    start: bucket.bucket_start,
                    rates,
                });
            }
        }
    }
    series
}
