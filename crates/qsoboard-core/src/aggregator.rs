//! Change detection, aggregation and snapshot publication for one refresh
//! cycle.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::aggregate::SummaryViews;
use crate::config::AggregationConfig;
use crate::model::{ModeTable, Timestamp};
use crate::render::{ArtifactRenderer, DisplaySize};
use crate::slots::{SlotId, TitleCard, render_slot};
use crate::snapshot::{Snapshot, SnapshotWriter};
use crate::store::EventStore;

/// Seconds subtracted from "now" to stamp a pass over an empty store.
const EMPTY_STORE_OFFSET_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Timestamp to pass back as `previous` next cycle.
    pub timestamp: Option<Timestamp>,
    pub updated: bool,
}

impl RefreshOutcome {
    fn unchanged(previous: Option<Timestamp>) -> Self {
        Self {
            timestamp: previous,
            updated: false,
        }
    }
}

fn now_epoch() -> Timestamp {
    Utc::now().timestamp()
}

pub struct Aggregator<S, R: ArtifactRenderer> {
    store: S,
    renderer: R,
    writer: SnapshotWriter<R::Artifact>,
    settings: AggregationConfig,
    modes: ModeTable,
    card: TitleCard,
    /// Views of the last successful pass, kept for re-rendering on resize.
    cached: Option<SummaryViews>,
    rendered_size: Option<DisplaySize>,
    clock: fn() -> Timestamp,
}

impl<S, R> Aggregator<S, R>
where
    S: EventStore,
    R: ArtifactRenderer,
{
    pub fn new(
        store: S,
        renderer: R,
        writer: SnapshotWriter<R::Artifact>,
        settings: AggregationConfig,
        modes: ModeTable,
        card: TitleCard,
    ) -> Self {
        Self {
            store,
            renderer,
            writer,
            settings,
            modes,
            card,
            cached: None,
            rendered_size: None,
            clock: now_epoch,
        }
    }

    /// Replaces the wall clock used for the empty-store timestamp.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> Timestamp) -> Self {
        self.clock = clock;
        self
    }

    /// Runs one cycle. `previous` is the timestamp returned by the last call,
    /// `None` before the first one.
    ///
    /// Store and render failures are logged and never propagate: the cycle
    /// reports `updated = false` and the published snapshot stays as it was.
    pub fn refresh(&mut self, previous: Option<Timestamp>, size: DisplaySize) -> RefreshOutcome {
        let latest = match self.store.latest_event() {
            Ok(latest) => latest,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "event store unavailable; skipping refresh");
                return RefreshOutcome::unchanged(previous);
            }
        };

        let (timestamp, banner) = match latest {
            Some(record) => (record.timestamp, Some(record.banner())),
            // Only the very first pass renders an empty store.
            None if previous.is_some() => return RefreshOutcome::unchanged(previous),
            None => ((self.clock)() - EMPTY_STORE_OFFSET_SECS, None),
        };

        if previous == Some(timestamp) {
            debug!(timestamp, "no new contacts");
            return RefreshOutcome::unchanged(previous);
        }

        let views = match SummaryViews::compute(&self.store, &self.settings, &self.modes, timestamp)
        {
            Ok(views) => views,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "aggregation pass failed; keeping previous snapshot");
                return RefreshOutcome::unchanged(previous);
            }
        };

        let mut next = (*self.writer.current()).clone();
        self.render_into(&mut next, &views, size);
        next.last_event = Some(timestamp);
        next.banner = banner;
        self.writer.publish(next);
        self.cached = Some(views);

        info!(
            last_event = timestamp,
            generation = self.writer.current().generation,
            "published snapshot"
        );
        RefreshOutcome {
            timestamp: Some(timestamp),
            updated: true,
        }
    }

    /// Re-renders the last pass at a new size without querying the store.
    /// Returns whether anything was published.
    pub fn rerender(&mut self, size: DisplaySize) -> bool {
        if self.rendered_size == Some(size) {
            return false;
        }
        let Some(views) = self.cached.take() else {
            return false;
        };
        let mut next = (*self.writer.current()).clone();
        self.render_into(&mut next, &views, size);
        self.writer.publish(next);
        self.cached = Some(views);
        debug!(width = size.width, height = size.height, "re-rendered snapshot");
        true
    }

    fn render_into(&mut self, next: &mut Snapshot<R::Artifact>, views: &SummaryViews, size: DisplaySize) {
        let resized = self.rendered_size != Some(size);
        for slot in SlotId::ALL {
            // The title card never depends on the data.
            if slot == SlotId::Logo && !resized && next.slots[slot].is_some() {
                continue;
            }
            match render_slot(&self.renderer, views, slot, &self.card, &self.settings, size) {
                Ok(artifact) => next.slots[slot] = Some(Arc::new(artifact)),
                Err(err) => {
                    warn!(?slot, error = %format!("{err:#}"), "render failed; keeping previous artifact");
                }
            }
        }
        self.rendered_size = Some(size);
        next.size = Some(size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventRecord;
    use crate::render::stub::StubRenderer;
    use crate::snapshot::{self, SnapshotReader};
    use crate::store::MemoryEventStore;

    const SIZE: DisplaySize = DisplaySize::new(80, 23);

    fn card() -> TitleCard {
        TitleCard {
            title: "Field Day".to_string(),
            lines: vec!["W1AW".to_string()],
        }
    }

    fn fixed_clock() -> Timestamp {
        1_000_000
    }

    fn aggregator(
        store: MemoryEventStore,
        renderer: StubRenderer,
    ) -> (Aggregator<MemoryEventStore, StubRenderer>, SnapshotReader<String>) {
        let (writer, reader) = snapshot::channel(Snapshot::default());
        let aggregator = Aggregator::new(
            store,
            renderer,
            writer,
            AggregationConfig::default(),
            ModeTable::default(),
            card(),
        )
        .with_clock(fixed_clock);
        (aggregator, reader)
    }

    fn record(ts: Timestamp, operator: &str) -> EventRecord {
        EventRecord::new(ts, operator, "Station 1", "20m", "CW")
    }

    #[test]
    fn test_second_refresh_without_new_records_is_a_noop() {
        let store = MemoryEventStore::with_records([record(100, "A")]);
        let renderer = StubRenderer::default();
        let (mut aggregator, reader) = aggregator(store, renderer.clone());

        let first = aggregator.refresh(None, SIZE);
        assert_eq!(first, RefreshOutcome { timestamp: Some(100), updated: true });
        let before = reader.load();
        let renders = renderer.render_count();

        let second = aggregator.refresh(first.timestamp, SIZE);
        assert_eq!(second, RefreshOutcome { timestamp: Some(100), updated: false });
        assert!(Arc::ptr_eq(&before, &reader.load()));
        assert_eq!(renderer.render_count(), renders);
    }

    #[test]
    fn test_timestamps_are_monotonic_for_appended_records() {
        let store = MemoryEventStore::new();
        let (mut aggregator, reader) = aggregator(store.clone(), StubRenderer::default());

        let mut previous = aggregator.refresh(None, SIZE).timestamp;
        let mut seen = Vec::new();
        for ts in [1_000_100, 1_000_200, 1_000_300] {
            store.push(record(ts, "A"));
            let outcome = aggregator.refresh(previous, SIZE);
            assert!(outcome.updated);
            seen.push(outcome.timestamp.unwrap());
            previous = outcome.timestamp;
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reader.load().last_event, Some(1_000_300));
    }

    #[test]
    fn test_empty_store_renders_once() {
        let (mut aggregator, reader) = aggregator(MemoryEventStore::new(), StubRenderer::default());

        let first = aggregator.refresh(None, SIZE);
        assert_eq!(first.timestamp, Some(fixed_clock() - 60));
        assert!(first.updated);
        assert!(reader.read_all().iter().all(|(_, artifact)| artifact.is_some()));
        assert!(reader.load().banner.is_none());

        let second = aggregator.refresh(first.timestamp, SIZE);
        assert!(!second.updated);
        assert_eq!(second.timestamp, first.timestamp);
    }

    #[test]
    fn test_end_to_end_counts() {
        let store = MemoryEventStore::with_records(
            [(1, "A"), (2, "A"), (3, "A"), (4, "B"), (5, "B")].map(|(ts, op)| record(ts, op)),
        );
        let (mut aggregator, reader) = aggregator(store, StubRenderer::default());
        aggregator.refresh(None, SIZE);

        let pie = reader.read(SlotId::OperatorsPie).unwrap();
        assert_eq!(pie.as_str(), "QSOs by Operator@80x23:A=3,B=2");
        let summary = reader.read(SlotId::QsoSummary).unwrap();
        assert!(summary.contains("20m,5,0,0,5"));
        assert!(reader.load().banner.as_deref().unwrap().starts_with("Last QSO:"));
    }

    #[test]
    fn test_store_failure_keeps_snapshot_and_cursor() {
        let store = MemoryEventStore::with_records([record(100, "A")]);
        let (mut aggregator, reader) = aggregator(store.clone(), StubRenderer::default());
        let first = aggregator.refresh(None, SIZE);
        let before = reader.load();

        store.push(record(200, "B"));
        store.set_unavailable(true);
        let failed = aggregator.refresh(first.timestamp, SIZE);
        assert_eq!(failed, RefreshOutcome { timestamp: Some(100), updated: false });
        assert!(Arc::ptr_eq(&before, &reader.load()));

        store.set_unavailable(false);
        let recovered = aggregator.refresh(failed.timestamp, SIZE);
        assert_eq!(recovered.timestamp, Some(200));
        assert!(recovered.updated);
    }

    #[test]
    fn test_store_failure_on_first_call() {
        let store = MemoryEventStore::new();
        store.set_unavailable(true);
        let (mut aggregator, reader) = aggregator(store, StubRenderer::default());

        assert_eq!(aggregator.refresh(None, SIZE), RefreshOutcome::unchanged(None));
        assert_eq!(reader.load().generation, 0);
    }

    #[test]
    fn test_render_failure_keeps_stale_artifact() {
        let store = MemoryEventStore::with_records([record(100, "A")]);
        let renderer = StubRenderer::default();
        let (mut aggregator, reader) = aggregator(store.clone(), renderer.clone());
        aggregator.refresh(None, SIZE);
        let stale = reader.read(SlotId::StationsPie).unwrap();

        renderer.fail_on(Some(SlotId::StationsPie.title()));
        store.push(record(200, "B"));
        let outcome = aggregator.refresh(Some(100), SIZE);
        assert!(outcome.updated);

        assert!(Arc::ptr_eq(&stale, &reader.read(SlotId::StationsPie).unwrap()));
        let operators = reader.read(SlotId::OperatorsPie).unwrap();
        assert_eq!(operators.as_str(), "QSOs by Operator@80x23:A=1,B=1");
    }

    #[test]
    fn test_rerender_on_resize_only() {
        let store = MemoryEventStore::with_records([record(100, "A")]);
        let renderer = StubRenderer::default();
        let (mut aggregator, reader) = aggregator(store, renderer.clone());

        assert!(!aggregator.rerender(SIZE));
        aggregator.refresh(None, SIZE);
        assert_eq!(reader.load().size, Some(SIZE));
        assert!(!aggregator.rerender(SIZE));

        let bigger = DisplaySize::new(120, 39);
        assert!(aggregator.rerender(bigger));
        let logo = reader.read(SlotId::Logo).unwrap();
        assert_eq!(logo.as_str(), "Field Day@120x39:W1AW");
        assert_eq!(reader.load().last_event, Some(100));
        assert_eq!(reader.load().size, Some(bigger));
    }
}
