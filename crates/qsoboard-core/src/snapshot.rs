//! Shared handoff between the refresh worker and the display.
//!
//! The worker builds a complete [`Snapshot`] off to the side and publishes it
//! with one atomic swap. Readers load the current snapshot without locking and
//! never see a half-built one.

use std::sync::Arc;

use arc_swap::ArcSwap;
use enum_map::EnumMap;

use crate::model::Timestamp;
use crate::render::DisplaySize;
use crate::slots::SlotId;

/// Rendered artifacts for every slot plus what they were built from.
pub struct Snapshot<A> {
    pub slots: EnumMap<SlotId, Option<Arc<A>>>,
    /// Newest contact covered, `None` until the first pass.
    pub last_event: Option<Timestamp>,
    /// Last-QSO ticker text, if any contact exists.
    pub banner: Option<String>,
    /// Area the slot artifacts were rendered for.
    pub size: Option<DisplaySize>,
    /// Bumped on every publish.
    pub generation: u64,
}

impl<A> Snapshot<A> {
    pub fn slot(&self, slot: SlotId) -> Option<Arc<A>> {
        self.slots[slot].clone()
    }
}

// Manual impls: cloning only bumps the artifact refcounts, so `A` needn't be Clone.
impl<A> Clone for Snapshot<A> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            last_event: self.last_event,
            banner: self.banner.clone(),
            size: self.size,
            generation: self.generation,
        }
    }
}

impl<A> Default for Snapshot<A> {
    fn default() -> Self {
        Self {
            slots: EnumMap::from_fn(|_| None),
            last_event: None,
            banner: None,
            size: None,
            generation: 0,
        }
    }
}

/// Creates the single writer and a cloneable reader over `initial`.
pub fn channel<A>(initial: Snapshot<A>) -> (SnapshotWriter<A>, SnapshotReader<A>) {
    let shared = Arc::new(ArcSwap::from_pointee(initial));
    (
        SnapshotWriter {
            shared: Arc::clone(&shared),
        },
        SnapshotReader { shared },
    )
}

/// The only handle that can publish. Not `Clone`.
pub struct SnapshotWriter<A> {
    shared: Arc<ArcSwap<Snapshot<A>>>,
}

impl<A> SnapshotWriter<A> {
    /// The snapshot currently visible to readers.
    pub fn current(&self) -> Arc<Snapshot<A>> {
        self.shared.load_full()
    }

    /// Publishes `next` as a whole, replacing the current snapshot.
    pub fn publish(&mut self, mut next: Snapshot<A>) {
        next.generation = self.shared.load().generation + 1;
        self.shared.store(Arc::new(next));
    }

    /// Copies the current snapshot, applies `f` and publishes the result.
    pub fn update(&mut self, f: impl FnOnce(&mut Snapshot<A>)) {
        let mut next = (*self.current()).clone();
        f(&mut next);
        self.publish(next);
    }

    /// Publishes one slot, leaving the others untouched.
    pub fn write(&mut self, slot: SlotId, artifact: A) {
        let artifact = Arc::new(artifact);
        self.update(|snapshot| snapshot.slots[slot] = Some(artifact));
    }

    pub fn reader(&self) -> SnapshotReader<A> {
        SnapshotReader {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Lock-free read handle.
pub struct SnapshotReader<A> {
    shared: Arc<ArcSwap<Snapshot<A>>>,
}

impl<A> Clone for SnapshotReader<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A> SnapshotReader<A> {
    pub fn read(&self, slot: SlotId) -> Option<Arc<A>> {
        self.shared.load().slot(slot)
    }

    /// Every slot in rotation order, all from the same snapshot.
    pub fn read_all(&self) -> Vec<(SlotId, Option<Arc<A>>)> {
        let snapshot = self.shared.load();
        SlotId::ALL
            .iter()
            .map(|slot| (*slot, snapshot.slot(*slot)))
            .collect()
    }

    /// Consistent view for multi-slot reads.
    pub fn load(&self) -> Arc<Snapshot<A>> {
        self.shared.load_full()
    }
}
