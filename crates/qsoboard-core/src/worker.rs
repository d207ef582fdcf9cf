//! Background refresh worker.
//!
//! One task owns the [`Aggregator`] and runs a cycle per request on the
//! blocking pool, so store queries and rendering never stall the display
//! loop. Requests made while a cycle is in flight are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::aggregator::Aggregator;
use crate::model::Timestamp;
use crate::render::{ArtifactRenderer, DisplaySize};
use crate::store::EventStore;

/// Clears the busy flag when a cycle ends, including by panic.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RefreshWorker {
    requests: mpsc::UnboundedSender<DisplaySize>,
    busy: Arc<AtomicBool>,
    cancel: CancellationToken,
    done: std_mpsc::Receiver<()>,
}

impl RefreshWorker {
    /// Spawns the worker task on `handle`. The aggregator moves into the task.
    pub fn spawn<S, R>(handle: &Handle, aggregator: Aggregator<S, R>) -> Self
    where
        S: EventStore + Send + 'static,
        R: ArtifactRenderer + Send + 'static,
    {
        let (requests, rx) = mpsc::unbounded_channel();
        let (done_tx, done) = std_mpsc::channel();
        let busy = Arc::new(AtomicBool::new(false));
        let cancel = CancellationToken::new();

        handle.spawn(run_cycles(
            aggregator,
            rx,
            Arc::clone(&busy),
            cancel.clone(),
            done_tx,
        ));

        Self {
            requests,
            busy,
            cancel,
            done,
        }
    }

    /// Asks for one refresh cycle at `size`. Returns `false` (and does nothing)
    /// when a cycle is already in flight or the worker has stopped.
    pub fn request_refresh(&self, size: DisplaySize) -> bool {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("refresh already in flight; skipping request");
            return false;
        }
        if self.requests.send(size).is_err() {
            self.busy.store(false, Ordering::Release);
            warn!("refresh worker has stopped; request dropped");
            return false;
        }
        true
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Stops the worker, waiting up to `timeout` for an in-flight cycle.
    /// Returns `false` if the wait timed out and the task was left behind.
    pub fn shutdown(self, timeout: Duration) -> bool {
        self.cancel.cancel();
        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(std_mpsc::RecvTimeoutError::Disconnected) => {
                info!("refresh worker stopped");
                true
            }
            Err(std_mpsc::RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "refresh worker did not stop in time; detaching"
                );
                false
            }
        }
    }
}

/// Runs `future` on a new multi-thread runtime and tears the runtime down
/// without waiting for blocking work. A cycle detached by a timed-out
/// [`RefreshWorker::shutdown`] must not keep the process alive.
///
/// # Errors
/// Returns an error if the runtime cannot be built.
pub fn block_on_detached<F: Future>(future: F) -> Result<F::Output> {
    let rt = Runtime::new().context("create tokio runtime")?;
    let output = rt.block_on(future);
    rt.shutdown_background();
    Ok(output)
}

impl Drop for RefreshWorker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_cycles<S, R>(
    aggregator: Aggregator<S, R>,
    mut requests: mpsc::UnboundedReceiver<DisplaySize>,
    busy: Arc<AtomicBool>,
    cancel: CancellationToken,
    done: std_mpsc::Sender<()>,
) where
    S: EventStore + Send + 'static,
    R: ArtifactRenderer + Send + 'static,
{
    let mut aggregator = Some(aggregator);
    let mut last_seen: Option<Timestamp> = None;

    loop {
        let size = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            request = requests.recv() => match request {
                Some(size) => size,
                None => break,
            },
        };
        let Some(mut current) = aggregator.take() else {
            break;
        };

        let guard = BusyGuard(Arc::clone(&busy));
        let previous = last_seen;
        let cycle = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let outcome = current.refresh(previous, size);
            if !outcome.updated {
                current.rerender(size);
            }
            (current, outcome)
        });

        match cycle.await {
            Ok((returned, outcome)) => {
                last_seen = outcome.timestamp;
                aggregator = Some(returned);
            }
            Err(err) => {
                error!(error = %err, "refresh cycle panicked; stopping worker");
                break;
            }
        }
    }

    // Receiver may already be gone after a timed-out shutdown.
    let _ = done.send(());
}

#[cfg(test)]
mod tests {
    use std::sync::{Condvar, Mutex};
    use std::thread;
    use std::time::Instant;

    use anyhow::Result;

    use super::*;
    use crate::config::AggregationConfig;
    use crate::model::{EventRecord, ModeTable};
    use crate::render::stub::StubRenderer;
    use crate::slots::TitleCard;
    use crate::snapshot::{self, Snapshot, SnapshotReader};
    use crate::store::MemoryEventStore;

    const SIZE: DisplaySize = DisplaySize::new(80, 23);

    /// Store whose queries block until the gate opens.
    #[derive(Clone, Default)]
    struct GatedStore {
        inner: MemoryEventStore,
        gate: Arc<(Mutex<bool>, Condvar)>,
    }

    impl GatedStore {
        fn closed(inner: MemoryEventStore) -> Self {
            Self {
                inner,
                gate: Arc::default(),
            }
        }

        fn open(&self) {
            let (lock, cvar) = &*self.gate;
            *lock.lock().unwrap() = true;
            cvar.notify_all();
        }

        fn wait(&self) {
            let (lock, cvar) = &*self.gate;
            let mut open = lock.lock().unwrap();
            while !*open {
                open = cvar.wait(open).unwrap();
            }
        }
    }

    impl EventStore for GatedStore {
        fn latest_event(&self) -> Result<Option<EventRecord>> {
            self.wait();
            self.inner.latest_event()
        }

        fn scan(&self) -> Result<Vec<EventRecord>> {
            self.inner.scan()
        }
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap()
    }

    fn spawn_worker<S: EventStore + Send + 'static>(
        handle: &Handle,
        store: S,
    ) -> (RefreshWorker, SnapshotReader<String>) {
        let (writer, reader) = snapshot::channel(Snapshot::default());
        let aggregator = Aggregator::new(
            store,
            StubRenderer::default(),
            writer,
            AggregationConfig::default(),
            ModeTable::default(),
            TitleCard {
                title: "Field Day".to_string(),
                lines: Vec::new(),
            },
        );
        (RefreshWorker::spawn(handle, aggregator), reader)
    }

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_refresh_publishes_and_tracks_cursor() {
        let rt = runtime();
        let store = MemoryEventStore::with_records([EventRecord::new(100, "A", "S1", "20m", "CW")]);
        let (worker, reader) = spawn_worker(rt.handle(), store.clone());

        assert!(worker.request_refresh(SIZE));
        wait_until(|| !worker.is_busy() && reader.load().generation == 1);
        assert_eq!(reader.load().last_event, Some(100));

        // Nothing new: the cursor makes the second cycle a no-op.
        assert!(worker.request_refresh(SIZE));
        wait_until(|| !worker.is_busy());
        assert_eq!(reader.load().generation, 1);

        store.push(EventRecord::new(200, "B", "S1", "40m", "CW"));
        assert!(worker.request_refresh(SIZE));
        wait_until(|| reader.load().generation == 2);
        assert_eq!(reader.load().last_event, Some(200));

        assert!(worker.shutdown(Duration::from_secs(5)));
    }

    #[test]
    fn test_requests_while_busy_are_skipped() {
        let rt = runtime();
        let store = GatedStore::closed(MemoryEventStore::with_records([EventRecord::new(
            100, "A", "S1", "20m", "CW",
        )]));
        let (worker, reader) = spawn_worker(rt.handle(), store.clone());

        assert!(worker.request_refresh(SIZE));
        assert!(worker.is_busy());
        assert!(!worker.request_refresh(SIZE));

        store.open();
        wait_until(|| !worker.is_busy());
        assert_eq!(reader.load().generation, 1);
        assert!(worker.request_refresh(SIZE));
        assert!(worker.shutdown(Duration::from_secs(5)));
    }

    #[test]
    fn test_shutdown_times_out_on_stuck_cycle() {
        let rt = runtime();
        let store = GatedStore::closed(MemoryEventStore::new());
        let (worker, _reader) = spawn_worker(rt.handle(), store.clone());

        assert!(worker.request_refresh(SIZE));
        thread::sleep(Duration::from_millis(20));
        assert!(!worker.shutdown(Duration::from_millis(50)));

        // Let the blocking cycle finish so the runtime can drop cleanly.
        store.open();
    }

    #[test]
    fn test_detached_cycle_does_not_block_exit() {
        let store = GatedStore::closed(MemoryEventStore::new());
        let gate = store.clone();
        let started = Instant::now();

        let stopped = block_on_detached(async move {
            let (worker, _reader) = spawn_worker(&Handle::current(), store);
            assert!(worker.request_refresh(SIZE));
            tokio::time::sleep(Duration::from_millis(20)).await;
            worker.shutdown(Duration::from_millis(50))
        })
        .unwrap();

        assert!(!stopped);
        assert!(started.elapsed() < Duration::from_secs(3));
        gate.open();
    }

    #[test]
    fn test_idle_worker_stops_promptly() {
        let rt = runtime();
        let (worker, _reader) = spawn_worker(rt.handle(), MemoryEventStore::new());
        assert!(worker.shutdown(Duration::from_secs(5)));
    }
}
