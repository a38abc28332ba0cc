use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use larousse_model::{EntryRequest, LogEvent, RunReport, SnapshotError};
use tokio::sync::{mpsc, oneshot};

use crate::config::SnapshotConfig;
use crate::events::Reporter;
use crate::pipeline;
use crate::render::PageRenderer;

/// Runs snapshots off the caller's thread, one at a time.
///
/// Each run gets its own OS thread and single-threaded tokio runtime, so an
/// interactive front end keeps reading input while a page renders. A second
/// [`submit`](EntryWorker::submit) while a run is active is refused with
/// [`SnapshotError::Busy`]. Runs are never cancelled.
pub struct EntryWorker {
    config: Arc<SnapshotConfig>,
    renderer: Arc<dyn PageRenderer>,
    busy: Arc<AtomicBool>,
}

/// Progress and outcome of one submitted run.
pub struct RunHandle {
    pub events: mpsc::UnboundedReceiver<LogEvent>,
    result: oneshot::Receiver<Result<RunReport, SnapshotError>>,
}

impl RunHandle {
    /// Wait for the run to end.
    ///
    /// A worker thread that died without reporting (a panic) surfaces as
    /// [`SnapshotError::Worker`].
    pub async fn finish(self) -> Result<RunReport, SnapshotError> {
        self.result
            .await
            .unwrap_or_else(|_| Err(SnapshotError::Worker("run ended without a result".into())))
    }
}

/// Clears the busy flag when a run's thread exits, including by panic.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl EntryWorker {
    pub fn new(config: SnapshotConfig, renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            config: Arc::new(config),
            renderer,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Start a run for `request` on a worker thread.
    pub fn submit(&self, request: EntryRequest) -> Result<RunHandle, SnapshotError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SnapshotError::Busy);
        }

        let (event_tx, events) = mpsc::unbounded_channel();
        let (result_tx, result) = oneshot::channel();

        let config = Arc::clone(&self.config);
        let renderer = Arc::clone(&self.renderer);
        let guard = BusyGuard(Arc::clone(&self.busy));

        let spawned = std::thread::Builder::new()
            .name("larousse-run".into())
            .spawn(move || {
                let reporter = Reporter::new(event_tx);
                let outcome = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime.block_on(pipeline::run_entry(
                        &request,
                        &config,
                        renderer.as_ref(),
                        &reporter,
                    )),
                    Err(e) => Err(SnapshotError::Worker(format!("failed to start runtime: {e}"))),
                };
                // Free the slot before reporting so the caller can resubmit right away.
                drop(guard);
                let _ = result_tx.send(outcome);
            });

        match spawned {
            Ok(_) => Ok(RunHandle { events, result }),
            // The closure (and its guard) was dropped, so the flag is already clear.
            Err(e) => Err(SnapshotError::Worker(format!("failed to spawn worker thread: {e}"))),
        }
    }
}
