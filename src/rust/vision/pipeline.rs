use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use super::frame::FrameLease;
use super::label::{FrameMode, FrameOutcome};
use super::FaceDetector;

struct Slot {
    pending: Mutex<Option<FrameLease>>,
    wake: Notify,
    closed: AtomicBool,
    dropped: AtomicU64,
    classified: AtomicU64,
}

/// Classifies live frames one at a time, keeping only the newest pending frame.
///
/// While a frame is being classified, newly submitted frames replace each other
/// in a single slot; every replaced frame is released unclassified. Outcomes are
/// delivered in order on the channel given to [`FramePipeline::spawn`].
pub struct FramePipeline {
    slot: Arc<Slot>,
    worker: Option<JoinHandle<()>>,
}

impl FramePipeline {
    /// Starts the worker task on the current tokio runtime
    pub fn spawn(
        detector: Arc<dyn FaceDetector>,
        mode: FrameMode,
        outcomes: mpsc::Sender<FrameOutcome>,
    ) -> Self {
        let slot = Arc::new(Slot {
            pending: Mutex::new(None),
            wake: Notify::new(),
            closed: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
            classified: AtomicU64::new(0),
        });
        info!("Starting frame pipeline in {:?} mode", mode);
        let worker = tokio::spawn(run(Arc::clone(&slot), detector, mode, outcomes));
        Self {
            slot,
            worker: Some(worker),
        }
    }

    /// Offers a frame. Returns false if the pipeline is shut down, in which case
    /// the frame has already been released.
    pub fn submit(&self, frame: FrameLease) -> bool {
        if self.slot.closed.load(Ordering::Acquire) {
            return false;
        }

        let replaced = self.slot.pending.lock().replace(frame);
        if let Some(stale) = replaced {
            self.slot.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Dropping pending frame @{}ms in favour of a newer one",
                stale.image().timestamp_millis
            );
        }
        // The worker may have exited between the check above and the replace
        if self.slot.closed.load(Ordering::Acquire) {
            self.slot.pending.lock().take();
            return false;
        }
        self.slot.wake.notify_one();
        true
    }

    /// False once the worker has stopped, whether by shutdown, a closed
    /// outcome channel or a detector panic
    pub fn is_running(&self) -> bool {
        !self.slot.closed.load(Ordering::Acquire)
    }

    /// Frames released without classification because a newer one arrived
    pub fn dropped_frames(&self) -> u64 {
        self.slot.dropped.load(Ordering::Relaxed)
    }

    /// Frames that went through the detector
    pub fn classified_frames(&self) -> u64 {
        self.slot.classified.load(Ordering::Relaxed)
    }

    /// Stops accepting frames, lets an in-flight classification finish and
    /// releases any pending frame.
    pub async fn shutdown(mut self) {
        self.slot.closed.store(true, Ordering::Release);
        self.slot.wake.notify_one();
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
        self.slot.pending.lock().take();
        info!(
            "Frame pipeline stopped ({} classified, {} dropped)",
            self.classified_frames(),
            self.dropped_frames()
        );
    }
}

impl Drop for FramePipeline {
    fn drop(&mut self) {
        self.slot.closed.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            // Aborting drops the in-flight lease, which releases its frame
            worker.abort();
        }
        self.slot.pending.lock().take();
    }
}

/// Closes the slot whenever the worker future is dropped: normal exit, abort,
/// or a detector panic that tokio caught
struct WorkerExit(Arc<Slot>);

impl Drop for WorkerExit {
    fn drop(&mut self) {
        if !self.0.closed.swap(true, Ordering::AcqRel) {
            warn!("Frame pipeline worker stopped unexpectedly");
        }
        self.0.pending.lock().take();
    }
}

async fn run(
    slot: Arc<Slot>,
    detector: Arc<dyn FaceDetector>,
    mode: FrameMode,
    outcomes: mpsc::Sender<FrameOutcome>,
) {
    let _exit = WorkerExit(Arc::clone(&slot));
    loop {
        slot.wake.notified().await;
        if slot.closed.load(Ordering::Acquire) {
            break;
        }

        let Some(frame) = slot.pending.lock().take() else {
            continue;
        };

        let result = detector.detect(frame.image()).await;
        slot.classified.fetch_add(1, Ordering::Relaxed);
        drop(frame);

        let outcome = FrameOutcome::from_detection(mode, &result);
        if outcomes.send(outcome).await.is_err() {
            debug!("Outcome receiver gone, stopping frame pipeline");
            slot.closed.store(true, Ordering::Release);
            break;
        }
    }
}
