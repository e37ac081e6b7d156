//! Runs a [`LivenessSession`] on its own thread.
//!
//! The capture layer pushes frames at its own rate. Only one frame may be in
//! the session at a time; frames offered while one is in flight are dropped,
//! since a stale frame is worth nothing to a real-time check.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::mpsc;

use crate::detector::FaceDetector;
use crate::error::LivenessError;
use crate::event::EventSink;
use crate::face::Rect;
use crate::frame::Frame;
use crate::region::RegionTracker;
use crate::session::LivenessSession;

/// Handle to a session running on a dedicated thread.
///
/// Dropping the handle closes the session.
pub struct SessionHandle {
    tx: Option<mpsc::Sender<Frame>>,
    in_flight: Arc<AtomicBool>,
    dropped: AtomicU64,
    region: RegionTracker,
    thread: Option<JoinHandle<()>>,
}

/// Move `session` onto a new thread and return a handle to feed it.
pub fn spawn_session<D, S>(mut session: LivenessSession<D, S>) -> Result<SessionHandle, LivenessError>
where
    D: FaceDetector + 'static,
    S: EventSink + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Frame>(1);
    let in_flight = Arc::new(AtomicBool::new(false));
    let region = session.region().clone();
    let worker_in_flight = Arc::clone(&in_flight);

    let thread = std::thread::Builder::new()
        .name("liveness-session".into())
        .spawn(move || {
            tracing::debug!(session = %session.id(), "session thread started");
            while let Some(frame) = rx.blocking_recv() {
                session.process(&frame);
                worker_in_flight.store(false, Ordering::Release);
            }
            session.close();
            tracing::debug!(session = %session.id(), "session thread exiting");
        })
        .map_err(LivenessError::WorkerSpawn)?;

    Ok(SessionHandle {
        tx: Some(tx),
        in_flight,
        dropped: AtomicU64::new(0),
        region,
        thread: Some(thread),
    })
}

impl SessionHandle {
    /// Offer a frame. Returns `false` if it was dropped because another frame
    /// is still being processed or the session is closed.
    pub fn submit(&self, frame: Frame) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::trace!(dropped, "session busy, frame dropped");
            return false;
        }
        match tx.try_send(frame) {
            Ok(()) => true,
            Err(_) => {
                self.in_flight.store(false, Ordering::Release);
                false
            }
        }
    }

    /// Reconfigure the expected face region. Takes effect on the next frame.
    pub fn set_expected_region(&self, roi: Rect, surface_width: i32, surface_height: i32) {
        self.region
            .set_expected_region(roi, surface_width, surface_height);
    }

    /// Frames dropped because the session was busy.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }

    /// Stop accepting frames, let the in-flight frame finish, then close the
    /// detector. Safe to call more than once.
    pub fn close(&mut self) {
        if self.tx.take().is_none() {
            return;
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("session thread panicked");
            }
        }
        tracing::info!(dropped = self.dropped_frames(), "session handle closed");
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.close();
    }
}
