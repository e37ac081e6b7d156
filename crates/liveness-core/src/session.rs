use uuid::Uuid;

use crate::chain::{ChainRun, HandlerChain};
use crate::detector::FaceDetector;
use crate::event::EventSink;
use crate::face::Rect;
use crate::frame::{Frame, InputImage};
use crate::region::RegionTracker;

/// Outcome of one [`LivenessSession::process`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The detector produced a face list and the chain ran over it.
    Processed(ChainRun),
    /// The detector failed; an `Error` event was emitted.
    DetectorFailed,
    /// The session is closed; nothing happened.
    Closed,
}

/// One liveness check: a detector, a handler chain, and the sink receiving
/// the chain's events.
///
/// Frames are processed strictly one at a time. Closing releases the
/// detector; frames arriving afterwards are ignored.
pub struct LivenessSession<D: FaceDetector, S: EventSink> {
    id: Uuid,
    detector: Option<D>,
    chain: HandlerChain,
    region: RegionTracker,
    sink: S,
    frames: u64,
}

impl<D: FaceDetector, S: EventSink> LivenessSession<D, S> {
    /// `region` must be the tracker the chain's region gate was built with.
    pub fn new(mut detector: D, chain: HandlerChain, region: RegionTracker, sink: S) -> Self {
        let id = Uuid::new_v4();
        detector.configure(chain.detector_options());
        tracing::info!(
            session = %id,
            handlers = ?chain.handler_names(),
            tracking = chain.detector_options().tracking,
            "liveness session opened"
        );
        Self {
            id,
            detector: Some(detector),
            chain,
            region,
            sink,
            frames: 0,
        }
    }

    /// Detect faces in `frame` and run the chain over them.
    pub fn process(&mut self, frame: &Frame) -> FrameOutcome {
        let Some(detector) = self.detector.as_mut() else {
            tracing::trace!(session = %self.id, "frame after close ignored");
            return FrameOutcome::Closed;
        };
        self.frames += 1;

        let (width, height) = frame.portrait_size();
        self.region.set_frame_size(
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        );

        let image = InputImage::from_frame(frame);
        match detector.detect(&image) {
            Ok(faces) => {
                let run = self.chain.run(&faces, &mut self.sink);
                tracing::debug!(
                    session = %self.id,
                    frame = self.frames,
                    faces = faces.len(),
                    handlers_run = run.handlers_run,
                    halted_by = ?run.halted_by,
                    "frame processed"
                );
                FrameOutcome::Processed(run)
            }
            Err(e) => {
                tracing::warn!(session = %self.id, frame = self.frames, error = %e, "face detection failed");
                self.chain.report_failure(&e.to_string(), &mut self.sink);
                FrameOutcome::DetectorFailed
            }
        }
    }

    /// Reconfigure the expected face region. Takes effect on the next frame.
    pub fn set_expected_region(&self, roi: Rect, surface_width: i32, surface_height: i32) {
        self.region
            .set_expected_region(roi, surface_width, surface_height);
    }

    pub fn region(&self) -> &RegionTracker {
        &self.region
    }

    /// Release the detector. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(mut detector) = self.detector.take() {
            detector.close();
            tracing::info!(session = %self.id, frames = self.frames, "liveness session closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.detector.is_none()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Frames handed to the detector so far.
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<D: FaceDetector, S: EventSink> Drop for LivenessSession<D, S> {
    fn drop(&mut self) {
        self.close();
    }
}
