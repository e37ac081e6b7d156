//! Expected face region: where on screen the face must sit.
//!
//! The hosting layer publishes the viewfinder's region of interest in surface
//! coordinates; the session publishes the frame size before each frame. The
//! region gate scales the former into the latter and checks containment.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::chain::FaceHandler;
use crate::event::{EventSink, LivenessEvent};
use crate::face::{DetectedFace, Rect};

/// Region of interest plus the surface and frame dimensions needed to map it
/// into frame pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpectedRegion {
    /// Region of interest in surface coordinates.
    pub roi: Rect,
    pub surface_width: i32,
    pub surface_height: i32,
    pub frame_width: i32,
    pub frame_height: i32,
}

impl ExpectedRegion {
    /// All five dimensions known and the region non-empty.
    pub fn is_valid(&self) -> bool {
        !self.roi.is_empty()
            && self.surface_width > 0
            && self.surface_height > 0
            && self.frame_width > 0
            && self.frame_height > 0
    }

    /// Region of interest mapped from surface space into frame space, or
    /// `None` if the geometry is not known yet.
    pub fn scaled_roi(&self) -> Option<Rect> {
        if !self.is_valid() {
            return None;
        }
        let scale = |v: i32, frame: i32, surface: i32| -> i32 {
            let scaled = i64::from(v) * i64::from(frame) / i64::from(surface);
            i32::try_from(scaled).unwrap_or(if scaled < 0 { i32::MIN } else { i32::MAX })
        };
        Some(Rect::new(
            scale(self.roi.left, self.frame_width, self.surface_width),
            scale(self.roi.top, self.frame_height, self.surface_height),
            scale(self.roi.right, self.frame_width, self.surface_width),
            scale(self.roi.bottom, self.frame_height, self.surface_height),
        ))
    }

    /// Whether a face bounding box lies fully inside the region.
    ///
    /// Fails open: with invalid geometry every face counts as inside.
    pub fn contains_face(&self, bounding_box: &Rect) -> bool {
        match self.scaled_roi() {
            Some(roi) => roi.contains(bounding_box),
            None => true,
        }
    }
}

/// Shared handle to the current [`ExpectedRegion`].
///
/// Written by the host (region of interest) and by the session (frame size),
/// read by [`RegionHandler`]. Cloning yields another handle to the same value.
#[derive(Debug, Clone, Default)]
pub struct RegionTracker {
    inner: Arc<RwLock<ExpectedRegion>>,
}

impl RegionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(region: ExpectedRegion) -> Self {
        Self {
            inner: Arc::new(RwLock::new(region)),
        }
    }

    /// Reconfigure the region of interest. Takes effect on the next frame.
    pub fn set_expected_region(&self, roi: Rect, surface_width: i32, surface_height: i32) {
        let mut region = self.inner.write();
        region.roi = roi;
        region.surface_width = surface_width;
        region.surface_height = surface_height;
        tracing::debug!(
            ?roi,
            surface_width,
            surface_height,
            "expected region updated"
        );
    }

    pub fn set_frame_size(&self, frame_width: i32, frame_height: i32) {
        let mut region = self.inner.write();
        region.frame_width = frame_width;
        region.frame_height = frame_height;
    }

    /// Copy of the current region.
    pub fn snapshot(&self) -> ExpectedRegion {
        *self.inner.read()
    }
}

/// Emits `Inside`/`Outside` for every face and optionally halts the chain
/// when a face is outside the expected region.
pub struct RegionHandler {
    halt_if_outside: bool,
    tracker: RegionTracker,
    next_can_handle: bool,
}

impl RegionHandler {
    pub fn new(halt_if_outside: bool, tracker: RegionTracker) -> Self {
        Self {
            halt_if_outside,
            tracker,
            next_can_handle: true,
        }
    }
}

impl FaceHandler for RegionHandler {
    fn name(&self) -> &'static str {
        "expected_region"
    }

    fn handle(&mut self, faces: &[DetectedFace], sink: &mut dyn EventSink) {
        let region = self.tracker.snapshot();
        self.next_can_handle = true;
        for face in faces {
            let inside = region.contains_face(&face.bounding_box);
            sink.on_liveness_event(if inside {
                LivenessEvent::Inside
            } else {
                LivenessEvent::Outside
            });

            // Last face wins; the count gate normally runs first.
            if self.halt_if_outside {
                self.next_can_handle = inside;
            }
        }
    }

    fn next_can_handle(&self) -> bool {
        self.next_can_handle
    }
}
