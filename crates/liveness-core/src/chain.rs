//! Handler chain: runs one frame's faces through an ordered list of handlers.
//!
//! Each handler inspects the faces, updates its own state, emits events, and
//! then says whether the rest of the chain may see this frame. Every frame
//! starts again from the first handler.

use rand::Rng;

use crate::config::LivenessConfig;
use crate::count::FaceCountHandler;
use crate::detector::DetectorOptions;
use crate::error::LivenessError;
use crate::event::{EventSink, LivenessEvent};
use crate::face::DetectedFace;
use crate::movement::{HeadMovementHandler, SupportPointListener};
use crate::region::{RegionHandler, RegionTracker};

/// One stage of the liveness pipeline.
pub trait FaceHandler: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Inspect one frame's faces. Empty lists are passed through as-is.
    fn handle(&mut self, faces: &[DetectedFace], sink: &mut dyn EventSink);

    /// Whether the handlers after this one may run for the current frame.
    fn next_can_handle(&self) -> bool;

    /// Whether this handler relies on detector tracking ids.
    fn requires_tracking(&self) -> bool {
        false
    }
}

/// What happened to a single frame in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainRun {
    /// Handlers invoked, the halting one included.
    pub handlers_run: usize,
    /// Handler that stopped propagation, if any.
    pub halted_by: Option<&'static str>,
}

pub struct HandlerChain {
    handlers: Vec<Box<dyn FaceHandler>>,
    detector_options: DetectorOptions,
}

impl HandlerChain {
    pub fn builder() -> HandlerChainBuilder {
        HandlerChainBuilder::default()
    }

    /// Feed one frame's faces through the handlers, in order, until one of
    /// them halts or the list is exhausted.
    pub fn run(&mut self, faces: &[DetectedFace], sink: &mut dyn EventSink) -> ChainRun {
        let mut handlers_run = 0;
        for handler in self.handlers.iter_mut() {
            handler.handle(faces, sink);
            handlers_run += 1;
            if !handler.next_can_handle() {
                tracing::trace!(handler = handler.name(), handlers_run, "chain halted");
                return ChainRun {
                    handlers_run,
                    halted_by: Some(handler.name()),
                };
            }
        }
        ChainRun {
            handlers_run,
            halted_by: None,
        }
    }

    /// Report a frame the detector could not process. No handler runs.
    pub fn report_failure(&self, message: &str, sink: &mut dyn EventSink) {
        sink.on_liveness_event(LivenessEvent::Error(message.to_string()));
    }

    pub fn detector_options(&self) -> &DetectorOptions {
        &self.detector_options
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Assembles a [`HandlerChain`] in call order.
#[derive(Default)]
pub struct HandlerChainBuilder {
    handlers: Vec<Box<dyn FaceHandler>>,
    min_face_size: Option<f32>,
}

impl HandlerChainBuilder {
    /// The standard liveness chain: exactly one face, inside the region, then
    /// the head movement challenges.
    pub fn liveness<R: Rng + ?Sized>(
        tracker: RegionTracker,
        config: &LivenessConfig,
        rng: &mut R,
        support_points: Option<Box<dyn SupportPointListener>>,
    ) -> Result<Self, LivenessError> {
        config.validate()?;
        let mut movement =
            HeadMovementHandler::new(config.challenge_sequence(rng)?, config.thresholds());
        if let Some(listener) = support_points {
            movement = movement.with_support_points(listener);
        }
        Ok(Self::default()
            .min_face_size(config.min_face_size)
            .face_count(config.halt_unless_one_face)
            .expected_region(config.halt_if_outside_region, tracker)
            .head_movement(movement))
    }

    pub fn face_count(self, halt_unless_exactly_one: bool) -> Self {
        self.handler(Box::new(FaceCountHandler::new(halt_unless_exactly_one)))
    }

    pub fn expected_region(self, halt_if_outside: bool, tracker: RegionTracker) -> Self {
        self.handler(Box::new(RegionHandler::new(halt_if_outside, tracker)))
    }

    pub fn head_movement(self, handler: HeadMovementHandler) -> Self {
        self.handler(Box::new(handler))
    }

    pub fn handler(mut self, handler: Box<dyn FaceHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn min_face_size(mut self, min_face_size: f32) -> Self {
        self.min_face_size = Some(min_face_size);
        self
    }

    pub fn build(self) -> HandlerChain {
        let mut detector_options = DetectorOptions {
            tracking: self.handlers.iter().any(|h| h.requires_tracking()),
            ..DetectorOptions::default()
        };
        if let Some(min_face_size) = self.min_face_size {
            detector_options.min_face_size = min_face_size;
        }
        HandlerChain {
            handlers: self.handlers,
            detector_options,
        }
    }
}
