//! Head movement challenge: the active part of the liveness check.
//!
//! The user is walked through a shuffled sequence of head movements. Every
//! challenge starts with the face centered, then waits for the head pose to
//! leave a fixed band in the requested direction.
//!
//! ```text
//! Centering ──centered──▶ AwaitingMovement ──moved──▶ MovementConfirmed
//!     ▲                                                   │        │
//!     └──────────────── next challenge ───────────────────┘        │
//!                                          sequence exhausted ─▶ Complete
//! ```
//!
//! `MovementConfirmed` is resolved in the frame that entered it, so between
//! frames the handler is only ever in one of the other three phases.
//!
//! # Known ambiguity
//!
//! The directional bands are fixed and do not depend on the active challenge.
//! Each challenge only checks its own side of its own axis, but a user who
//! drifts across one band while attempting another challenge is not penalised.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chain::FaceHandler;
use crate::error::LivenessError;
use crate::event::{EventSink, LivenessEvent, MessageKey};
use crate::face::{DetectedFace, Point};

/// Distance of the on-screen support point from the face center, in pixels.
const SUPPORT_POINT_OFFSET: f32 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadMovement {
    MoveRight,
    MoveLeft,
    MoveUp,
    MoveDown,
}

impl HeadMovement {
    pub const ALL: [HeadMovement; 4] = [
        HeadMovement::MoveRight,
        HeadMovement::MoveLeft,
        HeadMovement::MoveUp,
        HeadMovement::MoveDown,
    ];

    /// Instruction shown while this challenge is active.
    pub fn message_key(&self) -> MessageKey {
        match self {
            HeadMovement::MoveRight => MessageKey::MoveToRight,
            HeadMovement::MoveLeft => MessageKey::MoveToLeft,
            HeadMovement::MoveUp => MessageKey::MoveToTop,
            HeadMovement::MoveDown => MessageKey::MoveToBottom,
        }
    }

    /// Screen-space offset hinting which way to move.
    pub fn support_point(&self) -> Point {
        match self {
            HeadMovement::MoveRight => Point::new(SUPPORT_POINT_OFFSET, 0.0),
            HeadMovement::MoveLeft => Point::new(-SUPPORT_POINT_OFFSET, 0.0),
            HeadMovement::MoveUp => Point::new(0.0, -SUPPORT_POINT_OFFSET),
            HeadMovement::MoveDown => Point::new(0.0, SUPPORT_POINT_OFFSET),
        }
    }

    /// Whether the pose satisfies this movement's one-sided rule.
    pub fn is_satisfied(&self, yaw: f32, pitch: f32, thresholds: &MovementThresholds) -> bool {
        match self {
            HeadMovement::MoveRight => yaw < thresholds.yaw.lower,
            HeadMovement::MoveLeft => yaw > thresholds.yaw.upper,
            HeadMovement::MoveUp => pitch > thresholds.pitch.upper,
            HeadMovement::MoveDown => pitch < thresholds.pitch.lower,
        }
    }
}

impl std::fmt::Display for HeadMovement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HeadMovement::MoveRight => "right",
            HeadMovement::MoveLeft => "left",
            HeadMovement::MoveUp => "up",
            HeadMovement::MoveDown => "down",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for HeadMovement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" | "move_right" => Ok(HeadMovement::MoveRight),
            "left" | "move_left" => Ok(HeadMovement::MoveLeft),
            "up" | "move_up" => Ok(HeadMovement::MoveUp),
            "down" | "move_down" => Ok(HeadMovement::MoveDown),
            other => Err(format!("unknown head movement: {other}")),
        }
    }
}

/// Closed angle interval in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleBand {
    pub lower: f32,
    pub upper: f32,
}

impl AngleBand {
    pub const fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    pub const fn symmetric(tolerance: f32) -> Self {
        Self {
            lower: -tolerance,
            upper: tolerance,
        }
    }

    pub fn contains(&self, angle: f32) -> bool {
        angle >= self.lower && angle <= self.upper
    }
}

/// Angle windows driving the movement state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementThresholds {
    /// Window both yaw and pitch must fall in for the face to be centered.
    pub centering: AngleBand,
    /// Leaving this band left or right completes a horizontal challenge.
    pub yaw: AngleBand,
    /// Leaving this band up or down completes a vertical challenge.
    pub pitch: AngleBand,
}

impl Default for MovementThresholds {
    fn default() -> Self {
        Self {
            centering: AngleBand::symmetric(10.0),
            yaw: AngleBand::symmetric(10.0),
            pitch: AngleBand::symmetric(10.0),
        }
    }
}

impl MovementThresholds {
    pub fn is_centered(&self, yaw: f32, pitch: f32) -> bool {
        self.centering.contains(yaw) && self.centering.contains(pitch)
    }
}

/// Ordered challenges for one session. Realized once, never reshuffled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeSequence {
    order: Vec<HeadMovement>,
    position: usize,
}

impl ChallengeSequence {
    /// Fixed order, mainly for deterministic sessions.
    pub fn new(order: Vec<HeadMovement>) -> Result<Self, LivenessError> {
        if order.is_empty() {
            return Err(LivenessError::EmptyChallengeSequence);
        }
        Ok(Self { order, position: 0 })
    }

    /// Random permutation of every [`HeadMovement`].
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut order = HeadMovement::ALL.to_vec();
        order.shuffle(rng);
        Self { order, position: 0 }
    }

    pub fn current(&self) -> HeadMovement {
        self.order[self.position]
    }

    pub fn has_next(&self) -> bool {
        self.position + 1 < self.order.len()
    }

    /// Move on to the next challenge, if any.
    pub fn advance(&mut self) -> Option<HeadMovement> {
        if !self.has_next() {
            return None;
        }
        self.position += 1;
        Some(self.current())
    }

    pub fn order(&self) -> &[HeadMovement] {
        &self.order
    }

    /// Index of the active challenge within [`Self::order`].
    pub fn position(&self) -> usize {
        self.position
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementPhase {
    Centering,
    AwaitingMovement,
    /// Transient. Left before the confirming frame returns.
    MovementConfirmed,
    Complete,
}

/// Receiver of on-screen hint points. Presentation only.
pub trait SupportPointListener: Send {
    fn update_face_points(&mut self, points: &[Point]);
}

/// Drives one session through its [`ChallengeSequence`].
///
/// Halts the chain from the first centering attempt until every challenge is
/// done. More than one face short-circuits with `ManyFaces` in any phase; no
/// face is silently ignored.
pub struct HeadMovementHandler {
    phase: MovementPhase,
    sequence: ChallengeSequence,
    thresholds: MovementThresholds,
    support_points: Option<Box<dyn SupportPointListener>>,
    next_can_handle: bool,
}

impl HeadMovementHandler {
    pub fn new(sequence: ChallengeSequence, thresholds: MovementThresholds) -> Self {
        tracing::debug!(order = ?sequence.order(), "head movement challenges realized");
        Self {
            phase: MovementPhase::Centering,
            sequence,
            thresholds,
            support_points: None,
            next_can_handle: true,
        }
    }

    pub fn with_support_points(mut self, listener: Box<dyn SupportPointListener>) -> Self {
        self.support_points = Some(listener);
        self
    }

    pub fn phase(&self) -> MovementPhase {
        self.phase
    }

    pub fn sequence(&self) -> &ChallengeSequence {
        &self.sequence
    }

    fn center(&mut self, face: &DetectedFace, sink: &mut dyn EventSink) {
        self.next_can_handle = false;
        if !self.thresholds.is_centered(face.head_yaw, face.head_pitch) {
            sink.on_liveness_event(LivenessEvent::Information(MessageKey::CenterFace));
            return;
        }

        let movement = self.sequence.current();
        if let Some(listener) = self.support_points.as_mut() {
            listener.update_face_points(&[movement.support_point()]);
        }
        sink.on_liveness_event(LivenessEvent::Information(movement.message_key()));
        tracing::info!(%movement, "face centered, awaiting movement");
        self.phase = MovementPhase::AwaitingMovement;
    }

    fn await_movement(&mut self, face: &DetectedFace, sink: &mut dyn EventSink) {
        let movement = self.sequence.current();
        if !movement.is_satisfied(face.head_yaw, face.head_pitch, &self.thresholds) {
            return;
        }
        sink.on_liveness_event(LivenessEvent::DirectionalSuccess(movement));
        tracing::info!(
            %movement,
            yaw = face.head_yaw,
            pitch = face.head_pitch,
            "movement confirmed"
        );
        self.phase = MovementPhase::MovementConfirmed;
        self.confirm(sink);
    }

    /// Resolves `MovementConfirmed` within the frame that confirmed it.
    fn confirm(&mut self, sink: &mut dyn EventSink) {
        match self.sequence.advance() {
            Some(next) => {
                tracing::debug!(%next, "advancing to next challenge");
                self.phase = MovementPhase::Centering;
            }
            None => {
                sink.on_liveness_event(LivenessEvent::AllChallengesComplete);
                sink.on_liveness_event(LivenessEvent::Information(MessageKey::AllMovementsDone));
                tracing::info!(
                    challenges = self.sequence.order().len(),
                    "all head movement challenges complete"
                );
                self.next_can_handle = true;
                self.phase = MovementPhase::Complete;
            }
        }
    }
}

impl FaceHandler for HeadMovementHandler {
    fn name(&self) -> &'static str {
        "head_movement"
    }

    fn handle(&mut self, faces: &[DetectedFace], sink: &mut dyn EventSink) {
        if faces.len() > 1 {
            sink.on_liveness_event(LivenessEvent::ManyFaces);
            return;
        }
        let Some(face) = faces.first() else {
            return;
        };

        match self.phase {
            MovementPhase::Centering => self.center(face, sink),
            MovementPhase::AwaitingMovement => self.await_movement(face, sink),
            // not observable between frames; resolve it if ever entered
            MovementPhase::MovementConfirmed => self.confirm(sink),
            MovementPhase::Complete => {}
        }
    }

    fn next_can_handle(&self) -> bool {
        self.next_can_handle
    }
}
