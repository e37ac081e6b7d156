//! Frame-driven face liveness check.
//!
//! A stream of per-frame face detector results is turned into ordered
//! liveness events by a chain of stateful handlers:
//!
//! - [`count::FaceCountHandler`]: zero, one, or many faces.
//! - [`region::RegionHandler`]: is the face inside the on-screen region.
//! - [`movement::HeadMovementHandler`]: randomized head movement challenges.
//!
//! [`session::LivenessSession`] ties a [`detector::FaceDetector`] to a
//! [`chain::HandlerChain`] and an [`event::EventSink`];
//! [`worker::spawn_session`] runs one on its own thread.

pub mod chain;
pub mod config;
pub mod count;
pub mod detector;
pub mod error;
pub mod event;
pub mod face;
pub mod frame;
pub mod movement;
pub mod region;
pub mod session;
pub mod worker;

pub use chain::{ChainRun, FaceHandler, HandlerChain, HandlerChainBuilder};
pub use config::LivenessConfig;
pub use detector::{DetectorOptions, FaceDetector, ScriptedDetector};
pub use error::{DetectorError, LivenessError};
pub use event::{EventSink, LivenessEvent, MessageKey, TracingSink};
pub use face::{DetectedFace, Point, Rect};
pub use frame::{rotation_compensation, Frame, InputImage};
pub use movement::{
    AngleBand, ChallengeSequence, HeadMovement, HeadMovementHandler, MovementPhase,
    MovementThresholds, SupportPointListener,
};
pub use region::{ExpectedRegion, RegionHandler, RegionTracker};
pub use session::{FrameOutcome, LivenessSession};
pub use worker::{spawn_session, SessionHandle};
