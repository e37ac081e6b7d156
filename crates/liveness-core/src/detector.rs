//! Face detector collaborator.
//!
//! The detector itself is external; the pipeline only needs one list of faces
//! (or an error) per image. [`ScriptedDetector`] replays canned results and
//! backs the CLI replay command and the tests.

use std::collections::VecDeque;

use crate::error::DetectorError;
use crate::face::DetectedFace;
use crate::frame::InputImage;

/// Minimum face size, as a fraction of the image width.
pub const DEFAULT_MIN_FACE_SIZE: f32 = 0.30;

/// Settings handed to the detector once per session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorOptions {
    pub min_face_size: f32,
    /// Report stable tracking ids. Needed by the face count gate.
    pub tracking: bool,
    /// Favour speed over accuracy.
    pub fast: bool,
    pub landmarks: bool,
    pub contours: bool,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            tracking: false,
            fast: true,
            landmarks: true,
            contours: true,
        }
    }
}

pub trait FaceDetector: Send {
    /// Apply session options. Called once before the first frame.
    fn configure(&mut self, _options: &DetectorOptions) {}

    fn detect(&mut self, image: &InputImage) -> Result<Vec<DetectedFace>, DetectorError>;

    /// Release detector resources. Called at most once per session.
    fn close(&mut self) {}
}

/// Detector that returns pre-recorded results in order.
///
/// Once the script runs out every further call fails.
#[derive(Debug, Default)]
pub struct ScriptedDetector {
    script: VecDeque<Result<Vec<DetectedFace>, DetectorError>>,
    options: Option<DetectorOptions>,
    closed: bool,
}

impl ScriptedDetector {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<Vec<DetectedFace>, DetectorError>>,
    {
        Self {
            script: script.into_iter().collect(),
            options: None,
            closed: false,
        }
    }

    pub fn push(&mut self, result: Result<Vec<DetectedFace>, DetectorError>) {
        self.script.push_back(result);
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn options(&self) -> Option<&DetectorOptions> {
        self.options.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FaceDetector for ScriptedDetector {
    fn configure(&mut self, options: &DetectorOptions) {
        self.options = Some(*options);
    }

    fn detect(&mut self, _image: &InputImage) -> Result<Vec<DetectedFace>, DetectorError> {
        if self.closed {
            return Err(DetectorError::Closed);
        }
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(DetectorError::Failed("replay script exhausted".into())))
    }

    fn close(&mut self) {
        self.closed = true;
        self.script.clear();
    }
}
