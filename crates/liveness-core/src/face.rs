use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in integer pixel coordinates.
///
/// Edges are half-open in the usual screen convention: `right` and `bottom`
/// are one past the last covered pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// A rectangle with no area (zero or negative width or height).
    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// True if `other` lies fully inside `self`, all four edges included.
    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }
}

/// 2D point in screen space, used for on-screen hints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One face reported by the detector for a single frame.
///
/// Handlers only ever read these; a fresh list is produced for every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    /// Bounding box in frame pixel space.
    pub bounding_box: Rect,
    /// Detector-assigned id, stable for the same physical face across frames.
    /// Absent when tracking is disabled.
    #[serde(default)]
    pub tracking_id: Option<i32>,
    /// Rotation about the vertical axis, degrees.
    #[serde(default)]
    pub head_yaw: f32,
    /// Rotation about the lateral axis, degrees.
    #[serde(default)]
    pub head_pitch: f32,
}

impl DetectedFace {
    pub fn new(bounding_box: Rect, tracking_id: Option<i32>, head_yaw: f32, head_pitch: f32) -> Self {
        Self {
            bounding_box,
            tracking_id,
            head_yaw,
            head_pitch,
        }
    }
}
