//! `liveness replay`: run recorded detector output through a liveness session.
//!
//! A replay script is JSON:
//!
//! ```json
//! {
//!   "region": { "roi": {"left": 40, "top": 80, "right": 200, "bottom": 240},
//!               "surface_width": 240, "surface_height": 320 },
//!   "frames": [
//!     { "faces": [ { "bounding_box": {"left": 150, "top": 250, "right": 330, "bottom": 430},
//!                    "tracking_id": 1, "head_yaw": 0.0, "head_pitch": 0.0 } ] },
//!     { "error": "camera disconnected" }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use liveness_core::{
    DetectedFace, DetectorError, Frame, FrameOutcome, HandlerChainBuilder, LivenessConfig,
    LivenessEvent, LivenessSession, Rect, RegionTracker, ScriptedDetector,
};
use rand::Rng;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub region: Option<RegionSpec>,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RegionSpec {
    pub roi: Rect,
    pub surface_width: i32,
    pub surface_height: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReplayFrame {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub rotation: u32,
    #[serde(default)]
    pub faces: Vec<DetectedFace>,
    /// Simulated detector failure; `faces` is ignored when set.
    #[serde(default)]
    pub error: Option<String>,
}

fn default_width() -> u32 {
    480
}

fn default_height() -> u32 {
    640
}

impl ReplayScript {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read replay script {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse replay script {}", path.display()))
    }

    fn detector(&self) -> ScriptedDetector {
        ScriptedDetector::new(self.frames.iter().map(|f| match &f.error {
            Some(message) => Err(DetectorError::Failed(message.clone())),
            None => Ok(f.faces.clone()),
        }))
    }
}

/// Events grouped by the frame that produced them.
pub struct ReplayReport {
    pub frames: Vec<FrameReport>,
}

pub struct FrameReport {
    pub index: usize,
    pub outcome: FrameOutcome,
    pub events: Vec<LivenessEvent>,
}

pub fn run<R: Rng + ?Sized>(
    script: &ReplayScript,
    config: &LivenessConfig,
    rng: &mut R,
) -> Result<ReplayReport> {
    let tracker = RegionTracker::new();
    if let Some(region) = script.region {
        tracker.set_expected_region(region.roi, region.surface_width, region.surface_height);
    }

    let chain = HandlerChainBuilder::liveness(tracker.clone(), config, rng, None)
        .context("failed to build liveness chain")?
        .build();
    let mut session = LivenessSession::new(script.detector(), chain, tracker, Vec::<LivenessEvent>::new());
    tracing::info!(
        session = %session.id(),
        frames = script.frames.len(),
        region = script.region.is_some(),
        "replaying recorded frames"
    );

    let mut frames = Vec::with_capacity(script.frames.len());
    for (index, recorded) in script.frames.iter().enumerate() {
        let before = session.sink().len();
        let frame = Frame::new(Vec::new(), recorded.width, recorded.height, recorded.rotation);
        let outcome = session.process(&frame);
        frames.push(FrameReport {
            index,
            outcome,
            events: session.sink()[before..].to_vec(),
        });
    }
    session.close();
    tracing::debug!(events = session.sink().len(), "replay finished");

    Ok(ReplayReport { frames })
}

/// Human-readable detail for an event, empty if the name says it all.
pub fn event_detail(event: &LivenessEvent) -> String {
    match event {
        LivenessEvent::Information(key) => format!("{} ({})", key.default_text(), key.key()),
        LivenessEvent::DirectionalSuccess(movement) => movement.to_string(),
        LivenessEvent::Error(message) => message.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveness_core::{HeadMovement, MessageKey};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SCRIPT: &str = r#"{
        "region": {
            "roi": {"left": 40, "top": 80, "right": 200, "bottom": 240},
            "surface_width": 240,
            "surface_height": 320
        },
        "frames": [
            {"faces": []},
            {"faces": [{"bounding_box": {"left": 150, "top": 250, "right": 330, "bottom": 430},
                        "tracking_id": 1}]},
            {"error": "camera disconnected"},
            {"faces": [{"bounding_box": {"left": 150, "top": 250, "right": 330, "bottom": 430},
                        "tracking_id": 1, "head_yaw": -20.0}]}
        ]
    }"#;

    #[test]
    fn test_replay_groups_events_by_frame() {
        let script: ReplayScript = serde_json::from_str(SCRIPT).unwrap();
        let config = LivenessConfig {
            challenge_order: Some(vec![HeadMovement::MoveRight]),
            ..LivenessConfig::default()
        };
        let report = run(&script, &config, &mut StdRng::seed_from_u64(0)).unwrap();

        assert_eq!(report.frames.len(), 4);
        assert_eq!(report.frames[0].events, vec![LivenessEvent::NoFace]);
        assert_eq!(
            report.frames[1].events,
            vec![
                LivenessEvent::OneFace,
                LivenessEvent::Inside,
                LivenessEvent::Information(MessageKey::MoveToRight),
            ]
        );
        assert_eq!(report.frames[2].outcome, FrameOutcome::DetectorFailed);
        assert!(report.frames[3]
            .events
            .contains(&LivenessEvent::AllChallengesComplete));
    }

    #[test]
    fn test_demo_script_passes() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/right_then_up.json");
        let script = ReplayScript::from_file(&path).unwrap();
        let config = LivenessConfig {
            challenge_order: Some(vec![HeadMovement::MoveRight, HeadMovement::MoveUp]),
            ..LivenessConfig::default()
        };
        let report = run(&script, &config, &mut StdRng::seed_from_u64(0)).unwrap();

        assert_eq!(report.frames[4].outcome, FrameOutcome::DetectorFailed);
        assert_eq!(report.frames[5].events, vec![LivenessEvent::ManyFaces]);
        assert_eq!(
            report.frames[7].events,
            vec![
                LivenessEvent::OneFace,
                LivenessEvent::Inside,
                LivenessEvent::DirectionalSuccess(HeadMovement::MoveUp),
                LivenessEvent::AllChallengesComplete,
                LivenessEvent::Information(MessageKey::AllMovementsDone),
            ]
        );
    }

    #[test]
    fn test_frame_defaults() {
        let frame: ReplayFrame = serde_json::from_str("{}").unwrap();
        assert_eq!((frame.width, frame.height, frame.rotation), (480, 640, 0));
        assert!(frame.faces.is_empty());
        assert!(frame.error.is_none());
    }

    #[test]
    fn test_event_detail() {
        assert_eq!(
            event_detail(&LivenessEvent::DirectionalSuccess(HeadMovement::MoveUp)),
            "up"
        );
        assert_eq!(event_detail(&LivenessEvent::NoFace), "");
        assert!(event_detail(&LivenessEvent::Information(MessageKey::CenterFace))
            .contains("euler_movement_centralize_face"));
    }
}
