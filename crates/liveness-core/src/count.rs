use std::collections::HashSet;

use crate::chain::FaceHandler;
use crate::event::{EventSink, LivenessEvent};
use crate::face::DetectedFace;

/// Classify a frame by how many distinct faces it holds.
///
/// Distinctness is by tracking id: several detections sharing one id are one
/// face. Detections without an id all share the "no id" key.
pub fn classify(faces: &[DetectedFace]) -> LivenessEvent {
    if faces.is_empty() {
        return LivenessEvent::NoFace;
    }
    let distinct: HashSet<Option<i32>> = faces.iter().map(|f| f.tracking_id).collect();
    if distinct.len() > 1 {
        LivenessEvent::ManyFaces
    } else {
        LivenessEvent::OneFace
    }
}

/// Emits exactly one of `NoFace`, `OneFace` or `ManyFaces` per frame.
pub struct FaceCountHandler {
    halt_unless_exactly_one: bool,
    next_can_handle: bool,
}

impl FaceCountHandler {
    pub fn new(halt_unless_exactly_one: bool) -> Self {
        Self {
            halt_unless_exactly_one,
            next_can_handle: true,
        }
    }
}

impl FaceHandler for FaceCountHandler {
    fn name(&self) -> &'static str {
        "face_count"
    }

    fn handle(&mut self, faces: &[DetectedFace], sink: &mut dyn EventSink) {
        let event = classify(faces);
        if self.halt_unless_exactly_one {
            self.next_can_handle = event == LivenessEvent::OneFace;
        }
        sink.on_liveness_event(event);
    }

    fn next_can_handle(&self) -> bool {
        self.next_can_handle
    }

    fn requires_tracking(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::Rect;

    fn face(tracking_id: Option<i32>) -> DetectedFace {
        DetectedFace::new(Rect::new(0, 0, 10, 10), tracking_id, 0.0, 0.0)
    }

    #[test]
    fn test_empty_frame_is_no_face() {
        let mut handler = FaceCountHandler::new(true);
        let mut events = Vec::new();
        handler.handle(&[], &mut events);
        assert_eq!(events, vec![LivenessEvent::NoFace]);
        assert!(!handler.next_can_handle());
    }

    #[test]
    fn test_duplicate_tracking_ids_count_once() {
        assert_eq!(
            classify(&[face(Some(7)), face(Some(7)), face(Some(7))]),
            LivenessEvent::OneFace
        );
    }

    #[test]
    fn test_distinct_tracking_ids_are_many() {
        assert_eq!(classify(&[face(Some(1)), face(Some(2))]), LivenessEvent::ManyFaces);
    }

    #[test]
    fn test_missing_id_differs_from_present_id() {
        assert_eq!(classify(&[face(None), face(Some(2))]), LivenessEvent::ManyFaces);
        assert_eq!(classify(&[face(None), face(None)]), LivenessEvent::OneFace);
    }

    #[test]
    fn test_halts_unless_exactly_one() {
        let mut handler = FaceCountHandler::new(true);
        let mut events = Vec::new();

        handler.handle(&[face(Some(1))], &mut events);
        assert!(handler.next_can_handle());

        handler.handle(&[face(Some(1)), face(Some(2))], &mut events);
        assert!(!handler.next_can_handle());

        handler.handle(&[face(Some(3))], &mut events);
        assert!(handler.next_can_handle());

        assert_eq!(
            events,
            vec![
                LivenessEvent::OneFace,
                LivenessEvent::ManyFaces,
                LivenessEvent::OneFace
            ]
        );
    }

    #[test]
    fn test_never_halts_when_not_configured() {
        let mut handler = FaceCountHandler::new(false);
        let mut events = Vec::new();
        handler.handle(&[], &mut events);
        handler.handle(&[face(Some(1)), face(Some(2))], &mut events);
        assert!(handler.next_can_handle());
    }
}
