//! Liveness event vocabulary and the sink that receives it.

use crate::movement::HeadMovement;

/// Localizable message carried by [`LivenessEvent::Information`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    MoveToRight,
    MoveToLeft,
    MoveToTop,
    MoveToBottom,
    CenterFace,
    AllMovementsDone,
}

impl MessageKey {
    /// Stable lookup key for the host's string table.
    pub fn key(&self) -> &'static str {
        match self {
            MessageKey::MoveToRight => "euler_movement_move_to_right",
            MessageKey::MoveToLeft => "euler_movement_move_to_left",
            MessageKey::MoveToTop => "euler_movement_move_to_top",
            MessageKey::MoveToBottom => "euler_movement_move_to_bottom",
            MessageKey::CenterFace => "euler_movement_centralize_face",
            MessageKey::AllMovementsDone => "euler_movement_all_movements_done",
        }
    }

    /// Default English text, for hosts without their own translations.
    pub fn default_text(&self) -> &'static str {
        match self {
            MessageKey::MoveToRight => "Turn your head to the right",
            MessageKey::MoveToLeft => "Turn your head to the left",
            MessageKey::MoveToTop => "Tilt your head up",
            MessageKey::MoveToBottom => "Tilt your head down",
            MessageKey::CenterFace => "Look straight at the camera",
            MessageKey::AllMovementsDone => "All movements done",
        }
    }
}

/// Every outcome the handler chain can report for a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum LivenessEvent {
    NoFace,
    OneFace,
    ManyFaces,
    Inside,
    Outside,
    DirectionalSuccess(HeadMovement),
    AllChallengesComplete,
    Information(MessageKey),
    Error(String),
}

impl LivenessEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LivenessEvent::NoFace => "NoFace",
            LivenessEvent::OneFace => "FaceDetected",
            LivenessEvent::ManyFaces => "MoreThanOneFace",
            LivenessEvent::Inside => "FaceInsideRegion",
            LivenessEvent::Outside => "FaceOutsideRegion",
            LivenessEvent::DirectionalSuccess(movement) => match movement {
                HeadMovement::MoveRight => "EulerRightMovement",
                HeadMovement::MoveLeft => "EulerLeftMovement",
                HeadMovement::MoveUp => "EulerUpMovement",
                HeadMovement::MoveDown => "EulerDownMovement",
            },
            LivenessEvent::AllChallengesComplete => "AllMovementSuccess",
            LivenessEvent::Information(_) => "Information",
            LivenessEvent::Error(_) => "Error",
        }
    }

    /// Error message, if this is an [`LivenessEvent::Error`].
    pub fn error_message(&self) -> Option<&str> {
        match self {
            LivenessEvent::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Receiver of liveness events.
///
/// Called synchronously, possibly several times per frame, in handler order.
/// Implementations must not panic.
pub trait EventSink {
    fn on_liveness_event(&mut self, event: LivenessEvent);
}

/// Records every event, mostly for tests and replay output.
impl EventSink for Vec<LivenessEvent> {
    fn on_liveness_event(&mut self, event: LivenessEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn on_liveness_event(&mut self, event: LivenessEvent) {
        (**self).on_liveness_event(event);
    }
}

/// Sink that only logs events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_liveness_event(&mut self, event: LivenessEvent) {
        match &event {
            LivenessEvent::Error(message) => {
                tracing::warn!(event = event.name(), error = %message, "liveness event");
            }
            LivenessEvent::Information(key) => {
                tracing::info!(event = event.name(), message = key.key(), "liveness event");
            }
            _ => tracing::info!(event = event.name(), "liveness event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(LivenessEvent::OneFace.name(), "FaceDetected");
        assert_eq!(LivenessEvent::ManyFaces.name(), "MoreThanOneFace");
        assert_eq!(
            LivenessEvent::DirectionalSuccess(HeadMovement::MoveDown).name(),
            "EulerDownMovement"
        );
        assert_eq!(
            LivenessEvent::Information(MessageKey::CenterFace).name(),
            "Information"
        );
    }

    #[test]
    fn test_error_message_only_on_error() {
        let err = LivenessEvent::Error("camera unplugged".into());
        assert_eq!(err.error_message(), Some("camera unplugged"));
        assert_eq!(LivenessEvent::Inside.error_message(), None);
    }

    #[test]
    fn test_vec_sink_records_in_order() {
        let mut sink: Vec<LivenessEvent> = Vec::new();
        sink.on_liveness_event(LivenessEvent::OneFace);
        sink.on_liveness_event(LivenessEvent::Inside);
        assert_eq!(sink, vec![LivenessEvent::OneFace, LivenessEvent::Inside]);
    }

    #[test]
    fn test_message_keys_are_distinct() {
        let keys = [
            MessageKey::MoveToRight,
            MessageKey::MoveToLeft,
            MessageKey::MoveToTop,
            MessageKey::MoveToBottom,
            MessageKey::CenterFace,
            MessageKey::AllMovementsDone,
        ];
        let unique: std::collections::HashSet<_> = keys.iter().map(|k| k.key()).collect();
        assert_eq!(unique.len(), keys.len());
    }
}
