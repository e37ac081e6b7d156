use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::detector::DEFAULT_MIN_FACE_SIZE;
use crate::error::LivenessError;
use crate::movement::{AngleBand, ChallengeSequence, HeadMovement, MovementThresholds};

/// Liveness session settings. Every field has a default, so a partial TOML
/// table is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Half-width of the centering window on both yaw and pitch, degrees.
    pub centering_tolerance: f32,
    /// Yaw must leave this band to complete a left/right challenge.
    pub yaw_band: AngleBand,
    /// Pitch must leave this band to complete an up/down challenge.
    pub pitch_band: AngleBand,
    pub halt_if_outside_region: bool,
    pub halt_unless_one_face: bool,
    /// Seed for the challenge shuffle. Random when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Fixed challenge order; overrides the shuffle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_order: Option<Vec<HeadMovement>>,
    pub min_face_size: f32,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        let thresholds = MovementThresholds::default();
        Self {
            centering_tolerance: thresholds.centering.upper,
            yaw_band: thresholds.yaw,
            pitch_band: thresholds.pitch,
            halt_if_outside_region: true,
            halt_unless_one_face: true,
            seed: None,
            challenge_order: None,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
        }
    }
}

impl LivenessConfig {
    pub fn validate(&self) -> Result<(), LivenessError> {
        if !self.centering_tolerance.is_finite() || self.centering_tolerance < 0.0 {
            return Err(LivenessError::InvalidConfig(format!(
                "centering_tolerance must be a non-negative number, got {}",
                self.centering_tolerance
            )));
        }
        for (name, band) in [("yaw_band", self.yaw_band), ("pitch_band", self.pitch_band)] {
            if !band.lower.is_finite() || !band.upper.is_finite() || band.lower > band.upper {
                return Err(LivenessError::InvalidConfig(format!(
                    "{name} must satisfy lower <= upper, got {}..{}",
                    band.lower, band.upper
                )));
            }
        }
        if !(self.min_face_size > 0.0 && self.min_face_size <= 1.0) {
            return Err(LivenessError::InvalidConfig(format!(
                "min_face_size must be in (0, 1], got {}",
                self.min_face_size
            )));
        }
        if matches!(&self.challenge_order, Some(order) if order.is_empty()) {
            return Err(LivenessError::EmptyChallengeSequence);
        }
        Ok(())
    }

    pub fn thresholds(&self) -> MovementThresholds {
        MovementThresholds {
            centering: AngleBand::symmetric(self.centering_tolerance),
            yaw: self.yaw_band,
            pitch: self.pitch_band,
        }
    }

    /// Realize the session's challenge order: the fixed order if set, else a
    /// shuffle from `seed`, else a shuffle from `rng`.
    pub fn challenge_sequence<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<ChallengeSequence, LivenessError> {
        if let Some(order) = &self.challenge_order {
            return ChallengeSequence::new(order.clone());
        }
        Ok(match self.seed {
            Some(seed) => ChallengeSequence::shuffled(&mut StdRng::seed_from_u64(seed)),
            None => ChallengeSequence::shuffled(rng),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LivenessConfig::default();
        config.validate().unwrap();
        assert_eq!(config.thresholds(), MovementThresholds::default());
    }

    #[test]
    fn test_partial_table_keeps_defaults() {
        let config: LivenessConfig = serde_json::from_str(
            r#"{"centering_tolerance": 5.0, "pitch_band": {"lower": -10.0, "upper": 20.0}}"#,
        )
        .unwrap();
        assert_eq!(config.centering_tolerance, 5.0);
        assert_eq!(config.pitch_band, AngleBand::new(-10.0, 20.0));
        assert_eq!(config.yaw_band, AngleBand::symmetric(10.0));
        assert!(config.halt_unless_one_face);
    }

    #[test]
    fn test_rejects_inverted_band() {
        let config = LivenessConfig {
            yaw_band: AngleBand::new(10.0, -10.0),
            ..LivenessConfig::default()
        };
        assert!(matches!(config.validate(), Err(LivenessError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let config = LivenessConfig {
            centering_tolerance: -1.0,
            ..LivenessConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_order() {
        let config = LivenessConfig {
            challenge_order: Some(Vec::new()),
            ..LivenessConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LivenessError::EmptyChallengeSequence)
        ));
    }

    #[test]
    fn test_fixed_order_wins_over_seed() {
        let config = LivenessConfig {
            seed: Some(3),
            challenge_order: Some(vec![HeadMovement::MoveDown, HeadMovement::MoveUp]),
            ..LivenessConfig::default()
        };
        let seq = config.challenge_sequence(&mut rand::thread_rng()).unwrap();
        assert_eq!(seq.order(), &[HeadMovement::MoveDown, HeadMovement::MoveUp]);
    }

    #[test]
    fn test_seed_fixes_shuffle() {
        let config = LivenessConfig {
            seed: Some(99),
            ..LivenessConfig::default()
        };
        let a = config.challenge_sequence(&mut rand::thread_rng()).unwrap();
        let b = config.challenge_sequence(&mut rand::thread_rng()).unwrap();
        assert_eq!(a.order(), b.order());
    }
}
