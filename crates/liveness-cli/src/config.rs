use std::path::Path;

use anyhow::{Context, Result};
use liveness_core::LivenessConfig;

/// Load settings: defaults, then the optional TOML file, then `LIVENESS_*`
/// environment variables.
pub fn load(path: Option<&Path>) -> Result<LivenessConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => LivenessConfig::default(),
    };
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate().context("invalid liveness configuration")?;
    Ok(config)
}

/// Apply `LIVENESS_*` overrides from `lookup`. Unparsable values are ignored.
pub fn apply_overrides<F>(config: &mut LivenessConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let f32_var = |key: &str, default: f32| -> f32 {
        lookup(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    };
    let flag = |key: &str, default: bool| -> bool { lookup(key).map(|v| v != "0").unwrap_or(default) };

    config.centering_tolerance = f32_var("LIVENESS_CENTERING_TOLERANCE", config.centering_tolerance);
    config.yaw_band.lower = f32_var("LIVENESS_YAW_LOWER", config.yaw_band.lower);
    config.yaw_band.upper = f32_var("LIVENESS_YAW_UPPER", config.yaw_band.upper);
    config.pitch_band.lower = f32_var("LIVENESS_PITCH_LOWER", config.pitch_band.lower);
    config.pitch_band.upper = f32_var("LIVENESS_PITCH_UPPER", config.pitch_band.upper);
    config.min_face_size = f32_var("LIVENESS_MIN_FACE_SIZE", config.min_face_size);
    config.halt_if_outside_region = flag("LIVENESS_HALT_IF_OUTSIDE", config.halt_if_outside_region);
    config.halt_unless_one_face = flag("LIVENESS_HALT_UNLESS_ONE_FACE", config.halt_unless_one_face);
    if let Some(seed) = lookup("LIVENESS_SEED").and_then(|v| v.parse().ok()) {
        config.seed = Some(seed);
    }
}
