use std::path::{Path, PathBuf};

use facematch_config::{self, ConfigError, ResolvedConfig, ResolvedConfigWithSource};
use facematch_core::capture::{LivenessConfig, QualityThresholds};
use facematch_core::faces::{FaceScorer, Locale, ScoringWeights};

use crate::errors::{AppError, AppResult};

/// Everything the subcommands need, resolved from the configuration file
/// and validated once.
#[derive(Debug, Clone)]
pub struct Settings {
    pub weights: ScoringWeights,
    pub locale: Locale,
    pub thresholds: QualityThresholds,
    pub liveness: LivenessConfig,
    pub frame_skip: u32,
    pub source: Option<PathBuf>,
}

impl Settings {
    pub fn scorer(&self) -> FaceScorer {
        FaceScorer::new(self.weights, self.locale)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            locale: Locale::default(),
            thresholds: QualityThresholds::default(),
            liveness: LivenessConfig::default(),
            frame_skip: facematch_config::DEFAULT_FRAME_SKIP,
            source: None,
        }
    }
}

pub fn load_settings(explicit: Option<&Path>) -> AppResult<Settings> {
    let loaded = facematch_config::load_resolved_config(explicit).map_err(config_error)?;
    match &loaded.source {
        Some(path) => tracing::debug!(
            target: "facematch.config",
            "Loaded configuration from {}",
            path.display()
        ),
        None => tracing::debug!(
            target: "facematch.config",
            "No configuration file found; using built-in defaults"
        ),
    }
    settings_from_resolved(&loaded)
}

pub fn settings_from_resolved(loaded: &ResolvedConfigWithSource) -> AppResult<Settings> {
    let resolved = &loaded.resolved;
    let weights = weights_from(resolved);
    weights.validate()?;
    let locale: Locale = resolved.locale.parse()?;
    let liveness = liveness_from(resolved);
    validate_liveness(&liveness)?;

    Ok(Settings {
        weights,
        locale,
        thresholds: QualityThresholds::default(),
        liveness,
        frame_skip: resolved.frame_skip,
        source: loaded.source.clone(),
    })
}

pub fn weights_from(resolved: &ResolvedConfig) -> ScoringWeights {
    ScoringWeights {
        size_weight: resolved.size_weight,
        aspect_weight: resolved.aspect_weight,
        landmark_weight: resolved.landmark_weight,
        geometric_weight: resolved.geometric_weight,
        embedding_weight: resolved.embedding_weight,
        acceptance_threshold: resolved.similarity_threshold,
        min_embedding_landmarks: resolved.min_embedding_landmarks,
    }
}

pub fn liveness_from(resolved: &ResolvedConfig) -> LivenessConfig {
    LivenessConfig {
        blink_close_probability: resolved.blink_close_probability,
        blink_open_probability: resolved.blink_open_probability,
        blink_timeout_ms: duration_millis(resolved.blink_timeout),
        look_hold_ms: duration_millis(resolved.look_hold),
        look_yaw_degrees: resolved.look_yaw_degrees,
    }
}

pub fn validate_liveness(config: &LivenessConfig) -> AppResult<()> {
    let probabilities = [
        ("blink_close_probability", config.blink_close_probability),
        ("blink_open_probability", config.blink_open_probability),
    ];
    for (key, value) in probabilities {
        if !(0.0..=1.0).contains(&value) {
            return Err(AppError::InvalidConfig {
                key,
                message: format!("expected a probability between 0 and 1, found {value}"),
            });
        }
    }
    if config.blink_close_probability >= config.blink_open_probability {
        return Err(AppError::InvalidConfig {
            key: "blink_close_probability",
            message: format!(
                "must be below blink_open_probability ({} >= {})",
                config.blink_close_probability, config.blink_open_probability
            ),
        });
    }
    if config.blink_timeout_ms == 0 {
        return Err(AppError::InvalidConfig {
            key: "blink_timeout_millis",
            message: "expected a positive duration, found 0".to_string(),
        });
    }
    if !config.look_yaw_degrees.is_finite() || config.look_yaw_degrees <= 0.0 {
        return Err(AppError::InvalidConfig {
            key: "look_yaw_degrees",
            message: format!(
                "expected a positive angle, found {}",
                config.look_yaw_degrees
            ),
        });
    }
    Ok(())
}

fn duration_millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub fn config_error(err: ConfigError) -> AppError {
    match err {
        ConfigError::Read { path, source } => AppError::ConfigRead { path, source },
        ConfigError::Parse { path, message } => AppError::ConfigParse { path, message },
    }
}
