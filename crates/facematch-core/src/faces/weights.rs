use serde::Serialize;

use crate::errors::{AppError, AppResult};

// Product-tuned values carried over from the verification flow. They are
// empirical; no false-accept analysis backs them.
pub const SIZE_WEIGHT: f64 = 0.2;
pub const ASPECT_WEIGHT: f64 = 0.2;
pub const LANDMARK_WEIGHT: f64 = 0.6;
pub const GEOMETRIC_WEIGHT: f64 = 0.4;
pub const EMBEDDING_WEIGHT: f64 = 0.6;
pub const ACCEPTANCE_THRESHOLD: f64 = 0.40;
pub const MIN_EMBEDDING_LANDMARKS: usize = 4;

/// Blend weights and acceptance threshold for [`FaceScorer`](super::FaceScorer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringWeights {
    pub size_weight: f64,
    pub aspect_weight: f64,
    pub landmark_weight: f64,
    pub geometric_weight: f64,
    pub embedding_weight: f64,
    pub acceptance_threshold: f64,
    pub min_embedding_landmarks: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            size_weight: SIZE_WEIGHT,
            aspect_weight: ASPECT_WEIGHT,
            landmark_weight: LANDMARK_WEIGHT,
            geometric_weight: GEOMETRIC_WEIGHT,
            embedding_weight: EMBEDDING_WEIGHT,
            acceptance_threshold: ACCEPTANCE_THRESHOLD,
            min_embedding_landmarks: MIN_EMBEDDING_LANDMARKS,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> AppResult<()> {
        let weights = [
            ("size_weight", self.size_weight),
            ("aspect_weight", self.aspect_weight),
            ("landmark_weight", self.landmark_weight),
            ("geometric_weight", self.geometric_weight),
            ("embedding_weight", self.embedding_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::InvalidConfig {
                    key: name,
                    message: format!("expected a finite non-negative weight, found {value}"),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            return Err(AppError::InvalidConfig {
                key: "similarity_threshold",
                message: format!(
                    "expected a value between 0 and 1, found {}",
                    self.acceptance_threshold
                ),
            });
        }

        if !(1..=6).contains(&self.min_embedding_landmarks) {
            return Err(AppError::InvalidConfig {
                key: "min_embedding_landmarks",
                message: format!(
                    "expected between 1 and 6 landmarks, found {}",
                    self.min_embedding_landmarks
                ),
            });
        }

        Ok(())
    }
}
