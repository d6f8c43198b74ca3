use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use super::embedding::{cosine_similarity, feature_vector};
use super::geometry::{finite_or_zero, geometric_score};
use super::observation::FaceObservation;
use super::weights::ScoringWeights;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-BR")]
    PtBr,
}

impl FromStr for Locale {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "pt" | "pt-br" => Ok(Locale::PtBr),
            _ => Err(AppError::InvalidConfig {
                key: "locale",
                message: format!("unsupported locale '{value}' (expected \"en\" or \"pt-BR\")"),
            }),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => f.write_str("en"),
            Locale::PtBr => f.write_str("pt-BR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOutcome {
    NoSelfieFace,
    NoDocumentFace,
    Match,
    Mismatch,
}

/// Intermediate values behind a blended score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub size_ratio: f64,
    pub aspect_similarity: f64,
    pub landmark_pairs: usize,
    pub landmark_pair_average: f64,
    pub geometric: f64,
    /// Zero when either face lacked enough landmarks for a descriptor.
    pub embedding_length: usize,
    pub cosine: f64,
    /// Weighted sum before clamping; may be negative when the cosine is.
    pub blended: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub succeeded: bool,
    pub score: f64,
    pub message: String,
    pub outcome: ComparisonOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

impl SimilarityResult {
    fn missing(outcome: ComparisonOutcome, locale: Locale) -> Self {
        Self {
            succeeded: false,
            score: 0.0,
            message: message_for(outcome, 0.0, locale),
            outcome,
            breakdown: None,
        }
    }

    /// Score as a whole percentage, truncated.
    pub fn percent(&self) -> u32 {
        percent(self.score)
    }
}

// Absorbs rounding noise so that a score of 0.9999999999999999 reads as 100%.
const PERCENT_EPSILON: f64 = 1e-9;

fn percent(score: f64) -> u32 {
    (score * 100.0 + PERCENT_EPSILON).floor() as u32
}

fn message_for(outcome: ComparisonOutcome, score: f64, locale: Locale) -> String {
    let pct = percent(score);
    match (locale, outcome) {
        (Locale::En, ComparisonOutcome::NoSelfieFace) => "No face detected in the selfie".into(),
        (Locale::En, ComparisonOutcome::NoDocumentFace) => {
            "No face detected in the document".into()
        }
        (Locale::En, ComparisonOutcome::Match) => format!("Faces match ({pct}% similarity)"),
        (Locale::En, ComparisonOutcome::Mismatch) => {
            format!("Faces do not match closely enough ({pct}% similarity)")
        }
        (Locale::PtBr, ComparisonOutcome::NoSelfieFace) => {
            "Nenhuma face detectada na selfie".into()
        }
        (Locale::PtBr, ComparisonOutcome::NoDocumentFace) => {
            "Nenhuma face detectada no documento".into()
        }
        (Locale::PtBr, ComparisonOutcome::Match) => {
            format!("Faces correspondem ({pct}% de similaridade)")
        }
        (Locale::PtBr, ComparisonOutcome::Mismatch) => {
            format!("Faces não correspondem suficientemente ({pct}% de similaridade)")
        }
    }
}

/// Landmark-geometry face comparison. Holds only its weights, so a single
/// scorer can be shared freely across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaceScorer {
    weights: ScoringWeights,
    locale: Locale,
}

impl FaceScorer {
    pub fn new(weights: ScoringWeights, locale: Locale) -> Self {
        Self { weights, locale }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn compare(
        &self,
        selfie: Option<&FaceObservation>,
        document: Option<&FaceObservation>,
    ) -> SimilarityResult {
        let Some(selfie) = selfie else {
            return SimilarityResult::missing(ComparisonOutcome::NoSelfieFace, self.locale);
        };
        let Some(document) = document else {
            return SimilarityResult::missing(ComparisonOutcome::NoDocumentFace, self.locale);
        };

        let breakdown = self.score(selfie, document);
        let score = finite_or_zero(breakdown.blended).clamp(0.0, 1.0);
        let succeeded = score >= self.weights.acceptance_threshold;
        let outcome = if succeeded {
            ComparisonOutcome::Match
        } else {
            ComparisonOutcome::Mismatch
        };

        debug!(
            target: "facematch.scorer",
            score,
            threshold = self.weights.acceptance_threshold,
            succeeded,
            "face comparison scored"
        );

        SimilarityResult {
            succeeded,
            score,
            message: message_for(outcome, score, self.locale),
            outcome,
            breakdown: Some(breakdown),
        }
    }

    fn score(&self, selfie: &FaceObservation, document: &FaceObservation) -> ScoreBreakdown {
        let geometric = geometric_score(selfie, document, &self.weights);

        let min_landmarks = self.weights.min_embedding_landmarks;
        let selfie_features = feature_vector(selfie, min_landmarks);
        let document_features = feature_vector(document, min_landmarks);
        let (cosine, embedding_length) =
            if selfie_features.is_empty() || document_features.is_empty() {
                (0.0, 0)
            } else {
                (
                    cosine_similarity(&selfie_features, &document_features),
                    selfie_features.len(),
                )
            };

        let blended = geometric.combined * self.weights.geometric_weight
            + cosine * self.weights.embedding_weight;

        debug!(
            target: "facematch.scorer",
            size_ratio = geometric.size_ratio,
            aspect_similarity = geometric.aspect_similarity,
            landmark_pairs = geometric.landmark_pairs,
            geometric = geometric.combined,
            cosine,
            "sub-scores computed"
        );

        ScoreBreakdown {
            size_ratio: geometric.size_ratio,
            aspect_similarity: geometric.aspect_similarity,
            landmark_pairs: geometric.landmark_pairs,
            landmark_pair_average: geometric.landmark_pair_average,
            geometric: geometric.combined,
            embedding_length,
            cosine,
            blended,
        }
    }
}

/// Compares a selfie with a document photo using the default weights and
/// English messages.
pub fn compare(
    selfie: Option<&FaceObservation>,
    document: Option<&FaceObservation>,
) -> SimilarityResult {
    FaceScorer::default().compare(selfie, document)
}
