use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::detection::load_detection;
use crate::errors::AppResult;
use crate::faces::scorer::{FaceScorer, SimilarityResult};

#[derive(Debug, Clone)]
pub struct FaceComparisonConfig {
    pub selfie: PathBuf,
    pub document: PathBuf,
    pub scorer: FaceScorer,
}

#[derive(Debug, Clone, Serialize)]
pub struct FaceComparisonReport {
    pub selfie_path: String,
    pub document_path: String,
    pub selfie_faces: usize,
    pub document_faces: usize,
    pub threshold: f64,
    pub compared_at: String,
    #[serde(flatten)]
    pub result: SimilarityResult,
}

#[derive(Debug)]
pub struct FaceComparisonOutcome {
    pub report: FaceComparisonReport,
    pub logs: Vec<String>,
}

pub fn run_face_comparison(config: &FaceComparisonConfig) -> AppResult<FaceComparisonOutcome> {
    let selfie = load_detection(&config.selfie)?;
    let document = load_detection(&config.document)?;

    let result = config
        .scorer
        .compare(selfie.primary_face(), document.primary_face());

    let mut logs = Vec::new();
    logs.push(format!(
        "Loaded {} face(s) from selfie {}",
        selfie.faces.len(),
        config.selfie.display()
    ));
    logs.push(format!(
        "Loaded {} face(s) from document {}",
        document.faces.len(),
        config.document.display()
    ));
    if selfie.faces.len() > 1 || document.faces.len() > 1 {
        logs.push("Multiple faces detected; comparing the first face of each image".into());
    }
    if let Some(breakdown) = &result.breakdown {
        logs.push(format!(
            "Geometry {:.4} (size {:.4}, aspect {:.4}, {} landmark pair(s) averaging {:.4})",
            breakdown.geometric,
            breakdown.size_ratio,
            breakdown.aspect_similarity,
            breakdown.landmark_pairs,
            breakdown.landmark_pair_average
        ));
        if breakdown.embedding_length == 0 {
            logs.push("Landmark descriptor skipped: too few landmarks detected".into());
        } else {
            logs.push(format!("Landmark descriptor cosine {:.4}", breakdown.cosine));
        }
    }
    logs.push(format!(
        "Score {:.4} against threshold {:.2}",
        result.score,
        config.scorer.weights().acceptance_threshold
    ));

    let report = FaceComparisonReport {
        selfie_path: config.selfie.display().to_string(),
        document_path: config.document.display().to_string(),
        selfie_faces: selfie.faces.len(),
        document_faces: document.faces.len(),
        threshold: config.scorer.weights().acceptance_threshold,
        compared_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        result,
    };

    Ok(FaceComparisonOutcome { report, logs })
}
