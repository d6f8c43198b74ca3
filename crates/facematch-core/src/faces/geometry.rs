use serde::Serialize;

use super::observation::{BoundingBox, FaceObservation, LandmarkKind, Point};
use super::weights::ScoringWeights;

/// Landmark pairs compared between the two faces by the coarse score.
pub const CANONICAL_PAIRS: [(LandmarkKind, LandmarkKind); 4] = [
    (LandmarkKind::LeftEye, LandmarkKind::RightEye),
    (LandmarkKind::LeftEye, LandmarkKind::MouthBottom),
    (LandmarkKind::RightEye, LandmarkKind::MouthBottom),
    (LandmarkKind::NoseBase, LandmarkKind::MouthBottom),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeometricScore {
    pub size_ratio: f64,
    pub aspect_similarity: f64,
    /// Number of canonical pairs present in both faces.
    pub landmark_pairs: usize,
    pub landmark_pair_average: f64,
    pub combined: f64,
}

/// Distance between two points after dividing each axis by the face box
/// dimensions, so that scale and aspect drop out. Box sides below one pixel
/// are treated as one pixel.
pub fn normalized_distance(a: Point, b: Point, bbox: &BoundingBox) -> f64 {
    let width = bbox.width.max(1.0);
    let height = bbox.height.max(1.0);
    let dx = (a.x - b.x) / width;
    let dy = (a.y - b.y) / height;
    (dx * dx + dy * dy).sqrt()
}

/// `1 - |a - b| / max(a, b)` bounded to [0, 1]; 0.0 when the larger value
/// is not positive.
pub fn relative_similarity(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max.is_nan() || max <= 0.0 {
        return 0.0;
    }
    finite_or_zero(1.0 - (a - b).abs() / max).clamp(0.0, 1.0)
}

pub fn size_ratio(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let (area_a, area_b) = (a.area(), b.area());
    let max = area_a.max(area_b);
    if max.is_nan() || max <= 0.0 {
        return 0.0;
    }
    finite_or_zero(area_a.min(area_b) / max).clamp(0.0, 1.0)
}

pub fn aspect_similarity(a: &BoundingBox, b: &BoundingBox) -> f64 {
    relative_similarity(a.aspect_ratio(), b.aspect_ratio())
}

fn pair_distance(face: &FaceObservation, pair: (LandmarkKind, LandmarkKind)) -> Option<f64> {
    let (a, b) = face.landmarks.pair(pair.0, pair.1)?;
    Some(normalized_distance(a, b, &face.bounding_box))
}

/// Average similarity over the canonical pairs both faces expose, together
/// with the number of pairs used.
pub fn landmark_pair_similarity(lhs: &FaceObservation, rhs: &FaceObservation) -> (f64, usize) {
    let mut total = 0.0;
    let mut pairs = 0;
    for pair in CANONICAL_PAIRS {
        if let (Some(d1), Some(d2)) = (pair_distance(lhs, pair), pair_distance(rhs, pair)) {
            total += relative_similarity(d1, d2);
            pairs += 1;
        }
    }

    if pairs == 0 {
        (0.0, 0)
    } else {
        (total / pairs as f64, pairs)
    }
}

pub fn geometric_score(
    lhs: &FaceObservation,
    rhs: &FaceObservation,
    weights: &ScoringWeights,
) -> GeometricScore {
    let size_ratio = size_ratio(&lhs.bounding_box, &rhs.bounding_box);
    let aspect_similarity = aspect_similarity(&lhs.bounding_box, &rhs.bounding_box);
    let (landmark_pair_average, landmark_pairs) = landmark_pair_similarity(lhs, rhs);

    let combined = size_ratio * weights.size_weight
        + aspect_similarity * weights.aspect_weight
        + landmark_pair_average * weights.landmark_weight;

    GeometricScore {
        size_ratio,
        aspect_similarity,
        landmark_pairs,
        landmark_pair_average,
        combined: finite_or_zero(combined).clamp(0.0, 1.0),
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
