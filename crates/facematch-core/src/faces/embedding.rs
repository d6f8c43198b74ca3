use super::geometry::normalized_distance;
use super::observation::{FaceObservation, LandmarkKind};

pub const FEATURE_LEN: usize = 10;

/// Hand-crafted descriptor built from box-normalized landmark distances and
/// three scale-free ratios. Empty when fewer than `min_landmarks` of the six
/// landmarks were detected.
///
/// Layout: eye-eye, left eye-nose, right eye-nose, nose-mouth,
/// mouth-left eye, mouth-right eye, ear-ear, nose-mouth / eye-eye,
/// mean eye-nose / eye-eye, eye-eye / ear-ear. Missing distances are 0.0.
pub fn feature_vector(face: &FaceObservation, min_landmarks: usize) -> Vec<f64> {
    if face.landmarks.count_present(&LandmarkKind::ALL) < min_landmarks {
        return Vec::new();
    }

    let distance = |a: LandmarkKind, b: LandmarkKind| {
        face.landmarks
            .pair(a, b)
            .map(|(p, q)| normalized_distance(p, q, &face.bounding_box))
            .unwrap_or(0.0)
    };

    use LandmarkKind::*;
    let eye_eye = distance(LeftEye, RightEye);
    let left_eye_nose = distance(LeftEye, NoseBase);
    let right_eye_nose = distance(RightEye, NoseBase);
    let nose_mouth = distance(NoseBase, MouthBottom);
    let mouth_left_eye = distance(MouthBottom, LeftEye);
    let mouth_right_eye = distance(MouthBottom, RightEye);
    let ear_ear = distance(LeftEar, RightEar);

    let ratio = |numerator: f64, denominator: f64| {
        if denominator > 0.0 {
            numerator / denominator
        } else {
            0.0
        }
    };

    vec![
        eye_eye,
        left_eye_nose,
        right_eye_nose,
        nose_mouth,
        mouth_left_eye,
        mouth_right_eye,
        ear_ear,
        ratio(nose_mouth, eye_eye),
        ratio(left_eye_nose + right_eye_nose, 2.0 * eye_eye),
        ratio(eye_eye, ear_ear),
    ]
}

/// Cosine of the angle between two descriptors, clamped to [-1, 1]. Returns
/// 0.0 for empty or mismatched vectors and for zero-magnitude vectors.
pub fn cosine_similarity(lhs: &[f64], rhs: &[f64]) -> f64 {
    if lhs.is_empty() || lhs.len() != rhs.len() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_lhs = 0.0;
    let mut norm_rhs = 0.0;

    for (l, r) in lhs.iter().zip(rhs.iter()) {
        dot += l * r;
        norm_lhs += l * l;
        norm_rhs += r * r;
    }

    let denominator = norm_lhs.sqrt() * norm_rhs.sqrt();
    if !denominator.is_finite() || denominator <= 0.0 {
        return 0.0;
    }

    let similarity = dot / denominator;
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faces::observation::{BoundingBox, Landmarks, Point};

    fn face_with(points: &[(LandmarkKind, f64, f64)]) -> FaceObservation {
        let landmarks: Landmarks = points
            .iter()
            .map(|(kind, x, y)| (*kind, Point::new(*x, *y)))
            .collect();
        FaceObservation::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), landmarks)
    }

    #[test]
    fn too_few_landmarks_yield_empty_vector() {
        let face = face_with(&[
            (LandmarkKind::LeftEye, 30.0, 40.0),
            (LandmarkKind::NoseBase, 50.0, 60.0),
            (LandmarkKind::MouthBottom, 50.0, 80.0),
        ]);
        assert!(feature_vector(&face, 4).is_empty());
        assert_eq!(feature_vector(&face, 3).len(), FEATURE_LEN);
    }

    #[test]
    fn missing_ears_zero_the_ear_features() {
        let face = face_with(&[
            (LandmarkKind::LeftEye, 35.0, 40.0),
            (LandmarkKind::RightEye, 65.0, 40.0),
            (LandmarkKind::NoseBase, 50.0, 60.0),
            (LandmarkKind::MouthBottom, 50.0, 80.0),
        ]);
        let features = feature_vector(&face, 4);
        assert_eq!(features.len(), FEATURE_LEN);
        assert!((features[0] - 0.3).abs() < 1e-12);
        assert!((features[3] - 0.2).abs() < 1e-12);
        assert_eq!(features[6], 0.0);
        assert!((features[7] - 0.2 / 0.3).abs() < 1e-12);
        assert_eq!(features[9], 0.0);
    }

    #[test]
    fn ear_ratio_uses_ear_width() {
        let face = face_with(&[
            (LandmarkKind::LeftEye, 35.0, 40.0),
            (LandmarkKind::RightEye, 65.0, 40.0),
            (LandmarkKind::LeftEar, 10.0, 50.0),
            (LandmarkKind::RightEar, 90.0, 50.0),
        ]);
        let features = feature_vector(&face, 4);
        assert!((features[6] - 0.8).abs() < 1e-12);
        assert!((features[9] - 0.3 / 0.8).abs() < 1e-12);
        assert_eq!(features[7], 0.0);
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.3, 0.2, 0.1];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_negative_one() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_guards_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
