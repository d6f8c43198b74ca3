use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Image pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned face rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Width over height, or 0.0 for a degenerate box.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkKind {
    LeftEye,
    RightEye,
    NoseBase,
    MouthBottom,
    LeftEar,
    RightEar,
}

impl LandmarkKind {
    pub const ALL: [LandmarkKind; 6] = [
        LandmarkKind::LeftEye,
        LandmarkKind::RightEye,
        LandmarkKind::NoseBase,
        LandmarkKind::MouthBottom,
        LandmarkKind::LeftEar,
        LandmarkKind::RightEar,
    ];
}

/// Landmarks reported by the detector. Kinds the detector could not locate
/// have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Landmarks(BTreeMap<LandmarkKind, Point>);

impl Landmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: LandmarkKind) -> Option<Point> {
        self.0.get(&kind).copied()
    }

    pub fn insert(&mut self, kind: LandmarkKind, point: Point) -> Option<Point> {
        self.0.insert(kind, point)
    }

    pub fn remove(&mut self, kind: LandmarkKind) -> Option<Point> {
        self.0.remove(&kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn count_present(&self, kinds: &[LandmarkKind]) -> usize {
        kinds.iter().filter(|kind| self.0.contains_key(kind)).count()
    }

    /// Both points of a pair, when the detector located both.
    pub fn pair(&self, a: LandmarkKind, b: LandmarkKind) -> Option<(Point, Point)> {
        Some((self.get(a)?, self.get(b)?))
    }
}

impl FromIterator<(LandmarkKind, Point)> for Landmarks {
    fn from_iter<I: IntoIterator<Item = (LandmarkKind, Point)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One detected face in one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub landmarks: Landmarks,
    /// Horizontal head rotation in degrees; negative is the subject's left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_euler_y: Option<f64>,
    /// In-plane head tilt in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_euler_z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_eye_open_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_eye_open_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smiling_probability: Option<f64>,
}

impl FaceObservation {
    pub fn new(bounding_box: BoundingBox, landmarks: Landmarks) -> Self {
        Self {
            bounding_box,
            landmarks,
            head_euler_y: None,
            head_euler_z: None,
            left_eye_open_probability: None,
            right_eye_open_probability: None,
            smiling_probability: None,
        }
    }

    pub fn landmark(&self, kind: LandmarkKind) -> Option<Point> {
        self.landmarks.get(kind)
    }

    /// Both eye-open probabilities, when the detector classified them.
    pub fn eye_open_probabilities(&self) -> Option<(f64, f64)> {
        Some((
            self.left_eye_open_probability?,
            self.right_eye_open_probability?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_box_has_zero_aspect_ratio() {
        let bbox = BoundingBox::new(10.0, 10.0, 40.0, 0.0);
        assert_eq!(bbox.area(), 0.0);
        assert_eq!(bbox.aspect_ratio(), 0.0);
    }

    #[test]
    fn center_uses_origin_and_size() {
        let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(bbox.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn pair_requires_both_landmarks() {
        let landmarks: Landmarks = [(LandmarkKind::LeftEye, Point::new(1.0, 2.0))]
            .into_iter()
            .collect();
        assert!(landmarks
            .pair(LandmarkKind::LeftEye, LandmarkKind::RightEye)
            .is_none());
        assert_eq!(landmarks.count_present(&LandmarkKind::ALL), 1);
    }

    #[test]
    fn observation_deserializes_with_partial_landmarks() {
        let json = r#"{
            "bounding_box": {"x": 0, "y": 0, "width": 120, "height": 160},
            "landmarks": {
                "left_eye": {"x": 40, "y": 60},
                "nose_base": {"x": 60, "y": 90}
            },
            "head_euler_y": -4.5
        }"#;
        let face: FaceObservation = serde_json::from_str(json).unwrap();
        assert_eq!(face.landmarks.len(), 2);
        assert_eq!(
            face.landmark(LandmarkKind::NoseBase),
            Some(Point::new(60.0, 90.0))
        );
        assert!(face.landmark(LandmarkKind::RightEar).is_none());
        assert_eq!(face.head_euler_y, Some(-4.5));
        assert!(face.eye_open_probabilities().is_none());
    }

    #[test]
    fn missing_landmarks_field_means_none_detected() {
        let json = r#"{"bounding_box": {"x": 1, "y": 2, "width": 3, "height": 4}}"#;
        let face: FaceObservation = serde_json::from_str(json).unwrap();
        assert!(face.landmarks.is_empty());
    }
}
