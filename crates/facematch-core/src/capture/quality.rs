use serde::Serialize;

use crate::errors::{AppError, AppResult};
use crate::faces::FaceObservation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> AppResult<Self> {
        if width == 0 || height == 0 {
            return Err(AppError::InvalidFrameSize { width, height });
        }
        Ok(Self { width, height })
    }
}

/// Bounds a selfie frame must meet before it is worth comparing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityThresholds {
    /// Inclusive range for the face center, as a fraction of the frame.
    pub center_range: (f64, f64),
    /// Inclusive range for the mean of relative face width and height.
    pub size_range: (f64, f64),
    pub eye_open_probability: f64,
    pub smiling_range: (f64, f64),
    pub max_abs_yaw: f64,
    pub max_abs_roll: f64,
    pub min_quality_score: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            center_range: (0.3, 0.7),
            size_range: (0.25, 0.55),
            eye_open_probability: 0.5,
            smiling_range: (0.2, 0.8),
            max_abs_yaw: 25.0,
            max_abs_roll: 15.0,
            min_quality_score: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameQuality {
    pub has_face: bool,
    pub is_centered: bool,
    pub is_good_size: bool,
    pub eyes_open: bool,
    pub is_natural_pose: bool,
    pub is_looking_at_camera: bool,
    pub quality_score: f64,
    pub is_good_quality: bool,
    pub face_size: f64,
    pub face_center_x: f64,
    pub face_center_y: f64,
    pub head_euler_y: f64,
    pub head_euler_z: f64,
}

impl FrameQuality {
    pub fn no_face() -> Self {
        Self {
            has_face: false,
            is_centered: false,
            is_good_size: false,
            eyes_open: false,
            is_natural_pose: false,
            is_looking_at_camera: false,
            quality_score: 0.0,
            is_good_quality: false,
            face_size: 0.0,
            face_center_x: 0.5,
            face_center_y: 0.5,
            head_euler_y: 0.0,
            head_euler_z: 0.0,
        }
    }

    /// Short hints for the person holding the camera, most important first.
    ///
    /// `thresholds` must be the ones the frame was assessed with.
    pub fn guidance(&self, thresholds: &QualityThresholds) -> Vec<&'static str> {
        if !self.has_face {
            return vec!["no face in frame"];
        }
        let mut hints = Vec::new();
        if !self.is_centered {
            hints.push("center your face");
        }
        if !self.is_good_size {
            if self.face_size < thresholds.size_range.0 {
                hints.push("move closer");
            } else {
                hints.push("move further away");
            }
        }
        if !self.eyes_open {
            hints.push("keep your eyes open");
        }
        if !self.is_looking_at_camera {
            hints.push("look straight at the camera");
        }
        hints
    }
}

fn within(value: f64, (low, high): (f64, f64)) -> bool {
    (low..=high).contains(&value)
}

pub fn assess_frame(
    face: Option<&FaceObservation>,
    frame: FrameSize,
    thresholds: &QualityThresholds,
) -> FrameQuality {
    let Some(face) = face else {
        return FrameQuality::no_face();
    };

    let frame_width = f64::from(frame.width.max(1));
    let frame_height = f64::from(frame.height.max(1));
    let bbox = &face.bounding_box;
    let center = bbox.center();

    let face_center_x = center.x / frame_width;
    let face_center_y = center.y / frame_height;
    let face_size = (bbox.width / frame_width + bbox.height / frame_height) / 2.0;

    let is_centered = within(face_center_x, thresholds.center_range)
        && within(face_center_y, thresholds.center_range);
    let is_good_size = within(face_size, thresholds.size_range);

    // Unclassified eyes are given the benefit of the doubt.
    let eyes_open = match face.eye_open_probabilities() {
        Some((left, right)) => {
            left > thresholds.eye_open_probability && right > thresholds.eye_open_probability
        }
        None => true,
    };

    let is_natural_pose = face
        .smiling_probability
        .map_or(true, |smiling| within(smiling, thresholds.smiling_range));

    let head_euler_y = face.head_euler_y.unwrap_or(0.0);
    let head_euler_z = face.head_euler_z.unwrap_or(0.0);
    let is_looking_at_camera =
        head_euler_y.abs() < thresholds.max_abs_yaw && head_euler_z.abs() < thresholds.max_abs_roll;

    let mut quality_score = 0.0;
    if is_centered {
        quality_score += 0.3;
    }
    if is_good_size {
        quality_score += 0.3;
    }
    if eyes_open {
        quality_score += 0.2;
    }
    if is_looking_at_camera {
        quality_score += 0.2;
    }

    let is_good_quality = quality_score >= thresholds.min_quality_score
        && is_centered
        && is_good_size
        && eyes_open
        && is_looking_at_camera;

    FrameQuality {
        has_face: true,
        is_centered,
        is_good_size,
        eyes_open,
        is_natural_pose,
        is_looking_at_camera,
        quality_score,
        is_good_quality,
        face_size,
        face_center_x,
        face_center_y,
        head_euler_y,
        head_euler_z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faces::{BoundingBox, Landmarks};

    fn frame() -> FrameSize {
        FrameSize::new(640, 480).unwrap()
    }

    fn centered_face() -> FaceObservation {
        // 40% of the frame on both axes, centered.
        FaceObservation::new(BoundingBox::new(192.0, 144.0, 256.0, 192.0), Landmarks::new())
    }

    #[test]
    fn no_face_yields_defaults() {
        let quality = assess_frame(None, frame(), &QualityThresholds::default());
        assert!(!quality.has_face);
        assert_eq!(quality.quality_score, 0.0);
        assert_eq!(quality.face_center_x, 0.5);
        assert_eq!(
            quality.guidance(&QualityThresholds::default()),
            vec!["no face in frame"]
        );
    }

    #[test]
    fn well_framed_face_is_good_quality() {
        let quality = assess_frame(Some(&centered_face()), frame(), &QualityThresholds::default());
        assert!(quality.is_centered);
        assert!(quality.is_good_size);
        assert!(quality.eyes_open);
        assert!(quality.is_looking_at_camera);
        assert!((quality.quality_score - 1.0).abs() < 1e-9);
        assert!(quality.is_good_quality);
        assert!(quality.guidance(&QualityThresholds::default()).is_empty());
    }

    #[test]
    fn small_off_center_face_fails() {
        let face = FaceObservation::new(BoundingBox::new(0.0, 0.0, 64.0, 48.0), Landmarks::new());
        let quality = assess_frame(Some(&face), frame(), &QualityThresholds::default());
        assert!(!quality.is_centered);
        assert!(!quality.is_good_size);
        assert!((quality.quality_score - 0.4).abs() < 1e-9);
        assert!(!quality.is_good_quality);
        assert_eq!(
            quality.guidance(&QualityThresholds::default()),
            vec!["center your face", "move closer"]
        );
    }

    #[test]
    fn size_hint_follows_configured_range() {
        let thresholds = QualityThresholds {
            size_range: (0.45, 0.6),
            ..QualityThresholds::default()
        };
        let quality = assess_frame(Some(&centered_face()), frame(), &thresholds);
        assert!(!quality.is_good_size);
        assert_eq!(quality.guidance(&thresholds), vec!["move closer"]);

        let thresholds = QualityThresholds {
            size_range: (0.1, 0.3),
            ..QualityThresholds::default()
        };
        let quality = assess_frame(Some(&centered_face()), frame(), &thresholds);
        assert_eq!(quality.guidance(&thresholds), vec!["move further away"]);
    }

    #[test]
    fn closed_eyes_and_turned_head_are_flagged() {
        let mut face = centered_face();
        face.left_eye_open_probability = Some(0.9);
        face.right_eye_open_probability = Some(0.1);
        face.head_euler_y = Some(30.0);
        let quality = assess_frame(Some(&face), frame(), &QualityThresholds::default());
        assert!(!quality.eyes_open);
        assert!(!quality.is_looking_at_camera);
        assert!((quality.quality_score - 0.6).abs() < 1e-9);
        assert!(!quality.is_good_quality);
    }

    #[test]
    fn roll_limit_is_strict() {
        let mut face = centered_face();
        face.head_euler_z = Some(15.0);
        let quality = assess_frame(Some(&face), frame(), &QualityThresholds::default());
        assert!(!quality.is_looking_at_camera);
    }

    #[test]
    fn smiling_only_affects_pose_flag() {
        let mut face = centered_face();
        face.smiling_probability = Some(0.95);
        let quality = assess_frame(Some(&face), frame(), &QualityThresholds::default());
        assert!(!quality.is_natural_pose);
        assert!(quality.is_good_quality);
    }

    #[test]
    fn zero_frame_size_is_rejected() {
        assert!(matches!(
            FrameSize::new(0, 480),
            Err(AppError::InvalidFrameSize { width: 0, height: 480 })
        ));
    }
}
