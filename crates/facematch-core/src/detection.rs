//! JSON files produced by the external face detector.
//!
//! A detection file describes every face found in one image:
//!
//! ```json
//! {
//!   "image_path": "selfie.jpg",
//!   "faces": [
//!     {
//!       "bounding_box": {"x": 80, "y": 40, "width": 220, "height": 260},
//!       "landmarks": {"left_eye": {"x": 150, "y": 130}, "right_eye": {"x": 230, "y": 128}}
//!     }
//!   ]
//! }
//! ```
//!
//! A capture session file holds the detector output for consecutive camera
//! frames and drives the liveness check.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::faces::FaceObservation;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default)]
    pub faces: Vec<FaceObservation>,
}

impl DetectionFile {
    /// The face the verification flow uses: the first one reported.
    pub fn primary_face(&self) -> Option<&FaceObservation> {
        self.faces.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFrame {
    pub timestamp_ms: u64,
    #[serde(default)]
    pub faces: Vec<FaceObservation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSession {
    pub frame_width: u32,
    pub frame_height: u32,
    #[serde(default)]
    pub frames: Vec<SessionFrame>,
}

pub fn load_detection(path: &Path) -> AppResult<DetectionFile> {
    load_json(path)
}

pub fn load_session(path: &Path) -> AppResult<CaptureSession> {
    let session: CaptureSession = load_json(path)?;
    if session.frame_width == 0 || session.frame_height == 0 {
        return Err(AppError::InvalidDetectionFile {
            path: path.to_path_buf(),
            message: format!(
                "frame size {}x{} must be positive",
                session.frame_width, session.frame_height
            ),
        });
    }

    let mut previous = None;
    for (idx, frame) in session.frames.iter().enumerate() {
        if previous.is_some_and(|ts| frame.timestamp_ms < ts) {
            return Err(AppError::InvalidDetectionFile {
                path: path.to_path_buf(),
                message: format!("frame {idx} timestamp goes backwards"),
            });
        }
        previous = Some(frame.timestamp_ms);
    }
    Ok(session)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let file = File::open(path).map_err(|source| AppError::DetectionRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|err| AppError::InvalidDetectionFile {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_faces_in_reported_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("selfie.json");
        std::fs::write(
            &path,
            r#"{
                "image_path": "selfie.jpg",
                "faces": [
                    {"bounding_box": {"x": 0, "y": 0, "width": 100, "height": 120}},
                    {"bounding_box": {"x": 300, "y": 0, "width": 40, "height": 50}}
                ]
            }"#,
        )
        .unwrap();

        let detection = load_detection(&path).unwrap();
        assert_eq!(detection.faces.len(), 2);
        assert_eq!(detection.image_path.as_deref(), Some("selfie.jpg"));
        assert_eq!(detection.primary_face().unwrap().bounding_box.width, 100.0);
    }

    #[test]
    fn empty_face_list_has_no_primary_face() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("document.json");
        std::fs::write(&path, r#"{"faces": []}"#).unwrap();

        let detection = load_detection(&path).unwrap();
        assert!(detection.primary_face().is_none());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.json");

        match load_detection(&path).unwrap_err() {
            AppError::DetectionRead { path: err_path, .. } => assert_eq!(err_path, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, r#"{"faces": [{"landmarks": {}}]}"#).unwrap();

        match load_detection(&path).unwrap_err() {
            AppError::InvalidDetectionFile { path: err_path, .. } => assert_eq!(err_path, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_landmark_kind_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chin.json");
        std::fs::write(
            &path,
            r#"{"faces": [{"bounding_box": {"x": 0, "y": 0, "width": 1, "height": 1},
                          "landmarks": {"chin": {"x": 0, "y": 0}}}]}"#,
        )
        .unwrap();

        assert!(matches!(
            load_detection(&path).unwrap_err(),
            AppError::InvalidDetectionFile { .. }
        ));
    }

    #[test]
    fn session_rejects_zero_frame_size() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"frame_width": 0, "frame_height": 480, "frames": []}"#,
        )
        .unwrap();

        assert!(matches!(
            load_session(&path).unwrap_err(),
            AppError::InvalidDetectionFile { .. }
        ));
    }

    #[test]
    fn session_rejects_backwards_timestamps() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"frame_width": 640, "frame_height": 480, "frames": [
                {"timestamp_ms": 100},
                {"timestamp_ms": 50}
            ]}"#,
        )
        .unwrap();

        match load_session(&path).unwrap_err() {
            AppError::InvalidDetectionFile { message, .. } => {
                assert!(message.contains("frame 1"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn session_frames_default_to_no_faces() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"frame_width": 640, "frame_height": 480, "frames": [{"timestamp_ms": 0}]}"#,
        )
        .unwrap();

        let session = load_session(&path).unwrap();
        assert_eq!(session.frames.len(), 1);
        assert!(session.frames[0].faces.is_empty());
    }
}
