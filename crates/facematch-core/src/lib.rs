//! Selfie-to-document face comparison from detector landmarks.
//!
//! The scorer works purely on geometry already extracted by an external face
//! detector: bounding boxes and a handful of named landmarks. It never fails;
//! missing faces or landmarks lower the score instead.
//!
//! ```
//! use facematch_core::faces::{compare, BoundingBox, FaceObservation, LandmarkKind, Landmarks, Point};
//!
//! let landmarks: Landmarks = [
//!     (LandmarkKind::LeftEye, Point::new(35.0, 40.0)),
//!     (LandmarkKind::RightEye, Point::new(65.0, 40.0)),
//!     (LandmarkKind::NoseBase, Point::new(50.0, 60.0)),
//!     (LandmarkKind::MouthBottom, Point::new(50.0, 80.0)),
//! ]
//! .into_iter()
//! .collect();
//! let face = FaceObservation::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), landmarks);
//!
//! let result = compare(Some(&face), Some(&face));
//! assert!(result.succeeded);
//! ```

pub mod capture;
pub mod detection;
pub mod errors;
pub mod faces;

pub use errors::{AppError, AppResult};
