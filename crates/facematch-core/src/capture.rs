//! Frame-by-frame selfie analysis: framing quality plus blink and head-turn
//! liveness challenges over a capture session.

pub mod liveness;
pub mod quality;

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::detection::{load_detection, load_session};
use crate::errors::AppResult;
use crate::faces::FaceObservation;

pub use liveness::{LivenessConfig, LivenessState, LivenessTracker};
pub use quality::{assess_frame, FrameQuality, FrameSize, QualityThresholds};

/// Frames dropped between analysed frames.
pub const DEFAULT_FRAME_SKIP: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameReport {
    pub timestamp_ms: u64,
    pub quality: FrameQuality,
    pub liveness: LivenessState,
}

/// Runs quality and liveness analysis on a stream of detector results.
///
/// Only one frame in every `frame_skip + 1` is analysed; the rest are
/// dropped to keep up with the camera. Only the first face of a frame is
/// considered.
#[derive(Debug, Clone)]
pub struct FrameAnalyzer {
    thresholds: QualityThresholds,
    tracker: LivenessTracker,
    frame_skip: u32,
    skipped: u32,
}

impl FrameAnalyzer {
    pub fn new(thresholds: QualityThresholds, liveness: LivenessConfig, frame_skip: u32) -> Self {
        Self {
            thresholds,
            tracker: LivenessTracker::new(liveness),
            frame_skip,
            skipped: 0,
        }
    }

    pub fn analyze(
        &mut self,
        timestamp_ms: u64,
        frame: FrameSize,
        faces: &[FaceObservation],
    ) -> Option<FrameReport> {
        if self.skipped < self.frame_skip {
            self.skipped += 1;
            return None;
        }
        self.skipped = 0;

        let face = faces.first();
        let quality = assess_frame(face, frame, &self.thresholds);
        let liveness = match face {
            Some(face) => self.tracker.observe(face, timestamp_ms),
            None => self.tracker.state(),
        };

        Some(FrameReport {
            timestamp_ms,
            quality,
            liveness,
        })
    }

    pub fn liveness(&self) -> LivenessState {
        self.tracker.state()
    }

    pub fn reset(&mut self) {
        self.tracker.reset();
        self.skipped = 0;
    }
}

impl Default for FrameAnalyzer {
    fn default() -> Self {
        Self::new(
            QualityThresholds::default(),
            LivenessConfig::default(),
            DEFAULT_FRAME_SKIP,
        )
    }
}

#[derive(Debug, Clone)]
pub struct QualityCheckConfig {
    pub detection: PathBuf,
    pub frame: FrameSize,
    pub thresholds: QualityThresholds,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub detection_path: String,
    pub faces: usize,
    pub frame: FrameSize,
    pub quality: FrameQuality,
    pub guidance: Vec<String>,
}

#[derive(Debug)]
pub struct QualityCheckOutcome {
    pub report: QualityReport,
    pub logs: Vec<String>,
}

pub fn run_quality_check(config: &QualityCheckConfig) -> AppResult<QualityCheckOutcome> {
    let detection = load_detection(&config.detection)?;
    let quality = assess_frame(detection.primary_face(), config.frame, &config.thresholds);
    let guidance: Vec<String> = quality
        .guidance(&config.thresholds)
        .into_iter().map(String::from).collect();

    let mut logs = vec![format!(
        "Loaded {} face(s) from {} ({}x{} frame)",
        detection.faces.len(),
        config.detection.display(),
        config.frame.width,
        config.frame.height
    )];
    if quality.has_face {
        logs.push(format!(
            "Face center ({:.2}, {:.2}), size {:.2}, yaw {:.1}, roll {:.1}",
            quality.face_center_x,
            quality.face_center_y,
            quality.face_size,
            quality.head_euler_y,
            quality.head_euler_z
        ));
    }
    logs.push(format!("Quality score {:.2}", quality.quality_score));
    for hint in &guidance {
        logs.push(format!("Hint: {hint}"));
    }

    Ok(QualityCheckOutcome {
        report: QualityReport {
            detection_path: config.detection.display().to_string(),
            faces: detection.faces.len(),
            frame: config.frame,
            quality,
            guidance,
        },
        logs,
    })
}

#[derive(Debug, Clone)]
pub struct LivenessSessionConfig {
    pub session: PathBuf,
    pub thresholds: QualityThresholds,
    pub liveness: LivenessConfig,
    pub frame_skip: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LivenessSummary {
    pub session_path: String,
    pub frames_total: usize,
    pub frames_analyzed: usize,
    pub frames_with_face: usize,
    pub good_quality_frames: usize,
    pub best_quality_score: f64,
    pub liveness: LivenessState,
    pub live: bool,
}

#[derive(Debug)]
pub struct LivenessSessionOutcome {
    pub summary: LivenessSummary,
    pub reports: Vec<FrameReport>,
    pub logs: Vec<String>,
}

pub fn run_liveness_session(config: &LivenessSessionConfig) -> AppResult<LivenessSessionOutcome> {
    let session = load_session(&config.session)?;
    let frame = FrameSize::new(session.frame_width, session.frame_height)?;
    let mut analyzer = FrameAnalyzer::new(config.thresholds, config.liveness, config.frame_skip);

    let reports: Vec<FrameReport> = session
        .frames
        .iter()
        .filter_map(|entry| analyzer.analyze(entry.timestamp_ms, frame, &entry.faces))
        .collect();
    debug!(
        target: "facematch.liveness",
        frames = session.frames.len(),
        analyzed = reports.len(),
        "capture session analysed"
    );

    let frames_with_face = reports.iter().filter(|r| r.quality.has_face).count();
    let good_quality_frames = reports
        .iter()
        .filter(|r| r.quality.is_good_quality)
        .count();
    let best_quality_score = reports
        .iter()
        .map(|r| r.quality.quality_score)
        .fold(0.0, f64::max);
    let liveness = analyzer.liveness();
    let live = liveness.is_complete();

    let logs = vec![
        format!(
            "Loaded {} frame(s) from {}; analysed {} (skipping {} between)",
            session.frames.len(),
            config.session.display(),
            reports.len(),
            config.frame_skip
        ),
        format!(
            "{} frame(s) with a face, {} of good quality (best {:.2})",
            frames_with_face, good_quality_frames, best_quality_score
        ),
        format!(
            "Blink {}, look left {}, look right {}",
            seen(liveness.blink_detected),
            seen(liveness.look_left),
            seen(liveness.look_right)
        ),
    ];

    Ok(LivenessSessionOutcome {
        summary: LivenessSummary {
            session_path: config.session.display().to_string(),
            frames_total: session.frames.len(),
            frames_analyzed: reports.len(),
            frames_with_face,
            good_quality_frames,
            best_quality_score,
            liveness,
            live,
        },
        reports,
        logs,
    })
}

fn seen(flag: bool) -> &'static str {
    if flag {
        "seen"
    } else {
        "missing"
    }
}
