use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use facematch_cli::cli::{LivenessArgs, OutputMode, QualityArgs};
use facematch_cli::commands::{CommandHandler, LivenessHandler, QualityHandler};
use facematch_cli::config::Settings;
use facematch_cli::errors::AppError;
use facematch_core::capture::{run_liveness_session, run_quality_check};
use tempfile::TempDir;

const CENTERED_FACE: &str = r#"{"bounding_box": {"x": 192, "y": 144, "width": 256, "height": 192}}"#;

fn face_with(eyes: f64, yaw: f64) -> String {
    format!(
        r#"{{"bounding_box": {{"x": 192, "y": 144, "width": 256, "height": 192}},
            "left_eye_open_probability": {eyes},
            "right_eye_open_probability": {eyes},
            "head_euler_y": {yaw}}}"#
    )
}

#[test]
fn quality_handler_passes_a_well_framed_selfie() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("frame.json");
    fs::write(&path, format!(r#"{{"faces": [{CENTERED_FACE}]}}"#)).unwrap();

    let handler = QualityHandler::with_dependencies(
        QualityArgs {
            detection: path,
            frame_width: 640,
            frame_height: 480,
        },
        None,
        |_path| Ok(Settings::default()),
        run_quality_check,
        |_outcome, _mode| Ok(()),
    );
    assert_eq!(
        handler.execute(OutputMode::Human, false).unwrap(),
        ExitCode::SUCCESS
    );
}

#[test]
fn quality_handler_flags_an_empty_frame() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("frame.json");
    fs::write(&path, r#"{"faces": []}"#).unwrap();

    let guidance = Arc::new(Mutex::new(Vec::new()));
    let handler = QualityHandler::with_dependencies(
        QualityArgs {
            detection: path,
            frame_width: 640,
            frame_height: 480,
        },
        None,
        |_path| Ok(Settings::default()),
        run_quality_check,
        {
            let guidance = Arc::clone(&guidance);
            move |outcome, _mode| {
                guidance
                    .lock()
                    .unwrap()
                    .extend(outcome.report.guidance.iter().cloned());
                Ok(())
            }
        },
    );

    assert_eq!(
        handler.execute(OutputMode::Json, false).unwrap(),
        ExitCode::from(1)
    );
    assert_eq!(*guidance.lock().unwrap(), vec!["no face in frame".to_string()]);
}

#[test]
fn quality_handler_rejects_zero_frame_size() {
    let handler = QualityHandler::with_dependencies(
        QualityArgs {
            detection: PathBuf::from("frame.json"),
            frame_width: 0,
            frame_height: 480,
        },
        None,
        |_path| Ok(Settings::default()),
        |_config| panic!("quality check should not run"),
        |_outcome, _mode| Ok(()),
    );

    let err = handler.execute(OutputMode::Human, false).unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidFrameSize {
            width: 0,
            height: 480
        }
    ));
}

fn write_session(dir: &TempDir, frames: &[(u64, f64, f64)]) -> PathBuf {
    let frames = frames
        .iter()
        .map(|&(ts, eyes, yaw)| {
            format!(
                r#"{{"timestamp_ms": {ts}, "faces": [{}]}}"#,
                face_with(eyes, yaw)
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    let path = dir.path().join("session.json");
    fs::write(
        &path,
        format!(r#"{{"frame_width": 640, "frame_height": 480, "frames": [{frames}]}}"#),
    )
    .unwrap();
    path
}

#[test]
fn liveness_handler_confirms_complete_session() {
    let tmp = TempDir::new().unwrap();
    let session = write_session(
        &tmp,
        &[
            (0, 0.9, 0.0),
            (100, 0.1, 0.0),
            (200, 0.9, 0.0),
            (300, 0.9, -25.0),
            (800, 0.9, -25.0),
            (900, 0.9, 25.0),
            (1400, 0.9, 25.0),
        ],
    );

    let frames_flag = Arc::new(Mutex::new(None));
    let handler = LivenessHandler::with_dependencies(
        LivenessArgs {
            session,
            frame_skip: Some(0),
            frames: true,
        },
        None,
        |_path| Ok(Settings::default()),
        run_liveness_session,
        {
            let frames_flag = Arc::clone(&frames_flag);
            move |outcome, _mode, include_frames| {
                assert_eq!(outcome.reports.len(), 7);
                *frames_flag.lock().unwrap() = Some(include_frames);
                Ok(())
            }
        },
    );

    assert_eq!(
        handler.execute(OutputMode::Json, false).unwrap(),
        ExitCode::SUCCESS
    );
    assert_eq!(*frames_flag.lock().unwrap(), Some(true));
}

#[test]
fn liveness_handler_uses_configured_frame_skip() {
    let tmp = TempDir::new().unwrap();
    // With the default skip only frames 2 and 5 are analysed, missing the blink.
    let session = write_session(
        &tmp,
        &[
            (0, 0.9, 0.0),
            (100, 0.1, 0.0),
            (200, 0.9, 0.0),
            (300, 0.9, 0.0),
            (400, 0.9, 0.0),
            (500, 0.9, 0.0),
        ],
    );

    let analysed = Arc::new(Mutex::new(0));
    let handler = LivenessHandler::with_dependencies(
        LivenessArgs {
            session,
            frame_skip: None,
            frames: false,
        },
        None,
        |_path| Ok(Settings::default()),
        run_liveness_session,
        {
            let analysed = Arc::clone(&analysed);
            move |outcome, _mode, _frames| {
                assert!(!outcome.summary.liveness.blink_detected);
                *analysed.lock().unwrap() = outcome.summary.frames_analyzed;
                Ok(())
            }
        },
    );

    assert_eq!(
        handler.execute(OutputMode::Human, false).unwrap(),
        ExitCode::from(1)
    );
    assert_eq!(*analysed.lock().unwrap(), 2);
}
