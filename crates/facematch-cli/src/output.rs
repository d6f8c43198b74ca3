use std::error::Error;
use std::io::{self, Write};

use facematch_core::capture::{LivenessSessionOutcome, QualityCheckOutcome};
use facematch_core::faces::FaceComparisonOutcome;
use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputMode;
use crate::doctor::{CheckStatus, DoctorOutcome};
use crate::errors::{AppError, AppResult};

fn write_json_line<T: Serialize + ?Sized>(payload: &T) -> AppResult<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let payload = serde_json::to_string(payload)?;
    handle.write_all(payload.as_bytes())?;
    handle.write_all(b"\n")?;
    Ok(())
}

pub fn render_compare(outcome: &FaceComparisonOutcome, mode: OutputMode) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            for line in &outcome.logs {
                println!("{line}");
            }
            println!("{}", outcome.report.result.message);
        }
        OutputMode::Json => write_json_line(&outcome.report)?,
    }
    Ok(())
}

pub fn render_quality(outcome: &QualityCheckOutcome, mode: OutputMode) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            for line in &outcome.logs {
                println!("{line}");
            }
            let verdict = if outcome.report.quality.is_good_quality {
                "good"
            } else {
                "poor"
            };
            println!(
                "Frame quality {verdict}: {:.2}",
                outcome.report.quality.quality_score
            );
        }
        OutputMode::Json => write_json_line(&outcome.report)?,
    }
    Ok(())
}

pub fn render_liveness(
    outcome: &LivenessSessionOutcome,
    mode: OutputMode,
    include_frames: bool,
) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            for line in &outcome.logs {
                println!("{line}");
            }
            if outcome.summary.live {
                println!("Liveness confirmed");
            } else {
                println!("Liveness not confirmed");
            }
        }
        OutputMode::Json => write_json_line(&liveness_json_payload(outcome, include_frames)?)?,
    }
    Ok(())
}

fn liveness_json_payload(
    outcome: &LivenessSessionOutcome,
    include_frames: bool,
) -> AppResult<Value> {
    let summary = serde_json::to_value(&outcome.summary)?;
    let mut payload = json!({ "summary": summary });
    if include_frames {
        payload["frames"] = serde_json::to_value(&outcome.reports)?;
    }
    Ok(payload)
}

pub fn render_doctor(outcome: &DoctorOutcome, mode: OutputMode) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            for check in &outcome.checks {
                let tag = match check.status {
                    CheckStatus::Pass => "PASS",
                    CheckStatus::Warn => "WARN",
                    CheckStatus::Fail => "FAIL",
                };
                println!("[{tag}] {}: {}", check.name, check.message);
            }
            if outcome.ok {
                println!("doctor: OK");
            } else {
                println!("doctor: problems found");
            }
        }
        OutputMode::Json => write_json_line(outcome)?,
    }
    Ok(())
}

pub fn render_error(err: &AppError, mode: OutputMode) {
    match mode {
        OutputMode::Human => {
            eprintln!("error: {}", err.human_message());
            if let Some(source) = err.source() {
                eprintln!("cause: {source}");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "success": false,
                "error": err.human_message(),
            });
            if let Ok(json) = serde_json::to_string(&payload) {
                println!("{json}");
            }
            if let Some(source) = err.source() {
                eprintln!("cause: {source}");
            }
        }
    }
}
