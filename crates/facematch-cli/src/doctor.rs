use std::path::{Path, PathBuf};

use facematch_config::{
    self, ResolvedConfig, ResolvedConfigWithSource, PRIMARY_CONFIG_PATH,
    SECONDARY_CONFIG_PATH,
};
use facematch_core::faces::Locale;
use serde::Serialize;

use crate::config::{liveness_from, validate_liveness, weights_from};
use crate::errors::{AppError, AppResult};

const CHECK_CONFIG: &str = "config";
const CHECK_WEIGHTS: &str = "scoring_weights";
const CHECK_BLEND: &str = "weight_sums";
const CHECK_THRESHOLD: &str = "similarity_threshold";
const CHECK_LOCALE: &str = "locale";
const CHECK_LIVENESS: &str = "liveness";

/// Thresholds below this accept visibly different faces.
const PERMISSIVE_THRESHOLD: f64 = 0.5;
const SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorCheck {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl DoctorCheck {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
            path: None,
            value: None,
        }
    }

    fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.display().to_string());
        self
    }

    fn with_value(mut self, value: impl ToString) -> Self {
        self.value = Some(value.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorOutcome {
    pub ok: bool,
    pub checks: Vec<DoctorCheck>,
}

#[derive(Debug, Clone)]
pub struct DoctorPaths {
    pub config_paths: Vec<PathBuf>,
    /// Set for `--config`: a missing file is a failure rather than a
    /// fallback to defaults.
    pub required: bool,
}

impl Default for DoctorPaths {
    fn default() -> Self {
        Self {
            config_paths: vec![
                PathBuf::from(PRIMARY_CONFIG_PATH),
                PathBuf::from(SECONDARY_CONFIG_PATH),
            ],
            required: false,
        }
    }
}

impl DoctorPaths {
    pub fn for_explicit(explicit: Option<&Path>) -> Self {
        match explicit {
            Some(path) => Self {
                config_paths: vec![path.to_path_buf()],
                required: true,
            },
            None => Self::default(),
        }
    }
}

pub fn run_doctor(explicit: Option<&Path>) -> AppResult<DoctorOutcome> {
    run_doctor_with(&DoctorPaths::for_explicit(explicit))
}

pub fn run_doctor_with(paths: &DoctorPaths) -> AppResult<DoctorOutcome> {
    let (config_check, loaded) = check_config(paths);
    let resolved = &loaded.resolved;

    let checks = vec![
        config_check,
        check_weights(resolved),
        check_weight_sums(resolved),
        check_threshold(resolved),
        check_locale(resolved),
        check_liveness(resolved),
    ];
    for check in &checks {
        tracing::debug!(
            target: "facematch.doctor",
            check = %check.name,
            status = ?check.status,
            "{}",
            check.message
        );
    }

    // Warnings are advisory; only failures make the doctor unhappy.
    let ok = checks.iter().all(|c| c.status != CheckStatus::Fail);
    Ok(DoctorOutcome { ok, checks })
}

fn check_config(paths: &DoctorPaths) -> (DoctorCheck, ResolvedConfigWithSource) {
    let defaults = || ResolvedConfigWithSource {
        resolved: ResolvedConfig::default(),
        source: None,
    };
    let existing = paths.config_paths.iter().filter(|p| p.exists()).count();

    match facematch_config::load_from_paths(&paths.config_paths) {
        Ok(Some(entry)) => {
            let (status, message) = if existing > 1 {
                (
                    CheckStatus::Warn,
                    format!("Both config files exist; using {}", entry.source.display()),
                )
            } else {
                (
                    CheckStatus::Pass,
                    format!("Loaded config from {}", entry.source.display()),
                )
            };
            let check = DoctorCheck::new(CHECK_CONFIG, status, message).with_path(&entry.source);
            let loaded = ResolvedConfigWithSource {
                resolved: ResolvedConfig::from_raw(entry.contents),
                source: Some(entry.source),
            };
            (check, loaded)
        }
        Ok(None) if paths.required => (
            DoctorCheck::new(
                CHECK_CONFIG,
                CheckStatus::Fail,
                format!("Config file missing: {}", display_paths(&paths.config_paths)),
            ),
            defaults(),
        ),
        Ok(None) => (
            DoctorCheck::new(
                CHECK_CONFIG,
                CheckStatus::Warn,
                format!(
                    "No config file found (tried {}); using built-in defaults",
                    display_paths(&paths.config_paths)
                ),
            ),
            defaults(),
        ),
        Err(err) => (
            DoctorCheck::new(CHECK_CONFIG, CheckStatus::Fail, err.to_string()).with_path(err.path()),
            defaults(),
        ),
    }
}

fn check_weights(resolved: &ResolvedConfig) -> DoctorCheck {
    match weights_from(resolved).validate() {
        Ok(()) => DoctorCheck::new(
            CHECK_WEIGHTS,
            CheckStatus::Pass,
            format!(
                "size {}, aspect {}, landmarks {}, geometric {}, descriptor {}",
                resolved.size_weight,
                resolved.aspect_weight,
                resolved.landmark_weight,
                resolved.geometric_weight,
                resolved.embedding_weight
            ),
        ),
        Err(err) => failed(CHECK_WEIGHTS, &err),
    }
}

fn check_weight_sums(resolved: &ResolvedConfig) -> DoctorCheck {
    let geometry = resolved.size_weight + resolved.aspect_weight + resolved.landmark_weight;
    let blend = resolved.geometric_weight + resolved.embedding_weight;
    let off = [("geometry", geometry), ("blend", blend)]
        .into_iter()
        .filter(|(_, sum)| (sum - 1.0).abs() > SUM_TOLERANCE)
        .map(|(name, sum)| format!("{name} weights sum to {sum}"))
        .collect::<Vec<_>>();

    if off.is_empty() {
        DoctorCheck::new(CHECK_BLEND, CheckStatus::Pass, "Weights sum to 1")
    } else {
        DoctorCheck::new(
            CHECK_BLEND,
            CheckStatus::Warn,
            format!("{}; scores are clamped but no longer comparable", off.join(", ")),
        )
    }
}

fn check_threshold(resolved: &ResolvedConfig) -> DoctorCheck {
    let threshold = resolved.similarity_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return DoctorCheck::new(
            CHECK_THRESHOLD,
            CheckStatus::Fail,
            format!("Threshold {threshold} is outside 0.0 - 1.0"),
        )
        .with_value(threshold);
    }
    if threshold < PERMISSIVE_THRESHOLD {
        return DoctorCheck::new(
            CHECK_THRESHOLD,
            CheckStatus::Warn,
            format!(
                "Threshold {threshold} is permissive; landmark geometry alone cannot rule out a different person"
            ),
        )
        .with_value(threshold);
    }
    DoctorCheck::new(
        CHECK_THRESHOLD,
        CheckStatus::Pass,
        format!("Threshold {threshold}"),
    )
    .with_value(threshold)
}

fn check_locale(resolved: &ResolvedConfig) -> DoctorCheck {
    match resolved.locale.parse::<Locale>() {
        Ok(locale) => DoctorCheck::new(
            CHECK_LOCALE,
            CheckStatus::Pass,
            format!("Messages in {locale}"),
        )
        .with_value(locale),
        Err(err) => failed(CHECK_LOCALE, &err).with_value(&resolved.locale),
    }
}

fn check_liveness(resolved: &ResolvedConfig) -> DoctorCheck {
    let liveness = liveness_from(resolved);
    match validate_liveness(&liveness) {
        Ok(()) => DoctorCheck::new(
            CHECK_LIVENESS,
            CheckStatus::Pass,
            format!(
                "Blink {} -> {} within {} ms; head turn {} deg held {} ms; analysing 1 in {} frames",
                liveness.blink_open_probability,
                liveness.blink_close_probability,
                liveness.blink_timeout_ms,
                liveness.look_yaw_degrees,
                liveness.look_hold_ms,
                u64::from(resolved.frame_skip) + 1
            ),
        ),
        Err(err) => failed(CHECK_LIVENESS, &err),
    }
}

fn failed(name: &str, err: &AppError) -> DoctorCheck {
    DoctorCheck::new(name, CheckStatus::Fail, err.human_message())
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
