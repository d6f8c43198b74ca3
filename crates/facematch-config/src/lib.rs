use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use facematch_core::capture::{self, liveness};
use facematch_core::faces::weights;
use serde::Deserialize;
use thiserror::Error;

pub const PRIMARY_CONFIG_PATH: &str = "/etc/facematch/config.toml";
pub const SECONDARY_CONFIG_PATH: &str = "/usr/local/etc/facematch/config.toml";

// Defaults mirror the library's own so an empty file behaves like no file.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = weights::ACCEPTANCE_THRESHOLD;
pub const DEFAULT_SIZE_WEIGHT: f64 = weights::SIZE_WEIGHT;
pub const DEFAULT_ASPECT_WEIGHT: f64 = weights::ASPECT_WEIGHT;
pub const DEFAULT_LANDMARK_WEIGHT: f64 = weights::LANDMARK_WEIGHT;
pub const DEFAULT_GEOMETRIC_WEIGHT: f64 = weights::GEOMETRIC_WEIGHT;
pub const DEFAULT_EMBEDDING_WEIGHT: f64 = weights::EMBEDDING_WEIGHT;
pub const DEFAULT_MIN_EMBEDDING_LANDMARKS: usize = weights::MIN_EMBEDDING_LANDMARKS;
pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_FRAME_SKIP: u32 = capture::DEFAULT_FRAME_SKIP;
pub const DEFAULT_BLINK_CLOSE_PROBABILITY: f64 = liveness::BLINK_CLOSE_PROBABILITY;
pub const DEFAULT_BLINK_OPEN_PROBABILITY: f64 = liveness::BLINK_OPEN_PROBABILITY;
pub const DEFAULT_BLINK_TIMEOUT_MILLIS: u64 = liveness::BLINK_TIMEOUT_MS;
pub const DEFAULT_LOOK_HOLD_MILLIS: u64 = liveness::LOOK_HOLD_MS;
pub const DEFAULT_LOOK_YAW_DEGREES: f64 = liveness::LOOK_YAW_DEGREES;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub similarity_threshold: Option<f64>,
    pub size_weight: Option<f64>,
    pub aspect_weight: Option<f64>,
    pub landmark_weight: Option<f64>,
    pub geometric_weight: Option<f64>,
    pub embedding_weight: Option<f64>,
    pub min_embedding_landmarks: Option<usize>,
    pub locale: Option<String>,
    pub frame_skip: Option<u32>,
    pub blink_close_probability: Option<f64>,
    pub blink_open_probability: Option<f64>,
    pub blink_timeout_millis: Option<u64>,
    pub look_hold_millis: Option<u64>,
    pub look_yaw_degrees: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub similarity_threshold: f64,
    pub size_weight: f64,
    pub aspect_weight: f64,
    pub landmark_weight: f64,
    pub geometric_weight: f64,
    pub embedding_weight: f64,
    pub min_embedding_landmarks: usize,
    pub locale: String,
    pub frame_skip: u32,
    pub blink_close_probability: f64,
    pub blink_open_probability: f64,
    pub blink_timeout: Duration,
    pub look_hold: Duration,
    pub look_yaw_degrees: f64,
}

impl ResolvedConfig {
    pub fn from_raw(raw: ConfigFile) -> Self {
        Self {
            similarity_threshold: raw
                .similarity_threshold
                .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD),
            size_weight: raw.size_weight.unwrap_or(DEFAULT_SIZE_WEIGHT),
            aspect_weight: raw.aspect_weight.unwrap_or(DEFAULT_ASPECT_WEIGHT),
            landmark_weight: raw.landmark_weight.unwrap_or(DEFAULT_LANDMARK_WEIGHT),
            geometric_weight: raw.geometric_weight.unwrap_or(DEFAULT_GEOMETRIC_WEIGHT),
            embedding_weight: raw.embedding_weight.unwrap_or(DEFAULT_EMBEDDING_WEIGHT),
            min_embedding_landmarks: raw
                .min_embedding_landmarks
                .unwrap_or(DEFAULT_MIN_EMBEDDING_LANDMARKS),
            locale: raw.locale.unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            frame_skip: raw.frame_skip.unwrap_or(DEFAULT_FRAME_SKIP),
            blink_close_probability: raw
                .blink_close_probability
                .unwrap_or(DEFAULT_BLINK_CLOSE_PROBABILITY),
            blink_open_probability: raw
                .blink_open_probability
                .unwrap_or(DEFAULT_BLINK_OPEN_PROBABILITY),
            blink_timeout: Duration::from_millis(
                raw.blink_timeout_millis
                    .unwrap_or(DEFAULT_BLINK_TIMEOUT_MILLIS),
            ),
            look_hold: Duration::from_millis(
                raw.look_hold_millis.unwrap_or(DEFAULT_LOOK_HOLD_MILLIS),
            ),
            look_yaw_degrees: raw.look_yaw_degrees.unwrap_or(DEFAULT_LOOK_YAW_DEGREES),
        }
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::from_raw(ConfigFile::default())
    }
}

/// A configuration file as found on disk, before defaults are applied.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub contents: ConfigFile,
    pub source: PathBuf,
}

impl LoadedConfig {
    pub fn new(contents: ConfigFile, source: PathBuf) -> Self {
        Self { contents, source }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfigWithSource {
    pub resolved: ResolvedConfig,
    pub source: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Search order for configuration files. An explicit path replaces the
/// system locations and, unlike them, must exist.
pub fn config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => vec![
            PathBuf::from(PRIMARY_CONFIG_PATH),
            PathBuf::from(SECONDARY_CONFIG_PATH),
        ],
    }
}

pub fn load_resolved_config(
    explicit: Option<&Path>,
) -> Result<ResolvedConfigWithSource, ConfigError> {
    if let Some(path) = explicit {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = parse_config(&contents, path)?;
        return Ok(ResolvedConfigWithSource {
            resolved: ResolvedConfig::from_raw(parsed),
            source: Some(path.to_path_buf()),
        });
    }
    load_resolved_from_paths(&config_paths(None))
}

pub fn load_from_paths(paths: &[PathBuf]) -> Result<Option<LoadedConfig>, ConfigError> {
    for path in paths {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let parsed = parse_config(&contents, path)?;
                return Ok(Some(LoadedConfig::new(parsed, path.clone())));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => {
                return Err(ConfigError::Read {
                    path: path.clone(),
                    source: err,
                })
            }
        }
    }

    Ok(None)
}

pub fn load_resolved_from_paths(
    paths: &[PathBuf],
) -> Result<ResolvedConfigWithSource, ConfigError> {
    match load_from_paths(paths)? {
        Some(entry) => Ok(ResolvedConfigWithSource {
            resolved: ResolvedConfig::from_raw(entry.contents),
            source: Some(entry.source),
        }),
        None => Ok(ResolvedConfigWithSource {
            resolved: ResolvedConfig::default(),
            source: None,
        }),
    }
}

fn parse_config(contents: &str, path: &Path) -> Result<ConfigFile, ConfigError> {
    toml::from_str::<ConfigFile>(contents).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
