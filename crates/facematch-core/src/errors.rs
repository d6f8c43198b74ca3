use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read detection file {path}: {source}")]
    DetectionRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("detection file {path} is invalid: {message}")]
    InvalidDetectionFile { path: PathBuf, message: String },

    #[error("frame size {width}x{height} is invalid; both sides must be positive")]
    InvalidFrameSize { width: u32, height: u32 },

    #[error("failed to read configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("invalid configuration value for {key}: {message}")]
    InvalidConfig { key: &'static str, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::DetectionRead { .. } => ExitCode::from(2),
            AppError::InvalidDetectionFile { .. } => ExitCode::from(2),
            AppError::InvalidFrameSize { .. } => ExitCode::from(2),
            AppError::ConfigRead { .. } => ExitCode::from(2),
            AppError::ConfigParse { .. } => ExitCode::from(2),
            AppError::InvalidConfig { .. } => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }

    pub fn human_message(&self) -> String {
        self.to_string()
    }
}

pub type AppResult<T> = Result<T, AppError>;
