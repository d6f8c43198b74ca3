use std::any::Any;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::cli::{Commands, OutputMode};
use crate::errors::AppResult;

pub trait CommandHandler: Send + Sync {
    fn execute(&self, mode: OutputMode, verbose: bool) -> AppResult<ExitCode>;
    fn as_any(&self) -> &dyn Any;
}

mod compare;
mod doctor;
mod liveness;
mod quality;

pub use compare::{build_comparison_config, CompareHandler};
pub use doctor::DoctorHandler;
pub use liveness::{build_liveness_config, LivenessHandler};
pub use quality::{build_quality_config, QualityHandler};

/// Builds the handler for a parsed command. `config_path` is the global
/// `--config` flag; `None` searches the system locations.
pub fn handler_for(command: Commands, config_path: Option<PathBuf>) -> Box<dyn CommandHandler> {
    match command {
        Commands::Compare(args) => Box::new(CompareHandler::new(args, config_path)),
        Commands::Quality(args) => Box::new(QualityHandler::new(args, config_path)),
        Commands::Liveness(args) => Box::new(LivenessHandler::new(args, config_path)),
        Commands::Doctor => Box::new(DoctorHandler::new(config_path)),
    }
}

impl From<Commands> for Box<dyn CommandHandler> {
    fn from(command: Commands) -> Self {
        handler_for(command, None)
    }
}

fn exit_for(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
