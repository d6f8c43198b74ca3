use std::any::Any;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::cli::OutputMode;
use crate::commands::{exit_for, CommandHandler};
use crate::doctor::{self, DoctorOutcome};
use crate::errors::AppResult;
use crate::output::render_doctor;

pub struct DoctorHandler {
    config_path: Option<PathBuf>,
    run_doctor: Box<dyn Fn(Option<&Path>) -> AppResult<DoctorOutcome> + Send + Sync>,
    render: Box<dyn Fn(&DoctorOutcome, OutputMode) -> AppResult<()> + Send + Sync>,
}

impl DoctorHandler {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self::with_dependencies(config_path, doctor::run_doctor, render_doctor)
    }

    pub fn with_dependencies(
        config_path: Option<PathBuf>,
        run_doctor: impl Fn(Option<&Path>) -> AppResult<DoctorOutcome> + Send + Sync + 'static,
        render: impl Fn(&DoctorOutcome, OutputMode) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            config_path,
            run_doctor: Box::new(run_doctor),
            render: Box::new(render),
        }
    }
}

impl CommandHandler for DoctorHandler {
    fn execute(&self, mode: OutputMode, _verbose: bool) -> AppResult<ExitCode> {
        let outcome = (self.run_doctor)(self.config_path.as_deref())?;
        (self.render)(&outcome, mode)?;
        Ok(exit_for(outcome.ok))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
