use std::any::Any;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use facematch_core::capture::{
    run_quality_check, FrameSize, QualityCheckConfig, QualityCheckOutcome,
};

use crate::cli::{OutputMode, QualityArgs};
use crate::commands::{exit_for, CommandHandler};
use crate::config::{load_settings, Settings};
use crate::errors::AppResult;
use crate::output::render_quality;

type LoadSettings = dyn Fn(Option<&Path>) -> AppResult<Settings> + Send + Sync;

pub struct QualityHandler {
    args: QualityArgs,
    config_path: Option<PathBuf>,
    load_settings: Box<LoadSettings>,
    run: Box<dyn Fn(&QualityCheckConfig) -> AppResult<QualityCheckOutcome> + Send + Sync>,
    render: Box<dyn Fn(&QualityCheckOutcome, OutputMode) -> AppResult<()> + Send + Sync>,
}

impl QualityHandler {
    pub fn new(args: QualityArgs, config_path: Option<PathBuf>) -> Self {
        Self::with_dependencies(
            args,
            config_path,
            load_settings,
            run_quality_check,
            render_quality,
        )
    }

    pub fn with_dependencies(
        args: QualityArgs,
        config_path: Option<PathBuf>,
        load_settings: impl Fn(Option<&Path>) -> AppResult<Settings> + Send + Sync + 'static,
        run: impl Fn(&QualityCheckConfig) -> AppResult<QualityCheckOutcome> + Send + Sync + 'static,
        render: impl Fn(&QualityCheckOutcome, OutputMode) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            args,
            config_path,
            load_settings: Box::new(load_settings),
            run: Box::new(run),
            render: Box::new(render),
        }
    }
}

impl CommandHandler for QualityHandler {
    fn execute(&self, mode: OutputMode, _verbose: bool) -> AppResult<ExitCode> {
        let settings = (self.load_settings)(self.config_path.as_deref())?;
        let config = build_quality_config(&self.args, &settings)?;
        let outcome = (self.run)(&config)?;
        (self.render)(&outcome, mode)?;
        Ok(exit_for(outcome.report.quality.is_good_quality))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn build_quality_config(args: &QualityArgs, settings: &Settings) -> AppResult<QualityCheckConfig> {
    Ok(QualityCheckConfig {
        detection: args.detection.clone(),
        frame: FrameSize::new(args.frame_width, args.frame_height)?,
        thresholds: settings.thresholds,
    })
}
