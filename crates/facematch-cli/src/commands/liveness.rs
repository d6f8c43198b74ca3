use std::any::Any;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use facematch_core::capture::{
    run_liveness_session, LivenessSessionConfig, LivenessSessionOutcome,
};

use crate::cli::{LivenessArgs, OutputMode};
use crate::commands::{exit_for, CommandHandler};
use crate::config::{load_settings, Settings};
use crate::errors::AppResult;
use crate::output::render_liveness;

type LoadSettings = dyn Fn(Option<&Path>) -> AppResult<Settings> + Send + Sync;
type RenderLiveness = dyn Fn(&LivenessSessionOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync;

pub struct LivenessHandler {
    args: LivenessArgs,
    config_path: Option<PathBuf>,
    load_settings: Box<LoadSettings>,
    run: Box<dyn Fn(&LivenessSessionConfig) -> AppResult<LivenessSessionOutcome> + Send + Sync>,
    render: Box<RenderLiveness>,
}

impl LivenessHandler {
    pub fn new(args: LivenessArgs, config_path: Option<PathBuf>) -> Self {
        Self::with_dependencies(
            args,
            config_path,
            load_settings,
            run_liveness_session,
            render_liveness,
        )
    }

    pub fn with_dependencies(
        args: LivenessArgs,
        config_path: Option<PathBuf>,
        load_settings: impl Fn(Option<&Path>) -> AppResult<Settings> + Send + Sync + 'static,
        run: impl Fn(&LivenessSessionConfig) -> AppResult<LivenessSessionOutcome>
            + Send
            + Sync
            + 'static,
        render: impl Fn(&LivenessSessionOutcome, OutputMode, bool) -> AppResult<()>
            + Send
            + Sync
            + 'static,
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

impl CommandHandler for LivenessHandler {
    fn execute(&self, mode: OutputMode, _verbose: bool) -> AppResult<ExitCode> {
        let settings = (self.load_settings)(self.config_path.as_deref())?;
        let config = build_liveness_config(&self.args, &settings);
        let outcome = (self.run)(&config)?;
        (self.render)(&outcome, mode, self.args.frames)?;
        Ok(exit_for(outcome.summary.live))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn build_liveness_config(args: &LivenessArgs, settings: &Settings) -> LivenessSessionConfig {
    LivenessSessionConfig {
        session: args.session.clone(),
        thresholds: settings.thresholds,
        liveness: settings.liveness,
        frame_skip: args.frame_skip.unwrap_or(settings.frame_skip),
    }
}
