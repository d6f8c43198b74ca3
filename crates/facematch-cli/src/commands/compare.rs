use std::any::Any;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use facematch_core::faces::{
    run_face_comparison, FaceComparisonConfig, FaceComparisonOutcome, FaceScorer, Locale,
};

use crate::cli::{CompareArgs, OutputMode};
use crate::commands::{exit_for, CommandHandler};
use crate::config::{load_settings, Settings};
use crate::errors::AppResult;
use crate::output::render_compare;

type LoadSettings = dyn Fn(Option<&Path>) -> AppResult<Settings> + Send + Sync;

pub struct CompareHandler {
    args: CompareArgs,
    config_path: Option<PathBuf>,
    load_settings: Box<LoadSettings>,
    run: Box<dyn Fn(&FaceComparisonConfig) -> AppResult<FaceComparisonOutcome> + Send + Sync>,
    render: Box<dyn Fn(&FaceComparisonOutcome, OutputMode) -> AppResult<()> + Send + Sync>,
}

impl CompareHandler {
    pub fn new(args: CompareArgs, config_path: Option<PathBuf>) -> Self {
        Self::with_dependencies(
            args,
            config_path,
            load_settings,
            run_face_comparison,
            render_compare,
        )
    }

    pub fn with_dependencies(
        args: CompareArgs,
        config_path: Option<PathBuf>,
        load_settings: impl Fn(Option<&Path>) -> AppResult<Settings> + Send + Sync + 'static,
        run: impl Fn(&FaceComparisonConfig) -> AppResult<FaceComparisonOutcome>
            + Send
            + Sync
            + 'static,
        render: impl Fn(&FaceComparisonOutcome, OutputMode) -> AppResult<()> + Send + Sync + 'static,
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

impl CommandHandler for CompareHandler {
    fn execute(&self, mode: OutputMode, _verbose: bool) -> AppResult<ExitCode> {
        let settings = (self.load_settings)(self.config_path.as_deref())?;
        let config = build_comparison_config(&self.args, &settings)?;
        let outcome = (self.run)(&config)?;
        (self.render)(&outcome, mode)?;
        Ok(exit_for(outcome.report.result.succeeded))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Applies `--threshold` and `--locale` on top of the configured values.
pub fn build_comparison_config(
    args: &CompareArgs,
    settings: &Settings,
) -> AppResult<FaceComparisonConfig> {
    let mut weights = settings.weights;
    if let Some(threshold) = args.threshold {
        weights.acceptance_threshold = threshold;
        weights.validate()?;
    }
    let locale = match &args.locale {
        Some(value) => value.parse::<Locale>()?,
        None => settings.locale,
    };
    if weights.acceptance_threshold < 0.5 {
        tracing::debug!(
            target: "facematch.compare",
            threshold = weights.acceptance_threshold,
            "Acceptance threshold below 0.5; matches are permissive"
        );
    }

    Ok(FaceComparisonConfig {
        selfie: args.selfie.clone(),
        document: args.document.clone(),
        scorer: FaceScorer::new(weights, locale),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    fn args() -> CompareArgs {
        CompareArgs {
            selfie: PathBuf::from("selfie.json"),
            document: PathBuf::from("document.json"),
            threshold: None,
            locale: None,
        }
    }

    #[test]
    fn settings_apply_without_overrides() {
        let mut settings = Settings::default();
        settings.locale = Locale::PtBr;
        let config = build_comparison_config(&args(), &settings).unwrap();
        assert_eq!(config.scorer.locale(), Locale::PtBr);
        assert_eq!(*config.scorer.weights(), settings.weights);
        assert_eq!(config.selfie, PathBuf::from("selfie.json"));
    }

    #[test]
    fn flags_override_settings() {
        let mut args = args();
        args.threshold = Some(0.75);
        args.locale = Some("pt-BR".into());
        let config = build_comparison_config(&args, &Settings::default()).unwrap();
        assert!((config.scorer.weights().acceptance_threshold - 0.75).abs() < 1e-9);
        assert_eq!(config.scorer.locale(), Locale::PtBr);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut args = args();
        args.threshold = Some(1.5);
        match build_comparison_config(&args, &Settings::default()).unwrap_err() {
            AppError::InvalidConfig { key, .. } => assert_eq!(key, "similarity_threshold"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
