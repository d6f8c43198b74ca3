use std::path::PathBuf;

use facematch_cli::cli::{CompareArgs, Commands, LivenessArgs, QualityArgs};
use facematch_cli::commands::{
    handler_for, CommandHandler, CompareHandler, DoctorHandler, LivenessHandler, QualityHandler,
};

fn sample_compare_args() -> CompareArgs {
    CompareArgs {
        selfie: PathBuf::from("selfie.json"),
        document: PathBuf::from("document.json"),
        threshold: None,
        locale: None,
    }
}

fn assert_dispatch<T: 'static>(command: Commands)
where
    T: CommandHandler,
{
    let handler: Box<dyn CommandHandler> = command.into();
    assert!(handler.as_any().is::<T>());
}

#[test]
fn compare_command_dispatches_compare_handler() {
    assert_dispatch::<CompareHandler>(Commands::Compare(sample_compare_args()));
}

#[test]
fn quality_command_dispatches_quality_handler() {
    assert_dispatch::<QualityHandler>(Commands::Quality(QualityArgs {
        detection: PathBuf::from("frame.json"),
        frame_width: 640,
        frame_height: 480,
    }));
}

#[test]
fn liveness_command_dispatches_liveness_handler() {
    assert_dispatch::<LivenessHandler>(Commands::Liveness(LivenessArgs {
        session: PathBuf::from("session.json"),
        frame_skip: None,
        frames: false,
    }));
}

#[test]
fn doctor_command_dispatches_doctor_handler() {
    assert_dispatch::<DoctorHandler>(Commands::Doctor);
}

#[test]
fn explicit_config_path_still_dispatches() {
    let handler = handler_for(
        Commands::Compare(sample_compare_args()),
        Some(PathBuf::from("/tmp/facematch.toml")),
    );
    assert!(handler.as_any().is::<CompareHandler>());
}
