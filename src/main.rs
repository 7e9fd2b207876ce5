use bevy::app::App;
use bevy::log::{Level, LogPlugin};
use clap::Parser;
use multipole::cli::{self, Args};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    App::new().add_plugins(LogPlugin {
        level: if args.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        },
        ..Default::default()
    });

    match cli::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
