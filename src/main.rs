//! buildstamp - stamp build metadata into generated source files.
//!
//! This is the main entry point for the buildstamp CLI tool.

use std::process::ExitCode;

use anyhow::Result;
use buildstamp::{generate, logging, parse_args, ShellRunner};

/// Exit status for any failure; the byte-truncated form of -1.
const FAILURE: u8 = 255;

fn run() -> Result<()> {
    let config = parse_args(std::env::args_os())?;
    let runner = ShellRunner::new().strict(config.strict_git);
    generate(&config, &runner)?;
    Ok(())
}

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<buildstamp::cli::ArgsError>() {
            Some(info) if info.is_info() => {
                print!("{info}");
                ExitCode::SUCCESS
            }
            _ => {
                eprintln!("{err}");
                ExitCode::from(FAILURE)
            }
        },
    }
}
