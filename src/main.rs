use std::process::ExitCode;

use clap::Parser;
use layerconf::cli::{Cli, describe_error, run};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {}", describe_error(&error));
            ExitCode::FAILURE
        }
    }
}
