use clap::Parser;
use manifest_lint::{cli::Cli, config, run_command};
use std::process::ExitCode;

/// Exit status when at least one violation was reported.
const EXIT_VIOLATIONS: u8 = 1;
/// Exit status for configuration errors.
const EXIT_CONFIG_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.init_logging();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_VIOLATIONS),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let settings = config::load_settings(cli.config.as_deref())?;
    let passed = run_command(cli.command, &settings)?;
    Ok(passed)
}
