// ABOUTME: Entry point for the ecs-pipeline-deploy CLI application.
// ABOUTME: Parses arguments, installs logging, and maps outcomes to exit codes.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use ecs_pipeline_deploy::config::Settings;
use ecs_pipeline_deploy::deploy::Outcome;
use ecs_pipeline_deploy::error::{EXIT_FAILURE, EXIT_SUCCESS, Error, Result};
use ecs_pipeline_deploy::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Usage errors exit 1; clap's own code 2 means "already deployed" here.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                EXIT_FAILURE
            } else {
                EXIT_SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    init_tracing(cli.verbose);

    let mode = OutputMode::from_flags(cli.quiet, cli.json);

    let result = tokio::select! {
        result = run(&cli, Output::new(mode)) => result,
        _ = tokio::signal::ctrl_c() => Err(Error::Interrupted),
    };

    let code = match result {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            Output::new(mode).error(&e.to_string());
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: bool) {
    // The AWS SDK and HTTP stack stay at warn unless RUST_LOG says otherwise.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("warn,ecs_pipeline_deploy={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: &Cli, output: Output) -> Result<Outcome> {
    let cwd = env::current_dir()?;
    let settings = Settings::resolve(cli.config.as_deref(), &cwd)?.merge(&cli.overrides());
    commands::deploy(cli, settings, output).await
}
