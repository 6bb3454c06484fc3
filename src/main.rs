//! LazyResident CLI
//!
//! Command-line interface for drafting admission-note sections.

use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use lazyresident::cli::{commands, Cli, Commands};
use lazyresident::{Config, ResidentError};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };
    // Diagnostics go to stderr so stdout stays clean for note text
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()
        .map_err(ResidentError::from)
        .context("Failed to read configuration from the environment")?
        .with_api_key(cli.api_key)
        .with_model(cli.model)
        .with_timeout_ms(cli.timeout_ms);
    if cli.plain {
        config = config.with_structured_output(false);
    }
    config
        .validate()
        .map_err(ResidentError::from)
        .context("Invalid command-line option")?;

    init_tracing(&config, cli.verbose);
    info!("LazyResident v{}", env!("CARGO_PKG_VERSION"));
    debug!(?config, "Configuration loaded");

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Generate {
            input,
            sections,
            json,
        } => commands::generate(&config, &input, &sections, json)?,
        Commands::Prompt {
            section,
            input,
            prior,
        } => commands::prompt(&config, section, &input, &prior)?,
        Commands::Extract { path } => commands::extract(&path)?,
        Commands::Sections => commands::list_sections()?,
        Commands::Models => commands::list_models(&config)?,
        Commands::CheckKey => commands::check_key(&config)?,
        Commands::Shell => commands::shell(&config)?,
    }
    Ok(())
}

fn report(err: &anyhow::Error) {
    match err.chain().find_map(|cause| cause.downcast_ref::<ResidentError>()) {
        Some(resident) => {
            eprintln!("Error [{}]: {}", resident.error_code(), resident.friendly_message());
            for suggestion in resident.recovery_suggestions() {
                eprintln!("  - {}", suggestion);
            }
        }
        None => eprintln!("Error: {:#}", err),
    }
}
