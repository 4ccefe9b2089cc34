//! stencil CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or template source not found
//! - 3: Configuration error
//! - 4: Template error
//! - 5: Output file system error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stencil_core::CoreError;
use stencil_settings::SettingsError;
use stencil_templates::TemplateError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIG_ERROR: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const OUTPUT_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging may already be initialized by an embedding process
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(log_filter(cli.verbose, cli.quiet))
        .try_init();

    let result = match cli.command {
        Commands::Use(args) => commands::use_template::execute(args),
        Commands::Settings(args) => commands::settings::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// `RUST_LOG` wins; otherwise the flags pick the default level.
fn log_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(default_directives(verbose, quiet))
}

/// `--quiet` beats `--verbose`.
fn default_directives(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else if verbose {
        "stencil=debug,warn"
    } else {
        "stencil=info,warn"
    }
}

/// Categorize error to determine exit code.
///
/// The first library error found in the context chain decides.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(core) = cause.downcast_ref::<CoreError>() {
            return match core {
                CoreError::Fetch(_) => ExitCodes::INVALID_ARGS,
                CoreError::Settings(_) => ExitCodes::CONFIG_ERROR,
                CoreError::PathRender { .. } | CoreError::ContentRender { .. } => {
                    ExitCodes::TEMPLATE_ERROR
                }
                CoreError::UnsafeTargetPath { .. }
                | CoreError::DirectoryCreate { .. }
                | CoreError::FileCreate { .. }
                | CoreError::Walk { .. } => ExitCodes::OUTPUT_ERROR,
                CoreError::Input(_) => ExitCodes::GENERAL_ERROR,
            };
        }
        if cause.downcast_ref::<SettingsError>().is_some() {
            return ExitCodes::CONFIG_ERROR;
        }
        if cause.downcast_ref::<TemplateError>().is_some() {
            return ExitCodes::TEMPLATE_ERROR;
        }
    }
    ExitCodes::GENERAL_ERROR
}
