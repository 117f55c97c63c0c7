// SPDX-FileCopyrightText: 2026 Cortex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cortex - cost-aware LLM model router.
//!
//! This is the binary entry point. It verifies the model catalog, loads
//! configuration, initialises logging and dispatches to a subcommand.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod doctor;
mod explain;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cortex_config::CortexConfig;
use cortex_core::{CortexError, ModelId};

/// Cortex - cost-aware LLM model router.
#[derive(Parser, Debug)]
#[command(name = "cortex", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one request through the supervised pipeline.
    Run {
        input: String,
        /// Skip selection and use this model.
        #[arg(long, value_name = "ID")]
        model: Option<ModelId>,
        /// Accept the first non-empty answer without validation.
        #[arg(long)]
        skip_validation: bool,
        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run one request per non-empty line of FILE in parallel.
    Batch {
        file: PathBuf,
        /// Print the responses as a JSON array.
        #[arg(long)]
        json: bool,
    },
    /// Show how a request would be profiled, priced and routed.
    Explain { input: String },
    /// List the model catalog.
    Models,
    /// Check configuration, credentials, routing and storage.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(issues) = cortex_catalog::verify_catalog() {
        for issue in &issues {
            eprintln!("cortex: catalog error: {issue}");
        }
        return ExitCode::FAILURE;
    }

    let loaded = match &cli.config {
        Some(path) => cortex_config::load_and_validate_path(path),
        None => cortex_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            cortex_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.agent.log_level);

    match dispatch(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("cortex: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Commands, config: &CortexConfig) -> Result<ExitCode, CortexError> {
    match command {
        Commands::Run {
            input,
            model,
            skip_validation,
            json,
        } => {
            let mut request = cortex_supervisor::SupervisorRequest::new(input);
            if let Some(model) = model {
                request = request.with_model(model);
            }
            if skip_validation {
                request = request.skip_validation();
            }
            let success = commands::run(config, request, json).await?;
            Ok(exit_code(success))
        }
        Commands::Batch { file, json } => {
            let success = commands::batch(config, &file, json).await?;
            Ok(exit_code(success))
        }
        Commands::Explain { input } => {
            println!("{}", explain::explain_for_config(config, &input));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Models => {
            print!("{}", commands::models_table());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Doctor { plain } => {
            let failures = doctor::run_doctor(config, plain).await;
            Ok(exit_code(failures == 0))
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Initialize the tracing subscriber with the configured log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cortex={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
