// crates/tf-gate-cli/src/main.rs
// ============================================================================
// Module: tf-gate CLI Entry Point
// Description: Command dispatcher for the tf-gate MCP server.
// Purpose: Start the server or run one offline validation.
// Dependencies: clap, tf-gate-config, tf-gate-core, tf-gate-mcp, tokio
// ============================================================================

//! ## Overview
//! The tf-gate CLI starts the MCP server (`serve`) or runs the validation
//! pipeline against a local file without the protocol (`validate`).
//! Individual invocation failures never terminate the server; only a fatal
//! transport failure ends `serve`, logging the cause to stderr.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use tf_gate_config::TfGateConfig;
use tf_gate_core::Validator;
use tf_gate_mcp::McpServer;
use tf_gate_mcp::StderrMetrics;

// ============================================================================
// SECTION: Command Definitions
// ============================================================================

/// tf-gate command-line interface.
#[derive(Debug, Parser)]
#[command(name = "tf-gate", version, about = "Terraform validation over MCP")]
struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Start the MCP server with the configured transport.
    Serve {
        /// Path to the tf-gate configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate a local Terraform file and print the report.
    Validate {
        /// Terraform configuration file to validate.
        file: PathBuf,
        /// Path to the tf-gate configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            config,
        } => run_serve(config.as_deref()).await,
        Command::Validate {
            file,
            config,
        } => run_validate(&file, config.as_deref()).await,
    }
}

/// Runs the MCP server until the transport closes or fails.
async fn run_serve(config_path: Option<&Path>) -> ExitCode {
    let config = match TfGateConfig::load(config_path) {
        Ok(config) => config,
        Err(err) => return fail(&format!("tf-gate: {err}")),
    };
    let server = match McpServer::from_config(config) {
        Ok(server) => server.with_metrics(Arc::new(StderrMetrics)),
        Err(err) => return fail(&format!("tf-gate: {err}")),
    };
    match server.serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(&format!("tf-gate: fatal transport failure: {err}")),
    }
}

/// Runs one offline validation against a local file.
async fn run_validate(file: &Path, config_path: Option<&Path>) -> ExitCode {
    let config = match TfGateConfig::load(config_path) {
        Ok(config) => config,
        Err(err) => return fail(&format!("tf-gate: {err}")),
    };
    let code = match fs::read_to_string(file) {
        Ok(code) => code,
        Err(err) => return fail(&format!("tf-gate: cannot read {}: {err}", file.display())),
    };
    let validator = Validator::new(config.terraform.validator_options());
    let report = validator.validate_code(&code).await;
    emit(&report.report);
    if report.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Prints a report to stdout.
#[allow(clippy::print_stdout, reason = "Stdout is the CLI's report channel.")]
fn emit(message: &str) {
    println!("{message}");
}

/// Logs a fatal error to stderr and returns the failure exit code.
#[allow(clippy::print_stderr, reason = "Stderr is the CLI's error channel.")]
fn fail(message: &str) -> ExitCode {
    eprintln!("{message}");
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================
