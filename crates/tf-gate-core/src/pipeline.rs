// crates/tf-gate-core/src/pipeline.rs
// ============================================================================
// Module: Validation Pipeline
// Description: End-to-end orchestration of one validation invocation.
// Purpose: Compose workspace, adapter, and normalizer into the uniform
//          request/response contract with error-as-value failure handling.
// Dependencies: crate::{report, terraform, workspace}, thiserror
// ============================================================================

//! ## Overview
//! The pipeline walks one invocation through workspace creation, artifact
//! write, binary location, init, validate, and report building. Every
//! expected failure mode is caught here and rendered into a negative-verdict
//! [`ValidationReport`]; nothing escapes as a transport-level error. Failure
//! kinds stay typed as [`ValidateError`] until the single rendering point so
//! callers and tests can distinguish them before they become text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::report::ValidationReport;
use crate::report::build_report;
use crate::terraform;
use crate::terraform::TerraformCli;
use crate::terraform::TerraformError;
use crate::workspace::Workspace;
use crate::workspace::WorkspaceError;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Tunable policy for one validator instance.
///
/// # Invariants
/// - `binary_path`, when set, bypasses the search-path lookup entirely.
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    /// Binary name searched on the executable path.
    pub binary_name: String,
    /// Explicit binary path override.
    pub binary_path: Option<PathBuf>,
    /// Whether phase 1 forces a provider upgrade.
    pub init_upgrade: bool,
    /// Phase-1 wall-clock budget.
    pub init_timeout: Duration,
    /// Phase-2 wall-clock budget.
    pub validate_timeout: Duration,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            binary_name: terraform::DEFAULT_BINARY_NAME.to_string(),
            binary_path: None,
            init_upgrade: true,
            init_timeout: Duration::from_secs(600),
            validate_timeout: Duration::from_secs(60),
        }
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Stateless validator composing the full invocation pipeline.
///
/// Each call allocates its own workspace and subprocess handles, so
/// concurrent invocations are safe by construction.
#[derive(Debug, Clone)]
pub struct Validator {
    /// Policy applied to every invocation.
    options: ValidatorOptions,
}

impl Validator {
    /// Builds a validator with the given policy.
    #[must_use]
    pub const fn new(options: ValidatorOptions) -> Self {
        Self {
            options,
        }
    }

    /// Validates one unit of configuration text end to end.
    ///
    /// Always produces a fully populated report; expected failures are
    /// rendered into a negative verdict rather than propagated.
    pub async fn validate_code(&self, code: &str) -> ValidationReport {
        match self.run_pipeline(code).await {
            Ok(report) => report,
            Err(error) => ValidationReport {
                is_valid: false,
                report: failure_report(&error),
            },
        }
    }

    /// Runs the typed pipeline, surfacing failures as [`ValidateError`].
    async fn run_pipeline(&self, code: &str) -> Result<ValidationReport, ValidateError> {
        let workspace = Workspace::create()?;
        workspace.write_config(code)?;
        let binary = match &self.options.binary_path {
            Some(path) => path.clone(),
            None => terraform::locate(&self.options.binary_name)?,
        };
        let cli = TerraformCli::new(
            binary,
            workspace.path().to_path_buf(),
            self.options.init_upgrade,
            self.options.init_timeout,
            self.options.validate_timeout,
        );
        cli.init().await?;
        let output = cli.validate().await?;
        Ok(build_report(&output))
        // workspace drops here, removing the directory on every path above
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pipeline failure kinds, caught at the invocation boundary.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// Workspace allocation or artifact write failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    /// Terraform location or subprocess phase failed.
    #[error(transparent)]
    Terraform(#[from] TerraformError),
}

/// Renders a pipeline failure into the user-facing report text.
fn failure_report(error: &ValidateError) -> String {
    match error {
        ValidateError::Workspace(WorkspaceError::Create(raw)) => {
            format!("System error creating temp dir: {raw}")
        }
        ValidateError::Workspace(WorkspaceError::Write(raw)) => {
            format!("System error writing file: {raw}")
        }
        ValidateError::Terraform(TerraformError::BinaryNotFound) => {
            "Terraform binary not found on the server path.".to_string()
        }
        ValidateError::Terraform(TerraformError::Init(raw)) => {
            format!("Terraform init failed:\n{raw}")
        }
        ValidateError::Terraform(TerraformError::Execution(raw)) => {
            format!("Terraform validate failed:\n{raw}")
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only pipeline assertions."
    )]

    use std::fs;
    use std::path::Path;
    use std::path::PathBuf;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::Validator;
    use super::ValidatorOptions;

    /// Writes an executable stub validator script into the directory.
    #[cfg(unix)]
    fn write_stub(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("terraform");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("stub written");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("stub executable");
        path
    }

    /// Builds options pinned to a stub binary path.
    fn stub_options(binary: PathBuf) -> ValidatorOptions {
        ValidatorOptions {
            binary_path: Some(binary),
            init_timeout: Duration::from_secs(5),
            validate_timeout: Duration::from_secs(5),
            ..ValidatorOptions::default()
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn clean_run_yields_positive_verdict() {
        let bin_dir = TempDir::new().expect("temp dir");
        let stub = write_stub(
            bin_dir.path(),
            "if [ \"$1\" = \"validate\" ]; then echo '{\"valid\": true, \"diagnostics\": []}'; fi",
        );
        let validator = Validator::new(stub_options(stub));
        let report = validator.validate_code("resource \"null_resource\" \"noop\" {}").await;
        assert!(report.is_valid);
        assert_eq!(report.report, "Configuration is valid.");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn rejected_configuration_is_not_an_error() {
        let bin_dir = TempDir::new().expect("temp dir");
        let stub = write_stub(
            bin_dir.path(),
            "if [ \"$1\" = \"validate\" ]; then echo '{\"valid\": false, \"diagnostics\": \
             [{\"severity\": \"error\", \"summary\": \"Unsupported argument\", \"detail\": \
             \"nope\", \"range\": {\"start\": {\"line\": 2}}}]}'; exit 1; fi",
        );
        let validator = Validator::new(stub_options(stub));
        let report = validator.validate_code("resource {}").await;
        assert!(!report.is_valid);
        assert!(report.report.starts_with("Validation Failed:"));
        assert!(report.report.contains("- [error] Unsupported argument: nope (Line: 2)"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn init_failure_short_circuits_validate() {
        let bin_dir = TempDir::new().expect("temp dir");
        let marker = bin_dir.path().join("validate-ran");
        let stub = write_stub(
            bin_dir.path(),
            &format!(
                "if [ \"$1\" = \"init\" ]; then echo 'backend unreachable' >&2; exit 1; fi\n\
                 if [ \"$1\" = \"validate\" ]; then touch {}; fi",
                marker.display()
            ),
        );
        let validator = Validator::new(stub_options(stub));
        let report = validator.validate_code("terraform {}").await;
        assert!(!report.is_valid);
        assert!(report.report.starts_with("Terraform init failed:\n"));
        assert!(report.report.contains("backend unreachable"));
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn missing_binary_reports_without_spawning() {
        let validator = Validator::new(ValidatorOptions {
            binary_name: "terraform-binary-that-does-not-exist".to_string(),
            ..ValidatorOptions::default()
        });
        let report = validator.validate_code("terraform {}").await;
        assert!(!report.is_valid);
        assert_eq!(report.report, "Terraform binary not found on the server path.");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn repeated_validation_is_idempotent() {
        let bin_dir = TempDir::new().expect("temp dir");
        let stub = write_stub(
            bin_dir.path(),
            "if [ \"$1\" = \"validate\" ]; then echo '{\"valid\": true, \"diagnostics\": []}'; fi",
        );
        let validator = Validator::new(stub_options(stub));
        let first = validator.validate_code("locals {}").await;
        let second = validator.validate_code("locals {}").await;
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn concurrent_invocations_do_not_interfere() {
        let bin_dir = TempDir::new().expect("temp dir");
        // The stub echoes the workspace's main.tf back through the summary,
        // so cross-invocation leakage would flip the wrong report.
        let stub = write_stub(
            bin_dir.path(),
            "if [ \"$1\" = \"validate\" ]; then printf '{\"valid\": false, \"diagnostics\": \
             [{\"severity\": \"error\", \"summary\": \"%s\"}]}' \"$(cat main.tf)\"; fi",
        );
        let validator = Validator::new(stub_options(stub));
        let (left, right) =
            tokio::join!(validator.validate_code("alpha"), validator.validate_code("beta"));
        assert!(left.report.contains("alpha"));
        assert!(right.report.contains("beta"));
        assert!(!left.report.contains("beta"));
        assert!(!right.report.contains("alpha"));
    }
}
