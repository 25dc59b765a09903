// crates/tf-gate-core/src/terraform.rs
// ============================================================================
// Module: Terraform Process Adapter
// Description: Locate and drive the external terraform binary.
// Purpose: Run the two-phase init/validate workflow against one workspace.
// Dependencies: crate::diagnostics, thiserror, tokio
// ============================================================================

//! ## Overview
//! The adapter binds the terraform executable to a single workspace directory
//! and exposes the two sequential phase operations. Phase 1 (`init`) prepares
//! providers and modules; phase 2 (`validate -json`) emits the structured
//! diagnostic result. A run that reports the configuration invalid is a
//! successful run; only a subprocess that fails to produce parseable output
//! is an execution error. Children are spawned with kill-on-drop so a
//! cancelled invocation cannot leak a process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::path::Path;
use std::path::PathBuf;
use std::process::Output;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

use crate::diagnostics::ValidationOutput;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default validator binary name searched on the executable path.
pub const DEFAULT_BINARY_NAME: &str = "terraform";

// ============================================================================
// SECTION: Binary Location
// ============================================================================

/// Locates the validator binary on the host's executable search path.
///
/// # Errors
///
/// Returns [`TerraformError::BinaryNotFound`] when no matching executable
/// exists in any search path entry.
pub fn locate(binary_name: &str) -> Result<PathBuf, TerraformError> {
    let dirs = env::var_os("PATH").map(|paths| env::split_paths(&paths).collect::<Vec<_>>());
    locate_in_dirs(binary_name, dirs.unwrap_or_default()).ok_or(TerraformError::BinaryNotFound)
}

/// Searches an explicit directory list for an executable with the given name.
pub(crate) fn locate_in_dirs(
    binary_name: &str,
    dirs: impl IntoIterator<Item = PathBuf>,
) -> Option<PathBuf> {
    dirs.into_iter().map(|dir| dir.join(binary_name)).find(|candidate| is_executable(candidate))
}

/// Returns whether the candidate path is an executable regular file.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata().is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

/// Returns whether the candidate path is a regular file.
#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

// ============================================================================
// SECTION: Terraform CLI Handle
// ============================================================================

/// Handle binding one terraform binary to one workspace directory.
#[derive(Debug, Clone)]
pub struct TerraformCli {
    /// Resolved validator binary path.
    binary: PathBuf,
    /// Workspace directory the subprocesses run in.
    workdir: PathBuf,
    /// Whether phase 1 forces a provider upgrade.
    init_upgrade: bool,
    /// Phase-1 wall-clock budget.
    init_timeout: Duration,
    /// Phase-2 wall-clock budget.
    validate_timeout: Duration,
}

impl TerraformCli {
    /// Binds the validator binary to a workspace directory.
    #[must_use]
    pub fn new(
        binary: PathBuf,
        workdir: PathBuf,
        init_upgrade: bool,
        init_timeout: Duration,
        validate_timeout: Duration,
    ) -> Self {
        Self {
            binary,
            workdir,
            init_upgrade,
            init_timeout,
            validate_timeout,
        }
    }

    /// Runs phase 1: provider and module initialization.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError::Init`] carrying the validator's raw error
    /// text when the subprocess fails, times out, or exits nonzero.
    pub async fn init(&self) -> Result<(), TerraformError> {
        let mut args = vec!["init", "-no-color", "-input=false"];
        if self.init_upgrade {
            args.push("-upgrade");
        }
        let output = self.run(&args, self.init_timeout).await.map_err(TerraformError::Init)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(TerraformError::Init(failure_text(&output)))
        }
    }

    /// Runs phase 2: structured validation of the workspace configuration.
    ///
    /// A nonzero exit with parseable JSON output is a successful run with
    /// diagnostics, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TerraformError::Execution`] when the subprocess fails to
    /// run, times out, or emits output the diagnostic schema cannot parse.
    pub async fn validate(&self) -> Result<ValidationOutput, TerraformError> {
        let output = self
            .run(&["validate", "-json", "-no-color"], self.validate_timeout)
            .await
            .map_err(TerraformError::Execution)?;
        serde_json::from_slice::<ValidationOutput>(&output.stdout).map_err(|err| {
            let raw = failure_text(&output);
            if raw.is_empty() {
                TerraformError::Execution(format!("unparsable validate output: {err}"))
            } else {
                TerraformError::Execution(raw)
            }
        })
    }

    /// Spawns the validator with the given arguments and waits for exit.
    ///
    /// Timeout expiry drops the child future; kill-on-drop terminates the
    /// subprocess before the error is returned.
    async fn run(&self, args: &[&str], budget: Duration) -> Result<Output, String> {
        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let child = command.spawn().map_err(|err| format!("spawn failed: {err}"))?;
        match timeout(budget, child.wait_with_output()).await {
            Ok(result) => result.map_err(|err| format!("subprocess failed: {err}")),
            Err(_) => Err(format!("timed out after {}ms", budget.as_millis())),
        }
    }
}

/// Extracts the most useful raw failure text from a subprocess output.
fn failure_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    format!("exit status: {}", output.status)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Terraform adapter errors.
#[derive(Debug, Error)]
pub enum TerraformError {
    /// Validator executable absent from the search path.
    #[error("terraform binary not found on the search path")]
    BinaryNotFound,
    /// Phase-1 initialization failed, carrying raw validator text.
    #[error("terraform init failed: {0}")]
    Init(String),
    /// Phase-2 validation subprocess failed to run.
    #[error("terraform validate failed: {0}")]
    Execution(String),
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
        reason = "Test-only subprocess assertions."
    )]

    use std::fs;
    use std::path::Path;
    use std::path::PathBuf;
    use std::time::Duration;
    use std::time::Instant;

    use tempfile::TempDir;

    use super::TerraformCli;
    use super::TerraformError;
    use super::locate_in_dirs;

    /// Writes an executable stub validator script into the directory.
    #[cfg(unix)]
    fn write_stub(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("terraform");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("stub written");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("stub executable");
        path
    }

    /// Builds a CLI handle with short test budgets.
    fn cli(binary: PathBuf, workdir: PathBuf) -> TerraformCli {
        TerraformCli::new(
            binary,
            workdir,
            false,
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn locate_in_dirs_misses_empty_and_missing_dirs() {
        let dir = TempDir::new().expect("temp dir");
        let found = locate_in_dirs(
            "terraform",
            vec![PathBuf::from("/does/not/exist"), dir.path().to_path_buf()],
        );
        assert!(found.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn locate_in_dirs_finds_executable_stub() {
        let dir = TempDir::new().expect("temp dir");
        let stub = write_stub(dir.path(), "exit 0");
        let found = locate_in_dirs("terraform", vec![dir.path().to_path_buf()]);
        assert_eq!(found, Some(stub));
    }

    #[cfg(unix)]
    #[test]
    fn locate_in_dirs_skips_non_executable_files() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("terraform");
        fs::write(&path, "not a binary").expect("file written");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("perms set");
        let found = locate_in_dirs("terraform", vec![dir.path().to_path_buf()]);
        assert!(found.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn init_succeeds_on_zero_exit() {
        let bin_dir = TempDir::new().expect("temp dir");
        let workdir = TempDir::new().expect("temp dir");
        let stub = write_stub(bin_dir.path(), "exit 0");
        let result = cli(stub, workdir.path().to_path_buf()).init().await;
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn init_failure_carries_raw_stderr() {
        let bin_dir = TempDir::new().expect("temp dir");
        let workdir = TempDir::new().expect("temp dir");
        let stub = write_stub(bin_dir.path(), "echo 'provider lookup failed' >&2\nexit 1");
        let result = cli(stub, workdir.path().to_path_buf()).init().await;
        match result {
            Err(TerraformError::Init(raw)) => assert!(raw.contains("provider lookup failed")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn validate_parses_json_despite_nonzero_exit() {
        let bin_dir = TempDir::new().expect("temp dir");
        let workdir = TempDir::new().expect("temp dir");
        let stub = write_stub(
            bin_dir.path(),
            "echo '{\"valid\": false, \"diagnostics\": [{\"severity\": \"error\", \
             \"summary\": \"bad block\"}]}'\nexit 1",
        );
        let output = cli(stub, workdir.path().to_path_buf()).validate().await.expect("parsed run");
        assert!(!output.valid);
        assert_eq!(output.diagnostics.len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn validate_rejects_unparsable_output() {
        let bin_dir = TempDir::new().expect("temp dir");
        let workdir = TempDir::new().expect("temp dir");
        let stub = write_stub(bin_dir.path(), "echo 'plugin crashed' >&2\nexit 2");
        let result = cli(stub, workdir.path().to_path_buf()).validate().await;
        match result {
            Err(TerraformError::Execution(raw)) => assert!(raw.contains("plugin crashed")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_subprocess_and_fails_phase() {
        let bin_dir = TempDir::new().expect("temp dir");
        let workdir = TempDir::new().expect("temp dir");
        let stub = write_stub(bin_dir.path(), "sleep 30");
        let handle = TerraformCli::new(
            stub,
            workdir.path().to_path_buf(),
            false,
            Duration::from_millis(100),
            Duration::from_millis(100),
        );
        let start = Instant::now();
        let result = handle.init().await;
        assert!(start.elapsed() < Duration::from_secs(5));
        match result {
            Err(TerraformError::Init(raw)) => assert!(raw.contains("timed out")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
