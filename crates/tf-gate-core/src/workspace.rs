// crates/tf-gate-core/src/workspace.rs
// ============================================================================
// Module: Validation Workspace
// Description: Ephemeral per-invocation workspace directories.
// Purpose: Materialize caller-supplied configuration text on disk with
//          guaranteed cleanup on every exit path.
// Dependencies: tempfile, thiserror
// ============================================================================

//! ## Overview
//! Terraform requires a directory context to run `init` and `validate`. Each
//! invocation gets a private, uniquely named temporary directory holding a
//! single `main.tf` artifact. Removal is bound to the [`Workspace`] value
//! itself, so a failed or cancelled invocation cannot leak a directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix for workspace directory names.
const WORKSPACE_PREFIX: &str = "tf-validate-";
/// Fixed artifact filename inside a workspace.
pub const CONFIG_FILE_NAME: &str = "main.tf";

// ============================================================================
// SECTION: Workspace
// ============================================================================

/// Ephemeral workspace backing one validation invocation.
///
/// # Invariants
/// - At most one artifact file exists in the workspace.
/// - The directory and all contents are removed when the value is dropped,
///   regardless of which pipeline state the invocation terminated in.
#[derive(Debug)]
pub struct Workspace {
    /// Scoped temporary directory; removal happens on drop.
    dir: TempDir,
}

impl Workspace {
    /// Allocates a new uniquely named workspace directory.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Create`] when the host filesystem cannot
    /// allocate or write the directory.
    pub fn create() -> Result<Self, WorkspaceError> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir()
            .map_err(|err| WorkspaceError::Create(err.to_string()))?;
        Ok(Self {
            dir,
        })
    }

    /// Writes the configuration text verbatim to the fixed artifact file.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Write`] when the artifact cannot be written.
    pub fn write_config(&self, code: &str) -> Result<PathBuf, WorkspaceError> {
        let path = self.dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, code).map_err(|err| WorkspaceError::Write(err.to_string()))?;
        Ok(path)
    }

    /// Returns the workspace directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Workspace allocation and artifact errors.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Workspace directory could not be created.
    #[error("workspace create failed: {0}")]
    Create(String),
    /// Artifact file could not be written.
    #[error("workspace write failed: {0}")]
    Write(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
