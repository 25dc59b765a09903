// crates/tf-gate-mcp/tests/helpers/mod.rs
// ============================================================================
// Module: Integration Test Helpers
// Description: Stub validator fixtures for pipeline integration tests.
// Purpose: Drive the full tool pipeline without a real terraform install.
// Dependencies: tf-gate-core, tempfile
// ============================================================================

//! ## Overview
//! The stub validator is a shell script handling the `init` and `validate`
//! subcommands with canned payloads, installed behind the explicit
//! binary-path override so tests stay hermetic and parallel-safe.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use tf_gate_core::ValidatorOptions;

/// Writes an executable stub validator script into the directory.
#[cfg(unix)]
pub fn write_stub(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("terraform");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("stub written");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("stub executable");
    path
}

/// Stub body for a clean validation run.
pub const CLEAN_RUN: &str =
    "if [ \"$1\" = \"validate\" ]; then echo '{\"valid\": true, \"diagnostics\": []}'; fi";

/// Stub body emitting two ordered diagnostics.
pub const TWO_DIAGNOSTICS: &str = "if [ \"$1\" = \"validate\" ]; then echo '{\"valid\": false, \
                                   \"diagnostics\": [{\"severity\": \"error\", \"summary\": \
                                   \"Unsupported argument\", \"detail\": \"An argument named \
                                   \\\"nam\\\" is not expected here.\", \"range\": {\"start\": \
                                   {\"line\": 3}}}, {\"severity\": \"warning\", \"summary\": \
                                   \"Deprecated provider\", \"detail\": \"Use the new \
                                   source.\"}]}'; exit 1; fi";

/// Builds validator options pinned to a stub binary path.
pub fn stub_options(binary: PathBuf) -> ValidatorOptions {
    ValidatorOptions {
        binary_path: Some(binary),
        init_timeout: Duration::from_secs(5),
        validate_timeout: Duration::from_secs(5),
        ..ValidatorOptions::default()
    }
}

/// Builds validator options naming a binary that cannot be located.
pub fn missing_binary_options() -> ValidatorOptions {
    ValidatorOptions {
        binary_name: "terraform-binary-that-does-not-exist".to_string(),
        ..ValidatorOptions::default()
    }
}
