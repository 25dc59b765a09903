// crates/tf-gate-core/src/diagnostics.rs
// ============================================================================
// Module: Validator Diagnostics
// Description: Structured diagnostics emitted by terraform validate.
// Purpose: Deserialize the machine-readable validate output while preserving
//          diagnostic order and tolerating unknown fields.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! `terraform validate -json` emits an overall validity flag plus an ordered
//! list of diagnostics. The severity set is owned by the validator, so the
//! model keeps an open `other` variant rather than rejecting new values.
//! Diagnostics are read-only inputs to report building and are not retained
//! after a response is produced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;

// ============================================================================
// SECTION: Diagnostic Types
// ============================================================================

/// Diagnostic severity as reported by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Validation error.
    Error,
    /// Validation warning.
    Warning,
    /// Severity value not recognized by this build.
    #[serde(other)]
    Other,
}

impl Severity {
    /// Returns the stable label used in rendered reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Other => "other",
        }
    }
}

/// Source position within the offending configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SourcePos {
    /// One-based line number.
    pub line: u64,
}

/// Source range attached to a diagnostic when the validator can localize it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SourceRange {
    /// Start position of the range.
    pub start: SourcePos,
}

/// One structured issue reported by the validator.
///
/// # Invariants
/// - `range` is `None` when the validator cannot localize the issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic severity.
    pub severity: Severity,
    /// Short description of the issue.
    pub summary: String,
    /// Longer explanation; empty when the validator omits it.
    #[serde(default)]
    pub detail: String,
    /// Source range when the issue can be localized.
    #[serde(default)]
    pub range: Option<SourceRange>,
}

/// Structured result of one `terraform validate -json` run.
///
/// # Invariants
/// - `diagnostics` preserves the validator's emission order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationOutput {
    /// Overall validity verdict from the validator.
    pub valid: bool,
    /// Ordered diagnostics; empty for a clean run.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
