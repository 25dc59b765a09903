// crates/tf-gate-core/src/report.rs
// ============================================================================
// Module: Report Normalizer
// Description: Render validator output into a single verdict and report.
// Purpose: Produce the uniform {is_valid, report} result for one invocation.
// Dependencies: crate::diagnostics, serde
// ============================================================================

//! ## Overview
//! The normalizer is a pure, total function over [`ValidationOutput`]. A
//! clean run yields the fixed success report; anything else yields one line
//! per diagnostic, in emission order, with a line-number suffix exactly when
//! the validator localized the issue. No diagnostic is dropped, reordered,
//! or deduplicated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;

use crate::diagnostics::ValidationOutput;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed report text for a clean validation run.
pub const VALID_REPORT: &str = "Configuration is valid.";
/// Header line for reports enumerating failures.
const FAILURE_HEADER: &str = "Validation Failed:";

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// Uniform validation result for one invocation.
///
/// # Invariants
/// - Both fields are populated on every code path; the value is constructed
///   exactly once per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Boolean validity verdict.
    pub is_valid: bool,
    /// Success text or failure enumeration.
    pub report: String,
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Builds the verdict and report for one validator run.
#[must_use]
pub fn build_report(output: &ValidationOutput) -> ValidationReport {
    if output.valid && output.diagnostics.is_empty() {
        return ValidationReport {
            is_valid: true,
            report: VALID_REPORT.to_string(),
        };
    }
    let mut report = String::new();
    report.push_str(FAILURE_HEADER);
    report.push('\n');
    for diagnostic in &output.diagnostics {
        let _ = write!(
            report,
            "- [{}] {}: {}",
            diagnostic.severity.as_str(),
            diagnostic.summary,
            diagnostic.detail
        );
        if let Some(range) = diagnostic.range {
            let _ = write!(report, " (Line: {})", range.start.line);
        }
        report.push('\n');
    }
    ValidationReport {
        is_valid: false,
        report,
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
        reason = "Test-only report assertions."
    )]

    use proptest::arbitrary::any;
    use proptest::collection::vec;
    use proptest::prop_assert;
    use proptest::prop_assert_eq;
    use proptest::prop_oneof;
    use proptest::proptest;
    use proptest::strategy::Just;
    use proptest::strategy::Strategy;

    use super::VALID_REPORT;
    use super::build_report;
    use crate::diagnostics::Diagnostic;
    use crate::diagnostics::Severity;
    use crate::diagnostics::SourcePos;
    use crate::diagnostics::SourceRange;
    use crate::diagnostics::ValidationOutput;

    /// Builds a diagnostic fixture with an optional line number.
    fn diagnostic(severity: Severity, summary: &str, detail: &str, line: Option<u64>) -> Diagnostic {
        Diagnostic {
            severity,
            summary: summary.to_string(),
            detail: detail.to_string(),
            range: line.map(|line| SourceRange {
                start: SourcePos {
                    line,
                },
            }),
        }
    }

    #[test]
    fn clean_run_yields_fixed_success_report() {
        let output = ValidationOutput {
            valid: true,
            diagnostics: Vec::new(),
        };
        let report = build_report(&output);
        assert!(report.is_valid);
        assert_eq!(report.report, VALID_REPORT);
    }

    #[test]
    fn valid_run_with_warnings_is_reported_as_failure() {
        let output = ValidationOutput {
            valid: true,
            diagnostics: vec![diagnostic(Severity::Warning, "Deprecated provider", "", None)],
        };
        let report = build_report(&output);
        assert!(!report.is_valid);
        assert!(report.report.contains("- [warning] Deprecated provider: "));
    }

    #[test]
    fn failure_report_enumerates_diagnostics_in_order() {
        let output = ValidationOutput {
            valid: false,
            diagnostics: vec![
                diagnostic(
                    Severity::Error,
                    "Unsupported argument",
                    "An argument named \"nam\" is not expected here.",
                    Some(3),
                ),
                diagnostic(Severity::Warning, "Deprecated provider", "Use the new source.", None),
            ],
        };
        let report = build_report(&output);
        assert!(!report.is_valid);
        let expected = "Validation Failed:\n- [error] Unsupported argument: An argument named \
                        \"nam\" is not expected here. (Line: 3)\n- [warning] Deprecated provider: \
                        Use the new source.\n";
        assert_eq!(report.report, expected);
    }

    #[test]
    fn line_suffix_appears_exactly_when_range_present() {
        let output = ValidationOutput {
            valid: false,
            diagnostics: vec![
                diagnostic(Severity::Error, "Localized", "detail", Some(7)),
                diagnostic(Severity::Error, "Unlocalized", "detail", None),
            ],
        };
        let report = build_report(&output);
        let lines: Vec<&str> = report.report.lines().collect();
        assert!(lines[1].ends_with("(Line: 7)"));
        assert!(!lines[2].contains("(Line:"));
    }

    /// Strategy producing arbitrary diagnostics with line-free summaries.
    fn diagnostic_strategy() -> impl Strategy<Value = Diagnostic> {
        let severity = prop_oneof![
            Just(Severity::Error),
            Just(Severity::Warning),
            Just(Severity::Other),
        ];
        (severity, "[a-zA-Z ]{1,16}", "[a-zA-Z ]{0,24}", any::<Option<u64>>()).prop_map(
            |(severity, summary, detail, line)| Diagnostic {
                severity,
                summary,
                detail,
                range: line.map(|line| SourceRange {
                    start: SourcePos {
                        line,
                    },
                }),
            },
        )
    }

    proptest! {
        #[test]
        fn every_diagnostic_renders_one_line_in_order(
            diagnostics in vec(diagnostic_strategy(), 1..8)
        ) {
            let output = ValidationOutput { valid: false, diagnostics: diagnostics.clone() };
            let report = build_report(&output);
            let lines: Vec<&str> = report.report.lines().collect();
            prop_assert!(!report.is_valid);
            prop_assert_eq!(lines.len(), diagnostics.len() + 1);
            for (line, diagnostic) in lines.iter().skip(1).zip(&diagnostics) {
                let expected_prefix = format!("- [{}]", diagnostic.severity.as_str());
                prop_assert!(line.starts_with(&expected_prefix));
                prop_assert!(line.contains(&diagnostic.summary));
                prop_assert_eq!(line.contains("(Line:"), diagnostic.range.is_some());
            }
        }
    }
}
