// crates/tf-gate-mcp/src/telemetry.rs
// ============================================================================
// Module: MCP Telemetry
// Description: Observability hooks for MCP transport and tool routing.
// Purpose: Provide metric events without hard sink dependencies.
// Dependencies: tf-gate-core, tf-gate-config
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for MCP request outcomes. It
//! is intentionally dependency-light so downstream deployments can plug in
//! Prometheus or OpenTelemetry without redesign. Labels must not carry raw
//! configuration text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tf_gate_config::ServerTransport;
use tf_gate_core::ToolName;

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// MCP request method classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum McpMethod {
    /// JSON-RPC tools/list.
    ToolsList,
    /// JSON-RPC tools/call.
    ToolsCall,
    /// Invalid or malformed JSON-RPC request.
    Invalid,
    /// Unsupported JSON-RPC method.
    Other,
}

impl McpMethod {
    /// Returns a stable label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToolsList => "tools/list",
            Self::ToolsCall => "tools/call",
            Self::Invalid => "invalid",
            Self::Other => "other",
        }
    }
}

/// MCP request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum McpOutcome {
    /// Successful request.
    Ok,
    /// Failed request.
    Error,
}

impl McpOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// MCP request metric event payload.
///
/// # Invariants
/// - `tool` is `None` for requests that never resolved a tool name.
#[derive(Debug, Clone)]
pub struct McpMetricEvent {
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// JSON-RPC method classification.
    pub method: McpMethod,
    /// Tool name when available (tools/call).
    pub tool: Option<ToolName>,
    /// Request outcome.
    pub outcome: McpOutcome,
}

// ============================================================================
// SECTION: Metric Sinks
// ============================================================================

/// Sink for MCP request metric events.
pub trait McpMetrics: Send + Sync {
    /// Records one request event.
    fn record(&self, event: &McpMetricEvent);
}

/// Metrics sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl McpMetrics for NoopMetrics {
    fn record(&self, _event: &McpMetricEvent) {}
}

/// Metrics sink that writes one line per event to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrMetrics;

impl McpMetrics for StderrMetrics {
    #[allow(clippy::print_stderr, reason = "Stderr is this sink's output channel.")]
    fn record(&self, event: &McpMetricEvent) {
        eprintln!(
            "tf-gate-mcp: transport={} method={} tool={} outcome={}",
            event.transport.as_str(),
            event.method.as_str(),
            event.tool.map_or("-", ToolName::as_str),
            event.outcome.as_str()
        );
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
