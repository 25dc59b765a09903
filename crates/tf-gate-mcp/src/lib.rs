// crates/tf-gate-mcp/src/lib.rs
// ============================================================================
// Module: tf-gate MCP
// Description: MCP server exposing Terraform validation as a tool.
// Purpose: Provide the tf_validate tool over stdio and HTTP transports.
// Dependencies: tf-gate-core, tf-gate-config, axum, tokio
// ============================================================================

//! ## Overview
//! tf-gate MCP exposes the validation pipeline through a single MCP tool.
//! The tool handler is a thin wrapper over [`tf_gate_core::Validator`];
//! expected validation failures become negative-verdict responses, never
//! protocol errors. Only transport failures surface to the run loop.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod server;
pub mod telemetry;
pub mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use server::McpServer;
pub use server::McpServerError;
pub use telemetry::McpMethod;
pub use telemetry::McpMetricEvent;
pub use telemetry::McpMetrics;
pub use telemetry::McpOutcome;
pub use telemetry::NoopMetrics;
pub use telemetry::StderrMetrics;
pub use tools::ToolError;
pub use tools::ToolRouter;
pub use tools::ValidateRequest;
