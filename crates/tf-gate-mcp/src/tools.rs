// crates/tf-gate-mcp/src/tools.rs
// ============================================================================
// Module: MCP Tool Router
// Description: Tool routing for the tf-gate MCP server.
// Purpose: Expose the tf_validate tool as a thin wrapper over the core
//          validation pipeline.
// Dependencies: tf-gate-core, jsonschema, serde
// ============================================================================

//! ## Overview
//! The tool router dispatches MCP tool calls to the validation pipeline.
//! Tool arguments are untrusted: they are checked against the registered
//! input schema before deserialization. A configuration the validator
//! rejects is a successful call with a negative verdict; [`ToolError`] is
//! reserved for protocol-level problems (unknown tool, bad parameters).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use jsonschema::Draft;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use tf_gate_core::ToolDefinition;
use tf_gate_core::ToolName;
use tf_gate_core::Validator;
use tf_gate_core::ValidatorOptions;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Client-facing description of the tf_validate tool.
const TF_VALIDATE_DESCRIPTION: &str = "Validates a string of Terraform HCL code. Returns true if \
                                       valid, or a list of syntax/configuration errors.";

// ============================================================================
// SECTION: Tool Payloads
// ============================================================================

/// Arguments for the tf_validate tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    /// Raw Terraform configuration text to validate.
    pub code: String,
}

// ============================================================================
// SECTION: Tool Router
// ============================================================================

/// Tool router for MCP requests.
#[derive(Clone)]
pub struct ToolRouter {
    /// Validation pipeline shared across invocations.
    validator: Arc<Validator>,
    /// Compiled input schema for tf_validate arguments.
    input_schema: Arc<jsonschema::Validator>,
}

impl ToolRouter {
    /// Builds a tool router around the validation pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Internal`] when the registered input schema
    /// fails to compile.
    pub fn new(options: ValidatorOptions) -> Result<Self, ToolError> {
        let schema = validate_input_schema();
        let compiled = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map_err(|err| ToolError::Internal(format!("invalid input schema: {err}")))?;
        Ok(Self {
            validator: Arc::new(Validator::new(options)),
            input_schema: Arc::new(compiled),
        })
    }

    /// Returns the registered tool definitions.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: ToolName::TfValidate,
            description: TF_VALIDATE_DESCRIPTION.to_string(),
            input_schema: validate_input_schema(),
            output_schema: validate_output_schema(),
        }]
    }

    /// Dispatches a tool call to its handler.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] for unknown tools, schema-invalid arguments,
    /// or response serialization failures.
    pub async fn handle_tool_call(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        match ToolName::parse(name) {
            Some(ToolName::TfValidate) => self.tf_validate(arguments).await,
            None => Err(ToolError::UnknownTool),
        }
    }

    /// Handles one tf_validate invocation.
    async fn tf_validate(&self, arguments: Value) -> Result<Value, ToolError> {
        if let Some(error) = self.input_schema.iter_errors(&arguments).next() {
            return Err(ToolError::InvalidParams(error.to_string()));
        }
        let request: ValidateRequest = serde_json::from_value(arguments)
            .map_err(|err| ToolError::InvalidParams(err.to_string()))?;
        let report = self.validator.validate_code(&request.code).await;
        serde_json::to_value(report).map_err(|_| ToolError::Serialization)
    }
}

// ============================================================================
// SECTION: Schemas
// ============================================================================

/// JSON schema for tf_validate arguments.
fn validate_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "code": {
                "type": "string",
                "description": "The raw terraform configuration string to validate"
            }
        },
        "required": ["code"],
        "additionalProperties": false
    })
}

/// JSON schema for the tf_validate response payload.
fn validate_output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "is_valid": {
                "type": "boolean",
                "description": "true if the terraform code is valid"
            },
            "report": {
                "type": "string",
                "description": "detailed validation results or error messages"
            }
        },
        "required": ["is_valid", "report"]
    })
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool routing errors.
///
/// # Invariants
/// - Variants are stable for JSON-RPC error code mapping.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool name not recognized.
    #[error("unknown tool")]
    UnknownTool,
    /// Tool arguments rejected by the input schema.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// Tool payload serialization failed.
    #[error("serialization failure")]
    Serialization,
    /// Internal router error.
    #[error("internal error: {0}")]
    Internal(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
