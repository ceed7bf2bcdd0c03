//! Error types for the fraudhound domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! The taxonomy encodes the recovery policy: capability and tool failures
//! are recoverable (the loop degrades and keeps converging toward a
//! synthesized answer); only an invalid input corpus or a genuinely
//! unhandled loop error is fatal to an investigation.

use thiserror::Error;

/// The top-level error type for all fraudhound operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- External capability errors (reasoning / classification) ---
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Engine errors ---
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures from the consumed reasoning / classification capabilities.
#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unusable response: {0}")]
    InvalidResponse(String),

    #[error("Capability not configured: {0}")]
    NotConfigured(String),
}

/// Failures from investigation tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not registered: {0}")]
    NotRegistered(String),

    #[error("Tool execution failed: {tool} — {reason}")]
    ExecutionFailed { tool: String, reason: String },

    #[error("Tool timed out: {tool} after {timeout_secs}s")]
    Timeout { tool: String, timeout_secs: u64 },

    #[error("Invalid tool input: {0}")]
    InvalidInput(String),
}

/// Errors raised by the loop controller and investigation service.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid document corpus: {0}")]
    InvalidCorpus(String),

    #[error("Execution not found: {0}")]
    ExecutionNotFound(String),

    #[error("Investigation cancelled: {0}")]
    Cancelled(String),

    #[error("Internal loop error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_error_displays_correctly() {
        let err = Error::Capability(CapabilityError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::ExecutionFailed {
            tool: "validate_quantity_consistency".into(),
            reason: "no numeric fields found".into(),
        });
        assert!(err.to_string().contains("validate_quantity_consistency"));
        assert!(err.to_string().contains("numeric fields"));
    }

    #[test]
    fn engine_error_wraps_into_top_level() {
        let err: Error = EngineError::InvalidCorpus("no documents provided".into()).into();
        assert!(err.to_string().contains("no documents"));
    }
}
