//! Error types and error codes for glint.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid input (malformed AST or token stream from the provider)
//! - `3`: Invalid configuration (bad JSON, bad callee shape, duplicate id)
//! - `4`: Parse error (the reference Python provider rejected the source)
//! - `10`: Internal errors
//!
//! ## Design
//!
//! - **Unified type**: `GlintError` is what the analysis entry points return
//! - **Bridging**: `impl From<X> for GlintError` bridges crate-level errors
//! - **Code mapping**: `ErrorCode` provides stable integer codes

use std::fmt;

use glint_core::AnalysisError;
use thiserror::Error;

// ============================================================================
// Error Codes
// ============================================================================

/// Stable numeric codes for callers that surface errors as exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// The provider handed over malformed input.
    InvalidInput = 2,
    /// The analysis configuration is invalid.
    InvalidConfig = 3,
    /// The source text did not parse.
    ParseError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl ErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors raised while loading analysis configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid callee shape '{shape}': {reason}")]
    InvalidShape { shape: String, reason: String },

    #[error("duplicate pattern id '{id}'")]
    DuplicatePatternId { id: String },

    #[error("invalid configuration: {message}")]
    Json { message: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum GlintError {
    #[error(transparent)]
    Input(#[from] AnalysisError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The source text did not parse. Only produced by the Python entry point.
    #[error("parse error at {line}:{col}: {message}")]
    Parse { message: String, line: u32, col: u32 },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<&GlintError> for ErrorCode {
    fn from(err: &GlintError) -> Self {
        match err {
            GlintError::Input(_) => ErrorCode::InvalidInput,
            GlintError::Config(_) => ErrorCode::InvalidConfig,
            GlintError::Parse { .. } => ErrorCode::ParseError,
            GlintError::Internal { .. } => ErrorCode::InternalError,
        }
    }
}

impl From<GlintError> for ErrorCode {
    fn from(err: GlintError) -> Self {
        ErrorCode::from(&err)
    }
}

impl From<serde_json::Error> for GlintError {
    fn from(err: serde_json::Error) -> Self {
        GlintError::Internal {
            message: format!("serialization failed: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{NodeId, SourceSpan};

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::InvalidInput.code(), 2);
        assert_eq!(ErrorCode::InvalidConfig.code(), 3);
        assert_eq!(ErrorCode::ParseError.code(), 4);
        assert_eq!(ErrorCode::InternalError.to_string(), "10");
    }

    #[test]
    fn analysis_error_converts() {
        let err = GlintError::from(AnalysisError::invalid_node(
            NodeId(3),
            SourceSpan::new(1, 1, 9, 1),
            "span reaches outside the file",
        ));
        assert_eq!(ErrorCode::from(&err), ErrorCode::InvalidInput);
        assert!(err.to_string().contains("node 3"));
    }

    #[test]
    fn config_error_converts() {
        let err = GlintError::from(ConfigError::DuplicatePatternId {
            id: "setattr".to_string(),
        });
        assert_eq!(ErrorCode::from(err), ErrorCode::InvalidConfig);
    }
}
