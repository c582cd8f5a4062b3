//! Error bridge implementations for syntax-provider errors.
//!
//! These bridges live in their own module because they depend on the
//! optional Python provider, which the core analysis never needs.

use glint_python::ParserError;

use crate::error::GlintError;

// ============================================================================
// Bridge: ParserError -> GlintError
// ============================================================================

impl From<ParserError> for GlintError {
    fn from(err: ParserError) -> Self {
        match err.position() {
            Some(position) => GlintError::Parse {
                message: err.message(),
                line: position.line,
                col: position.col,
            },
            None => GlintError::Internal {
                message: err.to_string(),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
