//! Glint: comment attribution and mutation-call detection.
//!
//! Given one parsed source file (a comment-preserving token stream plus an
//! AST, see [`ParsedSource`]), glint answers two questions:
//! - which declaration or expression does each comment document?
//! - which calls dynamically mutate an attribute or item
//!   (`setattr`, `object.__setattr__`, `x.__setitem__`, ...)?
//!
//! Both answers are merged into one ordered [`Report`].
//!
//! ```ignore
//! let report = glint::analyze_python(source, &AnalysisConfig::default())?;
//! for event in report.matched_mutations() {
//!     println!("{} mutates {:?}", event.callee, event.receiver);
//! }
//! ```

// Analyses
pub mod attach;
pub mod matcher;
pub mod report;

// Configuration and errors
pub mod config;
pub mod error;

// Error bridges - converts provider errors to GlintError
#[cfg(feature = "python")]
mod error_bridges;

pub use glint_core;
#[cfg(feature = "python")]
pub use glint_python;

pub use attach::{attach_comments, AttachRelation, AttachTarget, CommentAttachment};
pub use config::{AnalysisConfig, ArityPolicy, NearMissPolicy};
pub use error::{ConfigError, ErrorCode, GlintError};
pub use glint_core::ParsedSource;
pub use matcher::{MatchReason, MutationEvent, MutationMatcher, PatternTable, QualifiedName};
pub use report::{Report, ReportEntry};

use tracing::debug;

/// Analyze one parsed file.
///
/// # Errors
///
/// - [`GlintError::Input`] when the provider's tree or tokens break the
///   input contract
/// - [`GlintError::Config`] when a custom pattern table is invalid
pub fn analyze(source: &ParsedSource, config: &AnalysisConfig) -> Result<Report, GlintError> {
    source.validate()?;
    let table = config.pattern_table()?;

    let attachments = attach_comments(source);
    let events = MutationMatcher::collect(&source.module, &table, config);
    debug!(
        comments = attachments.len(),
        mutations = events.len(),
        patterns = table.len(),
        "analysis complete"
    );
    Ok(Report::build(attachments, events))
}

/// Parse Python source with the reference provider, then [`analyze`] it.
///
/// # Errors
///
/// [`GlintError::Parse`] when the source does not parse, plus everything
/// [`analyze`] returns.
#[cfg(feature = "python")]
pub fn analyze_python(source: &str, config: &AnalysisConfig) -> Result<Report, GlintError> {
    let parsed = glint_python::parse_module(source)?;
    analyze(&parsed, config)
}
