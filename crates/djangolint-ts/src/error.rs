//! Error types for the analysis engine.

use tree_sitter::LanguageError;

/// A file that could not be analysed at all.
///
/// Distinct from an empty diagnostic list, which means the file is clean.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// The Python grammar could not be loaded into the parser.
    #[error("Failed to load Python grammar: {0}")]
    Language(#[from] LanguageError),

    /// The source contains a syntax error.
    #[error("Syntax error at {line}:{column}: {message}")]
    Parse {
        /// Line of the first error (1-indexed).
        line: usize,
        /// Column of the first error (0-indexed).
        column: usize,
        /// Short description.
        message: String,
    },
}

/// A failure inside one check for one node.
///
/// The traversal logs it and treats the check as having found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// A node lacked a field the grammar normally provides.
    #[error("{kind} node has no `{field}` field")]
    MissingField {
        /// Kind of the node being inspected.
        kind: &'static str,
        /// Field that was expected.
        field: &'static str,
    },

    /// A position pointed outside the source text.
    #[error("line {0} is outside the source")]
    LineOutOfRange(usize),
}

impl CheckError {
    /// Shorthand for [`CheckError::MissingField`].
    #[must_use]
    pub fn missing(kind: &'static str, field: &'static str) -> Self {
        Self::MissingField { kind, field }
    }
}
