//! # djangolint-core
//!
//! Parser-agnostic model for the djangolint static analyzer.
//!
//! This crate provides the value types every other djangolint crate speaks:
//!
//! - [`Issue`] for the internal, pre-formatting form of a detected violation
//! - [`Diagnostic`] for the positioned, file-scoped projection of an issue
//! - [`RuleCode`] for the closed catalog of rules and their metadata
//! - [`Config`], [`Conventions`] and [`Settings`] for user configuration
//! - [`FileContext`] for the source text of the file under analysis
//!
//! ## Example
//!
//! ```
//! use djangolint_core::{Issue, RuleCode, Span};
//!
//! let issue = Issue::new(RuleCode::Sec01, Span::new(1, 0));
//! assert_eq!(issue.severity, djangolint_core::Severity::Warning);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod rule;
mod types;

pub use config::{
    AnalyzerConfig, BooleanConventions, CheckToggles, ComplexityConventions, Config, ConfigError,
    Conventions, ExpressiveNames, FunctionNaming, GeneralSettings, NameLengthConvention,
    Settings,
};
pub use context::FileContext;
pub use rule::RuleCode;
pub use types::{
    Diagnostic, FileReport, Issue, LintResult, Replacement, SemanticKind, Severity, Span,
    Suggestion, Symbol,
};
