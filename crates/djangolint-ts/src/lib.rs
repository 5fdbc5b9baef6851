//! # djangolint-ts
//!
//! Tree-sitter based Django convention and security analyzer.
//!
//! Parses one Python file with the Tree-sitter Python grammar and runs the
//! djangolint checks over it in a single pre-order walk:
//!
//! - [`classifier`] decides whether a class or function is a view or model
//! - [`checks`] holds the independent rule checks
//! - [`Analyzer`] coordinates them and returns [`Diagnostic`]s in traversal order
//!
//! ## Example
//!
//! ```
//! use djangolint_core::{Conventions, RuleCode, Settings};
//! use std::path::Path;
//!
//! let source = "SECURE_HSTS_SECONDS = 0\nSECURE_HSTS_INCLUDE_SUBDOMAINS = True\n";
//! let diagnostics = djangolint_ts::analyze(
//!     Path::new("settings.py"),
//!     source,
//!     &Conventions::default(),
//!     &Settings::default(),
//! )
//! .unwrap();
//!
//! let codes: Vec<RuleCode> = diagnostics.iter().map(|d| d.issue_code).collect();
//! assert_eq!(codes, vec![RuleCode::Sec10, RuleCode::Sec11]);
//! ```
//!
//! [`Diagnostic`]: djangolint_core::Diagnostic

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod checks;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod literal;
pub mod syntax;

pub use engine::{analyze, Analyzer};
pub use error::{AnalyzeError, CheckError};
