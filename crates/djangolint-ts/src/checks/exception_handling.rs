//! Exception-handling presence check for views.

use djangolint_core::{Issue, RuleCode};
use tree_sitter::Node;

use super::{Check, CheckContext};
use crate::error::CheckError;
use crate::syntax::{self, preorder};

/// Check name.
pub const NAME: &str = "exception-handling";

/// Reports views that contain no `try` statement anywhere in their body.
///
/// Only meaningful for view-like symbols; the traversal decides which
/// definitions reach this check.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExceptionHandlingCheck;

impl ExceptionHandlingCheck {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Returns true if a `try` statement occurs anywhere under `node`.
#[must_use]
pub fn has_exception_handling(node: Node<'_>) -> bool {
    preorder(node).any(|n| n.kind() == "try_statement")
}

impl Check for ExceptionHandlingCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn codes(&self) -> &'static [RuleCode] {
        &[RuleCode::Cdq01]
    }

    fn run(&mut self, cx: &CheckContext<'_>, node: Node<'_>) -> Result<Vec<Issue>, CheckError> {
        if !matches!(node.kind(), "function_definition" | "class_definition") {
            return Ok(Vec::new());
        }
        let body = node
            .child_by_field_name("body")
            .ok_or_else(|| CheckError::missing(node.kind(), "body"))?;
        if has_exception_handling(body) {
            return Ok(Vec::new());
        }

        let name = syntax::field_text(node, "name", cx.src()).unwrap_or_default();
        Ok(vec![
            Issue::new(RuleCode::Cdq01, syntax::header_span(node)).with_param("name", name),
        ])
    }
}
