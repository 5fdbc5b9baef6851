//! Redundant queryset method chain check.
//!
//! # Detected Patterns
//!
//! | Chain                 | Replacement    |
//! |-----------------------|----------------|
//! | `.all().count()`      | `.count()`     |
//! | `.filter(..).all()`   | `.filter(..)`  |
//! | `.all().filter(..)`   | `.filter(..)`  |
//!
//! Only chains of exactly two method calls on a non-call receiver match, so
//! `Customer.objects.all().count()` is reported while a longer chain is only
//! reported through its inner two-call part.

use std::collections::VecDeque;

use djangolint_core::{FileContext, Issue, Replacement, RuleCode, Span, Suggestion};
use tree_sitter::Node;

use super::{Check, CheckContext};
use crate::error::CheckError;
use crate::syntax;

/// Check name.
pub const NAME: &str = "redundant-query";

/// Which call of a matched pair survives the rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keep {
    Outer,
    Inner,
}

/// Redundant pairs as `(outer, inner)` method names.
const PATTERNS: &[(&str, &str, &str, Keep)] = &[
    ("count", "all", "count()", Keep::Outer),
    ("all", "filter", "filter()", Keep::Inner),
    ("filter", "all", "filter()", Keep::Outer),
];

/// Finds the first redundant queryset chain inside a function.
#[derive(Debug, Default, Clone, Copy)]
pub struct RedundantQueryCheck;

impl RedundantQueryCheck {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for RedundantQueryCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn codes(&self) -> &'static [RuleCode] {
        &[RuleCode::Cdq14]
    }

    fn run(&mut self, cx: &CheckContext<'_>, node: Node<'_>) -> Result<Vec<Issue>, CheckError> {
        let mut queue = VecDeque::from([node]);
        while let Some(current) = queue.pop_front() {
            if current.kind() == "call" {
                if let Some(issue) = match_chain(cx, current)? {
                    return Ok(vec![issue]);
                }
            }
            let mut cursor = current.walk();
            queue.extend(current.children(&mut cursor));
        }
        Ok(Vec::new())
    }
}

/// One `.method(...)` application: the call node and its method name node.
struct Link<'tree> {
    call: Node<'tree>,
    method: Node<'tree>,
}

/// Method calls from `call` inward, outermost first.
fn method_chain(call: Node<'_>) -> Result<Vec<Link<'_>>, CheckError> {
    let mut chain = Vec::new();
    let mut current = call;
    while current.kind() == "call" {
        let Some(function) = current
            .child_by_field_name("function")
            .filter(|f| f.kind() == "attribute")
        else {
            break;
        };
        let method = function
            .child_by_field_name("attribute")
            .ok_or_else(|| CheckError::missing("attribute", "attribute"))?;
        chain.push(Link {
            call: current,
            method,
        });
        current = function
            .child_by_field_name("object")
            .ok_or_else(|| CheckError::missing("attribute", "object"))?;
    }
    Ok(chain)
}

fn match_chain(cx: &CheckContext<'_>, call: Node<'_>) -> Result<Option<Issue>, CheckError> {
    let src = cx.src();
    let chain = method_chain(call)?;
    let [outer, inner] = chain.as_slice() else {
        return Ok(None);
    };
    let names = (syntax::text(outer.method, src), syntax::text(inner.method, src));
    let Some(&(_, _, simplified, keep)) = PATTERNS
        .iter()
        .find(|(o, i, _, _)| (*o, *i) == names)
    else {
        return Ok(None);
    };

    let kept = match keep {
        Keep::Outer => outer,
        Keep::Inner => inner,
    };
    let redundant = src
        .get(inner.method.start_byte()..outer.call.end_byte())
        .unwrap_or_default();
    let replacement = src
        .get(kept.method.start_byte()..kept.call.end_byte())
        .unwrap_or_default();

    let first = syntax::line_of(call);
    let last = call.end_position().row + 1;
    let original = cx
        .file
        .lines(first, last)
        .ok_or(CheckError::LineOutOfRange(last))?;
    let fixed = original.replacen(redundant, replacement, 1);

    let raw_chain = format!("{}.{}", names.1, names.0);
    let issue = Issue::new(RuleCode::Cdq14, syntax::span_of(call))
        .with_param("chain", &raw_chain)
        .with_param("method_chain", format!("{}().{}()", names.1, names.0))
        .with_param("simplified_chain", simplified)
        .with_param("fixed_text", fixed);
    Ok(Some(issue))
}

/// Builds the whole-line fix carried by a redundant chain issue.
#[must_use]
pub fn suggestion(file: &FileContext<'_>, issue: &Issue) -> Option<Suggestion> {
    let fixed = issue.param("fixed_text")?;
    let simplified = issue.param("simplified_chain")?;
    let last = issue.span.end_line.unwrap_or(issue.span.line);
    let span = Span::new(issue.span.line, 0).with_end(last, file.line_len(last));
    Some(Suggestion::with_fix(
        format!("Replace with `{simplified}`"),
        Replacement::new(span, fixed),
    ))
}
