//! View complexity scoring.
//!
//! # Scoring
//!
//! Two metrics are measured once per definition:
//!
//! - `line_count`: physical lines from the definition header to its last line
//! - `operation_count`: assignments, calls, branches, loops, `try`, `with`,
//!   `return` and `raise` statements, nested bodies included
//!
//! Each metric contributes `(value / threshold) * 50` once it exceeds its
//! threshold and nothing below it. The sum is capped at 100.
//!
//! | Score     | Level    | Issue                |
//! |-----------|----------|----------------------|
//! | `< 40`    | Simple   | none                 |
//! | `40..75`  | Moderate | CMP01, information   |
//! | `>= 75`   | Complex  | CMP01, warning       |

use djangolint_core::{ComplexityConventions, Issue, RuleCode, Severity};
use tree_sitter::Node;

use super::{Check, CheckContext};
use crate::error::CheckError;
use crate::syntax::{self, named_children};

/// Check name.
pub const NAME: &str = "complexity";

/// Upper bound of the combined score.
pub const MAX_SCORE: f64 = 100.0;

const MODERATE: f64 = 40.0;
const COMPLEX: f64 = 75.0;

const MODERATE_TEMPLATE: &str = concat!(
    "\"{name}\" is moderately complex with {line_count} lines and {operation_count} operations.\n\n",
    "Consider keeping an eye on its growth and moving business logic into models or services.",
);

/// Complexity band of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Below the moderate threshold.
    Simple,
    /// Worth keeping an eye on.
    Moderate,
    /// Should be split up.
    Complex,
}

/// Raw metrics and the resulting score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complexity {
    /// Physical lines covered by the definition.
    pub line_count: usize,
    /// Counted statements.
    pub operation_count: usize,
    /// Combined score in `0..=100`.
    pub score: f64,
}

impl Complexity {
    /// Band for this score.
    #[must_use]
    pub fn level(&self) -> Level {
        if self.score >= COMPLEX {
            Level::Complex
        } else if self.score >= MODERATE {
            Level::Moderate
        } else {
            Level::Simple
        }
    }
}

/// Scores view functions and classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityScorer {
    thresholds: ComplexityConventions,
}

impl ComplexityScorer {
    /// Creates a scorer with the given thresholds.
    #[must_use]
    pub fn new(thresholds: ComplexityConventions) -> Self {
        Self { thresholds }
    }

    /// Combined score for the given metrics.
    #[must_use]
    pub fn score(&self, line_count: usize, operation_count: usize) -> f64 {
        let lines = sub_score(line_count, self.thresholds.line_threshold);
        let operations = sub_score(operation_count, self.thresholds.operation_threshold);
        (lines + operations).min(MAX_SCORE)
    }

    /// Measures a function or class definition.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::MissingField`] if the definition has no body.
    pub fn measure(&self, def: Node<'_>) -> Result<Complexity, CheckError> {
        let body = def
            .child_by_field_name("body")
            .ok_or_else(|| CheckError::missing(def.kind(), "body"))?;
        let line_count = def.end_position().row - def.start_position().row + 1;
        let operation_count = count_operations(body);
        Ok(Complexity {
            line_count,
            operation_count,
            score: self.score(line_count, operation_count),
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn sub_score(value: usize, threshold: usize) -> f64 {
    let threshold = threshold.max(1);
    if value > threshold {
        (value as f64 / threshold as f64) * (MAX_SCORE / 2.0)
    } else {
        0.0
    }
}

/// Counts operations in a block, descending into every nested body.
fn count_operations(block: Node<'_>) -> usize {
    named_children(block).into_iter().map(count_statement).sum()
}

fn count_statement(stmt: Node<'_>) -> usize {
    let body = |node: Node<'_>, field: &str| {
        node.child_by_field_name(field).map_or(0, count_operations)
    };

    match stmt.kind() {
        "expression_statement" => named_children(stmt)
            .into_iter()
            .filter(|expr| {
                (expr.kind() == "assignment" && expr.child_by_field_name("type").is_none())
                    || expr.kind() == "call"
            })
            .count(),
        "return_statement" | "raise_statement" => 1,
        "with_statement" => 1 + body(stmt, "body"),
        "if_statement" => {
            let branches: usize = stmt
                .children_by_field_name("alternative", &mut stmt.walk())
                .map(|branch| match branch.kind() {
                    "elif_clause" => 1 + body(branch, "consequence"),
                    _ => body(branch, "body"),
                })
                .sum();
            1 + body(stmt, "consequence") + branches
        }
        "for_statement" | "while_statement" => {
            let orelse = stmt
                .child_by_field_name("alternative")
                .map_or(0, |branch| body(branch, "body"));
            1 + body(stmt, "body") + orelse
        }
        "try_statement" => {
            let handlers: usize = named_children(stmt)
                .into_iter()
                .map(|clause| match clause.kind() {
                    "except_clause" | "except_group_clause" => named_children(clause)
                        .into_iter()
                        .filter(|child| child.kind() == "block")
                        .map(count_operations)
                        .sum(),
                    "else_clause" => body(clause, "body"),
                    _ => 0,
                })
                .sum();
            1 + body(stmt, "body") + handlers
        }
        "function_definition" | "class_definition" => body(stmt, "body"),
        "decorated_definition" => stmt
            .child_by_field_name("definition")
            .map_or(0, |def| body(def, "body")),
        _ => 0,
    }
}

impl Check for ComplexityScorer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn codes(&self) -> &'static [RuleCode] {
        &[RuleCode::Cmp01]
    }

    fn run(&mut self, cx: &CheckContext<'_>, node: Node<'_>) -> Result<Vec<Issue>, CheckError> {
        let complexity = self.measure(node)?;
        let name = syntax::field_text(node, "name", cx.src()).unwrap_or_default();
        let issue = Issue::new(RuleCode::Cmp01, syntax::header_span(node));

        let issue = match complexity.level() {
            Level::Simple => return Ok(Vec::new()),
            Level::Moderate => issue
                .with_severity(Severity::Information)
                .with_template(MODERATE_TEMPLATE),
            Level::Complex => issue.with_severity(Severity::Warning),
        };
        Ok(vec![issue
            .with_param("name", name)
            .with_param("line_count", complexity.line_count)
            .with_param("operation_count", complexity.operation_count)
            .with_param("score", format!("{:.1}", complexity.score))])
    }
}
