//! Model field convention check.
//!
//! # Detected Patterns
//!
//! - `ForeignKey(...)` without `related_name`
//! - `ForeignKey(...)` without `on_delete`
//! - `CharField(null=True)` / `TextField(null=True)`
//!
//! The field constructor is matched by name, qualified (`models.ForeignKey`)
//! or bare.

use djangolint_core::{Issue, RuleCode, Severity};
use tree_sitter::Node;

use super::{Check, CheckContext};
use crate::error::CheckError;
use crate::syntax;

/// Check name.
pub const NAME: &str = "model-fields";

const FOREIGN_KEY: &str = "ForeignKey";
const TEXT_FIELDS: &[&str] = &["CharField", "TextField"];

const MISSING_RELATED_NAME: &str = "ModelFieldIssue: ForeignKey '{field}' is missing 'related_name'. It is recommended to always define 'related_name' for better reverse access.";
const MISSING_ON_DELETE: &str = "ModelFieldIssue: ForeignKey '{field}' is missing 'on_delete'. It is strongly recommended to always define 'on_delete' for better data integrity.";
const NULLABLE_TEXT: &str = "ModelFieldIssue: CharField/TextField '{field}' uses null=True. Use blank=True instead to avoid NULL values. Django stores empty strings for text fields, keeping queries and validation simpler.";

/// Flags model field declarations that break common conventions.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelFieldCheck;

impl ModelFieldCheck {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Check for ModelFieldCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn codes(&self) -> &'static [RuleCode] {
        &[RuleCode::Cdq11]
    }

    fn run(&mut self, cx: &CheckContext<'_>, node: Node<'_>) -> Result<Vec<Issue>, CheckError> {
        if node.kind() != "assignment" {
            return Ok(Vec::new());
        }
        let src = cx.src();
        let parts = syntax::assignment_parts(node);
        let Some(call) = parts.value.filter(|v| v.kind() == "call") else {
            return Ok(Vec::new());
        };
        let Some(target) = parts.targets.first().copied() else {
            return Ok(Vec::new());
        };

        let function = call
            .child_by_field_name("function")
            .ok_or_else(|| CheckError::missing("call", "function"))?;
        let Some(constructor) = callee_name(function, src) else {
            return Ok(Vec::new());
        };
        let arguments = call
            .child_by_field_name("arguments")
            .ok_or_else(|| CheckError::missing("call", "arguments"))?;
        let keywords = keyword_arguments(arguments, src);

        let field = syntax::text(target, src);
        let span = syntax::span_of(target);
        let issue = |template: &'static str| {
            Issue::new(RuleCode::Cdq11, span)
                .with_template(template)
                .with_param("field", field)
        };

        let mut issues = Vec::new();
        if constructor == FOREIGN_KEY {
            if !keywords.iter().any(|(name, _)| *name == "related_name") {
                issues.push(issue(MISSING_RELATED_NAME));
            }
            if !keywords.iter().any(|(name, _)| *name == "on_delete") {
                issues.push(issue(MISSING_ON_DELETE));
            }
        } else if TEXT_FIELDS.contains(&constructor) {
            let nullable = keywords
                .iter()
                .any(|(name, value)| *name == "null" && value.kind() == "true");
            if nullable {
                issues.push(issue(NULLABLE_TEXT).with_severity(Severity::Information));
            }
        }
        Ok(issues)
    }
}

fn callee_name<'a>(function: Node<'_>, src: &'a str) -> Option<&'a str> {
    match function.kind() {
        "identifier" => Some(syntax::text(function, src)),
        "attribute" => syntax::field_text(function, "attribute", src),
        _ => None,
    }
}

fn keyword_arguments<'a, 'tree>(
    arguments: Node<'tree>,
    src: &'a str,
) -> Vec<(&'a str, Node<'tree>)> {
    syntax::named_children(arguments)
        .into_iter()
        .filter(|arg| arg.kind() == "keyword_argument")
        .filter_map(|arg| {
            let name = syntax::field_text(arg, "name", src)?;
            let value = arg.child_by_field_name("value")?;
            Some((name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::Snippet;

    fn run(src: &'static str) -> Vec<Issue> {
        let snippet = Snippet::new(src);
        let file = snippet.file();
        let cx = CheckContext::new(&file, snippet.tree.root_node());
        ModelFieldCheck::new()
            .run(&cx, snippet.first("assignment"))
            .unwrap()
    }

    #[test]
    fn foreign_key_missing_both_arguments() {
        let issues = run("class Order(models.Model):\n    customer = models.ForeignKey(Customer)\n");
        assert_eq!(issues.len(), 2);
        assert!(issues[0].message().contains("'related_name'"));
        assert!(issues[1].message().contains("'on_delete'"));
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
        assert_eq!(issues[0].param("field"), Some("customer"));
        assert_eq!(issues[0].span.line, 2);
    }

    #[test]
    fn complete_foreign_key_is_clean() {
        let issues = run(
            "customer = models.ForeignKey(Customer, on_delete=models.CASCADE, related_name='orders')\n",
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn bare_foreign_key_missing_related_name() {
        let issues = run("customer = ForeignKey(Customer, on_delete=CASCADE)\n");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message().contains("related_name"));
    }

    #[test]
    fn nullable_text_field_is_information() {
        let issues = run("title = models.CharField(max_length=10, null=True)\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Information);
        assert!(issues[0].message().contains("blank=True"));

        assert!(run("title = models.TextField(null=False, blank=True)\n").is_empty());
    }

    #[test]
    fn unrelated_calls_are_ignored() {
        assert!(run("total = compute(1, 2)\n").is_empty());
        assert!(run("name = 'x'\n").is_empty());
    }
}
