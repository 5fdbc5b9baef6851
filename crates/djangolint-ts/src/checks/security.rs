//! Security settings and raw SQL checks.
//!
//! # Detected Patterns
//!
//! - Insecure values for well-known settings assigned at module level
//!   (`DEBUG`, `SECRET_KEY`, `ALLOWED_HOSTS`, cookie and SSL flags,
//!   `X_FRAME_OPTIONS`, the HSTS pair)
//! - `<queryset>.raw(...)` calls inside class bodies, methods included
//! - `connection.cursor()` calls in the same places, when enabled
//!
//! Settings rules fire at most once per code for one file. The HSTS rules
//! look up the other half of the pair wherever it is assigned.

use std::collections::HashSet;
use std::sync::OnceLock;

use djangolint_core::{Issue, RuleCode, Span};
use regex::Regex;
use tree_sitter::Node;

use super::{Check, CheckContext};
use crate::error::CheckError;
use crate::literal::{self, PyLiteral};
use crate::syntax::{self, preorder};

/// Check name.
pub const NAME: &str = "security";

const CODES: &[RuleCode] = &[
    RuleCode::Sec01,
    RuleCode::Sec02,
    RuleCode::Sec03,
    RuleCode::Sec04,
    RuleCode::Sec05,
    RuleCode::Sec06,
    RuleCode::Sec07,
    RuleCode::Sec08,
    RuleCode::Sec09,
    RuleCode::Sec10,
    RuleCode::Sec11,
    RuleCode::Sec12,
    RuleCode::Sec13,
    RuleCode::Sec14,
];

const CLICKJACKING_MIDDLEWARE: &str = "django.middleware.clickjacking.XFrameOptionsMiddleware";
const FRAME_OPTIONS: &[&str] = &["deny", "sameorigin"];
const HSTS_SECONDS: &str = "SECURE_HSTS_SECONDS";
const HSTS_SUBDOMAINS: &str = "SECURE_HSTS_INCLUDE_SUBDOMAINS";

static ENV_LOOKUP: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::unwrap_used)]
fn env_lookup() -> &'static Regex {
    ENV_LOOKUP.get_or_init(|| {
        Regex::new(
            r"os\.environ(\[|\.)|os\.getenv\(|config\(|env\(|dotenv\.get_key\(|env\.str\(|django_environ\.Env\(",
        )
        .unwrap()
    })
}

/// Flags insecure settings and raw SQL access.
///
/// Holds per-file state; create a new instance for every file.
#[derive(Debug)]
pub struct SecurityCheck {
    flag_cursor: bool,
    emitted: HashSet<RuleCode>,
    seen_calls: HashSet<(usize, usize)>,
}

impl Default for SecurityCheck {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SecurityCheck {
    /// Creates the check. `flag_cursor` enables `connection.cursor()` reports.
    #[must_use]
    pub fn new(flag_cursor: bool) -> Self {
        Self {
            flag_cursor,
            emitted: HashSet::new(),
            seen_calls: HashSet::new(),
        }
    }

    fn once(&mut self, issue: Issue) -> Option<Issue> {
        self.emitted.insert(issue.code).then_some(issue)
    }

    fn check_assignment(
        &mut self,
        cx: &CheckContext<'_>,
        node: Node<'_>,
    ) -> Result<Vec<Issue>, CheckError> {
        if !syntax::is_module_scope(node) {
            return Ok(Vec::new());
        }
        let parts = syntax::assignment_parts(node);
        let Some(value) = parts.value else {
            return Ok(Vec::new());
        };

        let src = cx.src();
        let mut found = Vec::new();
        for target in parts.targets {
            let name = syntax::text(target, src);
            let span = syntax::span_of(target);
            found.extend(setting_issues(cx, name, value, span));
        }
        Ok(found.into_iter().filter_map(|issue| self.once(issue)).collect())
    }

    fn check_raw_sql(
        &mut self,
        cx: &CheckContext<'_>,
        node: Node<'_>,
    ) -> Result<Vec<Issue>, CheckError> {
        let src = cx.src();
        let mut issues = Vec::new();

        for call in preorder(node).filter(|n| n.kind() == "call") {
            let start = call.start_position();
            if !self.seen_calls.insert((start.row, start.column)) {
                continue;
            }
            let Some(function) = call.child_by_field_name("function") else {
                continue;
            };
            if function.kind() != "attribute" {
                continue;
            }
            let attr = syntax::field_text(function, "attribute", src)
                .ok_or_else(|| CheckError::missing("attribute", "attribute"))?;
            let object = function
                .child_by_field_name("object")
                .ok_or_else(|| CheckError::missing("attribute", "object"))?;

            if attr == "raw" {
                issues.push(Issue::new(RuleCode::Sec13, syntax::span_of(call)));
            } else if self.flag_cursor
                && attr == "cursor"
                && object.kind() == "identifier"
                && syntax::text(object, src) == "connection"
            {
                issues.push(Issue::new(RuleCode::Sec14, syntax::span_of(call)));
            }
        }
        Ok(issues)
    }
}

impl Check for SecurityCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn codes(&self) -> &'static [RuleCode] {
        CODES
    }

    fn run(&mut self, cx: &CheckContext<'_>, node: Node<'_>) -> Result<Vec<Issue>, CheckError> {
        match node.kind() {
            "assignment" => self.check_assignment(cx, node),
            "class_definition" => self.check_raw_sql(cx, node),
            _ => Ok(Vec::new()),
        }
    }
}

fn setting_issues(cx: &CheckContext<'_>, name: &str, value: Node<'_>, span: Span) -> Vec<Issue> {
    let src = cx.src();
    let raw = syntax::text(value, src).trim();
    let issue = |code| Issue::new(code, span);

    match name {
        "DEBUG" if raw.eq_ignore_ascii_case("true") => vec![issue(RuleCode::Sec01)],
        "SECRET_KEY" if !env_lookup().is_match(raw) => vec![issue(RuleCode::Sec02)],
        "ALLOWED_HOSTS" => match literal::evaluate(value, src) {
            Some(hosts) => {
                let mut issues = Vec::new();
                if hosts.elements().is_some_and(<[PyLiteral]>::is_empty) {
                    issues.push(issue(RuleCode::Sec03));
                }
                if hosts.contains_str("*") {
                    issues.push(issue(RuleCode::Sec04));
                }
                issues
            }
            None => Vec::new(),
        },
        "CSRF_COOKIE_SECURE" if raw == "False" => vec![issue(RuleCode::Sec05)],
        "SESSION_COOKIE_SECURE" if raw == "False" => vec![issue(RuleCode::Sec06)],
        "SECURE_SSL_REDIRECT" if raw.eq_ignore_ascii_case("false") => {
            vec![issue(RuleCode::Sec07)]
        }
        "X_FRAME_OPTIONS" => frame_options_issues(cx, value, span),
        HSTS_SECONDS | HSTS_SUBDOMAINS => hsts_issues(cx),
        _ => Vec::new(),
    }
}

fn frame_options_issues(cx: &CheckContext<'_>, value: Node<'_>, span: Span) -> Vec<Issue> {
    let mut issues = Vec::new();
    let valid = literal::evaluate(value, cx.src())
        .as_ref()
        .and_then(PyLiteral::as_str)
        .is_some_and(|v| FRAME_OPTIONS.contains(&v.trim().to_ascii_lowercase().as_str()));
    if !valid {
        issues.push(Issue::new(RuleCode::Sec08, span));
    }

    if let Some((Some(middleware), _)) = setting_value(cx, "MIDDLEWARE") {
        let listed = middleware.elements().is_some_and(|items| !items.is_empty());
        if listed && !middleware.contains_str(CLICKJACKING_MIDDLEWARE) {
            issues.push(Issue::new(RuleCode::Sec09, span));
        }
    }
    issues
}

fn hsts_issues(cx: &CheckContext<'_>) -> Vec<Issue> {
    let seconds = setting_value(cx, HSTS_SECONDS);
    let subdomains = setting_value(cx, HSTS_SUBDOMAINS);

    let seconds_zero = seconds
        .as_ref()
        .and_then(|(value, _)| value.as_ref())
        .is_some_and(PyLiteral::equals_zero);

    let mut issues = Vec::new();
    if let Some((_, span)) = seconds.as_ref().filter(|_| seconds_zero) {
        issues.push(Issue::new(RuleCode::Sec10, *span));
    }
    if let Some((Some(flag), span)) = &subdomains {
        if seconds_zero && flag.is_true() {
            issues.push(Issue::new(RuleCode::Sec11, *span));
        } else if !seconds_zero && flag.is_false() {
            issues.push(Issue::new(RuleCode::Sec12, *span));
        }
    }
    issues
}

/// First module-level assignment to `name`: its literal value, if any, and
/// the span of the target.
fn setting_value(cx: &CheckContext<'_>, name: &str) -> Option<(Option<PyLiteral>, Span)> {
    let src = cx.src();
    preorder(cx.root)
        .filter(|n| syntax::is_outer_assignment(*n) && syntax::is_module_scope(*n))
        .find_map(|assignment| {
            let parts = syntax::assignment_parts(assignment);
            let target = parts
                .targets
                .iter()
                .find(|t| syntax::text(**t, src) == name)?;
            let value = parts.value.and_then(|v| literal::evaluate(v, src));
            Some((value, syntax::span_of(*target)))
        })
}
