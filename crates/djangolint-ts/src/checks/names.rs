//! Naming conventions for variables, functions and dict keys.
//!
//! Each name is checked against the configured conventions in a fixed order
//! and only the first violation is reported.
//!
//! # Configuration
//!
//! - `expressiveNames.*.avoidShortNames`: minimum length per category
//! - `expressiveNames.functions.functionLengthLimit`: maximum top-level statements in the body
//! - `boolean.usePrefix` / `boolean.positiveNaming`: boolean naming
//! - `settings.general.prefixes`: accepted boolean prefixes

use djangolint_core::{Conventions, Issue, RuleCode, Settings, Span};
use tree_sitter::Node;

use super::{Check, CheckContext};
use crate::error::CheckError;
use crate::literal::{self, PyLiteral};
use crate::syntax::{self, named_children};

/// Check name.
pub const NAME: &str = "names";

const CODES: &[RuleCode] = &[
    RuleCode::Cdq02,
    RuleCode::Cdq03,
    RuleCode::Cdq04,
    RuleCode::Sty01,
    RuleCode::Sty02,
    RuleCode::Sty03,
    RuleCode::Sty04,
];

const VARIABLE_TOO_SHORT: &str = "Variable name '{name}' is too short.";
const FUNCTION_TOO_SHORT: &str = "Function name '{name}' is too short.";
const KEY_TOO_SHORT: &str = "Object key '{name}' is too short.";

/// Setting-like names that are exempt from variable rules.
const IGNORED_VARIABLES: &[&str] = &[
    "ID",
    "PK",
    "DEBUG",
    "USE_I18N",
    "USE_L10N",
    "USE_TZ",
    "CSRF_COOKIE_SECURE",
    "SESSION_COOKIE_SECURE",
    "SECURE_SSL_REDIRECT",
    "SECURE_HSTS_INCLUDE_SUBDOMAINS",
];

/// Framework hooks and entry points whose names are fixed.
const RESERVED_FUNCTIONS: &[&str] = &[
    "main",
    "save",
    "delete",
    "clean",
    "create",
    "update",
    "validate",
    "get",
    "post",
    "put",
    "patch",
    "get_queryset",
    "get_context_data",
    "get_absolute_url",
    "perform_create",
];

const PYTHON_RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield", "abs", "all", "any", "bool", "bytes", "dict", "dir",
    "filter", "float", "format", "hash", "id", "input", "int", "iter", "len", "list", "map",
    "max", "min", "next", "object", "open", "ord", "print", "range", "repr", "round", "set",
    "sorted", "str", "sum", "super", "tuple", "type", "vars", "zip",
];

const NEGATIVE_PREFIXES: &[&str] = &["not_", "never_", "no_"];

/// Accepted leading verbs for function names.
const VERBS: &[&str] = &[
    "accept", "access", "activate", "add", "aggregate", "allow", "annotate", "append", "apply",
    "approve", "archive", "assert", "assign", "attach", "authenticate", "authorize", "build",
    "calculate", "call", "cancel", "check", "clean", "clear", "close", "collect", "compare",
    "compute", "configure", "confirm", "connect", "convert", "copy", "count", "create",
    "deactivate", "decode", "delete", "deny", "deserialize", "destroy", "detect", "disable",
    "dispatch", "display", "download", "dump", "edit", "enable", "encode", "ensure", "enqueue",
    "execute", "export", "extract", "fetch", "filter", "find", "finish", "flush", "format",
    "generate", "get", "group", "handle", "has", "import", "increment", "index", "init",
    "initialize", "insert", "invalidate", "is", "iterate", "join", "list", "load", "lock",
    "log", "make", "map", "mark", "merge", "migrate", "move", "normalize", "notify", "open",
    "order", "paginate", "parse", "patch", "perform", "persist", "populate", "post", "prepare",
    "process", "publish", "pull", "push", "put", "query", "queue", "read", "receive",
    "record", "refresh", "register", "reject", "reload", "remove", "render", "replace",
    "report", "request", "reset", "resolve", "restore", "retrieve", "retry", "return", "run",
    "save", "schedule", "search", "send", "serialize", "set", "setup", "should", "show",
    "sort", "split", "start", "stop", "store", "submit", "subscribe", "sync", "test",
    "toggle", "track", "transform", "trigger", "unlock", "update", "upload", "upsert",
    "validate", "verify", "view", "write",
];

/// Applies naming conventions to the symbols of one file.
#[derive(Debug, Clone, Default)]
pub struct NameValidator {
    conventions: Conventions,
    prefixes: Vec<String>,
}

impl NameValidator {
    /// Creates a validator for the given conventions and settings.
    #[must_use]
    pub fn new(conventions: &Conventions, settings: &Settings) -> Self {
        Self {
            conventions: conventions.clone(),
            prefixes: settings.general.prefixes.clone(),
        }
    }

    /// Checks an assignment or loop target.
    ///
    /// `value` is the assigned expression, if any; boolean rules only apply
    /// when it is a boolean literal or a `"true"`/`"false"` string.
    #[must_use]
    pub fn validate_variable(
        &self,
        name: &str,
        value: Option<Node<'_>>,
        src: &str,
        span: Span,
    ) -> Option<Issue> {
        if is_exempt(name) || IGNORED_VARIABLES.contains(&name.to_ascii_uppercase().as_str()) {
            return None;
        }
        let issue = |code| Issue::new(code, span).with_param("name", name);

        if name.chars().all(|c| c == '_') {
            return None;
        }
        if self.conventions.expressive_names.variables.avoid_short_names
            && name.chars().count() < 3
        {
            return Some(issue(RuleCode::Cdq02).with_template(VARIABLE_TOO_SHORT));
        }

        if value.is_some_and(|v| is_boolean(v, src)) {
            return self
                .boolean_code(name, RuleCode::Sty01, RuleCode::Sty02)
                .map(issue);
        }
        None
    }

    /// Checks a function definition's name and length.
    #[must_use]
    pub fn validate_function(&self, def: Node<'_>, src: &str) -> Option<Issue> {
        let name_node = def.child_by_field_name("name")?;
        let name = syntax::text(name_node, src);
        if is_exempt(name) || RESERVED_FUNCTIONS.contains(&name) {
            return None;
        }
        let issue = |code| {
            Issue::new(code, syntax::header_span(def)).with_param("name", name)
        };
        let rules = &self.conventions.expressive_names.functions;

        let trimmed = name.trim_start_matches('_');
        if rules.avoid_short_names && trimmed.chars().count() <= 3 {
            return Some(issue(RuleCode::Cdq02).with_template(FUNCTION_TOO_SHORT));
        }

        let lowered = trimmed.to_ascii_lowercase();
        if !VERBS.iter().any(|verb| lowered.starts_with(verb)) {
            return Some(issue(RuleCode::Cdq03));
        }

        let statements = def
            .child_by_field_name("body")
            .map_or(0, |body| named_children(body).len());
        if statements > rules.function_length_limit {
            return Some(issue(RuleCode::Cdq04).with_param("limit", rules.function_length_limit));
        }
        None
    }

    /// Checks the string keys of a dict literal.
    #[must_use]
    pub fn validate_dict_keys(&self, dict: Node<'_>, src: &str) -> Vec<Issue> {
        named_children(dict)
            .into_iter()
            .filter(|pair| pair.kind() == "pair")
            .filter_map(|pair| {
                let key_node = pair.child_by_field_name("key")?;
                let key = match literal::evaluate(key_node, src)? {
                    PyLiteral::Str(key) => key,
                    _ => return None,
                };
                self.validate_key(&key, pair.child_by_field_name("value"), src, syntax::span_of(key_node))
            })
            .collect()
    }

    fn validate_key(&self, key: &str, value: Option<Node<'_>>, src: &str, span: Span) -> Option<Issue> {
        if key.is_empty() {
            return None;
        }
        let issue = |code| Issue::new(code, span).with_param("name", key);

        if self.conventions.expressive_names.object_properties.avoid_short_names
            && key.chars().count() <= 2
        {
            return Some(issue(RuleCode::Cdq02).with_template(KEY_TOO_SHORT));
        }
        if value.is_some_and(|v| is_boolean(v, src)) {
            return self
                .boolean_code(key, RuleCode::Sty03, RuleCode::Sty04)
                .map(issue);
        }
        None
    }

    fn boolean_code(&self, name: &str, prefix: RuleCode, negative: RuleCode) -> Option<RuleCode> {
        let rules = self.conventions.boolean;
        if rules.use_prefix && !self.prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            return Some(prefix);
        }
        if rules.positive_naming && NEGATIVE_PREFIXES.iter().any(|p| name.starts_with(p)) {
            return Some(negative);
        }
        None
    }
}

fn is_exempt(name: &str) -> bool {
    (name.len() > 4 && name.starts_with("__") && name.ends_with("__"))
        || PYTHON_RESERVED.contains(&name)
}

fn is_boolean(value: Node<'_>, src: &str) -> bool {
    match literal::evaluate(value, src) {
        Some(PyLiteral::Bool(_)) => true,
        Some(PyLiteral::Str(s)) => s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false"),
        _ => false,
    }
}

/// Plain names bound by a `for` target, including unpacked tuples.
#[must_use]
pub fn loop_targets(target: Node<'_>) -> Vec<Node<'_>> {
    let mut found = Vec::new();
    let mut pending = vec![target];
    while let Some(node) = pending.pop() {
        match node.kind() {
            "identifier" => found.push(node),
            "pattern_list" | "tuple_pattern" | "list_pattern" | "parenthesized_expression" => {
                pending.extend(named_children(node).into_iter().rev());
            }
            _ => {}
        }
    }
    found
}

impl Check for NameValidator {
    fn name(&self) -> &'static str {
        NAME
    }

    fn codes(&self) -> &'static [RuleCode] {
        CODES
    }

    fn run(&mut self, cx: &CheckContext<'_>, node: Node<'_>) -> Result<Vec<Issue>, CheckError> {
        let src = cx.src();
        let issues = match node.kind() {
            "function_definition" => self.validate_function(node, src).into_iter().collect(),
            "assignment" => {
                let parts = syntax::assignment_parts(node);
                parts
                    .targets
                    .iter()
                    .filter_map(|target| {
                        let name = syntax::text(*target, src);
                        self.validate_variable(name, parts.value, src, syntax::span_of(*target))
                    })
                    .collect()
            }
            "for_statement" => {
                let left = node
                    .child_by_field_name("left")
                    .ok_or_else(|| CheckError::missing("for_statement", "left"))?;
                loop_targets(left)
                    .into_iter()
                    .filter_map(|target| {
                        let name = syntax::text(target, src);
                        self.validate_variable(name, None, src, syntax::span_of(target))
                    })
                    .collect()
            }
            "dictionary" => self.validate_dict_keys(node, src),
            _ => Vec::new(),
        };
        Ok(issues)
    }
}
