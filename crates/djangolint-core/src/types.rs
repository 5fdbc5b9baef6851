//! Core types for issues, diagnostics and batch results.

use crate::context::FileContext;
use crate::rule::RuleCode;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Editor hint, never shown as a problem.
    Hint,
    /// Informational message, does not fail lint.
    Information,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hint => write!(f, "HINT"),
            Self::Information => write!(f, "INFORMATION"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Semantic role assigned to a symbol during one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticKind {
    /// Function with no recognised framework role.
    PlainFunction,
    /// Function-based view (decorated or `*_view` named).
    ViewFunction,
    /// Method defined inside a view class.
    ViewClassMethod,
    /// Class deriving from a recognised view base or mixin.
    ViewClass,
    /// Class deriving from `<module>.Model`.
    ModelClass,
    /// Assignment inside a model class body.
    ModelField,
    /// Any other assignment target.
    Assignment,
    /// Target of a `for` loop.
    ForLoopTarget,
    /// Key of a dict literal bound to a name.
    DictLiteral,
}

impl SemanticKind {
    /// Returns true for roles that get the view-only checks.
    #[must_use]
    pub fn is_view_like(self) -> bool {
        matches!(
            self,
            Self::ViewFunction | Self::ViewClassMethod | Self::ViewClass
        )
    }
}

/// Position of an issue in the analysed file.
///
/// `line` is 1-based, columns are 0-based byte offsets within the line.
/// A missing end position falls back to the end of the node's last line
/// when the issue is projected into a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start line (1-indexed).
    pub line: usize,
    /// Start column (0-indexed).
    pub col_offset: usize,
    /// End line, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    /// End column, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_col_offset: Option<usize>,
}

impl Span {
    /// Creates a span with only a start position.
    #[must_use]
    pub fn new(line: usize, col_offset: usize) -> Self {
        Self {
            line,
            col_offset,
            end_line: None,
            end_col_offset: None,
        }
    }

    /// Sets the end position.
    #[must_use]
    pub fn with_end(mut self, end_line: usize, end_col_offset: usize) -> Self {
        self.end_line = Some(end_line);
        self.end_col_offset = Some(end_col_offset);
        self
    }

    /// Sets an end column on the start line.
    #[must_use]
    pub fn with_end_col(self, end_col_offset: usize) -> Self {
        let line = self.line;
        self.with_end(line, end_col_offset)
    }

    /// Resolves the end column, falling back to the length of the last line.
    #[must_use]
    pub fn resolve_end_col(&self, ctx: &FileContext<'_>) -> usize {
        match (self.end_line, self.end_col_offset) {
            (Some(end_line), Some(col)) if end_line == self.line => col,
            (Some(end_line), _) => ctx.line_len(end_line),
            (None, Some(col)) => col,
            (None, None) => ctx.line_len(self.line),
        }
    }
}

/// An issue detected by a check, before projection into a diagnostic.
///
/// The message is kept as a `{key}` template plus parameters so callers can
/// re-render it; [`Issue::message`] performs the substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Rule that produced the issue.
    pub code: RuleCode,
    /// Severity of this occurrence.
    pub severity: Severity,
    /// Location of the issue.
    pub span: Span,
    /// Message template with `{key}` placeholders.
    pub template: Cow<'static, str>,
    /// Substitution parameters.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    /// Reference documentation for the rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_link: Option<&'static str>,
}

impl Issue {
    /// Creates an issue with the rule's default severity, template and doc link.
    #[must_use]
    pub fn new(code: RuleCode, span: Span) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            span,
            template: Cow::Borrowed(code.template()),
            params: BTreeMap::new(),
            doc_link: code.doc_link(),
        }
    }

    /// Overrides the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Overrides the message template.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<Cow<'static, str>>) -> Self {
        self.template = template.into();
        self
    }

    /// Adds a substitution parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Renders the template with all parameters substituted.
    ///
    /// Placeholders without a matching parameter are left verbatim.
    #[must_use]
    pub fn message(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest: &str = &self.template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    match self.params.get(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// The symbol a diagnostic is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Source name of the symbol.
    pub name: String,
    /// Role assigned by the classifier.
    pub kind: SemanticKind,
}

impl Symbol {
    /// Creates a new symbol.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SemanticKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A suggested fix for a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
    /// Optional automatic replacement.
    pub replacement: Option<Replacement>,
}

impl Suggestion {
    /// Creates a new suggestion with automatic fix.
    #[must_use]
    pub fn with_fix(message: impl Into<String>, replacement: Replacement) -> Self {
        Self {
            message: message.into(),
            replacement: Some(replacement),
        }
    }
}

/// An automatic source replacement covering whole lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Range being replaced.
    pub span: Span,
    /// New text to insert.
    pub new_text: String,
}

impl Replacement {
    /// Creates a new replacement.
    #[must_use]
    pub fn new(span: Span, new_text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: new_text.into(),
        }
    }
}

/// A positioned, file-scoped report of a detected issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// File the diagnostic belongs to.
    pub file_path: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Start column (0-indexed).
    pub col_offset: usize,
    /// End column (0-indexed, exclusive).
    pub end_col_offset: usize,
    /// Severity of the diagnostic.
    pub severity: Severity,
    /// Fully substituted message.
    pub message: String,
    /// Rule code, e.g. `SEC01`.
    pub issue_code: RuleCode,
    /// Issues this diagnostic was projected from.
    pub related_issues: Vec<Issue>,
    /// Symbol the diagnostic is attached to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Symbol>,
    /// Optional fix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
    /// Reference documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_link: Option<String>,
}

impl Diagnostic {
    /// Projects one issue into a diagnostic for `ctx`'s file.
    #[must_use]
    pub fn from_issue(ctx: &FileContext<'_>, issue: Issue) -> Self {
        Self {
            file_path: ctx.path().to_path_buf(),
            line: issue.span.line.max(1),
            col_offset: issue.span.col_offset,
            end_col_offset: issue.span.resolve_end_col(ctx),
            severity: issue.severity,
            message: issue.message(),
            issue_code: issue.code,
            doc_link: issue.doc_link.map(str::to_owned),
            symbol: None,
            suggestion: None,
            related_issues: vec![issue],
        }
    }

    /// Attaches the symbol this diagnostic belongs to.
    #[must_use]
    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = Some(symbol);
        self
    }

    /// Adds a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headline = self.message.lines().next().unwrap_or_default();
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.file_path.display(),
            self.line,
            self.col_offset,
            self.severity,
            self.issue_code,
            headline
        )
    }
}

/// Outcome of analysing one file in a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// File that was analysed.
    pub file_path: PathBuf,
    /// Diagnostics in traversal order.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of diagnostics.
    pub diagnostics_count: usize,
    /// Set when the file could not be read or parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    /// Creates a report for a successfully analysed file.
    #[must_use]
    pub fn analyzed(file_path: impl Into<PathBuf>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            file_path: file_path.into(),
            diagnostics_count: diagnostics.len(),
            diagnostics,
            error: None,
        }
    }

    /// Creates a report for a file that could not be analysed.
    #[must_use]
    pub fn failed(file_path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            diagnostics: Vec::new(),
            diagnostics_count: 0,
            error: Some(error.into()),
        }
    }
}

/// Result of running lint analysis over a set of files.
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    /// One report per file, in discovery order.
    pub files: Vec<FileReport>,
    /// Number of files checked.
    pub files_checked: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one file's report.
    pub fn push(&mut self, report: FileReport) {
        self.files_checked += 1;
        self.files.push(report);
    }

    /// Iterates over every diagnostic in file order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.iter().flat_map(|f| f.diagnostics.iter())
    }

    /// Total number of diagnostics across all files.
    #[must_use]
    pub fn total(&self) -> usize {
        self.files.iter().map(|f| f.diagnostics_count).sum()
    }

    /// Reports for files that failed to read or parse.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.error.is_some())
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics().any(|d| d.severity == Severity::Error)
    }

    /// Counts diagnostics as `(errors, warnings, infos, hints)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize, usize) {
        let count = |severity: Severity| {
            self.diagnostics()
                .filter(|d| d.severity == severity)
                .count()
        };
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Information),
            count(Severity::Hint),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FileContext<'static> {
        FileContext::new("settings.py", "DEBUG = True\nSECRET_KEY = 'abc'\n")
    }

    #[test]
    fn severity_orders_hint_to_error() {
        assert!(Severity::Hint < Severity::Information);
        assert!(Severity::Information < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn severity_serializes_uppercase() {
        let json = serde_json::to_string(&Severity::Information).unwrap();
        assert_eq!(json, "\"INFORMATION\"");
    }

    #[test]
    fn issue_message_substitutes_params() {
        let issue = Issue::new(RuleCode::Cdq02, Span::new(3, 0))
            .with_template("Variable name '{name}' is too short.")
            .with_param("name", "x");
        assert_eq!(issue.message(), "Variable name 'x' is too short.");
    }

    #[test]
    fn issue_message_keeps_unknown_placeholders() {
        let issue = Issue::new(RuleCode::Cdq02, Span::new(1, 0)).with_template("{missing} {");
        assert_eq!(issue.message(), "{missing} {");
    }

    #[test]
    fn issue_defaults_come_from_rule_code() {
        let issue = Issue::new(RuleCode::Sec13, Span::new(1, 0));
        assert_eq!(issue.severity, Severity::Information);
        assert!(issue.doc_link.is_some());
    }

    #[test]
    fn diagnostic_falls_back_to_end_of_line() {
        let issue = Issue::new(RuleCode::Sec01, Span::new(1, 0));
        let diag = Diagnostic::from_issue(&ctx(), issue);
        assert_eq!(diag.end_col_offset, "DEBUG = True".len());
        assert_eq!(diag.issue_code, RuleCode::Sec01);
        assert_eq!(diag.related_issues.len(), 1);
    }

    #[test]
    fn diagnostic_multiline_span_uses_last_line_length() {
        let issue = Issue::new(RuleCode::Sec13, Span::new(1, 4).with_end(2, 3));
        let diag = Diagnostic::from_issue(&ctx(), issue);
        assert_eq!(diag.end_col_offset, "SECRET_KEY = 'abc'".len());
    }

    #[test]
    fn diagnostic_display_uses_first_message_line() {
        let issue = Issue::new(RuleCode::Cdq01, Span::new(1, 0).with_end_col(5))
            .with_param("name", "index");
        let diag = Diagnostic::from_issue(&ctx(), issue);
        let display = format!("{diag}");
        assert!(display.starts_with("settings.py:1:0: INFORMATION [CDQ01]"));
        assert!(!display.contains('\n'));
    }

    #[test]
    fn lint_result_counts_by_severity() {
        let c = ctx();
        let warn = Diagnostic::from_issue(&c, Issue::new(RuleCode::Sec01, Span::new(1, 0)));
        let info = Diagnostic::from_issue(&c, Issue::new(RuleCode::Sec13, Span::new(2, 0)));
        let mut result = LintResult::new();
        result.push(FileReport::analyzed("settings.py", vec![warn, info]));
        result.push(FileReport::failed("broken.py", "parse error"));

        assert_eq!(result.files_checked, 2);
        assert_eq!(result.total(), 2);
        assert_eq!(result.count_by_severity(), (0, 1, 1, 0));
        assert!(!result.has_errors());
        assert_eq!(result.failures().count(), 1);
    }
}
