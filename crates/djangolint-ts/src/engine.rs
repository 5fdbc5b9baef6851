//! Orchestrating traversal.
//!
//! One pre-order walk per file, driven by an explicit stack. Each relevant node is classified, handed to
//! the checks that apply to it, and every returned [`Issue`] becomes one
//! [`Diagnostic`] in traversal order.

use std::path::Path;

use djangolint_core::{
    Config, Conventions, Diagnostic, FileContext, Issue, SemanticKind, Settings, Symbol,
};
use tracing::{debug, debug_span, warn};
use tree_sitter::Node;

use crate::checks::{
    redundant_query, Check, CheckContext, ComplexityScorer, ExceptionHandlingCheck,
    ModelFieldCheck, NameValidator, RedundantQueryCheck, SecurityCheck,
};
use crate::classifier::{self, ClassTable, Classifier};
use crate::error::AnalyzeError;
use crate::syntax;

/// Analyses Python files against one configuration.
///
/// # Example
///
/// ```
/// use djangolint_core::Config;
/// use djangolint_ts::Analyzer;
/// use std::path::Path;
///
/// let analyzer = Analyzer::new(Config::default());
/// let diagnostics = analyzer.analyze(Path::new("settings.py"), "DEBUG = True\n").unwrap();
/// assert_eq!(diagnostics.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: Config,
}

impl Analyzer {
    /// Creates an analyzer.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Analyses one file.
    ///
    /// All per-file state (class table, classification cache, emitted rule
    /// codes) is created here and dropped on return.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError`] if the source cannot be parsed. A clean file
    /// yields `Ok` with an empty list.
    pub fn analyze(&self, path: &Path, source: &str) -> Result<Vec<Diagnostic>, AnalyzeError> {
        let span = debug_span!("analyze", path = %path.display());
        let _guard = span.enter();

        let tree = syntax::parse(source)?;
        let file = FileContext::new(path, source);
        let root = tree.root_node();

        let mut traversal = Traversal::new(&self.config, &file, root);
        traversal.walk(root);

        debug!(
            diagnostics = traversal.diagnostics.len(),
            classes = traversal.classes.len(),
            walks = traversal.classifier.walks(),
            "analysis finished"
        );
        Ok(traversal.diagnostics)
    }
}

/// Analyses `source` with the given conventions and settings.
///
/// # Errors
///
/// Returns [`AnalyzeError`] if the source cannot be parsed.
pub fn analyze(
    path: &Path,
    source: &str,
    conventions: &Conventions,
    settings: &Settings,
) -> Result<Vec<Diagnostic>, AnalyzeError> {
    let config = Config {
        conventions: conventions.clone(),
        settings: settings.clone(),
        ..Config::default()
    };
    Analyzer::new(config).analyze(path, source)
}

/// Work item of the traversal stack.
enum Step<'a> {
    Enter(Node<'a>),
    LeaveClass,
}

/// State pushed on entry to a class body.
#[derive(Debug)]
struct ClassScope<'a> {
    name: &'a str,
    kind: Option<SemanticKind>,
}

struct Traversal<'a> {
    cx: CheckContext<'a>,
    classes: ClassTable<'a>,
    classifier: Classifier,
    security: SecurityCheck,
    models: ModelFieldCheck,
    exceptions: ExceptionHandlingCheck,
    redundant: RedundantQueryCheck,
    complexity: ComplexityScorer,
    names: NameValidator,
    scopes: Vec<ClassScope<'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Traversal<'a> {
    fn new(config: &Config, file: &'a FileContext<'a>, root: Node<'a>) -> Self {
        let cx = CheckContext::new(file, root);
        Self {
            cx,
            classes: ClassTable::build(root, cx.src()),
            classifier: Classifier::new(),
            security: SecurityCheck::new(config.checks.flag_cursor_usage),
            models: ModelFieldCheck::new(),
            exceptions: ExceptionHandlingCheck::new(),
            redundant: RedundantQueryCheck::new(),
            complexity: ComplexityScorer::new(config.conventions.complexity),
            names: NameValidator::new(&config.conventions, &config.settings),
            scopes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Walks the tree with an explicit stack so nesting depth is bounded
    /// by heap, not by the call stack.
    fn walk(&mut self, root: Node<'a>) {
        let mut stack = vec![Step::Enter(root)];
        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Enter(node) => node,
                Step::LeaveClass => {
                    self.leave_class();
                    continue;
                }
            };
            let descend = match node.kind() {
                "class_definition" => {
                    self.enter_class(node);
                    stack.push(Step::LeaveClass);
                    true
                }
                "function_definition" => self.visit_function(node),
                "assignment" if syntax::is_outer_assignment(node) => {
                    self.visit_assignment(node);
                    true
                }
                "for_statement" => {
                    self.visit_for(node);
                    true
                }
                "dictionary" => {
                    self.visit_dictionary(node);
                    true
                }
                _ => true,
            };
            if descend {
                let mut cursor = node.walk();
                let children: Vec<Node<'a>> = node.children(&mut cursor).collect();
                stack.extend(children.into_iter().rev().map(Step::Enter));
            }
        }
    }

    fn enclosing_class(&self) -> Option<SemanticKind> {
        self.scopes.last().and_then(|scope| scope.kind)
    }

    fn enter_class(&mut self, node: Node<'a>) {
        let name = syntax::field_text(node, "name", self.cx.src()).unwrap_or_default();
        let kind = self.classifier.classify(node, &self.classes, self.cx.src());
        let symbol = kind.map(|kind| Symbol::new(name, kind));

        let raw_sql = guarded(&mut self.security, &self.cx, node);
        self.emit(raw_sql, symbol.as_ref());

        if kind == Some(SemanticKind::ViewClass) {
            let issues = guarded(&mut self.complexity, &self.cx, node);
            self.emit(issues, symbol.as_ref());
        }

        self.scopes.push(ClassScope { name, kind });
    }

    fn leave_class(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            debug!(class = scope.name, kind = ?scope.kind, "left class");
        }
    }

    /// Returns whether the function body should be walked.
    fn visit_function(&mut self, node: Node<'a>) -> bool {
        let src = self.cx.src();
        let name = syntax::field_text(node, "name", src).unwrap_or_default();

        let redundant = guarded(&mut self.redundant, &self.cx, node);
        if !redundant.is_empty() {
            for issue in redundant {
                let suggestion = redundant_query::suggestion(self.cx.file, &issue);
                let mut diagnostic = Diagnostic::from_issue(self.cx.file, issue);
                if let Some(suggestion) = suggestion {
                    diagnostic = diagnostic.with_suggestion(suggestion);
                }
                self.diagnostics.push(diagnostic);
            }
            debug!(function = name, "redundant query chain, skipping remaining checks");
            return false;
        }

        let kind = if self.enclosing_class() == Some(SemanticKind::ViewClass) {
            SemanticKind::ViewClassMethod
        } else if classifier::is_view_function(node, src) {
            SemanticKind::ViewFunction
        } else {
            SemanticKind::PlainFunction
        };
        let symbol = Symbol::new(name, kind);

        let mut issues = Vec::new();
        if kind.is_view_like() {
            issues.extend(guarded(&mut self.exceptions, &self.cx, node));
            issues.extend(guarded(&mut self.complexity, &self.cx, node));
        }
        issues.extend(guarded(&mut self.names, &self.cx, node));
        self.emit(issues, Some(&symbol));
        true
    }

    fn visit_assignment(&mut self, node: Node<'a>) {
        let src = self.cx.src();
        let parts = syntax::assignment_parts(node);
        let Some(first) = parts.targets.first() else {
            return;
        };
        let kind = if self.enclosing_class() == Some(SemanticKind::ModelClass) {
            SemanticKind::ModelField
        } else {
            SemanticKind::Assignment
        };

        let mut issues = guarded(&mut self.security, &self.cx, node);
        issues.extend(guarded(&mut self.models, &self.cx, node));
        issues.extend(guarded(&mut self.names, &self.cx, node));

        let fallback = syntax::text(*first, src);
        for issue in issues {
            let name = issue
                .param("name")
                .or_else(|| issue.param("field"))
                .unwrap_or(fallback)
                .to_string();
            self.push(issue, Some(Symbol::new(name, kind)));
        }
    }

    fn visit_for(&mut self, node: Node<'a>) {
        let issues = guarded(&mut self.names, &self.cx, node);
        self.emit_named(issues, SemanticKind::ForLoopTarget);
    }

    fn visit_dictionary(&mut self, node: Node<'a>) {
        let bound = node.parent().is_some_and(|parent| {
            parent.kind() == "assignment"
                && parent.child_by_field_name("right") == Some(node)
                && parent
                    .child_by_field_name("left")
                    .is_some_and(|left| left.kind() == "identifier")
        });
        if bound {
            let issues = guarded(&mut self.names, &self.cx, node);
            self.emit_named(issues, SemanticKind::DictLiteral);
        }
    }

    fn emit(&mut self, issues: Vec<Issue>, symbol: Option<&Symbol>) {
        for issue in issues {
            self.push(issue, symbol.cloned());
        }
    }

    fn emit_named(&mut self, issues: Vec<Issue>, kind: SemanticKind) {
        for issue in issues {
            let symbol = issue.param("name").map(|name| Symbol::new(name, kind));
            self.push(issue, symbol);
        }
    }

    fn push(&mut self, issue: Issue, symbol: Option<Symbol>) {
        let mut diagnostic = Diagnostic::from_issue(self.cx.file, issue);
        if let Some(symbol) = symbol {
            diagnostic = diagnostic.with_symbol(symbol);
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Runs one check, turning a failure into "no issues".
fn guarded(check: &mut dyn Check, cx: &CheckContext<'_>, node: Node<'_>) -> Vec<Issue> {
    match check.run(cx, node) {
        Ok(issues) => issues,
        Err(err) => {
            warn!(
                check = check.name(),
                line = syntax::line_of(node),
                error = %err,
                "check failed, skipping node"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use djangolint_core::{RuleCode, Severity};

    fn run(src: &str) -> Vec<Diagnostic> {
        Analyzer::default()
            .analyze(Path::new("app/views.py"), src)
            .unwrap()
    }

    fn codes(src: &str) -> Vec<RuleCode> {
        run(src).into_iter().map(|d| d.issue_code).collect()
    }

    #[test]
    fn unrecognised_source_is_clean() {
        let src = "import os\n\nclass Helper(Base):\n    def compute_total(self, rows):\n        return sum(rows)\n";
        assert!(run(src).is_empty());
    }

    #[test]
    fn syntax_error_is_distinct_from_clean() {
        let err = Analyzer::default()
            .analyze(Path::new("bad.py"), "def broken(:\n")
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::Parse { line: 1, .. }));
    }

    #[test]
    fn view_function_gets_exception_diagnostic_with_symbol() {
        let diagnostics = run("@api_view(['GET'])\ndef list_orders(request):\n    return Response([])\n");
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics[0];
        assert_eq!(d.issue_code, RuleCode::Cdq01);
        assert_eq!((d.line, d.col_offset, d.end_col_offset), (2, 0, 15));
        assert_eq!(d.symbol, Some(Symbol::new("list_orders", SemanticKind::ViewFunction)));
        assert_eq!(d.file_path, Path::new("app/views.py"));
    }

    #[test]
    fn view_class_methods_are_view_like() {
        let src = "class Home(TemplateView):\n    def get_context_data(self, **kwargs):\n        return {}\n";
        let diagnostics = run(src);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].symbol.as_ref().map(|s| s.kind),
            Some(SemanticKind::ViewClassMethod)
        );
    }

    #[test]
    fn class_scope_ends_with_its_body() {
        let src = "class Home(TemplateView):\n    pass\n\ndef load_page(self):\n    return render()\n";
        assert!(run(src).is_empty());

        let nested = "class Order(models.Model):\n    class Meta:\n        ordering = []\n    customer = models.ForeignKey(Customer)\n";
        let kinds: Vec<SemanticKind> = run(nested)
            .iter()
            .filter_map(|d| d.symbol.as_ref().map(|s| s.kind))
            .collect();
        assert_eq!(kinds, vec![SemanticKind::ModelField, SemanticKind::ModelField]);
    }

    #[test]
    fn redundant_chain_short_circuits_function() {
        let src = "@api_view\ndef x(request):\n    return Customer.objects.all().count()\n";
        let diagnostics = run(src);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].issue_code, RuleCode::Cdq14);
        let fix = diagnostics[0].suggestion.as_ref().unwrap();
        assert!(fix.replacement.as_ref().unwrap().new_text.contains("count()"));
    }

    #[test]
    fn model_fields_carry_model_field_symbol() {
        let src = "class Order(models.Model):\n    customer = models.ForeignKey(Customer)\n";
        let diagnostics = run(src);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.symbol
            == Some(Symbol::new("customer", SemanticKind::ModelField))));
    }

    #[test]
    fn hsts_pair_reported_once_each() {
        let src = "SECURE_HSTS_SECONDS = 0\nSECURE_HSTS_INCLUDE_SUBDOMAINS = True\n";
        assert_eq!(codes(src), vec![RuleCode::Sec10, RuleCode::Sec11]);
    }

    #[test]
    fn conventions_drive_name_checks() {
        let mut conventions = Conventions::default();
        conventions.expressive_names.variables.avoid_short_names = true;
        conventions.boolean.use_prefix = true;
        let src = "ab = 1\nfor i in rows:\n    pass\nflags = {'visible': True}\n";
        let diagnostics =
            analyze(Path::new("x.py"), src, &conventions, &Settings::default()).unwrap();
        let found: Vec<(RuleCode, SemanticKind)> = diagnostics
            .iter()
            .map(|d| (d.issue_code, d.symbol.as_ref().unwrap().kind))
            .collect();
        assert_eq!(
            found,
            vec![
                (RuleCode::Cdq02, SemanticKind::Assignment),
                (RuleCode::Cdq02, SemanticKind::ForLoopTarget),
                (RuleCode::Sty03, SemanticKind::DictLiteral),
            ]
        );
    }

    #[test]
    fn every_diagnostic_is_well_formed() {
        let src = "DEBUG = True\nSECRET_KEY = 'x'\nALLOWED_HOSTS = ['*']\n\ndef home_view(request):\n    Customer.objects.raw('SELECT 1')\n";
        for d in run(src) {
            assert!(d.line >= 1);
            assert!(!d.issue_code.as_str().is_empty());
            assert!(matches!(
                d.severity,
                Severity::Error | Severity::Warning | Severity::Information | Severity::Hint
            ));
        }
    }
}
