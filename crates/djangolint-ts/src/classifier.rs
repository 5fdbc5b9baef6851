//! Symbol classification by name and shape.
//!
//! Classes are resolved by a bounded breadth-first walk over their base
//! classes. Bases are matched by name only; nothing is imported or resolved,
//! so a base that is not defined in the same file is treated as external.

use std::collections::{HashMap, HashSet, VecDeque};

use djangolint_core::SemanticKind;
use tree_sitter::Node;
use tracing::{debug, warn};

use crate::syntax::{self, preorder};

/// Maximum inheritance distance searched before a branch is abandoned.
pub const MAX_DEPTH: usize = 5;

const VIEW_BASES: &[&str] = &[
    "View",
    "TemplateView",
    "ListView",
    "DetailView",
    "CreateView",
    "UpdateView",
    "DeleteView",
    "FormView",
    "RedirectView",
    "APIView",
    "GenericAPIView",
    "ViewSet",
    "ModelViewSet",
    "ReadOnlyModelViewSet",
];

const VIEW_MIXINS: &[&str] = &[
    "LoginRequiredMixin",
    "PermissionRequiredMixin",
    "UserPassesTestMixin",
    "AccessMixin",
    "ContextMixin",
    "SingleObjectMixin",
    "MultipleObjectMixin",
    "TemplateResponseMixin",
];

const MODEL_BASE: &str = "Model";
const VIEW_DECORATORS: &[&str] = &["view", "api_view"];
const VIEW_SUFFIX: &str = "_view";

/// Class definitions of one file, keyed by simple name.
///
/// Built by a full scan; a redefined name keeps its last definition.
#[derive(Debug, Default)]
pub struct ClassTable<'tree> {
    classes: HashMap<String, Node<'tree>>,
}

impl<'tree> ClassTable<'tree> {
    /// Scans the whole tree for class definitions.
    #[must_use]
    pub fn build(root: Node<'tree>, src: &str) -> Self {
        let mut classes = HashMap::new();
        for node in preorder(root).filter(|n| n.kind() == "class_definition") {
            if let Some(name) = syntax::field_text(node, "name", src) {
                classes.insert(name.to_string(), node);
            }
        }
        debug!(count = classes.len(), "collected class definitions");
        Self { classes }
    }

    /// Looks up a class by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Node<'tree>> {
        self.classes.get(name).copied()
    }

    /// Number of distinct class names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if the file defines no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// A direct base of a class, reduced to the parts matching needs.
enum Base<'a> {
    /// `Foo`
    Name(&'a str),
    /// `module.Foo`, keeping only `Foo`.
    Qualified(&'a str),
}

/// Resolves the framework role of classes and functions.
///
/// Results are memoised by class name for the lifetime of the classifier,
/// which must therefore not outlive one file's analysis.
#[derive(Debug, Default)]
pub struct Classifier {
    cache: HashMap<String, Option<SemanticKind>>,
    walks: usize,
}

impl Classifier {
    /// Creates an empty classifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of base-class walks performed so far; cache hits do not walk.
    #[must_use]
    pub fn walks(&self) -> usize {
        self.walks
    }

    /// Classifies a class as [`SemanticKind::ViewClass`], [`SemanticKind::ModelClass`]
    /// or `None` when no recognised base is found within [`MAX_DEPTH`].
    pub fn classify(
        &mut self,
        class: Node<'_>,
        table: &ClassTable<'_>,
        src: &str,
    ) -> Option<SemanticKind> {
        let name = syntax::field_text(class, "name", src).unwrap_or_default();
        if let Some(cached) = self.cache.get(name) {
            return *cached;
        }

        self.walks += 1;
        let kind = Self::walk(class, table, src);
        debug!(class = name, ?kind, "classified class");
        self.cache.insert(name.to_string(), kind);
        kind
    }

    fn walk(class: Node<'_>, table: &ClassTable<'_>, src: &str) -> Option<SemanticKind> {
        let mut queue = VecDeque::from([(class, 0usize)]);
        let mut visited: HashSet<&str> = HashSet::new();

        while let Some((current, depth)) = queue.pop_front() {
            let name = syntax::field_text(current, "name", src).unwrap_or_default();
            if depth > MAX_DEPTH {
                warn!(class = name, depth, "inheritance depth limit reached");
                continue;
            }
            if !visited.insert(name) {
                continue;
            }

            let bases = bases(current, src);
            let is_view = bases.iter().any(|base| match base {
                Base::Name(n) | Base::Qualified(n) => is_view_base(n),
            });
            if is_view {
                return Some(SemanticKind::ViewClass);
            }
            if bases
                .iter()
                .any(|base| matches!(base, Base::Qualified(n) if *n == MODEL_BASE))
            {
                return Some(SemanticKind::ModelClass);
            }

            for base in &bases {
                if let Base::Name(n) = base {
                    if let Some(parent) = table.get(n) {
                        queue.push_back((parent, depth + 1));
                    }
                }
            }
        }
        None
    }
}

fn bases<'a>(class: Node<'_>, src: &'a str) -> Vec<Base<'a>> {
    let Some(list) = class.child_by_field_name("superclasses") else {
        return Vec::new();
    };
    syntax::named_children(list)
        .into_iter()
        .filter_map(|arg| match arg.kind() {
            "identifier" => Some(Base::Name(syntax::text(arg, src))),
            "attribute" => syntax::field_text(arg, "attribute", src).map(Base::Qualified),
            _ => None,
        })
        .collect()
}

fn is_view_base(name: &str) -> bool {
    VIEW_BASES.contains(&name) || VIEW_MIXINS.contains(&name)
}

/// Returns true for function-based views: a `view`/`api_view` decorator
/// (bare, called or qualified) or a name ending in `_view`.
#[must_use]
pub fn is_view_function(function: Node<'_>, src: &str) -> bool {
    let name = syntax::field_text(function, "name", src).unwrap_or_default();
    if name.ends_with(VIEW_SUFFIX) {
        return true;
    }
    syntax::decorators(function)
        .into_iter()
        .filter_map(syntax::first_named)
        .filter_map(|expr| decorator_name(expr, src))
        .any(|name| VIEW_DECORATORS.contains(&name))
}

fn decorator_name<'a>(expr: Node<'_>, src: &'a str) -> Option<&'a str> {
    match expr.kind() {
        "identifier" => Some(syntax::text(expr, src)),
        "attribute" => syntax::field_text(expr, "attribute", src),
        "call" => decorator_name(expr.child_by_field_name("function")?, src),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn classify_named(src: &str, target: &str) -> (Option<SemanticKind>, Classifier) {
        let tree = parse(src).unwrap();
        let root = tree.root_node();
        let table = ClassTable::build(root, src);
        let class = table.get(target).unwrap();
        let mut classifier = Classifier::new();
        let kind = classifier.classify(class, &table, src);
        (kind, classifier)
    }

    #[test]
    fn direct_view_base() {
        let src = "class Home(TemplateView):\n    pass\n";
        assert_eq!(classify_named(src, "Home").0, Some(SemanticKind::ViewClass));
    }

    #[test]
    fn qualified_view_base_and_mixin() {
        let src = "class A(generic.ListView):\n    pass\nclass B(LoginRequiredMixin, Base):\n    pass\n";
        assert_eq!(classify_named(src, "A").0, Some(SemanticKind::ViewClass));
        assert_eq!(classify_named(src, "B").0, Some(SemanticKind::ViewClass));
    }

    #[test]
    fn model_base() {
        let src = "class Customer(models.Model):\n    name = models.CharField()\n";
        assert_eq!(classify_named(src, "Customer").0, Some(SemanticKind::ModelClass));
    }

    #[test]
    fn inherited_through_local_classes() {
        let src = "class Base(View):\n    pass\nclass Mid(Base):\n    pass\nclass Leaf(Mid):\n    pass\n";
        assert_eq!(classify_named(src, "Leaf").0, Some(SemanticKind::ViewClass));
    }

    #[test]
    fn external_bases_are_unclassified() {
        let src = "class Leaf(SomethingImported):\n    pass\n";
        assert_eq!(classify_named(src, "Leaf").0, None);
    }

    #[test]
    fn chain_deeper_than_limit_is_unclassified() {
        let mut src = String::from("class C0(View):\n    pass\n");
        for i in 1..=8 {
            src.push_str(&format!("class C{i}(C{}):\n    pass\n", i - 1));
        }
        assert_eq!(classify_named(&src, "C8").0, None);
        assert_eq!(classify_named(&src, "C5").0, Some(SemanticKind::ViewClass));
    }

    #[test]
    fn cyclic_bases_terminate() {
        let src = "class A(B):\n    pass\nclass B(A):\n    pass\n";
        assert_eq!(classify_named(src, "A").0, None);
    }

    #[test]
    fn last_definition_wins() {
        let src = "class A(View):\n    pass\nclass A(object):\n    pass\n";
        let tree = parse(src).unwrap();
        let table = ClassTable::build(tree.root_node(), src);
        assert_eq!(table.len(), 1);
        let node = table.get("A").unwrap();
        assert_eq!(node.start_position().row, 2);
    }

    #[test]
    fn second_classification_hits_cache() {
        let src = "class Home(View):\n    pass\n";
        let tree = parse(src).unwrap();
        let table = ClassTable::build(tree.root_node(), src);
        let class = table.get("Home").unwrap();
        let mut classifier = Classifier::new();

        let first = classifier.classify(class, &table, src);
        let second = classifier.classify(class, &table, src);

        assert_eq!(first, second);
        assert_eq!(classifier.walks(), 1);
    }

    fn first_function(src: &str) -> bool {
        let tree = parse(src).unwrap();
        let func = preorder(tree.root_node())
            .find(|n| n.kind() == "function_definition")
            .unwrap();
        is_view_function(func, src)
    }

    #[test]
    fn view_functions_by_shape() {
        assert!(first_function("def home_view(request):\n    pass\n"));
        assert!(first_function("@api_view\ndef home(request):\n    pass\n"));
        assert!(first_function("@api_view(['GET'])\ndef home(request):\n    pass\n"));
        assert!(first_function("@decorators.view\ndef home(request):\n    pass\n"));
        assert!(!first_function("@login_required\ndef home(request):\n    pass\n"));
        assert!(!first_function("def helper():\n    pass\n"));
    }
}
