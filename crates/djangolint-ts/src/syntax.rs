//! Python parsing and small read-only helpers over Tree-sitter nodes.

use djangolint_core::Span;
use tree_sitter::{Language, Node, Parser, Tree, TreeCursor};

use crate::error::AnalyzeError;

/// Parses Python source into a syntax tree.
///
/// # Errors
///
/// Returns [`AnalyzeError::Language`] if the grammar cannot be loaded and
/// [`AnalyzeError::Parse`] if the source contains a syntax error.
pub fn parse(source: &str) -> Result<Tree, AnalyzeError> {
    let language: Language = tree_sitter_python::LANGUAGE.into();
    let mut parser = Parser::new();
    parser.set_language(&language)?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AnalyzeError::Parse {
            line: 1,
            column: 0,
            message: "parser produced no tree".to_string(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let (line, column, message) = match first_error(root) {
            Some(node) if node.is_missing() => (
                line_of(node),
                node.start_position().column,
                format!("missing {}", node.kind()),
            ),
            Some(node) => (
                line_of(node),
                node.start_position().column,
                "invalid syntax".to_string(),
            ),
            None => (1, 0, "invalid syntax".to_string()),
        };
        return Err(AnalyzeError::Parse {
            line,
            column,
            message,
        });
    }

    Ok(tree)
}

/// Finds the first `ERROR` or missing node in source order.
#[must_use]
pub fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    preorder(root).find(|n| n.is_error() || n.is_missing())
}

/// Source text covered by `node`, or `""` if the range is not valid UTF-8.
#[must_use]
pub fn text<'a>(node: Node<'_>, src: &'a str) -> &'a str {
    src.get(node.byte_range()).unwrap_or("")
}

/// Text of a named field child.
#[must_use]
pub fn field_text<'a>(node: Node<'_>, field: &str, src: &'a str) -> Option<&'a str> {
    node.child_by_field_name(field).map(|n| text(n, src))
}

/// 1-indexed start line of `node`.
#[must_use]
pub fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Full span of `node`.
#[must_use]
pub fn span_of(node: Node<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(start.row + 1, start.column).with_end(end.row + 1, end.column)
}

/// Span from the start of a definition to the end of its name.
///
/// Used as the anchor for diagnostics about a whole function or class.
#[must_use]
pub fn header_span(def: Node<'_>) -> Span {
    let start = def.start_position();
    let end = def
        .child_by_field_name("name")
        .filter(|name| name.start_position().row == start.row)
        .map_or(start.column, |name| name.end_position().column);
    Span::new(start.row + 1, start.column).with_end_col(end)
}

/// Named children of `node`, skipping comments.
#[must_use]
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// First named, non-comment child.
#[must_use]
pub fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    found
}

/// Returns true if any ancestor of `node` has one of `kinds`.
#[must_use]
pub fn has_ancestor(node: Node<'_>, kinds: &[&str]) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if kinds.contains(&parent.kind()) {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Returns true if `node` is not nested in a function or class.
#[must_use]
pub fn is_module_scope(node: Node<'_>) -> bool {
    !has_ancestor(node, &["function_definition", "class_definition"])
}

/// The decorators attached to a function or class definition.
#[must_use]
pub fn decorators(def: Node<'_>) -> Vec<Node<'_>> {
    match def.parent() {
        Some(parent) if parent.kind() == "decorated_definition" => {
            let mut cursor = parent.walk();
            parent
                .children(&mut cursor)
                .filter(|child| child.kind() == "decorator")
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Identifier targets and value of an assignment statement.
///
/// `a = b = 1` yields targets `[a, b]` and value `1`. Targets that are not
/// plain names (attributes, subscripts, unpacking) are skipped.
#[derive(Debug, Clone, Default)]
pub struct AssignmentParts<'tree> {
    /// Plain-name targets in source order.
    pub targets: Vec<Node<'tree>>,
    /// Right-hand side, absent for a bare annotation.
    pub value: Option<Node<'tree>>,
}

/// Splits an assignment, following chained assignments to the innermost value.
#[must_use]
pub fn assignment_parts(node: Node<'_>) -> AssignmentParts<'_> {
    let mut parts = AssignmentParts::default();
    let mut current = node;
    loop {
        if let Some(left) = current.child_by_field_name("left") {
            if left.kind() == "identifier" {
                parts.targets.push(left);
            }
        }
        match current.child_by_field_name("right") {
            Some(right) if right.kind() == "assignment" => current = right,
            right => {
                parts.value = right;
                return parts;
            }
        }
    }
}

/// Returns true for the outermost node of a (possibly chained) assignment.
#[must_use]
pub fn is_outer_assignment(node: Node<'_>) -> bool {
    node.kind() == "assignment" && node.parent().map_or(true, |p| p.kind() != "assignment")
}

/// Pre-order iterator over `node` and all of its descendants.
#[must_use]
pub fn preorder(node: Node<'_>) -> Preorder<'_> {
    Preorder {
        cursor: node.walk(),
        done: false,
    }
}

/// Depth-first, source-ordered walk driven by a [`TreeCursor`].
pub struct Preorder<'tree> {
    cursor: TreeCursor<'tree>,
    done: bool,
}

impl<'tree> Iterator for Preorder<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if self.cursor.goto_first_child() {
            return Some(node);
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_kinds(src: &str) -> Vec<&'static str> {
        let tree = parse(src).unwrap();
        preorder(tree.root_node()).map(|n| n.kind()).collect()
    }

    #[test]
    fn parses_valid_source() {
        let kinds = root_kinds("x = 1\n");
        assert_eq!(kinds[0], "module");
        assert!(kinds.contains(&"assignment"));
        assert!(kinds.contains(&"integer"));
    }

    #[test]
    fn reports_syntax_error_position() {
        let err = parse("def broken(:\n    pass\n").unwrap_err();
        match err {
            AnalyzeError::Parse { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn preorder_visits_in_source_order() {
        let src = "a = 1\nb = 2\n";
        let tree = parse(src).unwrap();
        let names: Vec<&str> = preorder(tree.root_node())
            .filter(|n| n.kind() == "identifier")
            .map(|n| text(n, src))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn header_span_ends_at_name() {
        let src = "class Foo:\n    def bar(self):\n        pass\n";
        let tree = parse(src).unwrap();
        let func = preorder(tree.root_node())
            .find(|n| n.kind() == "function_definition")
            .unwrap();
        let span = header_span(func);
        assert_eq!((span.line, span.col_offset), (2, 4));
        assert_eq!(span.end_col_offset, Some(11));
        assert!(!is_module_scope(func));
    }

    #[test]
    fn chained_assignment_parts() {
        let src = "a = b = {'k': 1}\nself.x = 2\n";
        let tree = parse(src).unwrap();
        let outer = preorder(tree.root_node())
            .find(|n| is_outer_assignment(*n))
            .unwrap();
        let parts = assignment_parts(outer);
        let names: Vec<&str> = parts.targets.iter().map(|t| text(*t, src)).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(parts.value.map(|v| v.kind()), Some("dictionary"));

        let attr = preorder(tree.root_node())
            .filter(|n| is_outer_assignment(*n))
            .nth(1)
            .unwrap();
        assert!(assignment_parts(attr).targets.is_empty());
    }

    #[test]
    fn collects_decorators() {
        let src = "@login_required\n@api_view(['GET'])\ndef home(request):\n    pass\n";
        let tree = parse(src).unwrap();
        let func = preorder(tree.root_node())
            .find(|n| n.kind() == "function_definition")
            .unwrap();
        assert_eq!(decorators(func).len(), 2);
    }
}
