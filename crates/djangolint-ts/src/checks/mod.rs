//! Check services.
//!
//! Each check inspects one node at a time and returns zero or more
//! [`Issue`]s. Checks match on syntactic shape only and are independent of
//! each other; the traversal decides which node each check sees.

use djangolint_core::{FileContext, Issue, RuleCode};
use tree_sitter::Node;

use crate::error::CheckError;

pub mod complexity;
pub mod exception_handling;
pub mod model_fields;
pub mod names;
pub mod redundant_query;
pub mod security;

pub use complexity::ComplexityScorer;
pub use exception_handling::ExceptionHandlingCheck;
pub use model_fields::ModelFieldCheck;
pub use names::NameValidator;
pub use redundant_query::RedundantQueryCheck;
pub use security::SecurityCheck;

/// Read-only inputs shared by every check in one run.
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    /// The file under analysis.
    pub file: &'a FileContext<'a>,
    /// Module node of the parsed file.
    pub root: Node<'a>,
}

impl<'a> CheckContext<'a> {
    /// Creates a context for one file.
    #[must_use]
    pub fn new(file: &'a FileContext<'a>, root: Node<'a>) -> Self {
        Self { file, root }
    }

    /// Full source text.
    #[must_use]
    pub fn src(&self) -> &'a str {
        self.file.content()
    }
}

/// A rule check over single syntax nodes.
///
/// # Example
///
/// ```ignore
/// use djangolint_ts::checks::{Check, CheckContext};
///
/// struct NoPrint;
///
/// impl Check for NoPrint {
///     fn name(&self) -> &'static str { "no-print" }
///     fn codes(&self) -> &'static [RuleCode] { &[] }
///
///     fn run(&mut self, cx: &CheckContext<'_>, node: Node<'_>) -> Result<Vec<Issue>, CheckError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait Check {
    /// Returns the kebab-case name of this check.
    fn name(&self) -> &'static str;

    /// Rule codes this check can emit.
    fn codes(&self) -> &'static [RuleCode];

    /// Inspects `node` and returns the issues found.
    ///
    /// Nodes the check does not apply to yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] when the node does not have the shape the
    /// grammar promises. The caller treats this as "no issues".
    fn run(&mut self, cx: &CheckContext<'_>, node: Node<'_>) -> Result<Vec<Issue>, CheckError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use djangolint_core::FileContext;
    use tree_sitter::{Node, Tree};

    use crate::syntax::{parse, preorder};

    /// Parsed snippet kept alive for the duration of a test.
    pub struct Snippet {
        pub src: &'static str,
        pub tree: Tree,
    }

    impl Snippet {
        pub fn new(src: &'static str) -> Self {
            let tree = parse(src).unwrap();
            Self { src, tree }
        }

        pub fn file(&self) -> FileContext<'static> {
            FileContext::new("snippet.py", self.src)
        }

        pub fn nth(&self, kind: &str, n: usize) -> Node<'_> {
            preorder(self.tree.root_node())
                .filter(|node| node.kind() == kind)
                .nth(n)
                .unwrap()
        }

        pub fn first(&self, kind: &str) -> Node<'_> {
            self.nth(kind, 0)
        }
    }
}
