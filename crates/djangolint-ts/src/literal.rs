//! Side-effect free evaluation of Python literal expressions.
//!
//! Only the literal subset is understood: constants, strings, numbers and
//! containers of literals. Anything else (names, calls, f-strings, bytes)
//! evaluates to `None`, which callers treat as "value unknown".

use tree_sitter::Node;

use crate::syntax::{self, named_children};

/// A Python value that can be read directly from source.
#[derive(Debug, Clone, PartialEq)]
pub enum PyLiteral {
    /// `None`.
    None,
    /// `True` / `False`.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Text string literal, escapes resolved.
    Str(String),
    /// `[...]`.
    List(Vec<PyLiteral>),
    /// `(...)`.
    Tuple(Vec<PyLiteral>),
    /// `{a, b}`.
    Set(Vec<PyLiteral>),
    /// `{k: v}`.
    Dict(Vec<(PyLiteral, PyLiteral)>),
}

impl PyLiteral {
    /// Python `value == 0`.
    #[must_use]
    pub fn equals_zero(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            _ => false,
        }
    }

    /// Python `value is True`.
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// Python `value is False`.
    #[must_use]
    pub fn is_false(&self) -> bool {
        matches!(self, Self::Bool(false))
    }

    /// The string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list, tuple or set.
    #[must_use]
    pub fn elements(&self) -> Option<&[PyLiteral]> {
        match self {
            Self::List(items) | Self::Tuple(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true if this sequence has a string element equal to `needle`.
    #[must_use]
    pub fn contains_str(&self, needle: &str) -> bool {
        self.elements()
            .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(needle)))
    }
}

/// Deepest container nesting that is still evaluated.
pub const MAX_NESTING: usize = 64;

/// Evaluates `node` as a Python literal.
///
/// Values nested deeper than [`MAX_NESTING`] are unknown.
#[must_use]
pub fn evaluate(node: Node<'_>, src: &str) -> Option<PyLiteral> {
    evaluate_at(node, src, 0)
}

fn evaluate_at(node: Node<'_>, src: &str, depth: usize) -> Option<PyLiteral> {
    if depth > MAX_NESTING {
        return None;
    }
    let nested = |child| evaluate_at(child, src, depth + 1);
    match node.kind() {
        "none" => Some(PyLiteral::None),
        "true" => Some(PyLiteral::Bool(true)),
        "false" => Some(PyLiteral::Bool(false)),
        "integer" => parse_int(syntax::text(node, src)).map(PyLiteral::Int),
        "float" => parse_float(syntax::text(node, src)).map(PyLiteral::Float),
        "string" => parse_string(syntax::text(node, src)).map(PyLiteral::Str),
        "concatenated_string" => {
            let mut out = String::new();
            for part in named_children(node) {
                match nested(part)? {
                    PyLiteral::Str(s) => out.push_str(&s),
                    _ => return None,
                }
            }
            Some(PyLiteral::Str(out))
        }
        "unary_operator" => {
            let operand = nested(node.child_by_field_name("argument")?)?;
            apply_unary(syntax::field_text(node, "operator", src)?, operand)
        }
        "parenthesized_expression" => nested(syntax::first_named(node)?),
        "list" => evaluate_all(node, nested).map(PyLiteral::List),
        "tuple" => evaluate_all(node, nested).map(PyLiteral::Tuple),
        "set" => evaluate_all(node, nested).map(PyLiteral::Set),
        "dictionary" => {
            let mut pairs = Vec::new();
            for pair in named_children(node) {
                if pair.kind() != "pair" {
                    return None;
                }
                let key = nested(pair.child_by_field_name("key")?)?;
                let value = nested(pair.child_by_field_name("value")?)?;
                pairs.push((key, value));
            }
            Some(PyLiteral::Dict(pairs))
        }
        _ => None,
    }
}

fn evaluate_all<'tree>(
    node: Node<'tree>,
    nested: impl Fn(Node<'tree>) -> Option<PyLiteral>,
) -> Option<Vec<PyLiteral>> {
    named_children(node).into_iter().map(nested).collect()
}

fn apply_unary(operator: &str, operand: PyLiteral) -> Option<PyLiteral> {
    match (operator, operand) {
        ("-", PyLiteral::Int(i)) => i.checked_neg().map(PyLiteral::Int),
        ("-", PyLiteral::Float(f)) => Some(PyLiteral::Float(-f)),
        ("+", value @ (PyLiteral::Int(_) | PyLiteral::Float(_))) => Some(value),
        ("~", PyLiteral::Int(i)) => Some(PyLiteral::Int(!i)),
        _ => None,
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    let digits = raw.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else {
        lower.parse().ok()
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    let digits = raw.replace('_', "");
    if digits.ends_with(['j', 'J']) {
        return None;
    }
    digits.parse().ok()
}

/// Decodes a single string token including prefix and quotes.
///
/// Returns `None` for f-strings and bytes, whose value is not a plain `str`.
fn parse_string(raw: &str) -> Option<String> {
    let quote_at = raw.find(['\'', '"'])?;
    let prefix = raw[..quote_at].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') || prefix.contains('t') {
        return None;
    }
    let quoted = &raw[quote_at..];
    let delimiter = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        &quoted[..3]
    } else {
        &quoted[..1]
    };
    let body = quoted
        .strip_prefix(delimiter)?
        .strip_suffix(delimiter)?;

    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        Some(unescape(body))
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            'x' => push_code_point(&mut out, &mut chars, 2, "\\x"),
            'u' => push_code_point(&mut out, &mut chars, 4, "\\u"),
            'U' => push_code_point(&mut out, &mut chars, 8, "\\U"),
            '0'..='7' => {
                let mut value = escaped.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn push_code_point(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    width: usize,
    marker: &str,
) {
    let mut hex = String::with_capacity(width);
    while hex.len() < width {
        match chars.peek() {
            Some(d) if d.is_ascii_hexdigit() => {
                hex.push(*d);
                chars.next();
            }
            _ => break,
        }
    }
    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
        Some(c) if hex.len() == width => out.push(c),
        _ => {
            out.push_str(marker);
            out.push_str(&hex);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, preorder};

    fn eval(expr: &str) -> Option<PyLiteral> {
        let src = format!("VALUE = {expr}\n");
        let tree = parse(&src).unwrap();
        let assignment = preorder(tree.root_node())
            .find(|n| n.kind() == "assignment")
            .unwrap();
        evaluate(assignment.child_by_field_name("right").unwrap(), &src)
    }

    #[test]
    fn deep_nesting_is_unknown() {
        let shallow = format!("{}1{}", "[".repeat(8), "]".repeat(8));
        assert!(eval(&shallow).is_some());

        let deep = format!("{}1{}", "[".repeat(5_000), "]".repeat(5_000));
        assert_eq!(eval(&deep), None);
    }

    #[test]
    fn constants() {
        assert_eq!(eval("None"), Some(PyLiteral::None));
        assert_eq!(eval("True"), Some(PyLiteral::Bool(true)));
        assert_eq!(eval("False"), Some(PyLiteral::Bool(false)));
    }

    #[test]
    fn numbers() {
        assert_eq!(eval("31_536_000"), Some(PyLiteral::Int(31_536_000)));
        assert_eq!(eval("0x1F"), Some(PyLiteral::Int(31)));
        assert_eq!(eval("0o17"), Some(PyLiteral::Int(15)));
        assert_eq!(eval("0b101"), Some(PyLiteral::Int(5)));
        assert_eq!(eval("-5"), Some(PyLiteral::Int(-5)));
        assert_eq!(eval("1.5"), Some(PyLiteral::Float(1.5)));
        assert_eq!(eval("(0)"), Some(PyLiteral::Int(0)));
        assert_eq!(eval("2j"), None);
    }

    #[test]
    fn strings() {
        assert_eq!(eval("'DENY'"), Some(PyLiteral::Str("DENY".into())));
        assert_eq!(eval("\"a\\tb\""), Some(PyLiteral::Str("a\tb".into())));
        assert_eq!(eval("r'a\\tb'"), Some(PyLiteral::Str("a\\tb".into())));
        assert_eq!(eval("'''x'''"), Some(PyLiteral::Str("x".into())));
        assert_eq!(eval("'a' 'b'"), Some(PyLiteral::Str("ab".into())));
        assert_eq!(eval("'\\x41\\u00e9'"), Some(PyLiteral::Str("A\u{e9}".into())));
        assert_eq!(eval("f'{x}'"), None);
        assert_eq!(eval("b'x'"), None);
    }

    #[test]
    fn containers() {
        let hosts = eval("['example.com', '*']").unwrap();
        assert!(hosts.contains_str("*"));
        assert_eq!(eval("[]"), Some(PyLiteral::List(vec![])));
        assert_eq!(
            eval("('a',)"),
            Some(PyLiteral::Tuple(vec![PyLiteral::Str("a".into())]))
        );
        assert_eq!(
            eval("{'a': 1}"),
            Some(PyLiteral::Dict(vec![(
                PyLiteral::Str("a".into()),
                PyLiteral::Int(1)
            )]))
        );
        assert_eq!(eval("[1, name]"), None);
    }

    #[test]
    fn non_literals_are_unknown() {
        assert_eq!(eval("os.environ['KEY']"), None);
        assert_eq!(eval("env('DEBUG')"), None);
    }

    #[test]
    fn python_equality_with_zero() {
        assert!(PyLiteral::Int(0).equals_zero());
        assert!(PyLiteral::Float(0.0).equals_zero());
        assert!(PyLiteral::Bool(false).equals_zero());
        assert!(!PyLiteral::None.equals_zero());
        assert!(!PyLiteral::Int(3600).equals_zero());
    }
}
