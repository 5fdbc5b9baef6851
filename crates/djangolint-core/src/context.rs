//! Source context for one analysis run.

use std::path::Path;

/// The file being analysed: its path, its text and a line index over it.
///
/// Lines are 1-indexed and columns are 0-indexed byte offsets, matching the
/// positions reported by the parser.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    path: &'a Path,
    content: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new<P: AsRef<Path> + ?Sized>(path: &'a P, content: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            path: path.as_ref(),
            content,
            line_starts,
        }
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &'a Path {
        self.path
    }

    /// Full source text.
    #[must_use]
    pub fn content(&self) -> &'a str {
        self.content
    }

    /// Number of lines in the file.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of a line without its terminator, or `None` when out of range.
    #[must_use]
    pub fn line_text(&self, line: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map_or(self.content.len(), |next| next - 1);
        let text = self.content.get(start..end)?;
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Byte length of a line, 0 when out of range.
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        self.line_text(line).map_or(0, str::len)
    }

    /// Text from the start of `first` through the end of `last`, inclusive.
    #[must_use]
    pub fn lines(&self, first: usize, last: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(first.checked_sub(1)?)?;
        let end = self.offset_for(last, self.line_len(last))?;
        self.content.get(start..end)
    }

    /// Calculates the byte offset for a 1-indexed line and 0-indexed column.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> Option<usize> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        Some((start + column).min(self.content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_text_and_len() {
        let ctx = FileContext::new("views.py", "line1\nline22\r\nline3");
        assert_eq!(ctx.line_count(), 3);
        assert_eq!(ctx.line_text(1), Some("line1"));
        assert_eq!(ctx.line_text(2), Some("line22"));
        assert_eq!(ctx.line_text(3), Some("line3"));
        assert_eq!(ctx.line_len(2), 6);
        assert_eq!(ctx.line_text(0), None);
        assert_eq!(ctx.line_len(9), 0);
    }

    #[test]
    fn test_offset_calculation() {
        let ctx = FileContext::new("views.py", "line1\nline2\nline3");
        assert_eq!(ctx.offset_for(1, 0), Some(0));
        assert_eq!(ctx.offset_for(2, 0), Some(6));
        assert_eq!(ctx.offset_for(2, 2), Some(8));
        assert_eq!(ctx.offset_for(4, 0), None);
    }

    #[test]
    fn lines_spans_whole_lines() {
        let ctx = FileContext::new("views.py", "a = 1\nb = (\n  2)\nc = 3\n");
        assert_eq!(ctx.lines(2, 3), Some("b = (\n  2)"));
        assert_eq!(ctx.lines(1, 1), Some("a = 1"));
    }

    #[test]
    fn trailing_newline_adds_empty_line() {
        let ctx = FileContext::new("views.py", "x = 1\n");
        assert_eq!(ctx.line_count(), 2);
        assert_eq!(ctx.line_text(2), Some(""));
        assert_eq!(ctx.path(), Path::new("views.py"));
    }
}
