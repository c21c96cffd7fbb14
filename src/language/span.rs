use std::fmt;

/// Half-open byte range into the source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn union(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start.min(source.len())..self.end.min(source.len())]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Anything in the syntax tree that knows where it came from.
pub trait Spanned {
    fn span(&self) -> Span;
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}

/// Maps byte offsets to 1-based line numbers.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(idx, _)| idx + 1),
        );
        Self { line_starts }
    }

    pub fn line(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    pub fn line_start(&self, offset: usize) -> usize {
        let line = self.line(offset);
        self.line_starts[line - 1]
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn indentation<'a>(&self, text: &'a str, offset: usize) -> &'a str {
        let start = self.line_start(offset);
        let rest = &text[start..];
        let width = rest
            .find(|ch: char| ch != ' ' && ch != '\t')
            .unwrap_or(rest.len());
        &rest[..width]
    }
}

/// Terminator of the line containing `offset`: `"\r\n"` or `"\n"`.
pub fn line_ending(text: &str, offset: usize) -> &'static str {
    let rest = &text[offset.min(text.len())..];
    match rest.find('\n') {
        Some(idx) if rest[..idx].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_numbers_are_one_based() {
        let index = LineIndex::new("a\nbc\n\nd");
        assert_eq!(index.line(0), 1);
        assert_eq!(index.line(2), 2);
        assert_eq!(index.line(3), 2);
        assert_eq!(index.line(5), 3);
        assert_eq!(index.line(6), 4);
    }

    #[test]
    fn indentation_reads_leading_tabs() {
        let text = "func f() {\n\t\tgo work()\n}";
        let index = LineIndex::new(text);
        let offset = text.find("go").unwrap();
        assert_eq!(index.indentation(text, offset), "\t\t");
    }

    #[test]
    fn line_endings_follow_the_line() {
        let text = "package p\r\nfunc f() {}\n";
        assert_eq!(line_ending(text, 0), "\r\n");
        assert_eq!(line_ending(text, 12), "\n");
        assert_eq!(line_ending("x", 0), "\n");
    }
}
