use crate::language::span::{Span, Spanned};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Edit {
    span: Span,
    text: String,
    seq: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("overlapping edits at {first} and {second}")]
pub struct EditConflict {
    pub first: Span,
    pub second: Span,
}

/// Pending replacements and insertions, each anchored to a syntax node.
///
/// Nothing touches the text until [`EditSet::apply`], which sorts the edits
/// and splices them in a single forward pass.
#[derive(Clone, Debug, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
    next_seq: usize,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn replace(&mut self, node: &impl Spanned, text: impl Into<String>) {
        self.push(node.span(), text.into());
    }

    /// Inserts `text` directly after `node`, e.g. after a block's `{`.
    pub fn insert_after(&mut self, node: &impl Spanned, text: impl Into<String>) {
        self.push(Span::empty(node.span().end), text.into());
    }

    pub fn insert_before(&mut self, node: &impl Spanned, text: impl Into<String>) {
        self.push(Span::empty(node.span().start), text.into());
    }

    /// Takes over every edit of `other`, after the ones already queued.
    pub fn extend(&mut self, other: EditSet) {
        for edit in other.sorted() {
            self.push(edit.span, edit.text);
        }
    }

    fn push(&mut self, span: Span, text: String) {
        self.edits.push(Edit {
            span,
            text,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    fn sorted(&self) -> Vec<Edit> {
        let mut edits = self.edits.clone();
        edits.sort_by_key(|edit| (edit.span.start, edit.span.end, edit.seq));
        edits
    }

    pub fn apply(&self, source: &str) -> Result<String, EditConflict> {
        self.render(source, Span::new(0, source.len()))
    }

    /// Renders `range` of `source` with only the edits inside it applied.
    pub fn render(&self, source: &str, range: Span) -> Result<String, EditConflict> {
        let edits: Vec<Edit> = self
            .sorted()
            .into_iter()
            .filter(|edit| range.contains(edit.span))
            .collect();
        check_overlaps(&edits)?;

        let mut out = String::with_capacity(range.len());
        let mut cursor = range.start;
        for edit in &edits {
            out.push_str(&source[cursor..edit.span.start]);
            out.push_str(&edit.text);
            cursor = edit.span.end;
        }
        out.push_str(&source[cursor..range.end]);
        Ok(out)
    }
}

fn check_overlaps(edits: &[Edit]) -> Result<(), EditConflict> {
    for pair in edits.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let same_replacement = !prev.span.is_empty() && prev.span == next.span;
        if next.span.start < prev.span.end || same_replacement {
            return Err(EditConflict {
                first: prev.span,
                second: next.span,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_edits_in_position_order() {
        let source = "a(b, c)";
        let mut edits = EditSet::new();
        edits.replace(&Span::new(5, 6), "z");
        edits.replace(&Span::new(2, 3), "y");
        assert_eq!(edits.apply(source).expect("apply"), "a(y, z)");
    }

    #[test]
    fn insertions_at_one_point_keep_queue_order() {
        let source = "{}";
        let mut edits = EditSet::new();
        edits.insert_after(&Span::new(0, 1), "1");
        edits.insert_after(&Span::new(0, 1), "2");
        assert_eq!(edits.apply(source).expect("apply"), "{12}");
    }

    #[test]
    fn insertion_touching_a_replacement_is_fine() {
        let source = "abc";
        let mut edits = EditSet::new();
        edits.replace(&Span::new(0, 1), "X");
        edits.insert_after(&Span::new(0, 1), "+");
        assert_eq!(edits.apply(source).expect("apply"), "X+bc");
    }

    #[test]
    fn overlapping_replacements_conflict() {
        let mut edits = EditSet::new();
        edits.replace(&Span::new(0, 4), "x");
        edits.replace(&Span::new(2, 6), "y");
        let err = edits.apply("abcdefgh").unwrap_err();
        assert_eq!(err.first, Span::new(0, 4));
        assert_eq!(err.second, Span::new(2, 6));
    }

    #[test]
    fn identical_replacements_conflict() {
        let mut edits = EditSet::new();
        edits.replace(&Span::new(1, 2), "x");
        edits.replace(&Span::new(1, 2), "y");
        assert!(edits.apply("abc").is_err());
    }

    #[test]
    fn render_uses_only_edits_in_range() {
        let source = "go work(ctx) // ctx";
        let mut edits = EditSet::new();
        edits.replace(&Span::new(8, 11), "detachedCtx");
        edits.replace(&Span::new(16, 19), "other");
        let rendered = edits.render(source, Span::new(3, 12)).expect("render");
        assert_eq!(rendered, "work(detachedCtx)");
    }

    #[test]
    fn extend_merges_edit_sets() {
        let mut outer = EditSet::new();
        outer.insert_after(&Span::new(0, 1), "<");
        let mut inner = EditSet::new();
        inner.replace(&Span::new(1, 2), "B");
        outer.extend(inner);
        assert_eq!(outer.len(), 2);
        assert_eq!(outer.apply("ab").expect("apply"), "a<B");
    }
}
