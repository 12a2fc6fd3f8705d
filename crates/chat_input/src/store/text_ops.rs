// Copyright 2026 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Raw text edits: typing, pasting and deleting.

use tracing::trace;

use super::AttributeStore;
use crate::normalize::normalize;
use crate::span_set::apply_replacement;
use crate::text::utf16_len;
use crate::Selection;

impl AttributeStore {
    /// Replace `selection` with `new_text`, leaving the caret after it.
    ///
    /// Spans are carried across the edit and the mention, link and quote
    /// spans are then re-validated against the new text.
    #[must_use]
    pub fn replace_text(&self, selection: Selection, new_text: &str) -> Self {
        let mut next = self.clone();
        let range = next.clamp_selection(selection).range();
        let inserted = next.splice(range.clone(), new_text);
        next.selection = Selection::caret(range.start + inserted);
        next.renormalize();
        next.finish();
        next
    }

    /// Replace the current selection with `new_text`.
    #[must_use]
    pub fn replace_selection(&self, new_text: &str) -> Self {
        self.replace_text(self.selection, new_text)
    }

    /// Delete the current selection, or the character before a caret.
    #[must_use]
    pub fn backspace(&self) -> Self {
        let sel = self.clamp_selection(self.selection);
        if !sel.is_empty() {
            return self.replace_text(sel, "");
        }
        if sel.start == 0 {
            return self.clone();
        }
        let start = self.clamp_position(sel.start - 1);
        self.replace_text(Selection::new(start, sel.start), "")
    }

    #[must_use]
    pub fn select(&self, selection: Selection) -> Self {
        let mut next = self.clone();
        next.selection = next.clamp_selection(selection);
        next
    }

    /// Swap `range` for `new_text` in the buffer and shift spans to match.
    /// Returns the inserted length in UTF-16 units.
    pub(crate) fn splice(
        &mut self,
        range: std::ops::Range<usize>,
        new_text: &str,
    ) -> usize {
        let mut units = self.units().to_vec();
        let inserted = utf16_len(new_text);
        trace!(?range, inserted, "splicing text");
        units.splice(range.clone(), new_text.encode_utf16());
        self.set_units(&units);
        apply_replacement(&mut self.spans, &range, inserted);
        inserted
    }

    /// Run the mention, link and quote passes over the current text.
    pub(crate) fn renormalize(&mut self) {
        if let Some(spans) = normalize(self.units(), &self.spans) {
            self.spans = spans;
        }
    }
}

#[cfg(test)]
mod tests {
    use peer_mentions::PeerId;

    use crate::{AttributeStore, Selection, Span, SpanKind};

    fn span(kind: SpanKind, range: std::ops::Range<usize>) -> Span {
        Span::new(kind, range).unwrap()
    }

    fn bold_hello() -> AttributeStore {
        AttributeStore::with_spans("hello world", [span(SpanKind::Bold, 0..5)])
    }

    #[test]
    fn typing_inside_a_span_extends_it() {
        let store = bold_hello().replace_text(Selection::caret(2), "XY");
        assert_eq!(store.plain_text(), "heXYllo world");
        assert_eq!(store.spans(), &[span(SpanKind::Bold, 0..7)]);
        assert_eq!(store.selection(), Selection::caret(4));
    }

    #[test]
    fn typing_at_span_end_is_not_formatted() {
        let store = bold_hello().replace_text(Selection::caret(5), "!");
        assert_eq!(store.plain_text(), "hello! world");
        assert_eq!(store.spans(), &[span(SpanKind::Bold, 0..5)]);
    }

    #[test]
    fn typing_before_a_span_shifts_it() {
        let store = bold_hello().replace_text(Selection::caret(0), ">> ");
        assert_eq!(store.spans(), &[span(SpanKind::Bold, 3..8)]);
    }

    #[test]
    fn deleting_across_a_span_clips_it() {
        let store = bold_hello().replace_text(Selection::new(3, 8), "");
        assert_eq!(store.plain_text(), "helrld");
        assert_eq!(store.spans(), &[span(SpanKind::Bold, 0..3)]);
    }

    #[test]
    fn deleting_a_whole_span_drops_it() {
        let store = bold_hello().replace_text(Selection::new(0, 6), "");
        assert_eq!(store.plain_text(), "world");
        assert!(store.spans().is_empty());
    }

    #[test]
    fn editing_a_mention_renormalizes_it() {
        let store = AttributeStore::with_spans(
            "hi Alice",
            [span(SpanKind::TextMention(PeerId(1)), 3..8)],
        );
        let store = store.replace_text(Selection::caret(8), ", ok");
        assert_eq!(store.plain_text(), "hi Alice, ok");
        assert_eq!(
            store.spans(),
            &[span(SpanKind::TextMention(PeerId(1)), 3..8)]
        );

        let store = store.replace_text(Selection::new(3, 8), "");
        assert_eq!(store.plain_text(), "hi , ok");
        assert!(store.spans().is_empty());
    }

    #[test]
    fn replace_selection_uses_current_selection() {
        let store = AttributeStore::from_text("cat")
            .select(Selection::new(0, 1))
            .replace_selection("b");
        assert_eq!(store.plain_text(), "bat");
        assert_eq!(store.selection(), Selection::caret(1));
    }

    #[test]
    fn backspace_removes_a_whole_surrogate_pair() {
        let store = AttributeStore::from_text("a😀").backspace();
        assert_eq!(store.plain_text(), "a");
        let store = AttributeStore::from_text("").backspace();
        assert_eq!(store.plain_text(), "");
    }

    #[test]
    fn out_of_range_edits_are_clamped() {
        let store = AttributeStore::from_text("abc")
            .replace_text(Selection::new(2, 50), "Z");
        assert_eq!(store.plain_text(), "abZ");
        assert_eq!(store.selection(), Selection::caret(3));
    }
}
