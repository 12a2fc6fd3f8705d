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

use std::collections::BTreeSet;

use tracing::{debug, trace};
use widestring::{Utf16Str, Utf16String};

use crate::span_set::{
    canonicalize, merge_touching, resolve_addressing_overlaps, segments,
};
use crate::text::snap_to_char_boundary;
use crate::{Selection, Span, SpanKind};

/// A draft with its attribute spans and selection.
///
/// All offsets are UTF-16 code units. Spans are kept sorted by start, then
/// end; boolean kinds never overlap themselves and mentions never overlap
/// links.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeStore {
    pub(crate) text: Utf16String,
    pub(crate) spans: Vec<Span>,
    pub(crate) selection: Selection,
}

impl AttributeStore {
    /// An empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// A draft holding `text` with no spans and the caret at the end.
    pub fn from_text(text: &str) -> Self {
        let text = Utf16String::from_str(text);
        let selection = Selection::caret(text.len());
        Self {
            text,
            spans: Vec::new(),
            selection,
        }
    }

    /// A draft restored from stored text and spans. Spans are clipped to the
    /// text, same-kind boolean spans are merged and overlapping mention/link
    /// spans are resolved in favour of the earlier one.
    pub fn with_spans(
        text: &str,
        spans: impl IntoIterator<Item = Span>,
    ) -> Self {
        let mut store = Self::from_text(text);
        store.spans = spans.into_iter().collect();
        store.finish();
        store
    }

    pub fn text(&self) -> &Utf16Str {
        &self.text
    }

    pub fn plain_text(&self) -> String {
        self.text.to_string()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Spans whose kind equals `kind`, in order.
    pub fn spans_of<'a>(
        &'a self,
        kind: &'a SpanKind,
    ) -> impl Iterator<Item = &'a Span> + 'a {
        self.spans.iter().filter(move |s| s.kind() == kind)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Length of the draft in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn units(&self) -> &[u16] {
        self.text.as_slice()
    }

    /// Replace the buffer. Lone surrogates become U+FFFD, which keeps every
    /// offset valid.
    pub(crate) fn set_units(&mut self, units: &[u16]) {
        self.text = Utf16String::from_str(&String::from_utf16_lossy(units));
    }

    /// Clamp into the text and move both ends off surrogate-pair middles.
    pub(crate) fn clamp_selection(&self, selection: Selection) -> Selection {
        let units = self.units();
        if let Err(err) = selection.checked_within(units.len()) {
            debug!(%err, "selection outside the text");
        }
        let clamped = Selection::new(
            snap_to_char_boundary(units, selection.start),
            snap_to_char_boundary(units, selection.end),
        );
        if clamped != selection {
            debug!(?selection, ?clamped, len = units.len(), "selection clamped");
        }
        clamped
    }

    pub(crate) fn clamp_position(&self, pos: usize) -> usize {
        self.clamp_selection(Selection::caret(pos)).start
    }

    /// Restore the span invariants after an operation.
    pub(crate) fn finish(&mut self) {
        let len = self.len();
        let boolean_kinds: BTreeSet<SpanKind> = self
            .spans
            .iter()
            .map(Span::kind)
            .filter(|k| k.is_boolean())
            .cloned()
            .collect();
        for kind in &boolean_kinds {
            merge_touching(&mut self.spans, kind);
        }
        resolve_addressing_overlaps(&mut self.spans);
        canonicalize(&mut self.spans, len);
        self.selection = self.selection.clamped(len);
        trace!(spans = self.spans.len(), len, "store settled");

        #[cfg(feature = "assert-invariants")]
        self.explicitly_assert_invariants();
    }

    /// Panic if any span invariant is broken.
    pub fn explicitly_assert_invariants(&self) {
        let len = self.len();
        for span in &self.spans {
            assert!(
                span.start() < span.end() && span.end() <= len,
                "span {span:?} outside text of length {len}"
            );
        }
        for pair in self.spans.windows(2) {
            assert!(pair[0] <= pair[1], "spans out of order: {pair:?}");
        }
        let mut addressing: Vec<&Span> = self
            .spans
            .iter()
            .filter(|s| s.kind().is_addressing())
            .collect();
        addressing.sort();
        for pair in addressing.windows(2) {
            assert!(
                pair[0].end() <= pair[1].start(),
                "mention and link spans overlap: {pair:?}"
            );
        }
        for (i, a) in self.spans.iter().enumerate() {
            if !a.kind().is_boolean() {
                continue;
            }
            for b in &self.spans[i + 1..] {
                assert!(
                    a.kind() != b.kind() || a.end() < b.start(),
                    "{a:?} overlaps or touches {b:?}"
                );
            }
        }
        assert!(
            self.selection.end <= len,
            "selection {:?} outside text of length {len}",
            self.selection
        );
    }

    /// Return a debug tree representation of the draft.
    pub fn to_tree(&self) -> String {
        let Selection { start, end } = self.selection;
        let mut out = format!("sel: ({start},{end})\n");
        let pieces = segments(&self.spans, self.len());
        if pieces.is_empty() {
            out.push_str("(empty)\n");
            return out;
        }
        let last = pieces.len() - 1;
        for (i, (range, covering)) in pieces.into_iter().enumerate() {
            let branch = if i == last { "└─" } else { "├─" };
            let text = String::from_utf16_lossy(&self.units()[range]);
            let marks: Vec<String> =
                covering.iter().map(|s| describe(s.kind())).collect();
            if marks.is_empty() {
                out.push_str(&format!("{branch} {text:?}\n"));
            } else {
                out.push_str(&format!(
                    "{branch} {text:?} [{}]\n",
                    marks.join(", ")
                ));
            }
        }
        out
    }
}

fn describe(kind: &SpanKind) -> String {
    let name = kind.tag().mark_name();
    match kind {
        SpanKind::TextMention(peer) => format!("{name}={peer}"),
        SpanKind::TextUrl(url) => format!("{name}=\"{url}\""),
        SpanKind::CustomEmoji(id) => format!("{name}={id}"),
        _ => name.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use peer_mentions::PeerId;
    use speculoos::assert_that;
    use speculoos::prelude::*;

    use super::*;

    fn span(kind: SpanKind, range: std::ops::Range<usize>) -> Span {
        Span::new(kind, range).unwrap()
    }

    #[test]
    fn new_store_is_empty() {
        let store = AttributeStore::new();
        assert!(store.is_empty());
        assert_that!(store.spans().len()).is_equal_to(0);
        assert_eq!(store.selection(), Selection::caret(0));
    }

    #[test]
    fn from_text_puts_caret_at_end() {
        let store = AttributeStore::from_text("héllo 😀");
        assert_eq!(store.len(), 8);
        assert_eq!(store.selection(), Selection::caret(8));
        assert_eq!(store.plain_text(), "héllo 😀");
    }

    #[test]
    fn with_spans_clips_and_merges() {
        let store = AttributeStore::with_spans(
            "hello world",
            [
                span(SpanKind::Bold, 0..3),
                span(SpanKind::Bold, 3..5),
                span(SpanKind::Italic, 6..40),
                span(SpanKind::Bold, 30..40),
            ],
        );
        assert_eq!(
            store.spans(),
            &[span(SpanKind::Bold, 0..5), span(SpanKind::Italic, 6..11)]
        );
        store.explicitly_assert_invariants();
    }

    #[test]
    fn with_spans_keeps_earlier_of_overlapping_mention_and_link() {
        let store = AttributeStore::with_spans(
            "Alice example",
            [
                span(SpanKind::TextMention(PeerId(3)), 0..5),
                span(SpanKind::TextUrl("https://example.com".into()), 3..13),
            ],
        );
        assert_eq!(
            store.spans(),
            &[
                span(SpanKind::TextMention(PeerId(3)), 0..5),
                span(SpanKind::TextUrl("https://example.com".into()), 5..13),
            ]
        );
        store.explicitly_assert_invariants();
    }

    #[test]
    fn selection_is_clamped_off_surrogate_middle() {
        let store = AttributeStore::from_text("a😀b");
        assert_eq!(
            store.clamp_selection(Selection::new(2, 99)),
            Selection::new(1, 4)
        );
    }

    #[test]
    fn spans_of_filters_by_kind() {
        let store = AttributeStore::with_spans(
            "one two",
            [span(SpanKind::Bold, 0..3), span(SpanKind::Italic, 4..7)],
        );
        let bold: Vec<&Span> = store.spans_of(&SpanKind::Bold).collect();
        assert_eq!(bold, vec![&span(SpanKind::Bold, 0..3)]);
    }

    // ===================================================================
    // to_tree debug output
    // ===================================================================

    #[test]
    fn to_tree_lists_runs_and_marks() {
        let store = AttributeStore::with_spans(
            "hi bob",
            [
                span(SpanKind::Bold, 0..2),
                span(SpanKind::TextMention(PeerId(9)), 3..6),
            ],
        );
        assert_eq!(
            store.to_tree(),
            indoc! {r#"
                sel: (6,6)
                ├─ "hi" [bold]
                ├─ " "
                └─ "bob" [mention=9]
            "#}
        );
    }

    #[test]
    fn to_tree_of_empty_store() {
        assert_eq!(AttributeStore::new().to_tree(), "sel: (0,0)\n(empty)\n");
    }
}
