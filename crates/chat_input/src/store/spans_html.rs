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

//! Conversion from the span set to message HTML.
//!
//! Kinds map to tags as follows:
//! - `Quote`         → `<blockquote>`
//! - `Code`          → `<pre>`
//! - `TextUrl`       → `<a href="…">`
//! - `TextMention`   → `<a href="tg://user?id=…">`
//! - `CustomEmoji`   → `<emoji id="…">`
//! - `Bold`, `Italic`, `Underline`, `Strikethrough` → `<strong>`, `<em>`,
//!   `<u>`, `<del>`
//! - `Spoiler`       → `<span class="spoiler">`
//! - `Monospace`     → `<code>`
//!
//! Overlapping spans are split so the output is always well nested.

use std::cmp::Reverse;
use std::ptr;

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::AttributeStore;
use crate::span_set::segments;
use crate::{Span, SpanKind, SpanTag};

fn open_tag(kind: &SpanKind) -> String {
    match kind {
        SpanKind::Bold => "<strong>".to_owned(),
        SpanKind::Italic => "<em>".to_owned(),
        SpanKind::Monospace => "<code>".to_owned(),
        SpanKind::Strikethrough => "<del>".to_owned(),
        SpanKind::Underline => "<u>".to_owned(),
        SpanKind::Spoiler => "<span class=\"spoiler\">".to_owned(),
        SpanKind::Code => "<pre>".to_owned(),
        SpanKind::Quote => "<blockquote>".to_owned(),
        SpanKind::TextUrl(url) => {
            format!("<a href=\"{}\">", encode_double_quoted_attribute(url))
        }
        SpanKind::TextMention(peer) => {
            format!("<a href=\"tg://user?id={peer}\">")
        }
        SpanKind::CustomEmoji(id) => format!("<emoji id=\"{id}\">"),
    }
}

fn close_tag(kind: &SpanKind) -> &'static str {
    match kind {
        SpanKind::Bold => "</strong>",
        SpanKind::Italic => "</em>",
        SpanKind::Monospace => "</code>",
        SpanKind::Strikethrough => "</del>",
        SpanKind::Underline => "</u>",
        SpanKind::Spoiler => "</span>",
        SpanKind::Code => "</pre>",
        SpanKind::Quote => "</blockquote>",
        SpanKind::TextUrl(_) | SpanKind::TextMention(_) => "</a>",
        SpanKind::CustomEmoji(_) => "</emoji>",
    }
}

fn is_block(tag: SpanTag) -> bool {
    matches!(tag, SpanTag::Quote | SpanTag::Code)
}

impl AttributeStore {
    /// Serialise the draft as message HTML.
    pub fn to_html(&self) -> String {
        let units = self.units();
        let mut out = String::new();
        let mut open: Vec<&Span> = Vec::new();

        for (range, mut covering) in segments(&self.spans, self.len()) {
            // Blocks outermost, then longer-lived spans outside shorter
            // ones so already-open tags stay open.
            covering.sort_by_key(|s| {
                (Reverse(is_block(s.tag())), s.start(), Reverse(s.end()), s.tag())
            });
            let keep = open
                .iter()
                .zip(&covering)
                .take_while(|(a, b)| ptr::eq(**a, **b))
                .count();
            for span in open.drain(keep..).rev() {
                out.push_str(close_tag(span.kind()));
            }
            for span in &covering[keep..] {
                out.push_str(&open_tag(span.kind()));
            }
            open.extend_from_slice(&covering[keep..]);
            out.push_str(&encode_text(&String::from_utf16_lossy(&units[range])));
        }
        for span in open.into_iter().rev() {
            out.push_str(close_tag(span.kind()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use peer_mentions::{Peer, PeerId};

    use crate::{AttributeStore, CustomEmojiId, Selection, Span, SpanKind};

    fn span(kind: SpanKind, range: std::ops::Range<usize>) -> Span {
        Span::new(kind, range).unwrap()
    }

    #[test]
    fn plain_text_is_escaped() {
        let store = AttributeStore::from_text("a < b & \"c\"");
        assert_eq!(store.to_html(), "a &lt; b &amp; \"c\"");
    }

    #[test]
    fn simple_formatting() {
        let store = AttributeStore::from_markdown("say **hi** to `me`");
        assert_eq!(store.to_html(), "say <strong>hi</strong> to <code>me</code>");
    }

    #[test]
    fn overlapping_spans_nest() {
        let store = AttributeStore::with_spans(
            "abcdef",
            [span(SpanKind::Bold, 0..4), span(SpanKind::Italic, 2..6)],
        );
        assert_eq!(
            store.to_html(),
            "<strong>ab<em>cd</em></strong><em>ef</em>"
        );
    }

    #[test]
    fn link_displaces_surrounding_formatting() {
        let store = AttributeStore::with_spans(
            "read the docs",
            [span(SpanKind::Italic, 0..13)],
        )
        .set_link(Selection::new(9, 13), "https://docs.rs/?a=1&b=2");
        assert_eq!(
            store.to_html(),
            "<em>read the </em><a href=\"https://docs.rs/?a=1&amp;b=2\">docs</a>"
        );
    }

    #[test]
    fn quote_and_emoji_tags() {
        let store = AttributeStore::from_text("> ")
            .insert_mention(2, &Peer::new(PeerId(5), "Ann"))
            .set_quote(Selection::new(0, 5));
        assert_eq!(
            store.to_html(),
            "<blockquote>&gt; Ann</blockquote> "
        );

        let emoji = AttributeStore::with_spans(
            "xx",
            [
                span(SpanKind::CustomEmoji(CustomEmojiId(9)), 0..1),
                span(SpanKind::CustomEmoji(CustomEmojiId(9)), 1..2),
            ],
        );
        assert_eq!(
            emoji.to_html(),
            "<emoji id=\"9\">x</emoji><emoji id=\"9\">x</emoji>"
        );
    }

    #[test]
    fn mention_inside_bold() {
        let store = AttributeStore::with_spans(
            "hi Bob",
            [
                span(SpanKind::Bold, 0..6),
                span(SpanKind::TextMention(PeerId(5)), 3..6),
            ],
        );
        assert_eq!(
            store.to_html(),
            "<strong>hi <a href=\"tg://user?id=5\">Bob</a></strong>"
        );
    }
}
