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

//! The span model: a formatting kind attached to a range of the draft.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use peer_mentions::PeerId;
use strum_macros::{EnumDiscriminants, EnumIter};

use crate::SpanError;

/// Identity of a custom emoji whose placeholder text a span covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomEmojiId(pub i64);

impl fmt::Display for CustomEmojiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a span does to the text it covers.
///
/// Payload-free variants are boolean markers; `TextMention`, `TextUrl` and
/// `CustomEmoji` carry their payload inline and compare by value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumDiscriminants)]
#[strum_discriminants(name(SpanTag))]
#[strum_discriminants(derive(Hash, PartialOrd, Ord, EnumIter))]
pub enum SpanKind {
    Bold,
    Italic,
    Monospace,
    Strikethrough,
    Underline,
    Spoiler,
    Code,
    Quote,
    TextMention(PeerId),
    TextUrl(String),
    CustomEmoji(CustomEmojiId),
}

impl SpanKind {
    pub fn tag(&self) -> SpanTag {
        SpanTag::from(self)
    }

    /// Whether this kind is a plain on/off marker with no payload.
    pub fn is_boolean(&self) -> bool {
        self.tag().is_boolean()
    }

    /// Inline text styling; markdown shorthand never overrides these.
    pub fn is_formatting(&self) -> bool {
        self.tag().is_formatting()
    }

    /// Mentions and links never share a code unit.
    pub(crate) fn is_addressing(&self) -> bool {
        matches!(self, Self::TextMention(_) | Self::TextUrl(_))
    }
}

impl SpanTag {
    pub fn is_boolean(self) -> bool {
        !matches!(
            self,
            Self::TextMention | Self::TextUrl | Self::CustomEmoji
        )
    }

    pub fn is_formatting(self) -> bool {
        matches!(
            self,
            Self::Bold
                | Self::Italic
                | Self::Monospace
                | Self::Strikethrough
                | Self::Underline
                | Self::Spoiler
                | Self::Code
        )
    }

    /// Short lowercase name used by the tree dump.
    pub fn mark_name(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Monospace => "monospace",
            Self::Strikethrough => "strikethrough",
            Self::Underline => "underline",
            Self::Spoiler => "spoiler",
            Self::Code => "code",
            Self::Quote => "quote",
            Self::TextMention => "mention",
            Self::TextUrl => "link",
            Self::CustomEmoji => "emoji",
        }
    }
}

/// A formatting kind over a non-empty half-open range of UTF-16 units.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    kind: SpanKind,
    range: Range<usize>,
}

impl Span {
    pub fn new(kind: SpanKind, range: Range<usize>) -> Result<Self, SpanError> {
        if range.start >= range.end {
            return Err(SpanError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        Ok(Self { kind, range })
    }

    pub fn kind(&self) -> &SpanKind {
        &self.kind
    }

    pub fn tag(&self) -> SpanTag {
        self.kind.tag()
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    /// Same kind over another range, or `None` if that range is empty.
    pub(crate) fn with_range(&self, range: Range<usize>) -> Option<Self> {
        Self::new(self.kind.clone(), range).ok()
    }

    /// Shares at least one code unit with `range`.
    pub fn intersects(&self, range: &Range<usize>) -> bool {
        self.range.start < range.end && range.start < self.range.end
    }

    /// Intersects `range` or shares a boundary with it.
    pub fn touches(&self, range: &Range<usize>) -> bool {
        self.range.start <= range.end && range.start <= self.range.end
    }

    pub fn covers(&self, range: &Range<usize>) -> bool {
        self.range.start <= range.start && range.end <= self.range.end
    }
}

impl PartialOrd for Span {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Span {
    fn cmp(&self, other: &Self) -> Ordering {
        self.range
            .start
            .cmp(&other.range.start)
            .then(self.range.end.cmp(&other.range.end))
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn empty_or_reversed_ranges_are_rejected() {
        assert_eq!(
            Span::new(SpanKind::Bold, 3..3),
            Err(SpanError::InvalidRange { start: 3, end: 3 })
        );
        assert!(Span::new(SpanKind::Bold, 4..2).is_err());
        assert_eq!(Span::new(SpanKind::Bold, 2..4).unwrap().len(), 2);
    }

    #[test]
    fn spans_compare_by_value() {
        let a = Span::new(SpanKind::TextUrl("https://a.org".into()), 0..4);
        let b = Span::new(SpanKind::TextUrl("https://a.org".into()), 0..4);
        assert_eq!(a, b);
        let c = Span::new(SpanKind::TextMention(PeerId(1)), 0..4);
        let d = Span::new(SpanKind::TextMention(PeerId(2)), 0..4);
        assert_ne!(c, d);
    }

    #[test]
    fn payload_kinds_are_not_boolean() {
        let boolean: Vec<SpanTag> =
            SpanTag::iter().filter(|t| t.is_boolean()).collect();
        assert_eq!(boolean.len(), 8);
        assert!(!SpanKind::TextMention(PeerId(1)).is_boolean());
        assert!(SpanKind::Code.is_formatting());
        assert!(!SpanKind::Quote.is_formatting());
    }

    #[test]
    fn touches_includes_shared_boundaries() {
        let span = Span::new(SpanKind::Quote, 2..5).unwrap();
        assert!(span.touches(&(5..7)));
        assert!(!span.intersects(&(5..7)));
        assert!(span.intersects(&(4..7)));
        assert!(span.covers(&(2..5)));
        assert!(!span.covers(&(1..3)));
    }

    #[test]
    fn spans_sort_by_position_first() {
        let mut spans = vec![
            Span::new(SpanKind::Italic, 4..6).unwrap(),
            Span::new(SpanKind::Bold, 0..9).unwrap(),
            Span::new(SpanKind::Bold, 0..2).unwrap(),
        ];
        spans.sort();
        let ranges: Vec<_> = spans.iter().map(Span::range).collect();
        assert_eq!(ranges, vec![0..2, 0..9, 4..6]);
    }
}
