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

//! Range arithmetic over plain span lists.
//!
//! These helpers keep no invariants of their own; the store calls
//! [`canonicalize`] once an operation has finished rewriting its list.

use std::ops::Range;

use crate::{Span, SpanKind};

/// Remove `range` from every span matching `pred`, keeping the parts that
/// stick out on either side.
pub(crate) fn carve_out<F>(spans: &mut Vec<Span>, range: &Range<usize>, pred: F)
where
    F: Fn(&SpanKind) -> bool,
{
    if range.start >= range.end {
        return;
    }
    let mut carved = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        if !pred(span.kind()) || !span.intersects(range) {
            carved.push(span);
            continue;
        }
        if let Some(left) = span.with_range(span.start()..range.start) {
            carved.push(left);
        }
        if let Some(right) = span.with_range(range.end..span.end()) {
            carved.push(right);
        }
    }
    *spans = carved;
}

/// Adjust spans for `range` being replaced by `inserted_len` new units.
///
/// A span strictly containing a pure insertion point grows over the new
/// text; insertions at either boundary of a span leave it alone. Deleted
/// units are clipped out and spans that lose everything are dropped.
pub(crate) fn apply_replacement(
    spans: &mut Vec<Span>,
    range: &Range<usize>,
    inserted_len: usize,
) {
    let removed = range.end - range.start;
    let shift = |pos: usize| pos - removed + inserted_len;
    let mut adjusted = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        let (start, end) = (span.start(), span.end());
        let new_range = if end <= range.start {
            start..end
        } else if start >= range.end {
            shift(start)..shift(end)
        } else if start < range.start && end > range.end {
            start..shift(end)
        } else if start < range.start {
            start..range.start
        } else if end > range.end {
            range.start + inserted_len..shift(end)
        } else {
            continue;
        };
        if let Some(span) = span.with_range(new_range) {
            adjusted.push(span);
        }
    }
    *spans = adjusted;
}

/// Merge overlapping or adjacent spans of the same kind. Only meaningful
/// for kinds where a single span per run is wanted.
pub(crate) fn merge_touching(spans: &mut Vec<Span>, kind: &SpanKind) {
    let (mut same, mut rest): (Vec<Span>, Vec<Span>) =
        spans.drain(..).partition(|s| s.kind() == kind);
    same.sort();
    let mut merged: Vec<Span> = Vec::with_capacity(same.len());
    for span in same {
        match merged.last_mut() {
            Some(last) if span.start() <= last.end() => {
                if span.end() > last.end() {
                    if let Some(grown) = last.with_range(last.start()..span.end()) {
                        *last = grown;
                    }
                }
            }
            _ => merged.push(span),
        }
    }
    rest.extend(merged);
    *spans = rest;
}

/// Mentions and links may not share units: where they overlap, the span
/// that starts first keeps the contested units.
pub(crate) fn resolve_addressing_overlaps(spans: &mut Vec<Span>) {
    let (mut addressing, mut rest): (Vec<Span>, Vec<Span>) =
        spans.drain(..).partition(|s| s.kind().is_addressing());
    addressing.sort();
    let mut covered_to = 0;
    for span in addressing {
        let start = span.start().max(covered_to);
        if let Some(span) = span.with_range(start..span.end()) {
            covered_to = span.end();
            rest.push(span);
        }
    }
    *spans = rest;
}

/// Split `0..len` at every span boundary, pairing each non-empty piece with
/// the spans covering it.
pub(crate) fn segments(spans: &[Span], len: usize) -> Vec<(Range<usize>, Vec<&Span>)> {
    let mut bounds: Vec<usize> = spans
        .iter()
        .flat_map(|s| [s.start(), s.end()])
        .filter(|b| *b <= len)
        .chain([0, len])
        .collect();
    bounds.sort_unstable();
    bounds.dedup();
    bounds
        .windows(2)
        .map(|w| {
            let range = w[0]..w[1];
            let covering =
                spans.iter().filter(|s| s.covers(&range)).collect();
            (range, covering)
        })
        .collect()
}

/// Clip spans to `0..len`, sort them and drop exact duplicates.
pub(crate) fn canonicalize(spans: &mut Vec<Span>, len: usize) {
    let clipped: Vec<Span> = spans
        .drain(..)
        .filter_map(|s| s.with_range(s.start().min(len)..s.end().min(len)))
        .collect();
    *spans = clipped;
    spans.sort();
    spans.dedup();
}

/// Whether every unit of `range` is covered by a single span of `kind`.
pub(crate) fn covered_by_one(
    spans: &[Span],
    kind: &SpanKind,
    range: &Range<usize>,
) -> bool {
    spans.iter().any(|s| s.kind() == kind && s.covers(range))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(kind: SpanKind, range: Range<usize>) -> Span {
        Span::new(kind, range).unwrap()
    }

    fn ranges(spans: &[Span]) -> Vec<Range<usize>> {
        spans.iter().map(Span::range).collect()
    }

    #[test]
    fn carving_splits_a_covering_span() {
        let mut spans = vec![span(SpanKind::Bold, 0..10)];
        carve_out(&mut spans, &(3..5), |_| true);
        assert_eq!(ranges(&spans), vec![0..3, 5..10]);
    }

    #[test]
    fn carving_only_touches_matching_kinds() {
        let mut spans = vec![
            span(SpanKind::Bold, 0..4),
            span(SpanKind::Italic, 0..4),
        ];
        carve_out(&mut spans, &(0..4), |k| *k == SpanKind::Italic);
        assert_eq!(spans, vec![span(SpanKind::Bold, 0..4)]);
    }

    #[test]
    fn insertion_inside_a_span_grows_it() {
        let mut spans = vec![span(SpanKind::Bold, 2..6)];
        apply_replacement(&mut spans, &(4..4), 3);
        assert_eq!(ranges(&spans), vec![2..9]);
    }

    #[test]
    fn insertion_at_a_boundary_does_not_grow() {
        let mut spans =
            vec![span(SpanKind::Bold, 2..6), span(SpanKind::Italic, 6..8)];
        apply_replacement(&mut spans, &(6..6), 2);
        assert_eq!(ranges(&spans), vec![2..6, 8..10]);
    }

    #[test]
    fn deletion_clips_and_drops() {
        let mut spans = vec![
            span(SpanKind::Bold, 0..4),
            span(SpanKind::Italic, 3..5),
            span(SpanKind::Underline, 4..10),
        ];
        apply_replacement(&mut spans, &(2..6), 0);
        assert_eq!(ranges(&spans), vec![0..2, 2..6]);
        assert_eq!(spans[1].kind(), &SpanKind::Underline);
    }

    #[test]
    fn replacement_places_tail_after_new_text() {
        let mut spans = vec![span(SpanKind::Spoiler, 3..8)];
        apply_replacement(&mut spans, &(1..5), 1);
        assert_eq!(ranges(&spans), vec![2..5]);
    }

    #[test]
    fn merging_joins_adjacent_and_overlapping_runs() {
        let mut spans = vec![
            span(SpanKind::Bold, 0..3),
            span(SpanKind::Bold, 3..5),
            span(SpanKind::Bold, 4..8),
            span(SpanKind::Bold, 10..12),
            span(SpanKind::Italic, 5..10),
        ];
        merge_touching(&mut spans, &SpanKind::Bold);
        canonicalize(&mut spans, 12);
        assert_eq!(ranges(&spans), vec![0..8, 5..10, 10..12]);
    }

    #[test]
    fn canonicalize_clips_to_text_length() {
        let mut spans = vec![
            span(SpanKind::Bold, 2..9),
            span(SpanKind::Bold, 2..9),
            span(SpanKind::Italic, 6..9),
        ];
        canonicalize(&mut spans, 5);
        assert_eq!(spans, vec![span(SpanKind::Bold, 2..5)]);
    }

    #[test]
    fn earlier_addressing_span_keeps_contested_units() {
        use peer_mentions::PeerId;

        let mut spans = vec![
            span(SpanKind::TextUrl("https://a.org".into()), 2..8),
            span(SpanKind::TextMention(PeerId(1)), 0..4),
            span(SpanKind::TextMention(PeerId(2)), 3..5),
            span(SpanKind::Bold, 0..8),
        ];
        resolve_addressing_overlaps(&mut spans);
        canonicalize(&mut spans, 8);
        assert_eq!(
            spans,
            vec![
                span(SpanKind::Bold, 0..8),
                span(SpanKind::TextMention(PeerId(1)), 0..4),
                span(SpanKind::TextUrl("https://a.org".into()), 4..8),
            ]
        );
    }

    #[test]
    fn segments_split_at_every_boundary() {
        let spans = vec![span(SpanKind::Bold, 1..4), span(SpanKind::Italic, 3..6)];
        let pieces: Vec<(Range<usize>, usize)> = segments(&spans, 7)
            .into_iter()
            .map(|(r, covering)| (r, covering.len()))
            .collect();
        assert_eq!(
            pieces,
            vec![(0..1, 0), (1..3, 1), (3..4, 2), (4..6, 1), (6..7, 0)]
        );
        assert!(segments(&[], 0).is_empty());
    }
}
