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

//! Re-derivation of mention, link and quote boundaries after raw edits.
//!
//! Each [`Family`] is normalised on its own: spans are trimmed to characters
//! that may carry them, grown back over adjacent word characters, merged
//! with equal neighbours and de-duplicated. The pipeline runs mentions,
//! then links, then quotes, each pass reading the previous pass's output,
//! and repeats until no pass changes anything. Mentions and links never
//! grow, merge or stay across each other.

use std::collections::HashSet;
use std::ops::Range;

use tracing::{debug, trace};

use crate::span_set::carve_out;
use crate::text::{classify_units, CharClass};
use crate::{Span, SpanKind};

/// A pass settles in one or two rounds; this only bounds pathological input.
const MAX_ROUNDS: usize = 8;

/// The span kinds whose boundaries are re-derived after raw edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Mention,
    Link,
    Quote,
}

/// Order in which [`normalize`] runs the families.
pub const PIPELINE: [Family; 3] = [Family::Mention, Family::Link, Family::Quote];

impl Family {
    pub fn claims(self, kind: &SpanKind) -> bool {
        match self {
            Self::Mention => matches!(kind, SpanKind::TextMention(_)),
            Self::Link => matches!(kind, SpanKind::TextUrl(_)),
            Self::Quote => matches!(kind, SpanKind::Quote),
        }
    }

    /// Spans of other families this one must not grow into.
    fn blocked_by(self, kind: &SpanKind) -> bool {
        match self {
            Self::Mention => Self::Link.claims(kind),
            Self::Link => Self::Mention.claims(kind),
            Self::Quote => false,
        }
    }

    /// Characters a span may keep at its ends.
    fn valid(self, class: CharClass) -> bool {
        match self {
            Self::Mention | Self::Quote => class.alphanumeric || class.space,
            Self::Link => {
                class.alphanumeric
                    || class.symbol
                    || class.punctuation
                    || class.is_whitespace()
            }
        }
    }

    /// Characters a span may grow over.
    fn edge(self, class: CharClass) -> bool {
        match self {
            Self::Mention => class.alphanumeric,
            Self::Link => class.alphanumeric || class.symbol || class.punctuation,
            Self::Quote => self.valid(class),
        }
    }

    /// Characters that may sit between two spans that get merged.
    fn connecting(self, class: CharClass) -> bool {
        self.valid(class)
    }

    /// Whether a payload may tag only one span.
    fn deduplicates(self) -> bool {
        !matches!(self, Self::Quote)
    }
}

/// Run the whole pipeline until it settles. Returns `None` when no family
/// changed.
pub fn normalize(units: &[u16], spans: &[Span]) -> Option<Vec<Span>> {
    let mut current: Option<Vec<Span>> = None;
    for _ in 0..MAX_ROUNDS {
        let mut changed = false;
        for family in PIPELINE {
            let input = current.as_deref().unwrap_or(spans);
            if let Some(next) = normalize_family(units, input, family) {
                current = Some(next);
                changed = true;
            }
        }
        if !changed {
            return current;
        }
    }
    debug!("normalisation pipeline did not settle");
    current
}

/// Normalise a single family, leaving other spans untouched. Returns `None`
/// when the family's spans are already normal.
pub fn normalize_family(
    units: &[u16],
    spans: &[Span],
    family: Family,
) -> Option<Vec<Span>> {
    let (mut own, others): (Vec<Span>, Vec<Span>) =
        spans.iter().cloned().partition(|s| family.claims(s.kind()));
    if own.is_empty() {
        return None;
    }
    own.sort();

    let classes = classify_units(units);
    let blockers: Vec<Range<usize>> = others
        .iter()
        .filter(|s| family.blocked_by(s.kind()))
        .map(Span::range)
        .collect();

    // Units held by the other addressing family are off limits.
    let mut result = own.clone();
    for blocker in &blockers {
        carve_out(&mut result, blocker, |_| true);
    }
    result.sort();
    let mut settled = false;
    for _ in 0..MAX_ROUNDS {
        let next = normalize_round(&classes, &result, &blockers, family);
        if next == result {
            settled = true;
            break;
        }
        result = next;
    }
    if !settled {
        debug!(?family, "normalisation did not settle");
    }

    if result == own {
        return None;
    }
    trace!(?family, before = own.len(), after = result.len(), "normalised");
    let mut combined = others;
    combined.extend(result);
    combined.sort();
    Some(combined)
}

/// One round of trim, grow, merge and de-duplicate over sorted spans.
fn normalize_round(
    classes: &[CharClass],
    spans: &[Span],
    blockers: &[Range<usize>],
    family: Family,
) -> Vec<Span> {
    let len = classes.len();

    let shrunk: Vec<Span> = spans
        .iter()
        .filter_map(|span| {
            let mut start = span.start().min(len);
            let mut end = span.end().min(len);
            while start < end && !family.valid(classes[start]) {
                start += 1;
            }
            while end > start && !family.valid(classes[end - 1]) {
                end -= 1;
            }
            let trimmed = span.with_range(start..end);
            if trimmed.is_none() {
                debug!(?family, range = ?span.range(), "dropping collapsed span");
            }
            trimmed
        })
        .collect();

    let mut grown: Vec<Span> = Vec::with_capacity(shrunk.len());
    for (i, span) in shrunk.iter().enumerate() {
        let mut left_limit = grown.last().map_or(0, Span::end);
        let mut right_limit = shrunk.get(i + 1).map_or(len, Span::start);
        for blocker in blockers {
            if blocker.end <= span.start() {
                left_limit = left_limit.max(blocker.end);
            }
            if blocker.start >= span.end() {
                right_limit = right_limit.min(blocker.start);
            }
        }
        let mut start = span.start();
        let mut end = span.end();
        while start > left_limit && family.edge(classes[start - 1]) {
            start -= 1;
        }
        while end < right_limit && family.edge(classes[end]) {
            end += 1;
        }
        if let Some(span) = span.with_range(start..end) {
            grown.push(span);
        }
    }

    let mut merged: Vec<Span> = Vec::with_capacity(grown.len());
    for span in grown {
        let Some(last) = merged.last_mut() else {
            merged.push(span);
            continue;
        };
        let gap = last.end()..span.start();
        let connected = span.start() <= last.end()
            || (classes[gap.clone()].iter().all(|c| family.connecting(*c))
                && !blockers
                    .iter()
                    .any(|b| b.start < gap.end && gap.start < b.end));
        if last.kind() == span.kind() && connected {
            let end = last.end().max(span.end());
            if let Some(joined) = last.with_range(last.start()..end) {
                *last = joined;
            }
        } else if span.start() < last.end() {
            // Different payloads may not share units; the earlier span wins.
            if let Some(rest) = span.with_range(last.end()..span.end()) {
                merged.push(rest);
            }
        } else {
            merged.push(span);
        }
    }

    if family.deduplicates() {
        let mut seen = HashSet::new();
        merged.retain(|span| seen.insert(span.kind().clone()));
    }
    merged
}
