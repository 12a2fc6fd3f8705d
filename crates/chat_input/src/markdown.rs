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

//! Markdown shorthand promotion.
//!
//! A hand-written, single left-to-right pass over the UTF-16 buffer that
//! turns delimiter pairs into spans and deletes the delimiters:
//!
//! | Shorthand            | Kind            |
//! |----------------------|-----------------|
//! | ```` ```code``` ```` | `Code` (3 or 4 backticks, may span lines) |
//! | ``` ``code`` ```     | `Code`          |
//! | `` `mono` ``         | `Monospace`     |
//! | `**bold**`           | `Bold`          |
//! | `__italic__`         | `Italic`        |
//! | `~~strike~~`         | `Strikethrough` |
//! | `\|\|spoiler\|\|`    | `Spoiler`       |
//!
//! An opening delimiter must follow the start of the text or whitespace; a
//! closing delimiter must precede whitespace, punctuation or the end of the
//! text. Inline pairs never span a newline. A pair whose interior already
//! carries rich formatting is left alone, as is anything unterminated.

use std::ops::Range;

use tracing::{debug, trace};

use crate::span_set::apply_replacement;
use crate::text::{char_at, char_before, CharClass};
use crate::{Span, SpanKind};

const BACKTICK: u16 = b'`' as u16;
const NEWLINE: u16 = b'\n' as u16;

/// Characters that open and close a doubled inline pair.
const PAIRS: [(u16, SpanKind); 4] = [
    (b'*' as u16, SpanKind::Bold),
    (b'_' as u16, SpanKind::Italic),
    (b'~' as u16, SpanKind::Strikethrough),
    (b'|' as u16, SpanKind::Spoiler),
];

/// A recognised delimiter pair, before the interior has been checked.
#[derive(Debug)]
struct Candidate {
    open: Range<usize>,
    close: Range<usize>,
    kind: SpanKind,
}

impl Candidate {
    fn interior(&self) -> Range<usize> {
        self.open.end..self.close.start
    }
}

/// Buffer and spans after promotion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Promoted {
    pub units: Vec<u16>,
    pub spans: Vec<Span>,
    /// Number of delimiter pairs converted.
    pub converted: usize,
    removed: Vec<Range<usize>>,
}

impl Promoted {
    /// Carry a position in the original buffer across the delimiter
    /// deletions. Positions inside a deleted delimiter land on its start.
    pub fn map_position(&self, pos: usize) -> usize {
        self.removed.iter().fold(pos, |pos, r| {
            if pos >= r.end {
                pos - r.len()
            } else {
                pos.min(r.start)
            }
        })
    }
}

/// Promote every recognised shorthand in `units`. Returns `None` if nothing
/// was converted.
pub fn promote(units: &[u16], spans: &[Span]) -> Option<Promoted> {
    let mut units = units.to_vec();
    let mut spans = spans.to_vec();
    let mut converted = 0;
    let mut removed = Vec::new();
    let mut pos = 0;

    while pos < units.len() {
        if !opens_at(&units, pos) {
            pos += 1;
            continue;
        }
        let Some(candidate) = find_candidate(&units, pos) else {
            pos += delimiter_len(&units, pos);
            continue;
        };
        let interior = candidate.interior();
        if spans
            .iter()
            .any(|s| s.kind().is_formatting() && s.intersects(&interior))
        {
            debug!(?interior, "markdown interior already formatted; leaving it");
            pos = candidate.close.end;
            continue;
        }

        trace!(kind = ?candidate.kind, ?interior, "promoting markdown");
        // Closing delimiter first so the opening offsets stay valid.
        units.drain(candidate.close.clone());
        apply_replacement(&mut spans, &candidate.close, 0);
        units.drain(candidate.open.clone());
        apply_replacement(&mut spans, &candidate.open, 0);
        removed.push(candidate.close.clone());
        removed.push(candidate.open.clone());

        let start = candidate.open.start;
        let end = start + interior.len();
        if let Ok(span) = Span::new(candidate.kind, start..end) {
            spans.push(span);
        }
        converted += 1;
        pos = end;
    }

    if converted == 0 {
        return None;
    }
    spans.sort();
    Some(Promoted {
        units,
        spans,
        converted,
        removed,
    })
}

/// A delimiter may open at `pos` only after whitespace or at the start.
fn opens_at(units: &[u16], pos: usize) -> bool {
    let first = units[pos];
    let is_delimiter =
        first == BACKTICK || PAIRS.iter().any(|(c, _)| *c == first);
    is_delimiter
        && char_before(units, pos)
            .map_or(true, |c| CharClass::of(c).is_whitespace())
}

/// A delimiter may close if followed by whitespace, punctuation or the end.
fn closes_before(units: &[u16], pos: usize) -> bool {
    if pos >= units.len() {
        return true;
    }
    char_at(units, pos).is_some_and(|c| {
        let class = CharClass::of(c);
        class.is_whitespace() || class.punctuation
    })
}

/// Length of the run of `unit` starting at `pos`.
fn run_len(units: &[u16], pos: usize, unit: u16) -> usize {
    units[pos..].iter().take_while(|u| **u == unit).count()
}

/// How far to skip when nothing opens at `pos`.
fn delimiter_len(units: &[u16], pos: usize) -> usize {
    if units[pos] == BACKTICK {
        run_len(units, pos, BACKTICK)
    } else {
        1
    }
}

fn find_candidate(units: &[u16], pos: usize) -> Option<Candidate> {
    if units[pos] == BACKTICK {
        let run = run_len(units, pos, BACKTICK);
        let kind = match run {
            1 => SpanKind::Monospace,
            2..=4 => SpanKind::Code,
            _ => return None,
        };
        let multiline = run >= 3;
        let close = find_backtick_close(units, pos + run, run, multiline)?;
        return Some(Candidate {
            open: pos..pos + run,
            close,
            kind,
        });
    }

    let (unit, kind) = PAIRS.iter().find(|(c, _)| *c == units[pos])?;
    let content_start = pos + 2;
    if units.get(pos + 1) != Some(unit) || units.get(content_start) == Some(unit)
    {
        return None;
    }
    // `2 ** 3` is arithmetic, not an opening delimiter.
    if char_at(units, content_start)
        .map_or(true, |c| CharClass::of(c).is_whitespace())
    {
        return None;
    }
    // Content must be non-empty, so the earliest close starts one unit in.
    let mut j = content_start + 1;
    while j + 1 < units.len() {
        match units[j] {
            NEWLINE => return None,
            u if u == *unit
                && units[j + 1] == *unit
                && closes_before(units, j + 2) =>
            {
                return Some(Candidate {
                    open: pos..content_start,
                    close: j..j + 2,
                    kind: kind.clone(),
                });
            }
            _ => j += 1,
        }
    }
    None
}

/// Find a closing run of exactly `run` backticks after non-empty content.
fn find_backtick_close(
    units: &[u16],
    content_start: usize,
    run: usize,
    multiline: bool,
) -> Option<Range<usize>> {
    let mut j = content_start + 1;
    while j < units.len() {
        match units[j] {
            NEWLINE if !multiline => return None,
            BACKTICK => {
                let len = run_len(units, j, BACKTICK);
                if len == run && closes_before(units, j + len) {
                    return Some(j..j + len);
                }
                j += len;
            }
            _ => j += 1,
        }
    }
    None
}
