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

//! Block quotes.

use std::ops::Range;

use tracing::trace;

use super::AttributeStore;
use crate::span_set::carve_out;
use crate::{Selection, Span, SpanKind};

const NEWLINE: u16 = b'\n' as u16;

impl AttributeStore {
    /// Quote `selection`. A collapsed selection leaves the store unchanged.
    ///
    /// The range is widened over every quote it touches and becomes one
    /// quote span; all other kinds inside it are removed.
    #[must_use]
    pub fn set_quote(&self, selection: Selection) -> Self {
        let sel = self.clamp_selection(selection);
        if sel.is_empty() {
            trace!(?sel, "nothing to quote");
            return self.clone();
        }
        let mut next = self.clone();
        next.selection = sel;
        next.quote_range(sel.range());
        next
    }

    /// Quote the whole line the caret sits on. Empty lines stay as they are.
    #[must_use]
    pub fn quote_line_at_caret(&self) -> Self {
        let sel = self.clamp_selection(self.selection);
        let range = self.line_around(sel.end);
        if range.is_empty() {
            trace!(pos = sel.end, "empty line, nothing to quote");
            return self.clone();
        }
        let mut next = self.clone();
        next.quote_range(range);
        next
    }

    fn quote_range(&mut self, range: Range<usize>) {
        let widened = self
            .spans
            .iter()
            .filter(|s| *s.kind() == SpanKind::Quote && s.touches(&range))
            .fold(range.clone(), |acc, s| {
                acc.start.min(s.start())..acc.end.max(s.end())
            });
        trace!(?widened, "quoting");
        carve_out(&mut self.spans, &widened, |_| true);
        if let Ok(span) = Span::new(SpanKind::Quote, widened) {
            self.spans.push(span);
        }
        self.finish();
    }

    fn line_around(&self, pos: usize) -> Range<usize> {
        let units = self.units();
        let start = units[..pos]
            .iter()
            .rposition(|u| *u == NEWLINE)
            .map_or(0, |i| i + 1);
        let end = units[pos..]
            .iter()
            .position(|u| *u == NEWLINE)
            .map_or(units.len(), |i| pos + i);
        start..end
    }
}
