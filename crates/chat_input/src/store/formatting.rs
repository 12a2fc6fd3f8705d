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

//! Inline formatting: toggling boolean kinds and clearing them.

use tracing::{debug, trace};

use super::AttributeStore;
use crate::span_set::{carve_out, covered_by_one};
use crate::{Selection, Span, SpanKind};

impl AttributeStore {
    /// Toggle a boolean kind over `selection`.
    ///
    /// If one span of `kind` already covers the whole selection the kind is
    /// removed from exactly the selected units. Otherwise any partial
    /// fragments inside the selection are replaced by a single span, which
    /// then merges with touching spans of the same kind.
    ///
    /// Collapsed selections and payload kinds are no-ops.
    #[must_use]
    pub fn toggle_attribute(&self, kind: SpanKind, selection: Selection) -> Self {
        let mut next = self.clone();
        next.toggle_inline_kind(kind, selection);
        next
    }

    /// Remove every kind from `selection`, including mentions and links.
    /// Parts of spans outside the selection survive.
    #[must_use]
    pub fn clear_formatting(&self, selection: Selection) -> Self {
        let mut next = self.clone();
        let sel = next.clamp_selection(selection);
        next.selection = sel;
        carve_out(&mut next.spans, &sel.range(), |_| true);
        next.finish();
        next
    }

    fn toggle_inline_kind(&mut self, kind: SpanKind, selection: Selection) {
        if !kind.is_boolean() {
            debug!(?kind, "only boolean kinds can be toggled");
            return;
        }
        let sel = self.clamp_selection(selection);
        self.selection = sel;
        if sel.is_empty() {
            trace!(?kind, "toggle on collapsed selection ignored");
            return;
        }

        let range = sel.range();
        let active = covered_by_one(&self.spans, &kind, &range);
        trace!(?kind, ?range, active, "toggling");
        carve_out(&mut self.spans, &range, |k| *k == kind);
        if !active {
            if let Ok(span) = Span::new(kind, range) {
                self.spans.push(span);
            }
        }
        self.finish();
    }
}
