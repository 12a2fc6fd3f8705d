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

//! Markdown shorthand typed or pasted into the draft.

use tracing::debug;

use super::AttributeStore;
use crate::markdown::promote;
use crate::normalize::{normalize_family, Family};
use crate::Selection;

impl AttributeStore {
    /// A draft built from markdown shorthand, with the delimiters removed.
    pub fn from_markdown(text: &str) -> Self {
        Self::new().insert_markdown_shorthand(text)
    }

    /// Replace the selection with `text`, then promote every markdown pair
    /// in the draft to a span.
    #[must_use]
    pub fn insert_markdown_shorthand(&self, text: &str) -> Self {
        let mut next = self.clone();
        let range = next.clamp_selection(next.selection).range();
        let inserted = next.splice(range.clone(), text);
        next.selection = Selection::caret(range.start + inserted);
        next.normalize_with_markdown();
        next.finish();
        next
    }

    /// Promote markdown pairs already in the draft, as done before sending.
    #[must_use]
    pub fn apply_markdown(&self) -> Self {
        let mut next = self.clone();
        next.normalize_with_markdown();
        next.finish();
        next
    }

    /// Mentions are settled against the text as typed; links and quotes
    /// against the text after delimiters are gone.
    fn normalize_with_markdown(&mut self) {
        self.normalize_family_in_place(Family::Mention);
        if let Some(promoted) = promote(self.units(), &self.spans) {
            debug!(converted = promoted.converted, "markdown promoted");
            let Selection { start, end } = self.selection;
            self.selection = Selection::new(
                promoted.map_position(start),
                promoted.map_position(end),
            );
            self.set_units(&promoted.units);
            self.spans = promoted.spans;
        }
        self.normalize_family_in_place(Family::Link);
        self.normalize_family_in_place(Family::Quote);
    }

    fn normalize_family_in_place(&mut self, family: Family) {
        if let Some(spans) = normalize_family(self.units(), &self.spans, family)
        {
            self.spans = spans;
        }
    }
}
