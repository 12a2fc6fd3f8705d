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

//! Mentions: inserting a peer into the draft and listing who is tagged.

use std::collections::BTreeSet;

use peer_mentions::{Peer, PeerId};
use tracing::{debug, trace};

use super::AttributeStore;
use crate::span_set::carve_out;
use crate::{Selection, Span, SpanKind};

impl AttributeStore {
    /// Insert a mention of `peer` at `position`.
    ///
    /// Peers with a public handle are written as `"@handle "` and left
    /// untagged. Otherwise the display title is written and tagged with
    /// [`SpanKind::TextMention`], followed by an untagged space. The caret
    /// ends after the inserted text. A peer with neither is a no-op.
    #[must_use]
    pub fn insert_mention(&self, position: usize, peer: &Peer) -> Self {
        self.insert_mention_at_suggestion(Selection::caret(position), peer)
    }

    /// Replace `suggestion`, typically the `@ali` the user typed to find
    /// the peer, with a mention of `peer`.
    #[must_use]
    pub fn insert_mention_at_suggestion(
        &self,
        suggestion: Selection,
        peer: &Peer,
    ) -> Self {
        let mut next = self.clone();
        let Some(mention) = peer.mention_text() else {
            debug!(peer = %peer.id, "peer has no handle or title to mention");
            return next;
        };
        let range = next.clamp_selection(suggestion).range();
        let inserted = next.splice(range.clone(), &mention.inserted_text());
        let written = range.start..range.start + inserted;
        // The new text never joins a surrounding mention or link.
        carve_out(&mut next.spans, &written, |k| {
            matches!(k, SpanKind::TextMention(_) | SpanKind::TextUrl(_))
        });
        if let Some(tagged) = mention.tagged_len_utf16() {
            let tag = range.start..range.start + tagged;
            trace!(peer = %peer.id, ?tag, "tagging mention");
            if let Ok(span) = Span::new(SpanKind::TextMention(peer.id), tag) {
                next.spans.push(span);
            }
        }
        next.selection = Selection::caret(written.end);
        next.finish();
        next
    }

    /// Every peer tagged in the draft.
    pub fn mentioned_peers(&self) -> BTreeSet<PeerId> {
        self.spans
            .iter()
            .filter_map(|s| match s.kind() {
                SpanKind::TextMention(peer) => Some(*peer),
                _ => None,
            })
            .collect()
    }
}
