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

//! State queries: which toolbar actions apply to the current selection.

use std::collections::HashMap;

use strum::IntoEnumIterator;

use super::AttributeStore;
use crate::{Span, SpanTag};

/// How a toolbar action should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionState {
    Enabled,
    /// The kind is already active; triggering the action removes it.
    Reversed,
    Disabled,
}

impl AttributeStore {
    /// Get the action state of every kind with a toolbar action. Custom
    /// emoji are inserted by the host, not toggled, so they are omitted.
    pub fn action_states(&self) -> HashMap<SpanTag, ActionState> {
        SpanTag::iter()
            .filter(|tag| *tag != SpanTag::CustomEmoji)
            .map(|tag| (tag, self.action_state(tag)))
            .collect()
    }

    fn action_state(&self, tag: SpanTag) -> ActionState {
        let sel = self.clamp_selection(self.selection);
        let range = sel.range();
        let active = |s: &&Span| {
            if sel.is_empty() {
                s.start() < sel.start && sel.start < s.end()
            } else {
                s.covers(&range)
            }
        };
        let touches_tag = |tag: SpanTag| {
            self.spans.iter().filter(|s| s.tag() == tag).any(|s| {
                if sel.is_empty() {
                    s.start() < sel.start && sel.start < s.end()
                } else {
                    s.intersects(&range)
                }
            })
        };

        match tag {
            SpanTag::TextUrl => {
                let in_link = if sel.is_empty() {
                    self.link_at(sel.start).is_some()
                } else {
                    self.spans
                        .iter()
                        .filter(|s| s.tag() == SpanTag::TextUrl)
                        .any(|s| active(&s))
                };
                if touches_tag(SpanTag::TextMention) {
                    ActionState::Disabled
                } else if in_link {
                    ActionState::Reversed
                } else if sel.is_empty() {
                    ActionState::Disabled
                } else {
                    ActionState::Enabled
                }
            }
            SpanTag::TextMention => {
                if touches_tag(SpanTag::TextMention)
                    || touches_tag(SpanTag::TextUrl)
                {
                    ActionState::Disabled
                } else {
                    ActionState::Enabled
                }
            }
            _ => {
                if self
                    .spans
                    .iter()
                    .filter(|s| s.tag() == tag)
                    .any(|s| active(&s))
                {
                    ActionState::Reversed
                } else if sel.is_empty() {
                    ActionState::Disabled
                } else {
                    ActionState::Enabled
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use peer_mentions::{Peer, PeerId};

    use crate::{ActionState, AttributeStore, Selection, Span, SpanKind, SpanTag};

    fn span(kind: SpanKind, range: std::ops::Range<usize>) -> Span {
        Span::new(kind, range).unwrap()
    }

    fn state(store: &AttributeStore, tag: SpanTag) -> Option<ActionState> {
        store.action_states().get(&tag).copied()
    }

    // ===================================================================
    // Action states
    // ===================================================================

    #[test]
    fn bold_action_is_enabled_when_not_active() {
        let store = AttributeStore::from_text("hello").select(Selection::new(0, 5));
        assert_eq!(state(&store, SpanTag::Bold), Some(ActionState::Enabled));
    }

    #[test]
    fn bold_action_is_reversed_when_bold_is_active() {
        let store = AttributeStore::from_text("hello")
            .toggle_attribute(SpanKind::Bold, Selection::new(0, 5));
        assert_eq!(state(&store, SpanTag::Bold), Some(ActionState::Reversed));
        assert_eq!(state(&store, SpanTag::Italic), Some(ActionState::Enabled));
    }

    #[test]
    fn partial_coverage_is_not_reversed() {
        let store =
            AttributeStore::with_spans("hello", [span(SpanKind::Bold, 0..2)])
                .select(Selection::new(0, 5));
        assert_eq!(state(&store, SpanTag::Bold), Some(ActionState::Enabled));
    }

    #[test]
    fn caret_reports_the_kind_around_it() {
        let store =
            AttributeStore::with_spans("hello", [span(SpanKind::Italic, 0..5)]);
        let inside = store.select(Selection::caret(2));
        assert_eq!(state(&inside, SpanTag::Italic), Some(ActionState::Reversed));
        assert_eq!(state(&inside, SpanTag::Bold), Some(ActionState::Disabled));

        // Typing at the end would not extend the span.
        let at_end = store.select(Selection::caret(5));
        assert_eq!(state(&at_end, SpanTag::Italic), Some(ActionState::Disabled));
    }

    #[test]
    fn link_is_disabled_over_a_mention() {
        let store = AttributeStore::from_text("hi ")
            .insert_mention(3, &Peer::new(PeerId(1), "Bob"))
            .select(Selection::new(0, 5));
        assert_eq!(state(&store, SpanTag::TextUrl), Some(ActionState::Disabled));
        assert_eq!(
            state(&store, SpanTag::TextMention),
            Some(ActionState::Disabled)
        );
    }

    #[test]
    fn link_is_reversed_inside_a_link() {
        let store = AttributeStore::from_text("see docs")
            .set_link(Selection::new(4, 8), "https://docs.rs");
        assert_eq!(state(&store, SpanTag::TextUrl), Some(ActionState::Reversed));
        let caret = store.select(Selection::caret(6));
        assert_eq!(state(&caret, SpanTag::TextUrl), Some(ActionState::Reversed));
        let outside = store.select(Selection::caret(1));
        assert_eq!(
            state(&outside, SpanTag::TextUrl),
            Some(ActionState::Disabled)
        );
        assert_eq!(
            state(&outside, SpanTag::TextMention),
            Some(ActionState::Enabled)
        );
    }

    #[test]
    fn custom_emoji_has_no_action() {
        let store = AttributeStore::from_text("x");
        assert_eq!(state(&store, SpanTag::CustomEmoji), None);
        assert_eq!(store.action_states().len(), 10);
    }
}
