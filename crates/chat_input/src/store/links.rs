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

//! Links: attaching a URL to a range and removing it again.

use email_address::EmailAddress;
use tracing::{debug, trace};
use url::Url;

use super::AttributeStore;
use crate::span_set::carve_out;
use crate::{Selection, Span, SpanKind};

/// Schemes accepted as typed even without `//`.
const OPAQUE_SCHEMES: [&str; 3] = ["mailto", "tel", "tg"];

/// How link targets typed by the user are normalised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkOptions {
    /// Scheme prepended to targets that have none, such as `example.com`.
    pub default_scheme: String,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            default_scheme: "https".to_owned(),
        }
    }
}

/// Turn user input into a link target, or `None` if it cannot be one.
///
/// Bare email addresses become `mailto:` links and scheme-less hosts get
/// [`LinkOptions::default_scheme`]. Targets that already parse keep their
/// spelling.
pub fn normalize_url(raw: &str, options: &LinkOptions) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if EmailAddress::is_valid(trimmed) {
        return Some(format!("mailto:{trimmed}"));
    }
    if let Ok(url) = Url::parse(trimmed) {
        if trimmed.contains("://") || OPAQUE_SCHEMES.contains(&url.scheme()) {
            return Some(trimmed.to_owned());
        }
    }
    let candidate = format!("{}://{trimmed}", options.default_scheme);
    match Url::parse(&candidate) {
        Ok(url) if url.host().is_some() => Some(candidate),
        _ => None,
    }
}

impl AttributeStore {
    /// Link `selection` to `url` using the default [`LinkOptions`].
    #[must_use]
    pub fn set_link(&self, selection: Selection, url: &str) -> Self {
        self.set_link_with_options(selection, url, &LinkOptions::default())
    }

    /// Link `selection` to `url`.
    ///
    /// The selection is widened over every link it touches, every other
    /// kind is removed from the widened range and a single link span is
    /// written over it. A collapsed selection or an unusable URL leaves the
    /// store unchanged.
    #[must_use]
    pub fn set_link_with_options(
        &self,
        selection: Selection,
        url: &str,
        options: &LinkOptions,
    ) -> Self {
        let Some(url) = normalize_url(url, options) else {
            debug!(url, "not a usable link target");
            return self.clone();
        };
        let sel = self.clamp_selection(selection);
        if sel.is_empty() {
            trace!(?sel, "no text selected to link");
            return self.clone();
        }
        let mut next = self.clone();
        next.selection = sel;
        next.link_range(sel.range(), url);
        next
    }

    /// Point the link under the caret at `url`, keeping its text and range.
    #[must_use]
    pub fn retarget_link_at_caret(&self, url: &str) -> Self {
        let Some(url) = normalize_url(url, &LinkOptions::default()) else {
            debug!(url, "not a usable link target");
            return self.clone();
        };
        let sel = self.clamp_selection(self.selection);
        let Some(range) = self.link_at(sel.end).map(Span::range) else {
            trace!(pos = sel.end, "no link at caret to retarget");
            return self.clone();
        };
        let mut next = self.clone();
        next.link_range(range, url);
        next
    }

    fn link_range(&mut self, range: std::ops::Range<usize>, url: String) {
        let widened = self
            .spans
            .iter()
            .filter(|s| matches!(s.kind(), SpanKind::TextUrl(_)))
            .filter(|s| s.touches(&range))
            .fold(range.clone(), |acc, s| {
                acc.start.min(s.start())..acc.end.max(s.end())
            });
        trace!(?widened, %url, "setting link");
        carve_out(&mut self.spans, &widened, |_| true);
        if let Ok(span) = Span::new(SpanKind::TextUrl(url), widened) {
            self.spans.push(span);
        }
        self.finish();
    }

    /// Remove the link around the caret, or every link the selection
    /// intersects. The text is kept.
    #[must_use]
    pub fn remove_links(&self) -> Self {
        let mut next = self.clone();
        let sel = next.clamp_selection(next.selection);
        let doomed: Vec<Span> = if sel.is_empty() {
            next.link_at(sel.start).cloned().into_iter().collect()
        } else {
            next.spans
                .iter()
                .filter(|s| matches!(s.kind(), SpanKind::TextUrl(_)))
                .filter(|s| s.intersects(&sel.range()))
                .cloned()
                .collect()
        };
        if doomed.is_empty() {
            trace!(?sel, "no link to remove");
            return next;
        }
        next.spans.retain(|s| !doomed.contains(s));
        next.finish();
        next
    }

    /// The link containing `pos`, counting both of its edges.
    pub(crate) fn link_at(&self, pos: usize) -> Option<&Span> {
        self.spans.iter().find(|s| {
            matches!(s.kind(), SpanKind::TextUrl(_))
                && s.start() <= pos
                && pos <= s.end()
        })
    }
}

#[cfg(test)]
mod tests {
    use peer_mentions::PeerId;
    use speculoos::assert_that;
    use speculoos::prelude::*;

    use super::*;

    fn span(kind: SpanKind, range: std::ops::Range<usize>) -> Span {
        Span::new(kind, range).unwrap()
    }

    fn link(url: &str, range: std::ops::Range<usize>) -> Span {
        span(SpanKind::TextUrl(url.to_owned()), range)
    }

    #[test]
    fn urls_are_normalised() {
        let options = LinkOptions::default();
        assert_that!(normalize_url("example.com", &options))
            .is_some()
            .is_equal_to("https://example.com".to_owned());
        assert_eq!(
            normalize_url("  http://a.org/x?y ", &options),
            Some("http://a.org/x?y".to_owned())
        );
        assert_eq!(
            normalize_url("bob@example.com", &options),
            Some("mailto:bob@example.com".to_owned())
        );
        assert_eq!(
            normalize_url("tel:+123", &options),
            Some("tel:+123".to_owned())
        );
        assert_eq!(normalize_url("   ", &options), None);
        assert_eq!(normalize_url("not a url", &options), None);
    }

    #[test]
    fn default_scheme_is_configurable() {
        let options = LinkOptions {
            default_scheme: "http".to_owned(),
        };
        assert_eq!(
            normalize_url("intranet.local", &options),
            Some("http://intranet.local".to_owned())
        );
    }

    #[test]
    fn set_link_displaces_other_kinds() {
        let store = AttributeStore::with_spans(
            "read this now",
            [span(SpanKind::Bold, 0..13)],
        )
        .set_link(Selection::new(5, 9), "https://x.org");
        assert_eq!(
            store.spans(),
            &[
                span(SpanKind::Bold, 0..5),
                link("https://x.org", 5..9),
                span(SpanKind::Bold, 9..13),
            ]
        );
    }

    #[test]
    fn set_link_widens_over_touched_links() {
        let store = AttributeStore::with_spans(
            "aaaa bbbb cccc",
            [link("https://a.org", 0..4), link("https://c.org", 10..14)],
        )
        .set_link(Selection::new(2, 10), "https://new.org");
        assert_eq!(store.spans(), &[link("https://new.org", 0..14)]);
    }

    #[test]
    fn set_link_removes_mentions_in_range() {
        let store = AttributeStore::with_spans(
            "hey Alice",
            [span(SpanKind::TextMention(PeerId(4)), 4..9)],
        )
        .set_link(Selection::new(0, 9), "x.org");
        assert_eq!(store.spans(), &[link("https://x.org", 0..9)]);
        store.explicitly_assert_invariants();
    }

    #[test]
    fn collapsed_selection_is_a_no_op() {
        let store = AttributeStore::with_spans(
            "see docs",
            [link("https://old.org", 4..8)],
        );
        let next = store.set_link(Selection::caret(6), "https://new.org");
        assert_eq!(next, store);
    }

    #[test]
    fn caret_inside_link_can_retarget_it() {
        let store = AttributeStore::with_spans(
            "see docs",
            [link("https://old.org", 4..8)],
        )
        .select(Selection::caret(6))
        .retarget_link_at_caret("new.org");
        assert_eq!(store.spans(), &[link("https://new.org", 4..8)]);
        assert_eq!(store.selection(), Selection::caret(6));

        let elsewhere = store
            .select(Selection::caret(1))
            .retarget_link_at_caret("https://z.org");
        assert_eq!(elsewhere.spans(), store.spans());
    }

    #[test]
    fn bad_url_is_a_no_op() {
        let store = AttributeStore::from_text("hello");
        let next = store.set_link(Selection::new(0, 5), "two words");
        assert_eq!(next, store);
    }

    #[test]
    fn remove_links_at_caret_and_in_selection() {
        let store = AttributeStore::with_spans(
            "one two three",
            [
                link("https://1.org", 0..3),
                link("https://2.org", 4..7),
                link("https://3.org", 8..13),
            ],
        );
        let at_caret = store.select(Selection::caret(5)).remove_links();
        assert_eq!(
            at_caret.spans(),
            &[link("https://1.org", 0..3), link("https://3.org", 8..13)]
        );

        let in_selection = store.select(Selection::new(2, 9)).remove_links();
        assert_that!(in_selection.spans().len()).is_equal_to(0);
        assert_eq!(in_selection.plain_text(), "one two three");
    }
}
