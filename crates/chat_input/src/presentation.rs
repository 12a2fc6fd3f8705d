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

//! Projection of a draft's span set into styled runs for a text renderer.
//!
//! [`render`] is total: every unit of the draft lands in exactly one run.
//! Neighbouring runs with identical styling are merged, except custom emoji,
//! which are drawn one placeholder at a time.

use peer_mentions::PeerId;

use crate::span_set::segments;
use crate::{AttributeStore, CustomEmojiId, Span, SpanKind};

/// Largest per-channel difference at which two colours read as the same.
const INDISTINGUISHABLE_DELTA: u8 = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xff)
    }

    /// Whether a reader could fail to tell `self` from `other`. Alpha is
    /// ignored.
    pub fn is_indistinguishable_from(self, other: Self) -> bool {
        [(self.r, other.r), (self.g, other.g), (self.b, other.b)]
            .iter()
            .all(|(a, b)| a.abs_diff(*b) <= INDISTINGUISHABLE_DELTA)
    }
}

/// The colours the mapper draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorScheme {
    pub text: Rgba,
    /// Mentions and links.
    pub accent: Rgba,
    pub quote_background: Rgba,
    /// Tint behind a spoiler once revealed.
    pub spoiler_background: Rgba,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            text: Rgba::rgb(0x00, 0x00, 0x00),
            accent: Rgba::rgb(0x16, 0x8a, 0xcd),
            quote_background: Rgba::new(0x16, 0x8a, 0xcd, 0x1a),
            spoiler_background: Rgba::new(0x00, 0x00, 0x00, 0x1f),
        }
    }
}

impl ColorScheme {
    pub fn dark() -> Self {
        Self {
            text: Rgba::rgb(0xff, 0xff, 0xff),
            accent: Rgba::rgb(0x71, 0xba, 0xfa),
            quote_background: Rgba::new(0x71, 0xba, 0xfa, 0x1a),
            spoiler_background: Rgba::new(0xff, 0xff, 0xff, 0x1f),
        }
    }
}

/// Bold, italic and monospace combined into one of eight faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontVariant {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
    Monospace,
    MonospaceBold,
    MonospaceItalic,
    MonospaceBoldItalic,
}

impl FontVariant {
    pub fn new(bold: bool, italic: bool, monospace: bool) -> Self {
        match (monospace, bold, italic) {
            (false, false, false) => Self::Regular,
            (false, true, false) => Self::Bold,
            (false, false, true) => Self::Italic,
            (false, true, true) => Self::BoldItalic,
            (true, false, false) => Self::Monospace,
            (true, true, false) => Self::MonospaceBold,
            (true, false, true) => Self::MonospaceItalic,
            (true, true, true) => Self::MonospaceBoldItalic,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(
            self,
            Self::Bold
                | Self::BoldItalic
                | Self::MonospaceBold
                | Self::MonospaceBoldItalic
        )
    }

    pub fn is_italic(self) -> bool {
        matches!(
            self,
            Self::Italic
                | Self::BoldItalic
                | Self::MonospaceItalic
                | Self::MonospaceBoldItalic
        )
    }

    pub fn is_monospace(self) -> bool {
        matches!(
            self,
            Self::Monospace
                | Self::MonospaceBold
                | Self::MonospaceItalic
                | Self::MonospaceBoldItalic
        )
    }
}

/// Block-level treatment, drawn by the renderer around the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockStyle {
    Code,
    Quote,
}

/// Everything a renderer needs to draw one run.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RunAttributes {
    pub font: FontVariant,
    pub block: Option<BlockStyle>,
    pub foreground: Option<Rgba>,
    pub background: Option<Rgba>,
    pub underline: bool,
    pub strikethrough: bool,
    /// Hidden until revealed; the renderer may draw particles over it.
    pub spoiler: bool,
    pub link_url: Option<String>,
    pub mention: Option<PeerId>,
    pub custom_emoji: Option<CustomEmojiId>,
}

/// A run of text with a single styling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledRun {
    /// UTF-16 start offset.
    pub start_utf16: usize,
    /// UTF-16 end offset (exclusive).
    pub end_utf16: usize,
    pub text: String,
    pub attributes: RunAttributes,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderDescription {
    pub runs: Vec<StyledRun>,
}

impl RenderDescription {
    /// The run containing the unit at `pos`.
    pub fn run_at(&self, pos: usize) -> Option<&StyledRun> {
        self.runs
            .iter()
            .find(|r| r.start_utf16 <= pos && pos < r.end_utf16)
    }
}

/// Describe how to draw `store` with `scheme`.
pub fn render(
    store: &AttributeStore,
    scheme: &ColorScheme,
    reveal_spoilers: bool,
) -> RenderDescription {
    let units = store.units();
    let mut runs: Vec<StyledRun> = Vec::new();
    for (range, covering) in segments(store.spans(), store.len()) {
        let attributes = attributes_for(&covering, scheme, reveal_spoilers);
        let text = String::from_utf16_lossy(&units[range.clone()]);
        match runs.last_mut() {
            Some(last)
                if last.attributes == attributes
                    && attributes.custom_emoji.is_none() =>
            {
                last.end_utf16 = range.end;
                last.text.push_str(&text);
            }
            _ => runs.push(StyledRun {
                start_utf16: range.start,
                end_utf16: range.end,
                text,
                attributes,
            }),
        }
    }
    RenderDescription { runs }
}

fn attributes_for(
    covering: &[&Span],
    scheme: &ColorScheme,
    reveal_spoilers: bool,
) -> RunAttributes {
    let has = |kind: &SpanKind| covering.iter().any(|s| s.kind() == kind);
    let mut attributes = RunAttributes::default();
    for span in covering {
        match span.kind() {
            SpanKind::TextUrl(url) => attributes.link_url = Some(url.clone()),
            SpanKind::TextMention(peer) => attributes.mention = Some(*peer),
            SpanKind::CustomEmoji(id) => attributes.custom_emoji = Some(*id),
            _ => {}
        }
    }

    let code = has(&SpanKind::Code);
    let quote = has(&SpanKind::Quote);
    attributes.block = if code {
        Some(BlockStyle::Code)
    } else if quote {
        Some(BlockStyle::Quote)
    } else {
        None
    };
    attributes.font = FontVariant::new(
        has(&SpanKind::Bold),
        has(&SpanKind::Italic),
        code || has(&SpanKind::Monospace),
    );
    attributes.spoiler = has(&SpanKind::Spoiler);
    attributes.strikethrough = has(&SpanKind::Strikethrough);

    let addressed =
        attributes.link_url.is_some() || attributes.mention.is_some();
    let hidden = attributes.spoiler && !reveal_spoilers;
    attributes.foreground = Some(if hidden || attributes.custom_emoji.is_some() {
        Rgba::TRANSPARENT
    } else if addressed {
        scheme.accent
    } else {
        scheme.text
    });
    attributes.background = if attributes.spoiler && reveal_spoilers {
        Some(scheme.spoiler_background)
    } else if quote {
        Some(scheme.quote_background)
    } else {
        None
    };
    attributes.underline = has(&SpanKind::Underline)
        || (addressed && scheme.accent.is_indistinguishable_from(scheme.text));
    attributes
}
