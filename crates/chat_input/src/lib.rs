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

//! Rich-text attributes for a chat message composer.
//!
//! A draft is plain text plus a set of [`Span`]s, each attaching a
//! [`SpanKind`] to a range of UTF-16 code units. [`AttributeStore`] owns a
//! draft and offers the editing operations; the [`normalize`] passes keep
//! mention, link and quote spans honest after raw edits; [`markdown`]
//! promotes typed shorthand to spans; [`presentation`] turns the result into
//! styled runs for a renderer.

mod error;
pub mod markdown;
pub mod normalize;
pub mod presentation;
mod selection;
mod span;
mod span_set;
mod store;
mod text;

pub use crate::error::SpanError;
pub use crate::presentation::{
    render, BlockStyle, ColorScheme, FontVariant, RenderDescription, Rgba,
    RunAttributes, StyledRun,
};
pub use crate::selection::Selection;
pub use crate::span::{CustomEmojiId, Span, SpanKind, SpanTag};
pub use crate::store::{normalize_url, ActionState, AttributeStore, LinkOptions};
pub use peer_mentions::{Peer, PeerId};
