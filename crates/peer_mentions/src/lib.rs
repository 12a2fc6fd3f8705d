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

//! Utilities for mentioning peers from a chat composer.
//!
//! A peer is mentioned either by its public handle (`@alice `), which is
//! self-describing and needs no tagging, or by its display title, which the
//! composer must tag with the peer's id so the mention survives sending.

use std::fmt;

/// Handles shorter than this are rejected by [`parse_handle`].
pub const MIN_HANDLE_LEN: usize = 4;

/// Numeric identity of a user, bot, group or channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(pub i64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PeerId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandleError {
    #[error("handle is empty")]
    Empty,
    #[error("handle contains invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("handle must be at least {} characters long", MIN_HANDLE_LEN)]
    TooShort,
}

/// Validate a public handle, returning it without any leading `@`.
///
/// Handles are ASCII letters, digits and underscores.
pub fn parse_handle(handle: &str) -> Result<&str, HandleError> {
    let bare = handle.strip_prefix('@').unwrap_or(handle);
    if bare.is_empty() {
        return Err(HandleError::Empty);
    }
    if let Some(c) = bare
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(HandleError::InvalidCharacter(c));
    }
    if bare.len() < MIN_HANDLE_LEN {
        return Err(HandleError::TooShort);
    }
    Ok(bare)
}

/// A peer that can be mentioned from the composer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Peer {
    pub id: PeerId,
    /// Public handle without the leading `@`.
    pub handle: Option<String>,
    pub display_name: String,
}

impl Peer {
    pub fn new(id: PeerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            handle: None,
            display_name: display_name.into(),
        }
    }

    /// Attach a public handle. A leading `@` is accepted and stripped.
    pub fn with_handle(mut self, handle: &str) -> Result<Self, HandleError> {
        self.handle = Some(parse_handle(handle)?.to_owned());
        Ok(self)
    }

    /// Decide how this peer is written into the draft, or `None` if the
    /// peer has neither a handle nor a usable title.
    pub fn mention_text(&self) -> Option<MentionText> {
        if let Some(handle) = self.handle.as_deref().filter(|h| !h.is_empty())
        {
            return Some(MentionText::Handle(handle.to_owned()));
        }
        let title = self.display_name.trim();
        if title.is_empty() {
            None
        } else {
            Some(MentionText::Title(title.to_owned()))
        }
    }
}

/// The literal text a mention inserts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MentionText {
    /// `@handle `, never tagged.
    Handle(String),
    /// `Title `, where the title (not the trailing space) is tagged with the
    /// peer id.
    Title(String),
}

impl MentionText {
    /// Full text to insert, including the trailing space.
    pub fn inserted_text(&self) -> String {
        match self {
            Self::Handle(handle) => format!("@{handle} "),
            Self::Title(title) => format!("{title} "),
        }
    }

    /// Length in UTF-16 code units of the part that must be tagged, if any.
    pub fn tagged_len_utf16(&self) -> Option<usize> {
        match self {
            Self::Handle(_) => None,
            Self::Title(title) => Some(title.encode_utf16().count()),
        }
    }
}
