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

//! UTF-16 helpers shared by the store, the normalizer and the markdown
//! tokenizer. Every index here is a UTF-16 code unit offset.

use icu_properties::props::GeneralCategory;
use icu_properties::CodePointMapData;

/// Unicode character classes the normalizer and tokenizer care about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CharClass {
    /// Letters, marks and numbers.
    pub alphanumeric: bool,
    /// Whitespace that does not end a line.
    pub space: bool,
    pub line_break: bool,
    pub symbol: bool,
    pub punctuation: bool,
}

impl CharClass {
    pub fn of(c: char) -> Self {
        let category = CodePointMapData::<GeneralCategory>::new().get(c);
        let line_break = matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}');
        Self {
            alphanumeric: matches!(
                category,
                GeneralCategory::UppercaseLetter
                    | GeneralCategory::LowercaseLetter
                    | GeneralCategory::TitlecaseLetter
                    | GeneralCategory::ModifierLetter
                    | GeneralCategory::OtherLetter
                    | GeneralCategory::NonspacingMark
                    | GeneralCategory::SpacingMark
                    | GeneralCategory::EnclosingMark
                    | GeneralCategory::DecimalNumber
                    | GeneralCategory::LetterNumber
                    | GeneralCategory::OtherNumber
            ),
            space: c.is_whitespace() && !line_break,
            line_break,
            symbol: matches!(
                category,
                GeneralCategory::MathSymbol
                    | GeneralCategory::CurrencySymbol
                    | GeneralCategory::ModifierSymbol
                    | GeneralCategory::OtherSymbol
            ),
            punctuation: matches!(
                category,
                GeneralCategory::ConnectorPunctuation
                    | GeneralCategory::DashPunctuation
                    | GeneralCategory::OpenPunctuation
                    | GeneralCategory::ClosePunctuation
                    | GeneralCategory::InitialPunctuation
                    | GeneralCategory::FinalPunctuation
                    | GeneralCategory::OtherPunctuation
            ),
        }
    }

    pub fn is_whitespace(&self) -> bool {
        self.space || self.line_break
    }
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// One [`CharClass`] per code unit. Both halves of a surrogate pair get the
/// class of the scalar they encode; unpaired surrogates get the default.
pub(crate) fn classify_units(units: &[u16]) -> Vec<CharClass> {
    let mut classes = Vec::with_capacity(units.len());
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(c) => {
                let class = CharClass::of(c);
                classes.extend(std::iter::repeat(class).take(c.len_utf16()));
            }
            Err(_) => classes.push(CharClass::default()),
        }
    }
    classes
}

/// The scalar starting at `index`, if `index` is a character boundary.
pub(crate) fn char_at(units: &[u16], index: usize) -> Option<char> {
    let end = (index + 2).min(units.len());
    char::decode_utf16(units.get(index..end)?.iter().copied())
        .next()?
        .ok()
}

/// The scalar ending at `index`.
pub(crate) fn char_before(units: &[u16], index: usize) -> Option<char> {
    if index == 0 || index > units.len() {
        return None;
    }
    let unit = units[index - 1];
    if is_low_surrogate(unit) && index >= 2 && is_high_surrogate(units[index - 2])
    {
        char_at(units, index - 2)
    } else {
        char_at(units, index - 1)
    }
}

/// Clamp `index` into the buffer and move it off the middle of a surrogate
/// pair.
pub(crate) fn snap_to_char_boundary(units: &[u16], index: usize) -> usize {
    let index = index.min(units.len());
    if index > 0
        && index < units.len()
        && is_low_surrogate(units[index])
        && is_high_surrogate(units[index - 1])
    {
        index - 1
    } else {
        index
    }
}

pub(crate) fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
