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

use thiserror::Error;

/// Errors produced while building spans and selections.
///
/// Store operations never return these: they recover locally by clamping
/// or by dropping the offending span.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("invalid span range {start}..{end}: start must be before end")]
    InvalidRange { start: usize, end: usize },
    #[error("index {index} is out of bounds for text of length {len}")]
    OutOfBounds { index: usize, len: usize },
}
