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

//! The attribute store: a draft's text, its spans and its selection.
//!
//! Every editing operation takes `&self` and returns the next store, so a
//! host can keep the previous value for undo or diffing. Raw text edits run
//! the normalizer afterwards; structured operations (formatting, links,
//! quotes, mentions) produce normal spans directly.

mod base;
mod block_ops;
mod formatting;
mod links;
mod mentions;
mod shorthand;
mod spans_html;
mod state_query;
mod text_ops;

pub use base::AttributeStore;
pub use links::{normalize_url, LinkOptions};
pub use state_query::ActionState;
