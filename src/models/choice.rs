// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Poll choice model.

use serde::{Deserialize, Serialize};

/// Maximum length of `choice_text`, in characters.
pub const CHOICE_TEXT_MAX_LEN: usize = 200;

/// One selectable answer under a [`Question`](super::Question).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Choice {
    pub id: i64,
    /// Owning question (foreign key)
    pub question_id: i64,
    pub choice_text: String,
    /// Vote tally, never negative
    pub votes: i64,
}
