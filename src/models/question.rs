// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Poll question model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of `question_text`, in characters.
pub const QUESTION_TEXT_MAX_LEN: usize = 200;

/// A poll prompt with a scheduled publish time.
///
/// A question is "published" once `pub_date` is at or before the current
/// time. That state is never stored; it is derived at request time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

impl Question {
    /// Whether the question went live within the last day.
    pub fn published_recently(&self) -> bool {
        self.published_recently_at(Utc::now())
    }

    /// Same as [`Question::published_recently`], against an explicit clock.
    ///
    /// True iff `now - 1 day < pub_date <= now`.
    pub fn published_recently_at(&self, now: DateTime<Utc>) -> bool {
        now - Duration::days(1) < self.pub_date && self.pub_date <= now
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.question_text)
    }
}
