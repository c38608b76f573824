// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin console configuration.
//!
//! The console is described declaratively by [`QUESTION_ADMIN`]; the route
//! handlers in `routes::admin` only interpret it.

pub mod filters;
pub mod forms;

use crate::models::Question;
use crate::time_utils::format_admin_datetime;
use chrono::{DateTime, Utc};

pub use filters::DateFilter;
pub use forms::{QuestionForm, QuestionFormErrors};

/// A titled group of fields on the change form.
#[derive(Debug, Clone, Copy)]
pub struct Fieldset {
    pub name: &'static str,
    pub fields: &'static [&'static str],
    /// Rendered folded until the user expands it
    pub collapsed: bool,
}

/// Child rows edited as a table inside the parent form.
#[derive(Debug, Clone, Copy)]
pub struct TabularInline {
    pub verbose_name_plural: &'static str,
    /// Blank rows offered in addition to the existing ones
    pub extra: usize,
}

/// A changelist column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListColumn {
    QuestionText,
    PubDate,
    PublishedRecently,
}

impl ListColumn {
    pub fn header(self) -> &'static str {
        match self {
            ListColumn::QuestionText => "Question text",
            ListColumn::PubDate => "Date published",
            ListColumn::PublishedRecently => "Published recently?",
        }
    }

    pub fn render(self, question: &Question, now: DateTime<Utc>) -> String {
        match self {
            ListColumn::QuestionText => question.question_text.clone(),
            ListColumn::PubDate => format_admin_datetime(question.pub_date),
            ListColumn::PublishedRecently => {
                let recent = if question.published_recently_at(now) { "Yes" } else { "No" };
                recent.to_string()
            }
        }
    }
}

/// Admin options for one model.
#[derive(Debug, Clone, Copy)]
pub struct ModelAdmin {
    pub verbose_name: &'static str,
    pub fieldsets: &'static [Fieldset],
    pub inline: TabularInline,
    pub list_display: &'static [ListColumn],
    /// Date field offering the [`DateFilter`] choices
    pub list_filter: &'static str,
    pub search_fields: &'static [&'static str],
}

/// Admin registration for [`Question`] with inline choices.
pub const QUESTION_ADMIN: ModelAdmin = ModelAdmin {
    verbose_name: "question",
    fieldsets: &[
        Fieldset {
            name: "Question Content",
            fields: &["question_text"],
            collapsed: false,
        },
        Fieldset {
            name: "Date Information",
            fields: &["pub_date"],
            collapsed: true,
        },
    ],
    inline: TabularInline {
        verbose_name_plural: "Choices",
        extra: 3,
    },
    list_display: &[
        ListColumn::QuestionText,
        ListColumn::PubDate,
        ListColumn::PublishedRecently,
    ],
    list_filter: "pub_date",
    search_fields: &["question_text"],
};

/// Human label for a question form field.
pub fn field_label(name: &str) -> &'static str {
    match name {
        "question_text" => "Question text",
        "pub_date" => "Date published",
        _ => "Field",
    }
}
