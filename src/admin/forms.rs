// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Question change form with inline choice rows.
//!
//! Inline rows are posted as `choice-<n>-id`, `choice-<n>-choice_text`,
//! `choice-<n>-votes` and `choice-<n>-DELETE`, with the row count in
//! `choice-TOTAL`.

use crate::db::ChoiceChange;
use crate::error::{AppError, Result};
use crate::models::choice::CHOICE_TEXT_MAX_LEN;
use crate::models::question::QUESTION_TEXT_MAX_LEN;
use crate::models::{Choice, Question};
use crate::time_utils::{format_admin_input, parse_admin_datetime};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use validator::{Validate, ValidationErrors};

/// Upper bound on submitted inline rows.
pub const MAX_INLINE_ROWS: usize = 1000;

const REQUIRED: &str = "This field is required.";

const QUESTION_TEXT_LIMIT: u64 = QUESTION_TEXT_MAX_LEN as u64;
const CHOICE_TEXT_LIMIT: u64 = CHOICE_TEXT_MAX_LEN as u64;

#[derive(Debug, Validate)]
struct QuestionFields {
    #[validate(length(max = QUESTION_TEXT_LIMIT))]
    question_text: String,
}

#[derive(Debug, Validate)]
struct ChoiceFields {
    #[validate(length(max = CHOICE_TEXT_LIMIT))]
    choice_text: String,
    #[validate(range(min = 0, message = "votes cannot be negative."))]
    votes: i64,
}

/// One inline choice row as shown in (or posted from) the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceRow {
    pub id: Option<i64>,
    pub choice_text: String,
    pub votes: String,
    pub delete: bool,
}

/// Raw question form values, kept verbatim for re-rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionForm {
    pub question_text: String,
    pub pub_date: String,
    pub choices: Vec<ChoiceRow>,
}

/// Validated form contents, ready for [`crate::db::Db::save_question`].
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedQuestion {
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub changes: Vec<ChoiceChange>,
}

/// Validation messages keyed by field, plus messages for inline rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionFormErrors {
    pub fields: BTreeMap<&'static str, Vec<String>>,
    pub rows: Vec<String>,
}

impl QuestionFormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.rows.is_empty()
    }

    fn add_field(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }
}

impl QuestionForm {
    /// Initial values for editing an existing question.
    pub fn from_question(question: &Question, choices: &[Choice]) -> Self {
        Self {
            question_text: question.question_text.clone(),
            pub_date: format_admin_input(question.pub_date),
            choices: choices
                .iter()
                .map(|c| ChoiceRow {
                    id: Some(c.id),
                    choice_text: c.choice_text.clone(),
                    votes: c.votes.to_string(),
                    delete: false,
                })
                .collect(),
        }
    }

    /// Read a posted form.
    pub fn from_submission(data: &HashMap<String, String>) -> Result<Self> {
        let field = |name: &str| data.get(name).cloned().unwrap_or_default();

        let total = match data.get("choice-TOTAL").map(|v| v.trim()) {
            None | Some("") => 0,
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                AppError::BadRequest("Invalid 'choice-TOTAL' value".to_string())
            })?,
        };
        if total > MAX_INLINE_ROWS {
            return Err(AppError::BadRequest(format!(
                "Too many inline rows: {} (max {})",
                total, MAX_INLINE_ROWS
            )));
        }

        let mut choices = Vec::with_capacity(total);
        for index in 0..total {
            let prefix = format!("choice-{}-", index);
            let id = match data.get(&format!("{}id", prefix)).map(|v| v.trim()) {
                None | Some("") => None,
                Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                    AppError::BadRequest(format!("Invalid id for inline row {}", index))
                })?),
            };
            choices.push(ChoiceRow {
                id,
                choice_text: field(&format!("{}choice_text", prefix)),
                votes: field(&format!("{}votes", prefix)),
                delete: data.contains_key(&format!("{}DELETE", prefix)),
            });
        }

        Ok(Self {
            question_text: field("question_text"),
            pub_date: field("pub_date"),
            choices,
        })
    }

    /// Rows to display: the form's own rows followed by `extra` blank ones.
    pub fn rows_with_extra(&self, extra: usize) -> Vec<ChoiceRow> {
        let mut rows = self.choices.clone();
        rows.extend(std::iter::repeat_with(ChoiceRow::default).take(extra));
        rows
    }

    /// Raw value of a top-level field, by name.
    pub fn value(&self, name: &str) -> &str {
        match name {
            "question_text" => &self.question_text,
            "pub_date" => &self.pub_date,
            _ => "",
        }
    }

    /// Validate and convert into database changes.
    pub fn clean(&self) -> std::result::Result<CleanedQuestion, QuestionFormErrors> {
        let mut errors = QuestionFormErrors::default();

        let question_text = self.question_text.trim();
        if question_text.is_empty() {
            errors.add_field("question_text", REQUIRED);
        } else {
            let fields = QuestionFields {
                question_text: question_text.to_string(),
            };
            if let Err(e) = fields.validate() {
                for message in messages(&e, QUESTION_TEXT_MAX_LEN) {
                    errors.add_field("question_text", message);
                }
            }
        }

        let pub_date = match self.pub_date.trim() {
            "" => {
                errors.add_field("pub_date", REQUIRED);
                None
            }
            raw => {
                let parsed = parse_admin_datetime(raw);
                if parsed.is_none() {
                    errors.add_field("pub_date", "Enter a valid date/time.");
                }
                parsed
            }
        };

        let mut changes = Vec::new();
        for (index, row) in self.choices.iter().enumerate() {
            let position = index + 1;
            let choice_text = row.choice_text.trim();

            if let (Some(id), true) = (row.id, row.delete) {
                changes.push(ChoiceChange::Delete { id });
                continue;
            }
            if choice_text.is_empty() {
                if row.id.is_some() {
                    errors
                        .rows
                        .push(format!("Choice {}: the choice text is required.", position));
                }
                // Untouched blank rows are ignored.
                continue;
            }

            let votes = match row.votes.trim() {
                "" => 0,
                raw => match raw.parse::<i64>() {
                    Ok(votes) => votes,
                    Err(_) => {
                        errors
                            .rows
                            .push(format!("Choice {}: enter a whole number of votes.", position));
                        continue;
                    }
                },
            };

            let fields = ChoiceFields {
                choice_text: choice_text.to_string(),
                votes,
            };
            if let Err(e) = fields.validate() {
                for message in messages(&e, CHOICE_TEXT_MAX_LEN) {
                    errors.rows.push(format!("Choice {}: {}", position, message));
                }
                continue;
            }

            changes.push(match row.id {
                Some(id) => ChoiceChange::Update {
                    id,
                    choice_text: choice_text.to_string(),
                    votes,
                },
                None => ChoiceChange::Create {
                    choice_text: choice_text.to_string(),
                    votes,
                },
            });
        }

        match pub_date {
            Some(pub_date) if errors.is_empty() => Ok(CleanedQuestion {
                question_text: question_text.to_string(),
                pub_date,
                changes,
            }),
            _ => Err(errors),
        }
    }
}

/// Human-readable messages; `max_len` is the text limit of the validated struct.
fn messages(errors: &ValidationErrors, max_len: usize) -> Vec<String> {
    let mut out: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .map(|e| match (&e.message, e.code.as_ref()) {
            (Some(message), _) => message.to_string(),
            (None, "length") => {
                format!("Ensure this value has at most {} characters.", max_len)
            }
            (None, code) => code.to_string(),
        })
        .collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn submission(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_clean_valid_add_form() {
        let data = submission(&[
            ("question_text", "  What's new?  "),
            ("pub_date", "2026-01-02 03:04:05"),
            ("choice-TOTAL", "3"),
            ("choice-0-choice_text", "Not much"),
            ("choice-0-votes", ""),
            ("choice-1-choice_text", "The sky"),
            ("choice-1-votes", "4"),
            ("choice-2-choice_text", ""),
            ("choice-2-votes", "0"),
        ]);

        let form = QuestionForm::from_submission(&data).unwrap();
        assert_eq!(form.choices.len(), 3);

        let cleaned = form.clean().unwrap();
        assert_eq!(cleaned.question_text, "What's new?");
        assert_eq!(
            cleaned.pub_date,
            Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
        );
        assert_eq!(
            cleaned.changes,
            vec![
                ChoiceChange::Create {
                    choice_text: "Not much".to_string(),
                    votes: 0
                },
                ChoiceChange::Create {
                    choice_text: "The sky".to_string(),
                    votes: 4
                },
            ]
        );
    }

    #[test]
    fn test_clean_existing_rows_update_and_delete() {
        let data = submission(&[
            ("question_text", "Q"),
            ("pub_date", "2026-01-02 03:04"),
            ("choice-TOTAL", "2"),
            ("choice-0-id", "10"),
            ("choice-0-choice_text", "Keep"),
            ("choice-0-votes", "2"),
            ("choice-1-id", "11"),
            ("choice-1-choice_text", "Drop"),
            ("choice-1-votes", "1"),
            ("choice-1-DELETE", "on"),
        ]);

        let cleaned = QuestionForm::from_submission(&data).unwrap().clean().unwrap();
        assert_eq!(
            cleaned.changes,
            vec![
                ChoiceChange::Update {
                    id: 10,
                    choice_text: "Keep".to_string(),
                    votes: 2
                },
                ChoiceChange::Delete { id: 11 },
            ]
        );
    }

    #[test]
    fn test_clean_reports_missing_fields() {
        let form = QuestionForm::default();
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.fields["question_text"], vec![REQUIRED.to_string()]);
        assert_eq!(errors.fields["pub_date"], vec![REQUIRED.to_string()]);
    }

    #[test]
    fn test_clean_rejects_long_text_bad_date_and_negative_votes() {
        let form = QuestionForm {
            question_text: "x".repeat(201),
            pub_date: "next tuesday".to_string(),
            choices: vec![ChoiceRow {
                id: None,
                choice_text: "Maybe".to_string(),
                votes: "-1".to_string(),
                delete: false,
            }],
        };

        let errors = form.clean().unwrap_err();
        assert_eq!(
            errors.fields["question_text"],
            vec!["Ensure this value has at most 200 characters.".to_string()]
        );
        assert_eq!(
            errors.fields["pub_date"],
            vec!["Enter a valid date/time.".to_string()]
        );
        assert_eq!(errors.rows, vec!["Choice 1: votes cannot be negative.".to_string()]);
    }

    #[test]
    fn test_clean_accepts_max_length_text() {
        let form = QuestionForm {
            question_text: "q".repeat(QUESTION_TEXT_MAX_LEN),
            pub_date: "2026-01-01 00:00".to_string(),
            choices: vec![ChoiceRow {
                id: None,
                choice_text: "c".repeat(CHOICE_TEXT_MAX_LEN),
                votes: String::new(),
                delete: false,
            }],
        };
        assert!(form.clean().is_ok());

        let too_long = QuestionForm {
            choices: vec![ChoiceRow {
                id: None,
                choice_text: "c".repeat(CHOICE_TEXT_MAX_LEN + 1),
                votes: String::new(),
                delete: false,
            }],
            ..form
        };
        let errors = too_long.clean().unwrap_err();
        assert_eq!(
            errors.rows,
            vec![format!(
                "Choice 1: Ensure this value has at most {} characters.",
                CHOICE_TEXT_MAX_LEN
            )]
        );
    }

    #[test]
    fn test_unchanged_form_keeps_exact_pub_date() {
        let question = Question {
            id: 5,
            question_text: "Precise?".to_string(),
            pub_date: Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 59).unwrap()
                + chrono::Duration::microseconds(999_999),
        };

        let cleaned = QuestionForm::from_question(&question, &[]).clean().unwrap();
        assert_eq!(cleaned.pub_date, question.pub_date);
        assert_eq!(cleaned.question_text, "Precise?");
        assert!(cleaned.changes.is_empty());
    }

    #[test]
    fn test_existing_row_requires_text() {
        let form = QuestionForm {
            question_text: "Q".to_string(),
            pub_date: "2026-01-01 00:00".to_string(),
            choices: vec![ChoiceRow {
                id: Some(3),
                choice_text: "   ".to_string(),
                votes: "0".to_string(),
                delete: false,
            }],
        };

        let errors = form.clean().unwrap_err();
        assert!(errors.fields.is_empty());
        assert_eq!(errors.rows.len(), 1);
    }

    #[test]
    fn test_from_submission_rejects_oversized_total() {
        let data = submission(&[("choice-TOTAL", "1001")]);
        assert!(matches!(
            QuestionForm::from_submission(&data),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_rows_with_extra_appends_blank_rows() {
        let form = QuestionForm {
            choices: vec![ChoiceRow {
                id: Some(1),
                choice_text: "A".to_string(),
                votes: "0".to_string(),
                delete: false,
            }],
            ..Default::default()
        };
        let rows = form.rows_with_extra(3);
        assert_eq!(rows.len(), 4);
        assert!(rows[1..].iter().all(|r| *r == ChoiceRow::default()));
    }
}
