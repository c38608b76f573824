// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public poll pages: index, detail, results and voting.

use crate::error::{AppError, Result};
use crate::models::{Choice, Question};
use crate::routes::{found, parse_id};
use crate::AppState;
use axum::{
    extract::{rejection::FormRejection, Path, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of questions shown on the index page.
pub const LATEST_QUESTIONS_LIMIT: u32 = 5;

/// Message shown when a vote is submitted without a valid choice.
pub const NO_CHOICE_ERROR: &str = "Please pick a choice!";

pub const INDEX_URL: &str = "/polls/";

pub fn detail_url(question_id: i64) -> String {
    format!("/polls/{}/", question_id)
}

pub fn results_url(question_id: i64) -> String {
    format!("/polls/{}/results/", question_id)
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/polls/", get(index))
        .route("/polls/{question_id}/", get(detail))
        .route("/polls/{question_id}/results/", get(results))
        .route("/polls/{question_id}/vote/", post(vote))
}

// ─── Index ───────────────────────────────────────────────────

#[derive(Serialize)]
struct IndexContext {
    latest_questions: Vec<Question>,
}

/// Latest published questions, newest first.
async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let latest_questions = state
        .db
        .latest_published_questions(Utc::now(), LATEST_QUESTIONS_LIMIT)
        .await?;

    tracing::debug!(count = latest_questions.len(), "Rendering poll index");

    state
        .templates
        .render("polls/index.html", &IndexContext { latest_questions })
}

// ─── Detail ──────────────────────────────────────────────────

#[derive(Serialize)]
struct QuestionContext<'a> {
    question: &'a Question,
    choices: &'a [Choice],
    error_message: Option<&'a str>,
}

/// Voting form for a published question. Unpublished questions are 404.
async fn detail(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<String>,
) -> Result<Html<String>> {
    let question_id = parse_id(&question_id)?;
    let question = state
        .db
        .get_published_question(question_id, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", question_id)))?;

    render_detail(&state, &question, None).await
}

async fn render_detail(
    state: &AppState,
    question: &Question,
    error_message: Option<&str>,
) -> Result<Html<String>> {
    let choices = state.db.choices_for_question(question.id).await?;
    state.templates.render(
        "polls/detail.html",
        &QuestionContext {
            question,
            choices: &choices,
            error_message,
        },
    )
}

// ─── Results ─────────────────────────────────────────────────

/// Vote tallies for a question.
///
/// Looked up by ID alone: unlike the detail page there is no publish-date
/// filter here.
async fn results(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<String>,
) -> Result<Html<String>> {
    let question_id = parse_id(&question_id)?;
    let question = state
        .db
        .get_question(question_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", question_id)))?;

    let choices = state.db.choices_for_question(question.id).await?;
    state.templates.render(
        "polls/results.html",
        &QuestionContext {
            question: &question,
            choices: &choices,
            error_message: None,
        },
    )
}

// ─── Vote ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct VoteForm {
    choice: Option<String>,
}

/// Record one vote and redirect to the results page.
///
/// A missing or foreign choice re-renders the voting form with
/// [`NO_CHOICE_ERROR`] and status 200. So does a body that is not a
/// readable form.
async fn vote(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<String>,
    form: std::result::Result<Form<VoteForm>, FormRejection>,
) -> Result<Response> {
    let question_id = parse_id(&question_id)?;
    let question = state
        .db
        .get_question(question_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", question_id)))?;

    let submitted = match form {
        Ok(Form(form)) => form.choice,
        Err(rejection) => {
            tracing::debug!(
                question_id = question.id,
                error = %rejection,
                "Unreadable vote form"
            );
            None
        }
    };

    let selected = match submitted.as_deref().and_then(|c| c.trim().parse::<i64>().ok()) {
        Some(choice_id) => {
            state
                .db
                .get_choice_for_question(question.id, choice_id)
                .await?
        }
        None => None,
    };

    let Some(choice) = selected else {
        tracing::debug!(
            question_id = question.id,
            submitted = ?submitted,
            "Vote without a valid choice"
        );
        return Ok(render_detail(&state, &question, Some(NO_CHOICE_ERROR))
            .await?
            .into_response());
    };

    state.db.record_vote(question.id, choice.id).await?;
    tracing::info!(question_id = question.id, choice_id = choice.id, "Vote recorded");

    Ok(found(&results_url(question.id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(detail_url(3), "/polls/3/");
        assert_eq!(results_url(3), "/polls/3/results/");
    }
}
