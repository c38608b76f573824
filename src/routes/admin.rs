// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin console routes.
//!
//! Everything except the login page sits behind [`require_admin`]. The
//! pages are driven by [`QUESTION_ADMIN`].

use crate::admin::{field_label, DateFilter, QuestionForm, QuestionFormErrors, QUESTION_ADMIN};
use crate::config::AdminConfig;
use crate::db::QuestionFilter;
use crate::error::{AppError, Result};
use crate::middleware::auth::{
    create_session_token, credentials_match, removal_cookie, require_admin, session_cookie,
    AdminUser,
};
use crate::models::Question;
use crate::routes::{found, parse_id, polls};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const LOGIN_URL: &str = "/admin/login/";
pub const CHANGELIST_URL: &str = "/admin/polls/question/";

const LOGIN_ERROR: &str =
    "Please enter the correct username and password. Note that both fields may be case-sensitive.";
const FORM_ERROR: &str = "Please correct the errors below.";

/// Admin routes. The session check is applied here so it only guards them.
pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/admin/", get(admin_index))
        .route("/admin/logout/", post(logout))
        .route("/admin/polls/question/", get(changelist))
        .route(
            "/admin/polls/question/add/",
            get(add_form).post(add_submit),
        )
        .route(
            "/admin/polls/question/{question_id}/change/",
            get(change_form).post(change_submit),
        )
        .route(
            "/admin/polls/question/{question_id}/delete/",
            post(delete_question),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route(LOGIN_URL, get(login_page).post(login))
        .merge(protected)
}

fn admin_config(state: &AppState) -> Result<&AdminConfig> {
    state
        .config
        .admin
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Admin console disabled".to_string()))
}

// ─── Login / Logout ──────────────────────────────────────────

#[derive(Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct LoginContext<'a> {
    user: Option<&'a str>,
    error: Option<&'a str>,
    username: &'a str,
}

async fn login_page(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    state.templates.render(
        "admin/login.html",
        &LoginContext {
            user: None,
            error: None,
            username: "",
        },
    )
}

/// Check credentials and start a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let admin = admin_config(&state)?;

    if !credentials_match(admin, form.username.trim(), &form.password) {
        tracing::warn!(username = %form.username, "Failed admin login");
        let page = state.templates.render(
            "admin/login.html",
            &LoginContext {
                user: None,
                error: Some(LOGIN_ERROR),
                username: &form.username,
            },
        )?;
        return Ok(page.into_response());
    }

    let token = create_session_token(&admin.username, &admin.session_signing_key)?;
    tracing::info!(username = %admin.username, "Admin logged in");

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((jar, found(CHANGELIST_URL)).into_response())
}

async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    tracing::info!("Admin logged out");
    let jar = jar.remove(removal_cookie(state.config.cookie_secure));
    (jar, found(LOGIN_URL)).into_response()
}

async fn admin_index() -> Response {
    found(CHANGELIST_URL)
}

// ─── Changelist ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ChangeListParams {
    q: Option<String>,
    pub_date: Option<String>,
}

#[derive(Serialize)]
struct FilterOption {
    label: &'static str,
    href: String,
    selected: bool,
}

#[derive(Serialize)]
struct ChangeListRow {
    id: i64,
    cells: Vec<String>,
}

#[derive(Serialize)]
struct ChangeListContext<'a> {
    user: Option<&'a str>,
    search_query: &'a str,
    active_filter: &'static str,
    columns: Vec<&'static str>,
    rows: Vec<ChangeListRow>,
    filters: Vec<FilterOption>,
    result_count: usize,
    total_count: i64,
}

/// Question list with search and date filter.
async fn changelist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AdminUser>,
    Query(params): Query<ChangeListParams>,
) -> Result<Html<String>> {
    let now = Utc::now();
    let search_query = if QUESTION_ADMIN.search_fields.is_empty() {
        ""
    } else {
        params.q.as_deref().map(str::trim).unwrap_or("")
    };
    let date_filter = DateFilter::from_param(params.pub_date.as_deref());

    let filter = QuestionFilter {
        search: Some(search_query.to_string()).filter(|q| !q.is_empty()),
        pub_date_range: date_filter.bounds(now),
    };
    let questions = state.db.list_questions(&filter).await?;
    let total_count = state.db.count_questions().await?;

    tracing::debug!(
        search = search_query,
        pub_date = date_filter.param(),
        results = questions.len(),
        "Rendering question changelist"
    );

    let rows = questions
        .iter()
        .map(|question| ChangeListRow {
            id: question.id,
            cells: QUESTION_ADMIN
                .list_display
                .iter()
                .map(|column| column.render(question, now))
                .collect(),
        })
        .collect();

    let filters = DateFilter::ALL
        .iter()
        .map(|option| FilterOption {
            label: option.label(),
            href: changelist_href(search_query, *option),
            selected: *option == date_filter,
        })
        .collect();

    state.templates.render(
        "admin/change_list.html",
        &ChangeListContext {
            user: Some(&user.username),
            search_query,
            active_filter: date_filter.param(),
            columns: QUESTION_ADMIN.list_display.iter().map(|c| c.header()).collect(),
            rows,
            filters,
            result_count: questions.len(),
            total_count,
        },
    )
}

fn changelist_href(search_query: &str, filter: DateFilter) -> String {
    let mut params = Vec::new();
    if !search_query.is_empty() {
        params.push(format!("q={}", urlencoding::encode(search_query)));
    }
    if filter != DateFilter::Any {
        params.push(format!("{}={}", QUESTION_ADMIN.list_filter, filter.param()));
    }

    if params.is_empty() {
        CHANGELIST_URL.to_string()
    } else {
        format!("{}?{}", CHANGELIST_URL, params.join("&"))
    }
}

// ─── Add / Change ────────────────────────────────────────────

#[derive(Serialize)]
struct FieldView<'a> {
    name: &'static str,
    label: &'static str,
    value: &'a str,
    errors: &'a [String],
}

#[derive(Serialize)]
struct FieldsetView<'a> {
    name: &'static str,
    collapsed: bool,
    fields: Vec<FieldView<'a>>,
}

#[derive(Serialize)]
struct InlineRowView {
    index: usize,
    id: Option<i64>,
    choice_text: String,
    votes: String,
    delete: bool,
}

#[derive(Serialize)]
struct InlineView {
    title: &'static str,
    total: usize,
    rows: Vec<InlineRowView>,
}

#[derive(Serialize)]
struct ChangeFormContext<'a> {
    user: Option<&'a str>,
    title: String,
    action: String,
    delete_action: Option<String>,
    view_on_site: Option<String>,
    errors: Vec<String>,
    fieldsets: Vec<FieldsetView<'a>>,
    inline: InlineView,
}

fn render_change_form(
    state: &AppState,
    user: &AdminUser,
    question: Option<&Question>,
    form: &QuestionForm,
    extra_rows: usize,
    errors: &QuestionFormErrors,
) -> Result<Html<String>> {
    let no_errors: &[String] = &[];

    let fieldsets = QUESTION_ADMIN
        .fieldsets
        .iter()
        .map(|fieldset| {
            let fields: Vec<FieldView> = fieldset
                .fields
                .iter()
                .map(|name| FieldView {
                    name: *name,
                    label: field_label(name),
                    value: form.value(name),
                    errors: errors.fields.get(name).map(Vec::as_slice).unwrap_or(no_errors),
                })
                .collect();
            // A folded fieldset opens when one of its fields needs fixing.
            let has_errors = fields.iter().any(|f| !f.errors.is_empty());
            FieldsetView {
                name: fieldset.name,
                collapsed: fieldset.collapsed && !has_errors,
                fields,
            }
        })
        .collect();

    let rows: Vec<InlineRowView> = form
        .rows_with_extra(extra_rows)
        .into_iter()
        .enumerate()
        .map(|(index, row)| InlineRowView {
            index,
            id: row.id,
            choice_text: row.choice_text,
            votes: row.votes,
            delete: row.delete,
        })
        .collect();

    let mut messages = Vec::new();
    if !errors.is_empty() {
        messages.push(FORM_ERROR.to_string());
        messages.extend(errors.rows.iter().cloned());
    }

    let (title, action, delete_action, view_on_site) = match question {
        Some(question) => (
            format!("Change {}", QUESTION_ADMIN.verbose_name),
            change_url(question.id),
            Some(format!("{}{}/delete/", CHANGELIST_URL, question.id)),
            Some(polls::detail_url(question.id)),
        ),
        None => (
            format!("Add {}", QUESTION_ADMIN.verbose_name),
            format!("{}add/", CHANGELIST_URL),
            None,
            None,
        ),
    };

    state.templates.render(
        "admin/change_form.html",
        &ChangeFormContext {
            user: Some(&user.username),
            title,
            action,
            delete_action,
            view_on_site,
            errors: messages,
            fieldsets,
            inline: InlineView {
                title: QUESTION_ADMIN.inline.verbose_name_plural,
                total: rows.len(),
                rows,
            },
        },
    )
}

fn change_url(question_id: i64) -> String {
    format!("{}{}/change/", CHANGELIST_URL, question_id)
}

async fn add_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AdminUser>,
) -> Result<Html<String>> {
    render_change_form(
        &state,
        &user,
        None,
        &QuestionForm::default(),
        QUESTION_ADMIN.inline.extra,
        &QuestionFormErrors::default(),
    )
}

async fn add_submit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AdminUser>,
    Form(data): Form<HashMap<String, String>>,
) -> Result<Response> {
    save(&state, &user, None, &data).await
}

async fn change_form(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AdminUser>,
    Path(question_id): Path<String>,
) -> Result<Html<String>> {
    let question = load_question(&state, &question_id).await?;
    let choices = state.db.choices_for_question(question.id).await?;

    render_change_form(
        &state,
        &user,
        Some(&question),
        &QuestionForm::from_question(&question, &choices),
        QUESTION_ADMIN.inline.extra,
        &QuestionFormErrors::default(),
    )
}

async fn change_submit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AdminUser>,
    Path(question_id): Path<String>,
    Form(data): Form<HashMap<String, String>>,
) -> Result<Response> {
    let question = load_question(&state, &question_id).await?;
    save(&state, &user, Some(&question), &data).await
}

/// Validate a posted form and save it, or re-render it with errors.
async fn save(
    state: &AppState,
    user: &AdminUser,
    existing: Option<&Question>,
    data: &HashMap<String, String>,
) -> Result<Response> {
    let form = QuestionForm::from_submission(data)?;

    let cleaned = match form.clean() {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            tracing::debug!(
                question_id = ?existing.map(|q| q.id),
                field_errors = errors.fields.len(),
                row_errors = errors.rows.len(),
                "Admin question form invalid"
            );
            let page = render_change_form(state, user, existing, &form, 0, &errors)?;
            return Ok(page.into_response());
        }
    };

    state
        .db
        .save_question(
            existing.map(|q| q.id),
            &cleaned.question_text,
            cleaned.pub_date,
            &cleaned.changes,
        )
        .await?;

    Ok(found(CHANGELIST_URL))
}

async fn load_question(state: &AppState, raw_id: &str) -> Result<Question> {
    let question_id = parse_id(raw_id)?;
    state
        .db
        .get_question(question_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", question_id)))
}

// ─── Delete ──────────────────────────────────────────────────

/// Delete a question together with its choices.
async fn delete_question(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AdminUser>,
    Path(question_id): Path<String>,
) -> Result<Response> {
    let question_id = parse_id(&question_id)?;
    if !state.db.delete_question(question_id).await? {
        return Err(AppError::NotFound(format!(
            "Question {} not found",
            question_id
        )));
    }

    tracing::info!(question_id, username = %user.username, "Question deleted via admin");
    Ok(found(CHANGELIST_URL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changelist_href() {
        assert_eq!(changelist_href("", DateFilter::Any), CHANGELIST_URL);
        assert_eq!(
            changelist_href("", DateFilter::Today),
            "/admin/polls/question/?pub_date=today"
        );
        assert_eq!(
            changelist_href("what's up", DateFilter::ThisYear),
            "/admin/polls/question/?q=what%27s%20up&pub_date=this_year"
        );
    }
}
