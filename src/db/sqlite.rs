// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Questions (public listing, detail lookups, admin changelist)
//! - Choices (per-question listing, vote increments)
//! - Admin saves (question plus inline choices in one transaction)

use crate::error::AppError;
use crate::models::{Choice, Question};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const MAX_CONNECTIONS: u32 = 5;

/// SQLite database client.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

/// Changelist filters applied by the admin console.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    /// Case-insensitive substring match on `question_text`
    pub search: Option<String>,
    /// Half-open `[start, end)` range on `pub_date`
    pub pub_date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

/// One inline choice row submitted with an admin question form.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceChange {
    Create { choice_text: String, votes: i64 },
    Update { id: i64, choice_text: String, votes: i64 },
    Delete { id: i64 },
}

impl Db {
    /// Open (creating if needed) the database at `database_url` and apply
    /// pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        if database_url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Database(format!("Invalid DATABASE_URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open SQLite database: {}", e)))?;

        let db = Self { pool };
        db.migrate().await?;

        tracing::info!(url = database_url, "Connected to SQLite");
        Ok(db)
    }

    /// Create a private in-memory database (used by tests).
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that never expires.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::Database(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), AppError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))
    }

    // ─── Question Operations ─────────────────────────────────────

    /// Most recent questions already published at `now`, newest first.
    pub async fn latest_published_questions(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Question>, AppError> {
        sqlx::query_as::<_, Question>(
            "SELECT id, question_text, pub_date FROM questions \
             WHERE pub_date <= ? ORDER BY pub_date DESC, id DESC LIMIT ?",
        )
        .bind(now)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a question by ID only if it is published at `now`.
    pub async fn get_published_question(
        &self,
        question_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Question>, AppError> {
        sqlx::query_as::<_, Question>(
            "SELECT id, question_text, pub_date FROM questions WHERE id = ? AND pub_date <= ?",
        )
        .bind(question_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a question by ID regardless of its publish date.
    pub async fn get_question(&self, question_id: i64) -> Result<Option<Question>, AppError> {
        sqlx::query_as::<_, Question>(
            "SELECT id, question_text, pub_date FROM questions WHERE id = ?",
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a question with no choices.
    pub async fn create_question(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
    ) -> Result<Question, AppError> {
        let question = sqlx::query_as::<_, Question>(
            "INSERT INTO questions (question_text, pub_date) VALUES (?, ?) \
             RETURNING id, question_text, pub_date",
        )
        .bind(question_text)
        .bind(pub_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(question_id = question.id, "Created question");
        Ok(question)
    }

    /// Questions matching the admin changelist filters, newest first.
    pub async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>, AppError> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, question_text, pub_date FROM questions WHERE 1 = 1");

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query
                .push(" AND question_text LIKE ")
                .push_bind(format!("%{}%", escape_like(search)))
                .push(" ESCAPE '\\'");
        }

        if let Some((start, end)) = filter.pub_date_range {
            query
                .push(" AND pub_date >= ")
                .push_bind(start)
                .push(" AND pub_date < ")
                .push_bind(end);
        }

        query.push(" ORDER BY pub_date DESC, id DESC");

        query
            .build_query_as::<Question>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Total number of questions.
    pub async fn count_questions(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert (`question_id == None`) or update a question and apply its
    /// inline choice changes, all in one transaction.
    pub async fn save_question(
        &self,
        question_id: Option<i64>,
        question_text: &str,
        pub_date: DateTime<Utc>,
        changes: &[ChoiceChange],
    ) -> Result<Question, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let question = match question_id {
            Some(id) => sqlx::query_as::<_, Question>(
                "UPDATE questions SET question_text = ?, pub_date = ? WHERE id = ? \
                 RETURNING id, question_text, pub_date",
            )
            .bind(question_text)
            .bind(pub_date)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Question {} not found", id)))?,
            None => sqlx::query_as::<_, Question>(
                "INSERT INTO questions (question_text, pub_date) VALUES (?, ?) \
                 RETURNING id, question_text, pub_date",
            )
            .bind(question_text)
            .bind(pub_date)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?,
        };

        for change in changes {
            let result = match change {
                ChoiceChange::Create { choice_text, votes } => sqlx::query(
                    "INSERT INTO choices (question_id, choice_text, votes) VALUES (?, ?, ?)",
                )
                .bind(question.id)
                .bind(choice_text)
                .bind(votes)
                .execute(&mut *tx)
                .await,
                ChoiceChange::Update {
                    id,
                    choice_text,
                    votes,
                } => sqlx::query(
                    "UPDATE choices SET choice_text = ?, votes = ? WHERE id = ? AND question_id = ?",
                )
                .bind(choice_text)
                .bind(votes)
                .bind(id)
                .bind(question.id)
                .execute(&mut *tx)
                .await,
                ChoiceChange::Delete { id } => {
                    sqlx::query("DELETE FROM choices WHERE id = ? AND question_id = ?")
                        .bind(id)
                        .bind(question.id)
                        .execute(&mut *tx)
                        .await
                }
            }
            .map_err(|e| AppError::Database(e.to_string()))?;

            if result.rows_affected() == 0 {
                // Dropping `tx` rolls the whole save back.
                return Err(AppError::BadRequest(format!(
                    "Choice does not belong to question {}",
                    question.id
                )));
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            question_id = question.id,
            created = question_id.is_none(),
            choice_changes = changes.len(),
            "Saved question"
        );
        Ok(question)
    }

    /// Delete a question; its choices go with it. Returns false if absent.
    pub async fn delete_question(&self, question_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(question_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(question_id, "Deleted question");
        }
        Ok(deleted)
    }

    // ─── Choice Operations ───────────────────────────────────────

    /// Choices of a question in creation order.
    pub async fn choices_for_question(&self, question_id: i64) -> Result<Vec<Choice>, AppError> {
        sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, choice_text, votes FROM choices \
             WHERE question_id = ? ORDER BY id",
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Resolve a choice ID among one question's choices.
    pub async fn get_choice_for_question(
        &self,
        question_id: i64,
        choice_id: i64,
    ) -> Result<Option<Choice>, AppError> {
        sqlx::query_as::<_, Choice>(
            "SELECT id, question_id, choice_text, votes FROM choices \
             WHERE id = ? AND question_id = ?",
        )
        .bind(choice_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a choice under a question.
    pub async fn create_choice(
        &self,
        question_id: i64,
        choice_text: &str,
        votes: i64,
    ) -> Result<Choice, AppError> {
        sqlx::query_as::<_, Choice>(
            "INSERT INTO choices (question_id, choice_text, votes) VALUES (?, ?, ?) \
             RETURNING id, question_id, choice_text, votes",
        )
        .bind(question_id)
        .bind(choice_text)
        .bind(votes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add exactly one vote to a choice of the given question.
    ///
    /// The increment happens inside a single UPDATE, so concurrent votes on
    /// the same choice are not lost.
    pub async fn record_vote(&self, question_id: i64, choice_id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE choices SET votes = votes + 1 WHERE id = ? AND question_id = ?",
        )
        .bind(choice_id)
        .bind(question_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Choice {} not found for question {}",
                choice_id, question_id
            )));
        }

        tracing::debug!(question_id, choice_id, "Recorded vote");
        Ok(())
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
