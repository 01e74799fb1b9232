//! PostgreSQL database operations

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::import::NewCard;

const NOTEBOOK_COLUMNS: &str = r#"
    n.id, n.name, n.is_pinned, n.last_tested_at, n.created_at,
    COUNT(c.id) AS total_cards,
    COUNT(c.id) FILTER (WHERE c.status = 'new') AS new_cards,
    COUNT(c.id) FILTER (WHERE c.status = 'normal') AS normal_cards,
    COUNT(c.id) FILTER (WHERE c.status = 'familiar') AS familiar_cards
"#;

const CARD_COLUMNS: &str = r#"
    id, notebook_id, english, part_of_speech, chinese, status,
    next_review_at, current_interval, consecutive_familiar_count, created_at
"#;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that only connects on first use and gives up quickly
    /// when the server is unreachable
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    // === Notebook Repository ===

    /// List notebooks with card counts, pinned first, then newest first
    pub async fn list_notebooks(&self) -> Result<Vec<DbNotebook>> {
        let sql = format!(
            r#"
            SELECT {NOTEBOOK_COLUMNS}
            FROM notebooks n
            LEFT JOIN cards c ON c.notebook_id = n.id
            GROUP BY n.id
            ORDER BY n.is_pinned DESC, n.created_at DESC
            "#
        );
        let notebooks = sqlx::query_as::<_, DbNotebook>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(notebooks)
    }

    /// Get notebook by ID
    pub async fn get_notebook(&self, id: Uuid) -> Result<Option<DbNotebook>> {
        let sql = format!(
            r#"
            SELECT {NOTEBOOK_COLUMNS}
            FROM notebooks n
            LEFT JOIN cards c ON c.notebook_id = n.id
            WHERE n.id = $1
            GROUP BY n.id
            "#
        );
        let notebook = sqlx::query_as::<_, DbNotebook>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(notebook)
    }

    /// Create a notebook and return its ID
    pub async fn create_notebook(&self, name: &str) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO notebooks (name)
            VALUES ($1)
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Update name and/or pin flag; returns false if the notebook does not exist
    pub async fn update_notebook(
        &self,
        id: Uuid,
        name: Option<&str>,
        is_pinned: Option<bool>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE notebooks
            SET name = COALESCE($2, name),
                is_pinned = COALESCE($3, is_pinned)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(is_pinned)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip the pin flag; returns the new value
    pub async fn toggle_pin(&self, id: Uuid) -> Result<Option<bool>> {
        let pinned: Option<bool> = sqlx::query_scalar(
            r#"
            UPDATE notebooks
            SET is_pinned = NOT is_pinned
            WHERE id = $1
            RETURNING is_pinned
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pinned)
    }

    /// Delete a notebook and its cards
    pub async fn delete_notebook(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notebooks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set `last_tested_at` on every listed notebook
    pub async fn mark_notebooks_tested(&self, ids: &[Uuid], at: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notebooks
            SET last_tested_at = $2
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // === Card Repository ===

    /// Get card by ID
    pub async fn get_card(&self, id: Uuid) -> Result<Option<DbCard>> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1");
        let card = sqlx::query_as::<_, DbCard>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(card)
    }

    /// Cards of one notebook, newest first
    pub async fn get_cards_by_notebook(&self, notebook_id: Uuid) -> Result<Vec<DbCard>> {
        let sql = format!(
            r#"
            SELECT {CARD_COLUMNS}
            FROM cards
            WHERE notebook_id = $1
            ORDER BY created_at DESC
            "#
        );
        let cards = sqlx::query_as::<_, DbCard>(&sql)
            .bind(notebook_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(cards)
    }

    /// Cards belonging to any of the listed notebooks
    pub async fn get_cards_in_notebooks(&self, notebook_ids: &[Uuid]) -> Result<Vec<DbCard>> {
        let sql = format!(
            r#"
            SELECT {CARD_COLUMNS}
            FROM cards
            WHERE notebook_id = ANY($1)
            "#
        );
        let cards = sqlx::query_as::<_, DbCard>(&sql)
            .bind(notebook_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(cards)
    }

    /// All cards with their notebook name, optionally filtered by a
    /// substring of english, part of speech or chinese
    pub async fn search_cards(
        &self,
        query: Option<&str>,
        sort: CardSort,
    ) -> Result<Vec<DbCardListing>> {
        let order = match sort {
            CardSort::Alpha => "LOWER(c.english) ASC, c.english ASC",
            CardSort::Date => "c.created_at DESC",
        };
        let sql = format!(
            r#"
            SELECT c.id, c.notebook_id, c.english, c.part_of_speech, c.chinese,
                   c.status, c.next_review_at, c.current_interval,
                   c.consecutive_familiar_count, c.created_at,
                   n.name AS notebook_name
            FROM cards c
            JOIN notebooks n ON n.id = c.notebook_id
            WHERE $1::TEXT IS NULL
               OR c.english ILIKE '%' || $1 || '%'
               OR c.part_of_speech ILIKE '%' || $1 || '%'
               OR c.chinese ILIKE '%' || $1 || '%'
            ORDER BY {order}
            "#
        );
        let pattern = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(escape_like);
        let cards = sqlx::query_as::<_, DbCardListing>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(cards)
    }

    /// Insert new cards into a notebook in one transaction
    pub async fn insert_cards(&self, notebook_id: Uuid, cards: &[NewCard]) -> Result<Vec<DbCard>> {
        let sql = format!(
            r#"
            INSERT INTO cards (notebook_id, english, part_of_speech, chinese,
                               status, consecutive_familiar_count)
            VALUES ($1, $2, $3, $4, 'new', 0)
            RETURNING {CARD_COLUMNS}
            "#
        );

        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(cards.len());
        for card in cards {
            let row = sqlx::query_as::<_, DbCard>(&sql)
                .bind(notebook_id)
                .bind(&card.english)
                .bind(&card.part_of_speech)
                .bind(&card.chinese)
                .fetch_one(&mut *tx)
                .await?;
            inserted.push(row);
        }
        tx.commit().await?;

        Ok(inserted)
    }

    /// Edit the vocabulary content of a card
    pub async fn update_card_content(
        &self,
        id: Uuid,
        request: &UpdateCardRequest,
    ) -> Result<Option<DbCard>> {
        let sql = format!(
            r#"
            UPDATE cards
            SET english = COALESCE($2, english),
                part_of_speech = COALESCE($3, part_of_speech),
                chinese = COALESCE($4, chinese)
            WHERE id = $1
            RETURNING {CARD_COLUMNS}
            "#
        );
        let card = sqlx::query_as::<_, DbCard>(&sql)
            .bind(id)
            .bind(request.english.as_deref().map(str::trim))
            .bind(request.part_of_speech.as_deref().map(str::trim))
            .bind(request.chinese.as_deref().map(str::trim))
            .fetch_optional(&self.pool)
            .await?;

        Ok(card)
    }

    /// Write the schedule computed by the scheduler
    pub async fn update_card_state(&self, id: Uuid, update: &CardUpdate) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE cards
            SET status = $2,
                next_review_at = $3,
                current_interval = $4,
                consecutive_familiar_count = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.status.as_str())
        .bind(update.next_review_at)
        .bind(to_int_column("current_interval", update.current_interval)?)
        .bind(to_int_column(
            "consecutive_familiar_count",
            update.consecutive_familiar_count,
        )?)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a card
    pub async fn delete_card(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Narrow a counter to the INTEGER column type
fn to_int_column(column: &str, value: u32) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| ApiError::Internal(format!("{} out of range: {}", column, value)))
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
