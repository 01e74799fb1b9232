//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helper functions for creating test data
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use vocab_backend::db::Database;
use vocab_backend::services::import::NewCard;
use vocab_backend::{router, AppState};
use vocab_core::CardUpdate;

/// Test context containing database connection and test router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
    notebooks: std::sync::Mutex<Vec<Uuid>>,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(db);
        let db = state.db.clone();
        let app = router(state);

        Self {
            db,
            app,
            notebooks: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a notebook directly in the database; it is removed on cleanup.
    pub async fn create_notebook(&self, name: &str) -> Uuid {
        let id = self
            .db
            .create_notebook(&fixtures::unique_name(name))
            .await
            .expect("Failed to create test notebook");
        self.track(id);
        id
    }

    /// Remember a notebook created through the API so cleanup removes it.
    pub fn track(&self, notebook_id: Uuid) {
        self.notebooks.lock().unwrap().push(notebook_id);
    }

    /// Insert cards with `status = new` and return their IDs in order.
    pub async fn create_cards(&self, notebook_id: Uuid, words: &[&str]) -> Vec<Uuid> {
        let cards: Vec<NewCard> = words.iter().map(|w| fixtures::new_card(w)).collect();
        self.db
            .insert_cards(notebook_id, &cards)
            .await
            .expect("Failed to insert test cards")
            .into_iter()
            .map(|c| c.id)
            .collect()
    }

    /// Schedule a card so it is not due until `next_review_at`.
    pub async fn schedule_card(&self, card_id: Uuid, next_review_at: DateTime<Utc>) {
        let update = CardUpdate {
            status: vocab_core::CardStatus::Normal,
            next_review_at: Some(next_review_at),
            current_interval: 1,
            consecutive_familiar_count: 0,
        };
        self.db
            .update_card_state(card_id, &update)
            .await
            .expect("Failed to schedule test card");
    }

    /// Clean up test data.
    ///
    /// Call this after tests; deleting a notebook cascades to its cards.
    pub async fn cleanup(&self) {
        let ids: Vec<Uuid> = self.notebooks.lock().unwrap().drain(..).collect();
        for id in ids {
            let _ = self.db.delete_notebook(id).await;
        }
    }
}
