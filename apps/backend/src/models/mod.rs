//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from vocab-core
pub use vocab_core::{
    Card, CardState, CardStatus, CardUpdate, Grade, Notebook, SessionProgress, SessionSummary,
};

use crate::services::import::{Delimiter, ImportLine, NewCard};

// === Database Entity Types ===

/// Notebook row joined with per-status card counts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNotebook {
    pub id: Uuid,
    pub name: String,
    pub is_pinned: bool,
    pub last_tested_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub total_cards: i64,
    pub new_cards: i64,
    pub normal_cards: i64,
    pub familiar_cards: i64,
}

impl DbNotebook {
    /// Convert to API notebook type
    pub fn to_api_notebook(&self) -> Notebook {
        Notebook {
            id: self.id,
            name: self.name.clone(),
            is_pinned: self.is_pinned,
            last_tested_at: self.last_tested_at,
            created_at: self.created_at,
            total_cards: self.total_cards.max(0) as usize,
            new_cards: self.new_cards.max(0) as usize,
            normal_cards: self.normal_cards.max(0) as usize,
            familiar_cards: self.familiar_cards.max(0) as usize,
        }
    }
}

/// Card stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCard {
    pub id: Uuid,
    pub notebook_id: Uuid,
    pub english: String,
    pub part_of_speech: String,
    pub chinese: String,
    pub status: String,
    pub next_review_at: Option<DateTime<Utc>>,
    pub current_interval: i32,
    pub consecutive_familiar_count: i32,
    pub created_at: DateTime<Utc>,
}

impl DbCard {
    /// Convert to vocab-core card
    pub fn to_core_card(&self) -> Card {
        Card {
            id: self.id,
            notebook_id: self.notebook_id,
            english: self.english.clone(),
            part_of_speech: self.part_of_speech.clone(),
            chinese: self.chinese.clone(),
            state: self.to_core_state(),
            created_at: self.created_at,
        }
    }

    /// Convert the schedule columns to vocab-core CardState
    pub fn to_core_state(&self) -> CardState {
        CardState {
            status: CardStatus::from_str(&self.status).unwrap_or_else(|| {
                tracing::warn!(
                    card_id = %self.id,
                    status = %self.status,
                    "Unknown card status, treating card as new"
                );
                CardStatus::New
            }),
            next_review_at: self.next_review_at,
            current_interval: self.current_interval.max(0) as u32,
            consecutive_familiar_count: self.consecutive_familiar_count.max(0) as u32,
        }
    }
}

/// Card row joined with the name of its notebook
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCardListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub card: DbCard,
    pub notebook_name: String,
}

impl DbCardListing {
    pub fn to_api_listing(&self) -> CardListing {
        CardListing {
            card: self.card.to_core_card(),
            notebook_name: self.notebook_name.clone(),
        }
    }
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateNotebookRequest {
    pub name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateNotebookRequest {
    pub name: Option<String>,
    pub is_pinned: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotebookListResponse {
    pub notebooks: Vec<Notebook>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCardRequest {
    pub english: String,
    #[serde(default)]
    pub part_of_speech: String,
    pub chinese: String,
}

impl CreateCardRequest {
    /// Trimmed card content; english and chinese must not be blank
    pub fn validate(&self) -> Option<NewCard> {
        let english = self.english.trim();
        let chinese = self.chinese.trim();
        if english.is_empty() || chinese.is_empty() {
            return None;
        }
        Some(NewCard {
            english: english.to_string(),
            part_of_speech: self.part_of_speech.trim().to_string(),
            chinese: chinese.to_string(),
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateCardRequest {
    pub english: Option<String>,
    pub part_of_speech: Option<String>,
    pub chinese: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CardListResponse {
    pub cards: Vec<Card>,
}

/// Card in the all-cards listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardListing {
    #[serde(flatten)]
    pub card: Card,
    pub notebook_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CardSearchResponse {
    pub cards: Vec<CardListing>,
}

/// Sort order for the all-cards listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSort {
    /// By english word, A to Z
    #[default]
    Alpha,
    /// Newest first
    Date,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CardSearchQuery {
    pub q: Option<String>,
    #[serde(default)]
    pub sort: CardSort,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportRequest {
    pub text: String,
    #[serde(default)]
    pub delimiter: Delimiter,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportPreviewResponse {
    pub lines: Vec<ImportLine>,
    pub valid_count: usize,
    pub invalid_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub created: Vec<Card>,
    pub invalid: Vec<ImportLine>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartQuizRequest {
    pub notebook_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub progress: SessionProgress,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GradeRequest {
    /// One of `again`, `normal`, `familiar`; validated by the handler
    pub grade: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GradeResponse {
    pub session_id: Uuid,
    pub card_id: Uuid,
    pub grade: Grade,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<CardUpdate>,
    #[serde(flatten)]
    pub progress: SessionProgress,
    /// Present once the queue is exhausted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub session_id: Uuid,
    pub complete: bool,
    #[serde(flatten)]
    pub summary: SessionSummary,
}
