//! Core types for the vocabulary notebook application.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InvalidGradeError;

/// Card lifecycle stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    #[default]
    New,
    Normal,
    Familiar,
}

impl CardStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Normal => "normal",
            Self::Familiar => "familiar",
        }
    }

    /// Parse from the storage representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "normal" => Some(Self::Normal),
            "familiar" => Some(Self::Familiar),
            _ => None,
        }
    }
}

/// Recall quality chosen by the user for the card under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// Show the card again later in the same session.
    Again,
    /// Review tomorrow.
    Normal,
    /// Push the card up the interval ladder.
    Familiar,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Normal => "normal",
            Self::Familiar => "familiar",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = InvalidGradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "again" => Ok(Self::Again),
            "normal" => Ok(Self::Normal),
            "familiar" => Ok(Self::Familiar),
            other => Err(InvalidGradeError::new(other)),
        }
    }
}

/// Review schedule of a single card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardState {
    pub status: CardStatus,
    pub next_review_at: Option<DateTime<Utc>>,
    /// Days until the next review, 0 when not yet scheduled.
    pub current_interval: u32,
    pub consecutive_familiar_count: u32,
}

impl Default for CardState {
    fn default() -> Self {
        Self {
            status: CardStatus::New,
            next_review_at: None,
            current_interval: 0,
            consecutive_familiar_count: 0,
        }
    }
}

impl CardState {
    /// Copy of this state with `update` written over it.
    pub fn with_update(&self, update: &CardUpdate) -> Self {
        Self {
            status: update.status,
            next_review_at: update.next_review_at,
            current_interval: update.current_interval,
            consecutive_familiar_count: update.consecutive_familiar_count,
        }
    }
}

/// Values to write back to the card store after a grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardUpdate {
    pub status: CardStatus,
    pub next_review_at: Option<DateTime<Utc>>,
    pub current_interval: u32,
    pub consecutive_familiar_count: u32,
}

/// Vocabulary card with its review state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub notebook_id: Uuid,
    pub english: String,
    pub part_of_speech: String,
    pub chinese: String,
    #[serde(flatten)]
    pub state: CardState,
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Copy of this card with `update` applied to its review state.
    pub fn with_update(&self, update: &CardUpdate) -> Self {
        Self {
            state: self.state.with_update(update),
            ..self.clone()
        }
    }
}

/// Notebook with card counts per status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    pub id: Uuid,
    pub name: String,
    pub is_pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tested_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub total_cards: usize,
    pub new_cards: usize,
    pub normal_cards: usize,
    pub familiar_cards: usize,
}
