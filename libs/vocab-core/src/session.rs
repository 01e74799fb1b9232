//! Review session over a shuffled queue of due cards.
//!
//! The session never talks to storage. Each grading returns a
//! [`GradeOutcome`] telling the caller what to persist, and the final
//! grading carries the notebooks that must be marked as tested.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SessionError};
use crate::scheduler::{familiar_interval, next_state, select_due, shuffle};
use crate::types::{Card, CardUpdate, Grade};

/// One grading, as recorded in the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingEvent {
    pub card_id: Uuid,
    pub grade: Grade,
    pub graded_at: DateTime<Utc>,
}

/// What the caller has to do after a grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeOutcome {
    pub card_id: Uuid,
    pub grade: Grade,
    /// Values to write to the card store; `None` for `again`.
    pub update: Option<CardUpdate>,
    /// Set on the grading that finishes the session.
    pub completion: Option<SessionCompletion>,
}

/// Side effects owed when the queue is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCompletion {
    /// Distinct notebooks of the original queue, in first-seen order.
    pub notebook_ids: Vec<Uuid>,
    pub completed_at: DateTime<Utc>,
}

/// Counts and card lists shown at the end of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Cards graded `normal` or `familiar`.
    pub reviewed: usize,
    pub familiar: usize,
    pub normal: usize,
    /// Distinct cards graded `again` at least once.
    pub needed_review: usize,
    pub familiar_cards: Vec<Card>,
    pub normal_cards: Vec<Card>,
    pub needed_review_cards: Vec<Card>,
}

/// Progress snapshot for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    /// Zero-based cursor into the queue.
    pub position: usize,
    pub queue_len: usize,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<Card>,
    /// Interval a `familiar` grading would give the current card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub familiar_interval: Option<u32>,
}

/// A single run through a queue of due cards.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    queue: Vec<Card>,
    cursor: usize,
    notebook_ids: Vec<Uuid>,
    familiar: Vec<Card>,
    normal: Vec<Card>,
    again: Vec<Card>,
    events: Vec<GradingEvent>,
}

impl ReviewSession {
    /// Select the due cards among `cards` and shuffle them into a session.
    pub fn start<R>(cards: &[Card], now: DateTime<Utc>, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let due = select_due(cards, now);
        if due.is_empty() {
            return Err(SessionError::NothingDue);
        }
        Ok(Self::from_queue(shuffle(&due, rng)))
    }

    /// Session over `queue` in the given order.
    pub fn from_queue(queue: Vec<Card>) -> Self {
        let mut seen = HashSet::new();
        let notebook_ids = queue
            .iter()
            .map(|card| card.notebook_id)
            .filter(|id| seen.insert(*id))
            .collect();

        Self {
            queue,
            cursor: 0,
            notebook_ids,
            familiar: Vec::new(),
            normal: Vec::new(),
            again: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&Card> {
        self.queue.get(self.cursor)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    pub fn notebook_ids(&self) -> &[Uuid] {
        &self.notebook_ids
    }

    /// Every grading so far, repeats included.
    pub fn events(&self) -> &[GradingEvent] {
        &self.events
    }

    pub fn progress(&self) -> SessionProgress {
        let current = self.current().cloned();
        let familiar_interval = current
            .as_ref()
            .map(|card| familiar_interval(card.state.consecutive_familiar_count.saturating_add(1)));

        SessionProgress {
            position: self.cursor,
            queue_len: self.queue.len(),
            complete: self.is_complete(),
            current,
            familiar_interval,
        }
    }

    /// Grade the card under the cursor and advance.
    pub fn grade(&mut self, grade: Grade, now: DateTime<Utc>) -> Result<GradeOutcome> {
        let card = match self.current() {
            Some(card) => card.clone(),
            None => {
                return Err(SessionError::Finished {
                    graded: self.events.len(),
                })
            }
        };

        let update = match grade {
            Grade::Again => {
                // Pre-grading snapshot goes to the back of the queue.
                self.queue.push(card.clone());
                self.again.push(card.clone());
                None
            }
            Grade::Normal | Grade::Familiar => {
                let update = next_state(&card.state, grade, now);
                let graded = card.with_update(&update);
                match grade {
                    Grade::Familiar => self.familiar.push(graded),
                    _ => self.normal.push(graded),
                }
                Some(update)
            }
        };

        self.events.push(GradingEvent {
            card_id: card.id,
            grade,
            graded_at: now,
        });
        self.cursor += 1;

        let completion = self.is_complete().then(|| SessionCompletion {
            notebook_ids: self.notebook_ids.clone(),
            completed_at: now,
        });

        Ok(GradeOutcome {
            card_id: card.id,
            grade,
            update,
            completion,
        })
    }

    pub fn summary(&self) -> SessionSummary {
        let mut seen = HashSet::new();
        let needed_review_cards: Vec<Card> = self
            .again
            .iter()
            .filter(|card| seen.insert(card.id))
            .cloned()
            .collect();

        SessionSummary {
            reviewed: self.familiar.len() + self.normal.len(),
            familiar: self.familiar.len(),
            normal: self.normal.len(),
            needed_review: needed_review_cards.len(),
            familiar_cards: self.familiar.clone(),
            normal_cards: self.normal.clone(),
            needed_review_cards,
        }
    }
}
