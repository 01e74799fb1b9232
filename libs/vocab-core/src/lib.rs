//! Core vocabulary review library shared by the backend and any other client.
//!
//! Provides:
//! - Fixed-ladder spaced repetition scheduler (due selection, shuffling, grading)
//! - Review session orchestration (requeue on `again`, completion, summary)
//! - Shared types (Card, CardState, Grade, Notebook, etc.)

pub mod error;
pub mod scheduler;
pub mod session;
pub mod types;

pub use error::{InvalidGradeError, Result, SessionError};
pub use scheduler::{
    familiar_interval, is_due, next_state, next_state_for_action, select_due, shuffle,
    shuffle_seeded, Schedulable, FAMILIAR_LADDER_DAYS, NORMAL_INTERVAL_DAYS,
};
pub use session::{
    GradeOutcome, GradingEvent, ReviewSession, SessionCompletion, SessionProgress, SessionSummary,
};
pub use types::{Card, CardState, CardStatus, CardUpdate, Grade, Notebook};
