//! Quiz session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use vocab_core::ReviewSession;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// POST /api/quiz
pub async fn start(
    State(state): State<AppState>,
    Json(request): Json<StartQuizRequest>,
) -> Result<(StatusCode, Json<QuizResponse>)> {
    if request.notebook_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "Select at least one notebook".to_string(),
        ));
    }

    let cards: Vec<Card> = state
        .db
        .get_cards_in_notebooks(&request.notebook_ids)
        .await?
        .iter()
        .map(DbCard::to_core_card)
        .collect();

    let session = ReviewSession::start(&cards, Utc::now(), &mut rand::thread_rng())?;
    let progress = session.progress();
    let session_id = state.sessions.insert(session).await;

    tracing::info!(
        session_id = %session_id,
        notebooks = request.notebook_ids.len(),
        due = progress.queue_len,
        "Started quiz session"
    );

    Ok((
        StatusCode::CREATED,
        Json(QuizResponse {
            session_id,
            progress,
        }),
    ))
}

/// GET /api/quiz/:id
pub async fn progress(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<QuizResponse>> {
    let handle = state.sessions.get(session_id).await?;
    let progress = handle.lock().await.progress();

    Ok(Json(QuizResponse {
        session_id,
        progress,
    }))
}

/// POST /api/quiz/:id/grade
pub async fn grade(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<GradeRequest>,
) -> Result<Json<GradeResponse>> {
    let grade: Grade = request.grade.parse()?;
    let handle = state.sessions.get(session_id).await?;

    // Held across the store writes so gradings in one session stay ordered.
    let mut session = handle.lock().await;
    let now = Utc::now();

    // Graded on a copy; the session only advances once the writes succeed.
    let mut draft = session.clone();
    let outcome = draft.grade(grade, now)?;

    tracing::debug!(
        session_id = %session_id,
        card_id = %outcome.card_id,
        grade = %grade,
        "Graded card"
    );

    if let Some(update) = &outcome.update {
        if !state.db.update_card_state(outcome.card_id, update).await? {
            tracing::warn!(card_id = %outcome.card_id, "Graded card no longer exists");
        }
    }

    let summary = match &outcome.completion {
        Some(completion) => {
            let marked = state
                .db
                .mark_notebooks_tested(&completion.notebook_ids, completion.completed_at)
                .await?;
            tracing::info!(
                session_id = %session_id,
                notebooks = marked,
                gradings = draft.events().len(),
                "Completed quiz session"
            );
            Some(draft.summary())
        }
        None => None,
    };

    *session = draft;

    Ok(Json(GradeResponse {
        session_id,
        card_id: outcome.card_id,
        grade: outcome.grade,
        update: outcome.update,
        progress: session.progress(),
        summary,
    }))
}

/// GET /api/quiz/:id/summary
pub async fn summary(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SummaryResponse>> {
    let handle = state.sessions.get(session_id).await?;
    let session = handle.lock().await;

    Ok(Json(SummaryResponse {
        session_id,
        complete: session.is_complete(),
        summary: session.summary(),
    }))
}

/// DELETE /api/quiz/:id
pub async fn abandon(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let removed = state.sessions.remove(session_id).await;
    if !removed {
        return Err(ApiError::NotFound(format!("Quiz session {}", session_id)));
    }

    tracing::info!(session_id = %session_id, "Abandoned quiz session");
    Ok(Json(serde_json::json!({ "abandoned": true })))
}
