//! Notebook endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/notebooks
pub async fn list(State(state): State<AppState>) -> Result<Json<NotebookListResponse>> {
    let notebooks = state
        .db
        .list_notebooks()
        .await?
        .iter()
        .map(DbNotebook::to_api_notebook)
        .collect();

    Ok(Json(NotebookListResponse { notebooks }))
}

/// GET /api/notebooks/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Notebook>> {
    let notebook = fetch(&state, id).await?;
    Ok(Json(notebook))
}

/// POST /api/notebooks
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateNotebookRequest>,
) -> Result<(StatusCode, Json<Notebook>)> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Notebook name is required".to_string()));
    }

    let id = state.db.create_notebook(name).await?;
    tracing::info!(notebook_id = %id, "Created notebook");

    Ok((StatusCode::CREATED, Json(fetch(&state, id).await?)))
}

/// PUT /api/notebooks/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateNotebookRequest>,
) -> Result<Json<Notebook>> {
    let name = request.name.as_deref().map(str::trim);
    if name.is_some_and(str::is_empty) {
        return Err(ApiError::BadRequest("Notebook name cannot be blank".to_string()));
    }

    if !state.db.update_notebook(id, name, request.is_pinned).await? {
        return Err(ApiError::NotFound(format!("Notebook {}", id)));
    }

    Ok(Json(fetch(&state, id).await?))
}

/// POST /api/notebooks/:id/pin
pub async fn toggle_pin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notebook>> {
    state
        .db
        .toggle_pin(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Notebook {}", id)))?;

    Ok(Json(fetch(&state, id).await?))
}

/// DELETE /api/notebooks/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let deleted = state.db.delete_notebook(id).await?;
    if deleted {
        tracing::info!(notebook_id = %id, "Deleted notebook");
    }

    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

async fn fetch(state: &AppState, id: Uuid) -> Result<Notebook> {
    state
        .db
        .get_notebook(id)
        .await?
        .map(|n| n.to_api_notebook())
        .ok_or_else(|| ApiError::NotFound(format!("Notebook {}", id)))
}
