//! Card endpoints, including batch import

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::import;
use crate::AppState;

/// GET /api/notebooks/:id/cards
pub async fn list_in_notebook(
    State(state): State<AppState>,
    Path(notebook_id): Path<Uuid>,
) -> Result<Json<CardListResponse>> {
    ensure_notebook(&state, notebook_id).await?;

    let cards = state
        .db
        .get_cards_by_notebook(notebook_id)
        .await?
        .iter()
        .map(DbCard::to_core_card)
        .collect();

    Ok(Json(CardListResponse { cards }))
}

/// GET /api/cards?q=&sort=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<CardSearchQuery>,
) -> Result<Json<CardSearchResponse>> {
    let cards = state
        .db
        .search_cards(query.q.as_deref(), query.sort)
        .await?
        .iter()
        .map(DbCardListing::to_api_listing)
        .collect();

    Ok(Json(CardSearchResponse { cards }))
}

/// POST /api/notebooks/:id/cards
pub async fn create(
    State(state): State<AppState>,
    Path(notebook_id): Path<Uuid>,
    Json(request): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<Card>)> {
    let new_card = request
        .validate()
        .ok_or_else(|| ApiError::BadRequest("English and Chinese are required".to_string()))?;

    ensure_notebook(&state, notebook_id).await?;

    let card = state
        .db
        .insert_cards(notebook_id, std::slice::from_ref(&new_card))
        .await?
        .pop()
        .ok_or_else(|| ApiError::Internal("Insert returned no row".to_string()))?;

    Ok((StatusCode::CREATED, Json(card.to_core_card())))
}

/// PUT /api/cards/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCardRequest>,
) -> Result<Json<Card>> {
    let blank = |field: &Option<String>| field.as_deref().is_some_and(|v| v.trim().is_empty());
    if blank(&request.english) || blank(&request.chinese) {
        return Err(ApiError::BadRequest(
            "English and Chinese cannot be blank".to_string(),
        ));
    }

    let card = state
        .db
        .update_card_content(id, &request)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Card {}", id)))?;

    Ok(Json(card.to_core_card()))
}

/// DELETE /api/cards/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let deleted = state.db.delete_card(id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// POST /api/import/preview
pub async fn preview_import(Json(request): Json<ImportRequest>) -> Json<ImportPreviewResponse> {
    let lines = import::parse(&request.text, request.delimiter);
    let valid_count = lines.iter().filter(|l| l.is_valid()).count();

    Json(ImportPreviewResponse {
        invalid_count: lines.len() - valid_count,
        valid_count,
        lines,
    })
}

/// POST /api/notebooks/:id/cards/batch
pub async fn batch_create(
    State(state): State<AppState>,
    Path(notebook_id): Path<Uuid>,
    Json(request): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ImportResponse>)> {
    let (cards, invalid) = import::partition(import::parse(&request.text, request.delimiter));
    if cards.is_empty() {
        return Err(ApiError::Import("No valid lines to import".to_string()));
    }

    ensure_notebook(&state, notebook_id).await?;

    let created: Vec<Card> = state
        .db
        .insert_cards(notebook_id, &cards)
        .await?
        .iter()
        .map(DbCard::to_core_card)
        .collect();

    tracing::info!(
        notebook_id = %notebook_id,
        created = created.len(),
        skipped = invalid.len(),
        "Batch imported cards"
    );

    Ok((StatusCode::CREATED, Json(ImportResponse { created, invalid })))
}

async fn ensure_notebook(state: &AppState, id: Uuid) -> Result<()> {
    state
        .db
        .get_notebook(id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound(format!("Notebook {}", id)))
}
