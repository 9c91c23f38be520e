//! Posture Routes

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;
use storage::{NewPostureRecord, PostureRecord};

use crate::error::ApiError;
use crate::AppState;

/// List every stored posture record
pub async fn get_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PostureRecord>>, ApiError> {
    let records = state.service.get_all_records().await?;
    Ok(Json(records))
}

/// Save one posture record.
///
/// `id` and `recordedAt` in the body are ignored; the store assigns both.
pub async fn save(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewPostureRecord>, JsonRejection>,
) -> Result<Json<PostureRecord>, ApiError> {
    let Json(record) = payload.map_err(|e| ApiError::MalformedRequest(e.body_text()))?;
    let stored = state.service.save_record(record).await?;
    Ok(Json(stored))
}
