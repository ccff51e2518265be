//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::domain::RoomCode;
use crate::infrastructure::dto::http::{RoomDetailDto, RoomSummaryDto};

use super::super::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of live rooms with their members
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let snapshots = state.get_rooms_usecase.room_snapshots().await;
    Json(snapshots.iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by code
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let code = RoomCode::new(code).map_err(|_| StatusCode::NOT_FOUND)?;

    match state.get_rooms_usecase.room_detail(&code).await {
        Ok(room) => Ok(Json(RoomDetailDto::from(&room))),
        Err(_) => Err(StatusCode::NOT_FOUND),
    }
}
