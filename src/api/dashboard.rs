//! Dashboard and person-lookup endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};

use super::error::ApiResult;
use super::AppState;
use crate::db::queries;
use crate::models::detail::EventWithStats;

/// GET /api/dashboard - marked, non-deleted events, oldest first.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<EventWithStats>>> {
    let pool = state.db.lock().await;
    Ok(Json(queries::dashboard_events(&pool.conn)?))
}

/// GET /api/persons - sorted distinct non-empty responsible persons.
pub async fn get_persons(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<String>>> {
    let pool = state.db.lock().await;
    Ok(Json(queries::distinct_persons(&pool.conn)?))
}
