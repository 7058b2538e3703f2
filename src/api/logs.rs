//! Start/stop logging endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::core::logbook;
use crate::errors::AppError;
use crate::models::log_entry::LogType;
use crate::utils::time;

#[derive(Debug, Deserialize)]
pub struct LogActionBody {
    pub log_type: Option<i64>,
}

/// POST /api/events/:id/log - apply a start/stop action.
///
/// Log insert, accrual and statistics write share one transaction, so a
/// crash mid-sequence leaves neither an orphan log entry nor stale
/// statistics.
pub async fn log_event_action(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    Json(body): Json<LogActionBody>,
) -> ApiResult<Json<Value>> {
    let log_type = body
        .log_type
        .and_then(LogType::from_i64)
        .ok_or_else(|| ApiError::bad_request("Invalid log_type. Use 1 for start, 0 for stop."))?;

    let mut pool = state.db.lock().await;
    let tx = pool.conn.transaction().map_err(AppError::from)?;
    let outcome = logbook::record_log_action(&tx, event_id, log_type, time::now())?;
    tx.commit().map_err(AppError::from)?;

    Ok(Json(json!({
        "message": format!("Event {} {} successfully", event_id, log_type.verb()),
        "log_id": outcome.log_id,
        "log_time": outcome.log_time,
        "statistics": outcome.statistics,
    })))
}
