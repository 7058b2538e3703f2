//! Event registry endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::core::logbook;
use crate::db::filters::{EventFilter, EventSort, Page};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::detail::EventWithStats;
use crate::models::event::EventPatch;
use crate::utils::time;

/// Query parameters for listing events
#[derive(Debug, Deserialize)]
pub struct ListEventsParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub show_deleted: bool,
    pub search_name: Option<String>,
    pub search_person: Option<String>,
    pub search_created_after: Option<String>,
    pub search_created_before: Option<String>,
    pub search_updated_after: Option<String>,
    pub search_updated_before: Option<String>,
    /// Sort key (name, person, create_time, update_time, status, duration)
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Sort order (ASC, DESC)
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

fn default_sort_by() -> String {
    "create_time".to_string()
}

fn default_sort_order() -> String {
    "DESC".to_string()
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub items_per_page: i64,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<EventWithStats>,
    pub pagination: Pagination,
}

fn parse_search_date(raw: &Option<String>) -> ApiResult<Option<NaiveDate>> {
    match raw.as_deref().filter(|r| !r.is_empty()) {
        Some(raw) => Ok(Some(time::parse_date(raw).map_err(ApiError::from)?)),
        None => Ok(None),
    }
}

/// GET /api/events - filtered, sorted, paginated listing
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListEventsParams>,
) -> ApiResult<Json<EventListResponse>> {
    let filter = EventFilter {
        show_deleted: params.show_deleted,
        name: params.search_name.filter(|s| !s.is_empty()),
        person: params.search_person.filter(|s| !s.is_empty()),
        created_after: parse_search_date(&params.search_created_after)?,
        created_before: parse_search_date(&params.search_created_before)?,
        updated_after: parse_search_date(&params.search_updated_after)?,
        updated_before: parse_search_date(&params.search_updated_before)?,
    };
    let sort = EventSort {
        key: params.sort_by,
        descending: params.sort_order.eq_ignore_ascii_case("desc"),
    };
    let page = Page::new(params.page, params.limit);

    let pool = state.db.lock().await;
    let (events, total_items) = queries::list_events(&pool.conn, &filter, &sort, &page)?;

    Ok(Json(EventListResponse {
        events,
        pagination: Pagination {
            total_items,
            total_pages: page.total_pages(total_items),
            current_page: page.page,
            items_per_page: page.limit,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateEventBody {
    pub event_name: Option<String>,
    pub event_desc: Option<String>,
    pub responsible_person: Option<String>,
}

/// POST /api/events - create an event, echo it back joined with stats
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateEventBody>,
) -> ApiResult<Response> {
    let name = body
        .event_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Event name is required"))?;

    let pool = state.db.lock().await;
    let id = queries::insert_event(
        &pool.conn,
        name,
        body.event_desc.as_deref(),
        body.responsible_person.as_deref(),
        time::now(),
    )?;

    let created = queries::get_event_with_stats(&pool.conn, id)?
        .ok_or(AppError::Other("Failed to retrieve created event".to_string()))?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// GET /api/events/:id - single event with joined statistics
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> ApiResult<Json<EventWithStats>> {
    let pool = state.db.lock().await;
    let event = queries::get_event_with_stats(&pool.conn, event_id)?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;
    Ok(Json(event))
}

/// PUT /api/events/:id - partial update of the allowed fields
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    Json(patch): Json<EventPatch>,
) -> ApiResult<Json<EventWithStats>> {
    if patch.is_empty() {
        return Err(ApiError::bad_request("No valid fields provided for update"));
    }

    let pool = state.db.lock().await;
    if queries::get_event(&pool.conn, event_id)?.is_none() {
        return Err(ApiError::not_found("Event not found"));
    }

    queries::update_event(&pool.conn, event_id, &patch, time::now())?;

    let updated = queries::get_event_with_stats(&pool.conn, event_id)?
        .ok_or(AppError::Other("Failed to retrieve updated event".to_string()))?;
    Ok(Json(updated))
}

/// DELETE /api/events/:id - soft delete; a running event is stopped
/// (one stop log entry + accrual) before the flag flips, all in one
/// transaction.
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> ApiResult<Response> {
    let mut pool = state.db.lock().await;
    let tx = pool.conn.transaction().map_err(AppError::from)?;

    let event =
        queries::get_event(&tx, event_id)?.ok_or_else(|| ApiError::not_found("Event not found"))?;
    if event.is_deleted() {
        return Ok(Json(json!({
            "message": format!("Event {} is already deleted", event_id)
        }))
        .into_response());
    }

    let now = time::now();
    if let Some(outcome) = logbook::force_stop_if_running(&tx, event_id, now)? {
        tracing::info!(
            event_id,
            log_id = outcome.log_id,
            "stopped running event before deletion"
        );
    }
    queries::soft_delete_event(&tx, event_id, now)?;

    tx.commit().map_err(AppError::from)?;

    Ok(Json(json!({
        "message": format!("Event {} marked as deleted", event_id)
    }))
    .into_response())
}
