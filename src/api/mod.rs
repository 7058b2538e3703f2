//! HTTP server setup with Axum.

pub mod dashboard;
pub mod error;
pub mod events;
pub mod logs;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};

/// Shared server state: one connection behind an async mutex, so each
/// request's read-modify-write of a statistics row is serialized.
pub struct AppState {
    pub db: Mutex<DbPool>,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self {
            db: Mutex::new(pool),
        }
    }
}

/// Create the Axum router with all endpoints.
pub fn create_router(state: Arc<AppState>, static_dir: Option<&str>) -> Router {
    // CORS configuration - the dashboard is served from arbitrary origins
    // during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // REST API endpoints
        .route(
            "/api/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/api/events/:id/log", post(logs::log_event_action))
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/api/persons", get(dashboard::get_persons));

    // Static dashboard front end, when configured
    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(cors).with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Open the database, run migrations, and serve the API until shutdown.
pub async fn serve(cfg: &Config) -> AppResult<()> {
    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;

    let state = Arc::new(AppState::new(pool));
    let app = create_router(state, cfg.static_dir.as_deref());

    let addr: SocketAddr = cfg
        .listen
        .parse()
        .map_err(|_| AppError::InvalidListenAddr(cfg.listen.clone()))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, database = %cfg.database, "eventboard listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let pool = DbPool::open_in_memory().unwrap();
        init_db(&pool.conn).unwrap();
        let state = Arc::new(AppState::new(pool));
        let app = create_router(state, None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }
}
