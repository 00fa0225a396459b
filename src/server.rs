//! HTTP API shim over the search relevance layer.
//!
//! A thin axum surface intended for a browser front-end:
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/search?q=...&artist=true` | Ranked song search |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Error responses carry a machine-readable code and message:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "q must not be empty" } }
//! ```
//!
//! Backend hiccups never surface here — the search layer degrades them to
//! an empty `results` array, so this shim only produces 400s for caller
//! mistakes.
//!
//! CORS permits all origins, methods, and headers to support browser
//! clients.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::backend::ElasticBackend;
use crate::config::Config;
use crate::models::SongResult;
use crate::search::SongSearcher;

#[derive(Clone)]
struct AppState {
    searcher: Arc<SongSearcher>,
}

/// Start the HTTP server on the configured bind address.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let backend = Arc::new(ElasticBackend::new(&config.backend)?);
    let searcher = Arc::new(SongSearcher::new(
        backend,
        config.backend.index.clone(),
        config.search.clone(),
    ));

    let app = router(AppState { searcher });

    println!("Song search API listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

// ============ Handlers ============

#[derive(Debug, Deserialize)]
struct SearchParams {
    /// The query string.
    q: String,
    /// Weight the artist field heavily (explicit artist lookup).
    #[serde(default)]
    artist: bool,
}

#[derive(Serialize)]
struct SearchResponseBody {
    results: Vec<SongResult>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponseBody>, AppError> {
    if params.q.trim().is_empty() {
        return Err(AppError::bad_request("q must not be empty"));
    }

    let results = state.searcher.search(&params.q, params.artist).await;
    Ok(Json(SearchResponseBody { results }))
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
