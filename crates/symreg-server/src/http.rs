//! HTTP query surface.
//!
//! A single endpoint, `GET /symbols`, resolves the latest snapshot per
//! requested exchange:
//!
//! | Query param | Meaning |
//! |-------------|---------|
//! | `exchanges` | `@`-separated exchange names; omitted means all |
//! | `date` | `YYYY-MM-DD` snapshot day; omitted means today (UTC) |
//!
//! Client mistakes map to 400, everything else to 500. Response bodies for
//! errors are generic; the detail lands in the logs only.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use symreg_core::resolver::{ResolveError, SnapshotResolver};
use symreg_core::{ApiExchangesSymbols, CalendarDay, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<SnapshotResolver>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/symbols", get(get_symbols))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SymbolsQuery {
    exchanges: Option<String>,
    date: Option<String>,
}

enum ApiError {
    BadRequest,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest => (StatusCode::BAD_REQUEST, "invalid request"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(error: ResolveError) -> Self {
        match &error {
            ResolveError::Date(cause) => {
                warn!(%cause, "rejected symbols query");
                Self::BadRequest
            }
            ResolveError::Store(StoreError::NotFound { exchange, day }) => {
                warn!(exchange = exchange.as_str(), %day, "no snapshot available");
                Self::Internal
            }
            ResolveError::Store(cause) => {
                warn!(%cause, "snapshot lookup failed");
                Self::Internal
            }
        }
    }
}

async fn get_symbols(
    State(state): State<AppState>,
    Query(query): Query<SymbolsQuery>,
) -> Result<Json<ApiExchangesSymbols>, ApiError> {
    let exchanges = symreg_core::parse_exchange_filter(query.exchanges.as_deref())
        .map_err(|cause| {
            warn!(%cause, "rejected exchange filter");
            ApiError::BadRequest
        })?;

    let resolver = Arc::clone(&state.resolver);
    let date = query.date;

    // The store is synchronous DuckDB; keep it off the runtime workers.
    let snapshots = tokio::task::spawn_blocking(move || {
        resolver.resolve(&exchanges, || match date.as_deref() {
            Some(raw) => CalendarDay::parse(raw),
            None => Ok(CalendarDay::today_utc()),
        })
    })
    .await
    .map_err(|cause| {
        warn!(%cause, "symbols lookup task failed");
        ApiError::Internal
    })??;

    Ok(Json(ApiExchangesSymbols::from(&snapshots)))
}
