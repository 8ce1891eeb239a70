//! REST routes and health check handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::Value;

use crate::dictionary::DictionaryStore;
use crate::error::{AppError, AppResult};
use crate::locale::LocaleConfig;

/// Build version.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub locales: Arc<LocaleConfig>,
    pub dictionaries: Arc<DictionaryStore>,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    checks: Option<HealthChecks>,
}

#[derive(Serialize)]
pub struct HealthChecks {
    dictionaries: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl CheckResult {
    const fn healthy() -> Self {
        Self {
            status: "healthy",
            message: None,
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy",
            message: Some(message.into()),
        }
    }
}

/// Build REST routes with the given application state.
///
/// There is no `/` route: the site root belongs to the locale middleware and
/// the static fallback.
pub fn rest_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/health/live", get(|| async { "OK" }))
        .route("/health/ready", get(readiness_handler))
        .route("/api/dictionaries/{locale}", get(dictionary_handler))
        .with_state(state)
}

/// Build REST routes with metrics endpoint.
pub fn rest_routes_with_metrics(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    rest_routes(state).route(
        "/metrics",
        get(move || {
            let handle = metrics_handle.clone();
            async move { handle.render() }
        }),
    )
}

async fn readiness_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let missing: Vec<&str> = state
        .locales
        .locales()
        .iter()
        .map(String::as_str)
        .filter(|tag| !state.dictionaries.contains(tag))
        .collect();

    let dictionaries_check = if missing.is_empty() {
        CheckResult::healthy()
    } else {
        CheckResult::unhealthy(format!("Missing dictionaries: {}", missing.join(", ")))
    };

    let healthy = dictionaries_check.status == "healthy";

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        version: VERSION,
        checks: Some(HealthChecks {
            dictionaries: dictionaries_check,
        }),
    })
}

/// Serve the translation bundle for one supported locale.
///
/// The path lives under the excluded `/api` prefix, so the locale middleware
/// never redirects it.
async fn dictionary_handler(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> AppResult<Json<Value>> {
    if !state.locales.is_supported(&locale) {
        return Err(AppError::NotFound(format!("Unsupported locale: {locale}")));
    }

    state
        .dictionaries
        .get(&locale)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::Internal(format!("Dictionary missing for locale '{locale}'")))
}
