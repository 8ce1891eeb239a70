//! Server startup and wiring.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use http::Request;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};

use crate::config::Config;
use crate::dictionary::DictionaryStore;
use crate::middleware::{LocaleLayer, MetricsLayer, RequestIdLayer};
use crate::routes::{AppState, rest_routes_with_metrics};

/// Request timeout duration.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build and configure the complete application.
pub fn build_app(
    config: &Config,
    metrics_handle: PrometheusHandle,
) -> anyhow::Result<(Router, SocketAddr)> {
    let locales = Arc::new(config.locale_config()?);

    let dictionaries = DictionaryStore::load(&config.dictionaries_dir, locales.locales())?;
    info!(count = dictionaries.len(), "Loaded locale dictionaries");

    let addr: SocketAddr = config.http_address.parse()?;

    let state = AppState {
        locales: locales.clone(),
        dictionaries: Arc::new(dictionaries),
    };

    // Locale-prefixed pages and dotted asset paths both resolve against the
    // static export; directory paths get their index.html.
    let site = ServeDir::new(&config.site_dir).append_index_html_on_directories(true);

    let router = rest_routes_with_metrics(state, metrics_handle).fallback_service(site);

    let cors = build_cors(config.cors_allow_origins.as_deref());

    let middleware = ServiceBuilder::new()
        .layer(RequestIdLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id = tracing::field::Empty,
                        locale = tracing::field::Empty,
                    )
                })
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(MetricsLayer::new())
        .layer(cors)
        .layer(LocaleLayer::new(locales));

    let app = router.layer(middleware);

    Ok((app, addr))
}

fn build_cors(origins: Option<&str>) -> CorsLayer {
    let cors = match origins {
        Some(o) if o.trim() == "*" => CorsLayer::permissive(),
        Some(o) => {
            let origins: Vec<_> = o.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            CorsLayer::new().allow_origin(origins)
        }
        None => CorsLayer::permissive(),
    };

    cors.allow_headers(Any)
        .expose_headers(["x-request-id".parse().unwrap()])
        .allow_methods(Any)
        .max_age(Duration::from_secs(3600))
}
