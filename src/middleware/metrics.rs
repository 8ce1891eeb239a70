//! Request metrics middleware.
//!
//! Records request count and duration for every response, rendered by the
//! Prometheus exporter behind `/metrics`.
//!
//! # Metrics Emitted
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `http_requests_total` | Counter | `method`, `path`, `status` | Total request count |
//! | `http_request_duration_seconds` | Histogram | `method`, `path`, `status` | Request latency |
//!
//! Site paths are dynamic (every page of every locale), so the `path` label
//! is normalized against the gateway's known route set; anything else is
//! bucketed as `/*` to keep label cardinality bounded.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use http::{Request, Response};
use tower::{Layer, Service};

/// Known gateway paths for metric label normalization.
const KNOWN_PATHS: &[&str] = &["/", "/health", "/health/live", "/health/ready", "/metrics"];

/// Tower layer for request metrics collection.
///
/// Place after `RequestIdLayer` and before `LocaleLayer` so redirects are
/// captured with the rest of the request lifecycle.
#[derive(Clone, Copy, Default)]
pub struct MetricsLayer;

impl MetricsLayer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

/// Metrics middleware service.
#[derive(Clone)]
pub struct MetricsService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MetricsService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let method = req.method().to_string();
        let path = normalize_path(req.uri().path());

        let start = Instant::now();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let response = inner.call(req).await?;

            let duration = start.elapsed().as_secs_f64();
            let status = response.status().as_u16().to_string();

            let labels = [("method", method), ("path", path), ("status", status)];

            metrics::counter!("http_requests_total", &labels).increment(1);
            metrics::histogram!("http_request_duration_seconds", &labels).record(duration);

            Ok(response)
        })
    }
}

/// Normalize paths to a known set to prevent label cardinality explosion.
fn normalize_path(path: &str) -> String {
    if KNOWN_PATHS.contains(&path) {
        return path.to_string();
    }

    // One bucket per dictionary fetch regardless of locale tag.
    if path.starts_with("/api/dictionaries") {
        return "/api/dictionaries".to_string();
    }

    "/*".to_string()
}
