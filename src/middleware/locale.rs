//! Locale redirect middleware.
//!
//! Applies the locale resolver to every inbound request: excluded and
//! locale-prefixed paths pass through, everything else is answered with a
//! `307` to its locale-prefixed form. The gateway's own operational
//! endpoints bypass resolution entirely.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use http::{HeaderName, Request, Response, StatusCode, header};
use phf::phf_set;
use tower::{Layer, Service};
use tracing::{Span, debug};

use crate::locale::{LocaleConfig, Resolution};

/// Gateway endpoints served directly, never subject to locale handling.
/// Compile-time perfect hash set, matched before the resolver runs.
static SERVICE_PATHS: phf::Set<&'static str> = phf_set! {
    "/health",
    "/health/live",
    "/health/ready",
    "/metrics",
};

/// Tower layer for locale negotiation and redirection.
#[derive(Clone)]
pub struct LocaleLayer {
    config: Arc<LocaleConfig>,
}

impl LocaleLayer {
    #[must_use]
    pub const fn new(config: Arc<LocaleConfig>) -> Self {
        Self { config }
    }
}

impl<S> Layer<S> for LocaleLayer {
    type Service = LocaleRedirectService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LocaleRedirectService {
            inner,
            config: self.config.clone(),
        }
    }
}

/// Locale redirect middleware service.
#[derive(Clone)]
pub struct LocaleRedirectService<S> {
    inner: S,
    config: Arc<LocaleConfig>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for LocaleRedirectService<S>
where
    S: Service<Request<ReqBody>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let path = req.uri().path();

        if SERVICE_PATHS.contains(path) {
            let mut inner = self.inner.clone();
            return Box::pin(async move { inner.call(req).await });
        }

        let cookie = locale_cookie(&req, self.config.cookie_name());
        let accept_language = header_str(&req, header::ACCEPT_LANGUAGE);

        match self.config.resolve(path, cookie.as_deref(), accept_language) {
            Resolution::Continue => {
                if let Some(tag) = self.config.locale_prefix(path) {
                    Span::current().record("locale", tag);
                }
                let mut inner = self.inner.clone();
                Box::pin(async move { inner.call(req).await })
            }
            Resolution::Redirect(to) => {
                let locale = redirect_locale(&to);
                let location = match req.uri().query() {
                    Some(query) => format!("{to}?{query}"),
                    None => to,
                };
                debug!(path, %location, "Redirecting to locale-prefixed path");
                metrics::counter!("locale_redirects_total", "locale" => locale).increment(1);
                Box::pin(async move { Ok(redirect_response(&location)) })
            }
        }
    }
}

/// Extract the named cookie value from the `Cookie` header(s).
fn locale_cookie<T>(req: &Request<T>, name: &str) -> Option<String> {
    for value in req.headers().get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((key, val)) = pair.trim().split_once('=') {
                if key == name {
                    return Some(val.trim().to_string());
                }
            }
        }
    }
    None
}

fn header_str<T>(req: &Request<T>, name: HeaderName) -> Option<&str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// First path segment of a redirect target, used as the metric label.
fn redirect_locale(to: &str) -> String {
    to.trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// 307 keeps the original method on replay.
fn redirect_response(location: &str) -> Response<Body> {
    Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(header::LOCATION, location)
        .body(Body::empty())
        .expect("valid response")
}
