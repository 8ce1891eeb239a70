//! Middleware pipeline for the gateway.
//!
//! # Middleware Order
//! Middleware is applied in layers. When using `.layer()` on a router:
//! - Outermost layer is added last
//! - Request flows: outermost → innermost → handler
//! - Response flows: handler → innermost → outermost
//!
//! Recommended order (applied in reverse):
//! 1. RequestIdLayer - Extract/generate request ID first
//! 2. TraceLayer - Request tracing with spans
//! 3. TimeoutLayer - Request timeout
//! 4. MetricsLayer - Request count/latency
//! 5. CorsLayer - CORS handling
//! 6. LocaleLayer - Locale negotiation and redirects (skips service paths)

pub mod locale;
pub mod metrics;
pub mod request_id;

pub use locale::LocaleLayer;
pub use metrics::MetricsLayer;
pub use request_id::{RequestId, RequestIdLayer};
