use axum::body::Body;
use axum::http::Request;
use tower_http::trace::{HttpMakeClassifier, TraceLayer};
use tracing::{info_span, Span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

pub const DEFAULT_FILTER: &str = "santa_backend=info,tower_http=info";

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default
/// filter, e.g. `RUST_LOG=santa_backend=debug`.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

pub fn http_trace_layer() -> TraceLayer<HttpMakeClassifier, fn(&Request<Body>) -> Span> {
    TraceLayer::new_for_http().make_span_with(request_span as fn(&Request<Body>) -> Span)
}

fn request_span(request: &Request<Body>) -> Span {
    info_span!(
        "http_request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    )
}
