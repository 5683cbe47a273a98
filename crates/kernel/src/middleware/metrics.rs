//! Request metrics middleware.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Path label for requests that matched no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Record count, duration and in-flight gauge for every request.
///
/// Requests are labelled by their route template, so arbitrary URLs
/// cannot grow the label set.
pub async fn track_metrics(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_PATH, MatchedPath::as_str)
        .to_string();
    let metrics = state.metrics().clone();

    metrics.connection_start();
    let started = Instant::now();

    let response = next.run(request).await;

    metrics.connection_end();
    metrics.record_request(
        &method,
        &path,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );

    response
}
