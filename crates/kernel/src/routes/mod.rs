//! HTTP route handlers.

pub mod debug;
pub mod health;
pub mod menus;
pub mod metrics;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router with request metrics and tracing.
///
/// CORS is left to the binary so tests can drive the router directly.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(menus::router())
        .merge(debug::router())
        .merge(health::router())
        .merge(metrics::router())
        // TraceLayer → track_metrics → routes
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::track_metrics,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
