pub mod config;
pub mod error;
pub mod handlers;
pub mod housekeeping;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod telemetry;

use axum::{
    Router, middleware,
    routing::{get, get_service},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{assets, status_handler};
use crate::rate_limit::rate_limit_middleware;
use crate::state::AppState;

// request -> trace -> rate limiter (if on) -> route or static file
pub fn build_app(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/", get_service(assets::index_file(&state.static_dir)))
        .route("/api/status", get(status_handler))
        .fallback_service(assets::static_files(&state.static_dir));

    // static files sit behind the limiter too
    if let Some(limiter) = &state.rate_limiter {
        app = app.layer(middleware::from_fn_with_state(
            Arc::clone(limiter),
            rate_limit_middleware,
        ));
    }

    app.layer(TraceLayer::new_for_http())
}
