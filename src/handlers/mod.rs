pub mod accounts;
pub mod auth;
pub mod buckets;
pub mod debug;
pub mod health;
pub mod schedule;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// `*` allows any origin; otherwise a comma-separated list of exact origins.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origin.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origin
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .route("/", get(health::health))
        .route("/healthz", get(health::health))
        .route("/auth/instagram", get(auth::start))
        .route(auth::CALLBACK_PATH, get(auth::callback))
        .route("/accounts", get(accounts::list_accounts))
        .route(
            "/buckets",
            get(buckets::get_buckets).post(buckets::update_buckets),
        )
        .route(
            "/schedule",
            get(schedule::get_schedule).post(schedule::update_schedule),
        )
        .route("/debug/files", get(debug::files))
        .route("/debug/read-accounts", get(debug::read_accounts))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
