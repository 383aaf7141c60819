use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Chirpy endpoints.
pub fn build_router(state: AppState) -> Router {
    let static_root = state.static_root();

    Router::new()
        .route("/api/healthz", get(handler::healthz))
        .route("/api/users", post(handler::create_user))
        .route("/api/login", post(handler::login))
        .route(
            "/api/chirps",
            get(handler::list_chirps).post(handler::create_chirp),
        )
        .route("/api/chirps/:id", get(handler::get_chirp))
        .nest_service("/app", ServeDir::new(&static_root))
        .nest_service("/assets", ServeDir::new(static_root.join("assets")))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
