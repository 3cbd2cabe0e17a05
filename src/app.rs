use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::routes::{growth, health, imports, runway};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    // Permissive CORS for development; restrict origins in production.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::<AppState>::new()
        .route("/", get(health::root))
        .nest("/health", health::router())
        .nest("/api/import", imports::router())
        .nest("/api/runway", runway::router())
        .nest("/api/growth", growth::router())
        .layer(cors)
        .with_state(state)
}
