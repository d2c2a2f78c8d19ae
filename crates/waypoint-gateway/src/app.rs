use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    api_links_handler, favicon_handler, health_handler, index_handler, redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/health", get(health_handler))
            .route("/favicon.ico", get(favicon_handler))
            .route("/api/links", get(api_links_handler))
            .route("/{shortcode}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
