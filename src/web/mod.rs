pub mod flash;
pub mod handlers;
pub mod pages;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tera::Tera;
use tower_http::trace::TraceLayer;

use crate::services::itinerary::ItineraryService;

#[derive(Clone)]
pub struct AppState {
    pub itineraries: Arc<ItineraryService>,
    pub pages: Arc<Tera>,
}

impl AppState {
    pub fn new(itineraries: Arc<ItineraryService>) -> Result<Self, tera::Error> {
        Ok(Self { itineraries, pages: Arc::new(pages::load_pages()?) })
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/plan", post(handlers::plan))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
