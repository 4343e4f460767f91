pub mod root;
pub mod song;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::controllers::SongController;
pub use root::health_check_route;
pub use song::song_routes;

/// Full HTTP surface with its middleware.
pub fn app(songs: SongController) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check_route))
        .merge(song_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(songs)
}
