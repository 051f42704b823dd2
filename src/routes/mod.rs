use axum::{Router, routing::get};

use crate::state::AppState;

pub mod auth;
pub mod doc;
pub mod health;
pub mod menu;
pub mod orders;
pub mod params;
pub mod restaurants;
pub mod users;

// State is attached once, at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/auth", auth::router())
        .nest("/restaurants", restaurants::router())
        .nest("/menu", menu::router())
        .nest("/orders", orders::router())
        .nest("/users", users::router())
}
