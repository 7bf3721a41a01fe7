//! In-memory stand-in for the IDBlock backend.
//!
//! Serves the mobile and admin endpoints under `/api/v1` with the same
//! envelopes (`{ "data": ... }`) and failure bodies
//! (`{ "message", "error", "statusCode" }`) as the real service.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tokio::net::TcpListener;

pub use error::AppError;
pub use state::{AppState, ADMIN_EMAIL, ADMIN_PASSWORD, DEMO_EMAIL, DEMO_PASSWORD, VERIFICATION_CODE};

pub const API_PREFIX: &str = "/api/v1";

pub fn router(state: AppState) -> Router {
    Router::new().nest(API_PREFIX, routes::api()).with_state(state)
}

/// Router over freshly seeded state.
pub fn app() -> Router {
    router(AppState::seeded())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, AppState::seeded()).await
}

pub async fn run_with(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}
