//! REST API layer: route handlers, DTOs, and router composition.
//!
//! A deliberately thin adapter over the domain layer — handlers validate
//! input, call the store or services, and map absence to status codes.
//! All resource endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
