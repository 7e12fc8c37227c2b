//! REST endpoint handlers organized by resource.

pub mod ads;
pub mod campaigns;
pub mod claim;
pub mod status;
pub mod system;
pub mod websites;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(ads::routes())
        .merge(campaigns::routes())
        .merge(claim::routes())
        .merge(websites::routes())
        .merge(status::routes())
}
