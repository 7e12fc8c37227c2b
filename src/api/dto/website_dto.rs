//! Website submission and listing DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Website;

/// Request body for `POST /websites`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWebsiteRequest {
    /// Submitting publisher wallet.
    pub publisher_wallet: String,
    /// Display name.
    pub name: String,
    /// Site URL.
    pub url: String,
    /// Content category.
    pub category: String,
    /// Publisher-declared monthly visitors.
    pub monthly_visitors: u64,
}

/// Query parameters for `GET /websites`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct WebsiteQuery {
    /// Restrict the listing to one publisher's submissions.
    #[serde(default)]
    pub publisher_wallet: Option<String>,
}

/// Response body for `GET /websites`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebsiteListResponse {
    /// Matching website records.
    pub websites: Vec<Website>,
}
