//! Data Transfer Objects for REST request/response serialization.
//!
//! Request and response field names are snake_case (the wire contract the
//! widget loader and dashboards consume); persisted domain documents use
//! camelCase independently of this layer.

pub mod ads_dto;
pub mod campaign_dto;
pub mod claim_dto;
pub mod status_dto;
pub mod website_dto;

pub use ads_dto::*;
pub use campaign_dto::*;
pub use claim_dto::*;
pub use status_dto::*;
pub use website_dto::*;
