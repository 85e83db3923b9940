pub mod auth;
pub mod health;
pub mod movies;
pub mod reviews;
pub mod users;

use common::PageRequest;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters shared by the plain list endpoints
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ListQuery {
    /// Page number (default: 1)
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    /// Page size (default: 5, larger values are clamped to 10)
    #[validate(range(min = 1))]
    pub page_size: Option<u64>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}
