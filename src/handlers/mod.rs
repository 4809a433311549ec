pub mod customers;
pub mod orders;
pub mod parts;
pub mod reports;
pub mod tasks;
pub mod vehicles;

use serde::{Deserialize, Serialize};

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

/// Common pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

impl PaginationParams {
    /// Clamps per_page to something the database can live with
    pub fn normalized(&self) -> (u64, u64) {
        let page = self.page.max(1);
        let per_page = self.per_page.clamp(1, 100);
        (page, per_page)
    }
}

/// Standard envelope for paginated list responses
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Query parameter for substring search endpoints
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}
