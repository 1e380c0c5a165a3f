//! Paging query parameters.

use serde::Deserialize;

use atelier_core::types::PageRequest;

/// The `?page=&page_size=` pair accepted by the list endpoints.
///
/// Kept distinct from [`PageRequest`] so the clamping in
/// [`PageRequest::new`] always runs on client-supplied values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationParams {
    pub page: u64,
    pub page_size: u64,
}

impl PaginationParams {
    pub fn into_page_request(self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        let request = PageRequest::default();
        Self {
            page: request.page,
            page_size: request.page_size,
        }
    }
}
