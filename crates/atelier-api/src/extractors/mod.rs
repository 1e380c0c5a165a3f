//! Extractors shared by the handlers.

pub mod identity;
pub mod pagination;

pub use identity::Identity;
pub use pagination::PaginationParams;
