//! User directory entities.

pub mod model;

pub use model::User;
