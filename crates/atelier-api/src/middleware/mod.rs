//! Request-scoped middleware.

pub mod logging;
