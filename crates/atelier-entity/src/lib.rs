//! # atelier-entity
//!
//! Domain entity models for the Atelier collaboration hub. Every struct in
//! this crate represents a database table row or a domain value object.
//! All entities derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and
//! persisted entities additionally derive `sqlx::FromRow`.

pub mod chat;
pub mod event;
pub mod notification;
pub mod presence;
pub mod user;
