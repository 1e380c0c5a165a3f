//! Handler modules, one per route group.

pub mod chat;
pub mod health;
pub mod notification;
pub mod presence;
pub mod user;
pub mod ws;
