//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod businesses;
pub mod cases;
pub mod health;
pub mod reviews;
pub mod users;
