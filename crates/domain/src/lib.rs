//! Domain layer for ValidVouch.
//!
//! This crate contains:
//! - Domain models and request/response DTOs
//! - The flagged-review moderation state machine
//! - Domain error types

pub mod models;
pub mod services;
