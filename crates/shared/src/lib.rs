//! Shared utilities for the ValidVouch backend.
//!
//! This crate provides functionality used across the other crates:
//! - Password hashing with Argon2id
//! - JWT access tokens for authenticated requests
//! - Field validators and the reference choice lists they check against

pub mod jwt;
pub mod password;
pub mod validation;
