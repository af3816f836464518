//! Orchestration services used by route handlers.

pub mod auth;
pub mod moderation;

pub use auth::{AuthError, AuthService};
pub use moderation::{ModerationService, ModerationServiceError};
