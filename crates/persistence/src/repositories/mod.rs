//! Repository implementations for database operations.

pub mod admin_stats;
pub mod business;
pub mod flagged_review;
pub mod review;
pub mod user;
pub mod vote;

pub use admin_stats::{AdminStatsEntity, AdminStatsRepository};
pub use business::BusinessRepository;
pub use flagged_review::FlaggedReviewRepository;
pub use review::ReviewRepository;
pub use user::UserRepository;
pub use vote::{LikeRepository, VoteRepository};
