//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod business;
pub mod flagged_review;
pub mod review;
pub mod user;

pub use business::{BusinessEntity, BusinessInput, BusinessStatsEntity, BusinessSummaryEntity};
pub use flagged_review::{FlaggedReviewContextEntity, FlaggedReviewEntity, ModerationDecisionDb};
pub use review::{
    ReviewEntity, ReviewWithVotesEntity, VoteCountsEntity, VoteEntity,
};
pub use user::{UserEntity, UserInput};
