//! Domain models for ValidVouch.

pub mod admin;
pub mod business;
pub mod business_hours;
pub mod moderation;
pub mod pagination;
pub mod review;
pub mod user;
pub mod vote;

pub use admin::DashboardStats;
pub use business::{Business, BusinessDetails, BusinessSearchQuery, BusinessSort, BusinessSummary};
pub use business_hours::{BusinessHours, Day, DaySchedule, HoursError, TimeOfDay};
pub use pagination::{ListQuery, Paged, Pagination};
pub use review::{Review, ReviewSort, ReviewWithVotes};
pub use user::{User, UserProfile};
pub use vote::{VoteCounts, VoteOutcome, VoteType};
