//! Review, vote and like entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the reviews table.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewEntity {
    pub id: Uuid,
    pub author_id: Uuid,
    pub business_id: Uuid,
    pub content: String,
    pub rating: i16,
    pub response: Option<String>,
    pub response_at: Option<DateTime<Utc>>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewEntity> for domain::models::Review {
    fn from(entity: ReviewEntity) -> Self {
        Self {
            id: entity.id,
            author_id: entity.author_id,
            business_id: entity.business_id,
            content: entity.content,
            rating: entity.rating,
            response: entity.response,
            response_at: entity.response_at,
            is_visible: entity.is_visible,
            created_at: entity.created_at,
        }
    }
}

/// Review row joined with author name and vote tallies.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewWithVotesEntity {
    pub id: Uuid,
    pub author_id: Uuid,
    pub business_id: Uuid,
    pub content: String,
    pub rating: i16,
    pub response: Option<String>,
    pub response_at: Option<DateTime<Utc>>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub author_name: String,
    pub up_votes: i64,
    pub down_votes: i64,
}

impl From<ReviewWithVotesEntity> for domain::models::ReviewWithVotes {
    fn from(entity: ReviewWithVotesEntity) -> Self {
        Self {
            review: domain::models::Review {
                id: entity.id,
                author_id: entity.author_id,
                business_id: entity.business_id,
                content: entity.content,
                rating: entity.rating,
                response: entity.response,
                response_at: entity.response_at,
                is_visible: entity.is_visible,
                created_at: entity.created_at,
            },
            author_name: entity.author_name,
            up_votes: entity.up_votes,
            down_votes: entity.down_votes,
        }
    }
}

/// Database row mapping for the review_votes table.
#[derive(Debug, Clone, FromRow)]
pub struct VoteEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub review_id: Uuid,
    pub vote_type: String,
    pub created_at: DateTime<Utc>,
}

/// Up and down vote counts for one review.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct VoteCountsEntity {
    pub up: i64,
    pub down: i64,
}

impl From<VoteCountsEntity> for domain::models::VoteCounts {
    fn from(entity: VoteCountsEntity) -> Self {
        Self {
            up: entity.up,
            down: entity.down,
        }
    }
}
