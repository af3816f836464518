//! Review domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Review {
    pub id: Uuid,
    pub author_id: Uuid,
    pub business_id: Uuid,
    pub content: String,
    pub rating: i16,
    pub response: Option<String>,
    pub response_at: Option<DateTime<Utc>>,
    /// Cleared while an upheld flag hides the review.
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_proof_of_purchase"))]
pub struct CreateReviewRequest {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub content: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[serde(default)]
    pub proof_of_purchase: bool,
}

fn validate_proof_of_purchase(
    req: &CreateReviewRequest,
) -> Result<(), validator::ValidationError> {
    if req.proof_of_purchase {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("proof_of_purchase");
        err.message = Some("Proof of purchase is required to leave a review".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateReviewRequest {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub content: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
}

/// Business owner's public reply to a review.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RespondToReviewRequest {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub response: String,
}

/// Order of a business's review listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSort {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
}

impl ReviewSort {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReviewSort::Newest => "r.created_at DESC",
            ReviewSort::Oldest => "r.created_at ASC",
            ReviewSort::Highest => "r.rating DESC, r.created_at DESC",
            ReviewSort::Lowest => "r.rating ASC, r.created_at DESC",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewListQuery {
    #[serde(default)]
    pub sort: ReviewSort,
}

/// A review with its vote tallies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ReviewWithVotes {
    #[serde(flatten)]
    pub review: Review,
    pub author_name: String,
    pub up_votes: i64,
    pub down_votes: i64,
}
