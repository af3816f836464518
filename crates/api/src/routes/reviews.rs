//! Review editing, owner responses, votes and flags.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::moderation::{FlagReviewRequest, FlaggedCaseResponse};
use domain::models::review::{RespondToReviewRequest, UpdateReviewRequest};
use domain::models::vote::{CastVoteRequest, VoteResponse};
use domain::models::Review;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

async fn load_review(state: &AppState, id: Uuid) -> Result<Review, ApiError> {
    state
        .reviews
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))
}

/// PUT /api/v1/reviews/:id
pub async fn update_review(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, ApiError> {
    let review = load_review(&state, id).await?;
    if review.author_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the author can edit this review".to_string(),
        ));
    }

    request.validate()?;
    let updated: Review = state
        .reviews
        .update_content(id, request.content.trim(), request.rating)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?
        .into();
    Ok(Json(updated))
}

/// PUT /api/v1/reviews/:id/response
pub async fn respond_to_review(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<RespondToReviewRequest>,
) -> Result<Json<Review>, ApiError> {
    let review = load_review(&state, id).await?;
    let business = state
        .businesses
        .find_by_id(review.business_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Business not found".to_string()))?;
    if business.owner_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the business owner can respond to reviews".to_string(),
        ));
    }

    request.validate()?;
    let updated: Review = state
        .reviews
        .set_response(id, request.response.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?
        .into();
    Ok(Json(updated))
}

/// POST /api/v1/reviews/:id/votes
///
/// Casting the same vote twice withdraws it; casting the other one switches it.
pub async fn cast_vote(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<CastVoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let review = load_review(&state, id).await?;
    if !review.is_visible {
        return Err(ApiError::NotFound("Review not found".to_string()));
    }

    let outcome = state
        .votes
        .cast_vote(auth.user_id, id, request.vote_type)
        .await?;
    let counts = state.votes.counts(id).await?;

    Ok(Json(VoteResponse {
        outcome,
        up: counts.up,
        down: counts.down,
    }))
}

/// POST /api/v1/reviews/:id/flags
pub async fn flag_review(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<FlagReviewRequest>,
) -> Result<(StatusCode, Json<FlaggedCaseResponse>), ApiError> {
    let case = state
        .moderation
        .submit_flag(id, auth.user_id, &request.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(case.into())))
}
