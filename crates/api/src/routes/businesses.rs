//! Business listings, search, likes and reviews of a business.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::business::{
    round_rating, CreateBusinessRequest, UpdateBusinessRequest,
};
use domain::models::review::{CreateReviewRequest, ReviewListQuery};
use domain::models::user::PasswordConfirmation;
use domain::models::{
    Business, BusinessDetails, BusinessSearchQuery, BusinessSummary, Review, ReviewWithVotes,
};
use persistence::entities::BusinessInput;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

async fn load_business(state: &AppState, id: Uuid) -> Result<Business, ApiError> {
    state
        .businesses
        .find_by_id(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Business not found".to_string()))
}

fn business_input(request: &CreateBusinessRequest) -> BusinessInput<'_> {
    BusinessInput {
        name: request.name.trim(),
        category: &request.category,
        address: request.address.trim(),
        city: request.city.trim(),
        state: &request.state,
        zip: &request.zip,
        description: request.description.trim(),
        phone: request.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()),
        website: request.website.as_deref().map(str::trim).filter(|w| !w.is_empty()),
        hours: request.hours.to_storage_string(),
        time_zone: &request.time_zone,
    }
}

/// Business names are unique, and a business phone may not be another
/// user's personal number.
async fn check_business_rules(
    state: &AppState,
    owner_id: Uuid,
    input: &BusinessInput<'_>,
    existing_id: Option<Uuid>,
) -> Result<(), ApiError> {
    if let Some(other) = state.businesses.find_by_name(input.name).await? {
        if Some(other.id) != existing_id {
            return Err(ApiError::Conflict(
                "A business with this name already exists".to_string(),
            ));
        }
    }

    if let Some(phone) = input.phone {
        if let Some(user) = state.users.find_by_phone(phone).await? {
            if user.id != owner_id {
                return Err(ApiError::Conflict(
                    "This phone number belongs to another user".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// GET /api/v1/businesses/search
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<BusinessSearchQuery>,
) -> Result<Json<Vec<BusinessSummary>>, ApiError> {
    query.validate()?;
    let query = query.normalized();
    let rows = state.businesses.search(&query).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/businesses/:id
pub async fn get_business(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BusinessDetails>, ApiError> {
    let business = load_business(&state, id).await?;
    let stats = state.businesses.stats(id).await?;

    Ok(Json(BusinessDetails {
        formatted_hours: business.hours.display(),
        business,
        average_rating: round_rating(stats.average_rating),
        review_count: stats.review_count,
        like_count: stats.like_count,
    }))
}

/// GET /api/v1/businesses/:id/reviews?sort=
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<Vec<ReviewWithVotes>>, ApiError> {
    load_business(&state, id).await?;
    let rows = state
        .reviews
        .list_visible_for_business(id, query.sort)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/businesses
pub async fn create_business(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateBusinessRequest>,
) -> Result<(StatusCode, Json<Business>), ApiError> {
    request.validate()?;
    let input = business_input(&request);
    check_business_rules(&state, auth.user_id, &input, None).await?;

    let business: Business = state.businesses.create(auth.user_id, &input).await?.into();
    tracing::info!(business_id = %business.id, owner_id = %auth.user_id, "Business created");
    Ok((StatusCode::CREATED, Json(business)))
}

/// PUT /api/v1/businesses/:id
pub async fn update_business(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBusinessRequest>,
) -> Result<Json<Business>, ApiError> {
    let existing = load_business(&state, id).await?;
    if existing.owner_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the owner can edit this business".to_string(),
        ));
    }

    request.validate()?;
    let input = business_input(&request);
    check_business_rules(&state, auth.user_id, &input, Some(id)).await?;

    let business: Business = state
        .businesses
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound("Business not found".to_string()))?
        .into();
    Ok(Json(business))
}

/// DELETE /api/v1/businesses/:id
///
/// Removes the business with all of its reviews, votes, likes and flags.
pub async fn delete_business(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<PasswordConfirmation>,
) -> Result<StatusCode, ApiError> {
    let existing = load_business(&state, id).await?;
    if existing.owner_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Only the owner can delete this business".to_string(),
        ));
    }

    request.validate()?;
    state
        .auth
        .confirm_password(auth.user_id, &request.password)
        .await?;

    if !state.businesses.delete(id).await? {
        return Err(ApiError::NotFound("Business not found".to_string()));
    }
    tracing::info!(business_id = %id, owner_id = %auth.user_id, "Business deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/businesses/:id/like
pub async fn like_business(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    load_business(&state, id).await?;
    let created = state.likes.like(auth.user_id, id).await?;
    Ok(if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    })
}

/// DELETE /api/v1/businesses/:id/like
pub async fn unlike_business(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.likes.unlike(auth.user_id, id).await? {
        return Err(ApiError::NotFound(
            "You have not liked this business".to_string(),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/businesses/:id/reviews
pub async fn create_review(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let business = load_business(&state, id).await?;
    if business.owner_id == auth.user_id {
        return Err(ApiError::Forbidden(
            "You cannot review your own business".to_string(),
        ));
    }

    request.validate()?;
    if state
        .reviews
        .find_by_author_and_business(auth.user_id, id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "You have already reviewed this business".to_string(),
        ));
    }

    let review: Review = state
        .reviews
        .create(auth.user_id, id, request.content.trim(), request.rating)
        .await?
        .into();
    tracing::info!(
        review_id = %review.id,
        business_id = %id,
        author_id = %auth.user_id,
        "Review posted",
    );
    Ok((StatusCode::CREATED, Json(review)))
}
