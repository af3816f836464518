//! The signed-in user's own account.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use domain::models::business::{LikedBusinessesQuery, LikedBusinessesResponse};
use domain::models::moderation::MyCasesResponse;
use domain::models::user::{DeleteAccountRequest, UpdateProfileRequest};
use domain::models::{User, UserProfile};
use persistence::entities::UserInput;
use shared::password::hash_password;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<UserProfile>, ApiError> {
    let user: User = state
        .users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();
    Ok(Json(user.into()))
}

/// PUT /api/v1/users/me
pub async fn update_me(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    request.validate()?;

    if state
        .users
        .exists_by_email_or_phone(&request.email, &request.phone_number, Some(auth.user_id))
        .await?
    {
        return Err(ApiError::Conflict(
            "Another account already uses this email or phone number".to_string(),
        ));
    }

    let input = UserInput {
        first_name: request.first_name.trim(),
        last_name: request.last_name.trim(),
        dob: request.dob,
        address: request.address.trim(),
        city: request.city.trim(),
        state: &request.state,
        zip: &request.zip,
        phone_number: &request.phone_number,
        email: request.email.trim(),
    };
    let user: User = state
        .users
        .update_profile(auth.user_id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();

    if let Some(new_password) = request.new_password.as_deref() {
        let hash = hash_password(new_password)?;
        state.users.update_password(auth.user_id, &hash).await?;
        tracing::info!(user_id = %auth.user_id, "Password changed");
    }

    Ok(Json(user.into()))
}

/// DELETE /api/v1/users/me
///
/// Refused while the user still owns businesses; those must be deleted first.
pub async fn delete_me(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<DeleteAccountRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;
    state
        .auth
        .confirm_password(auth.user_id, &request.password)
        .await?;

    let owned = state.businesses.count_by_owner(auth.user_id).await?;
    if owned > 0 {
        return Err(ApiError::Conflict(format!(
            "Delete your {} business(es) before deleting your account",
            owned
        )));
    }

    if !state.users.delete(auth.user_id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    tracing::info!(user_id = %auth.user_id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/me/liked-businesses?category=
pub async fn liked_businesses(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<LikedBusinessesQuery>,
) -> Result<Json<LikedBusinessesResponse>, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let liked = state
        .likes
        .list_liked_businesses(auth.user_id, category)
        .await?;
    Ok(Json(LikedBusinessesResponse::group(
        liked.into_iter().map(Into::into).collect(),
    )))
}

/// GET /api/v1/users/me/cases
pub async fn my_cases(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<MyCasesResponse>, ApiError> {
    if state.businesses.count_by_owner(auth.user_id).await? == 0 {
        return Err(ApiError::NotFound(
            "You do not own any businesses".to_string(),
        ));
    }
    Ok(Json(state.moderation.cases_for_owner(auth.user_id).await?))
}
