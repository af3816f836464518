//! Admin console: dashboard, account and business removal, flag moderation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::moderation::{DecisionRequest, FlaggedCaseItem, FlaggedCaseResponse};
use domain::models::{Business, DashboardStats, ListQuery, Paged, UserProfile};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminAuth;

/// GET /api/v1/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.stats.dashboard().await?.into()))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<UserProfile>>, ApiError> {
    query.validate()?;
    let rows = state.users.list(query.limit(), query.offset()).await?;
    let total = state.users.count().await?;
    Ok(Json(Paged {
        data: rows
            .into_iter()
            .map(|e| UserProfile::from(domain::models::User::from(e)))
            .collect(),
        pagination: query.pagination(total),
    }))
}

/// DELETE /api/v1/admin/users/:id
///
/// Removes the account and everything it owns through the storage cascade.
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if id == admin.user_id {
        return Err(ApiError::Conflict(
            "Admins cannot delete their own account from the console".to_string(),
        ));
    }
    if !state.users.delete(id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    info!(user_id = %id, admin_id = %admin.user_id, "User deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/businesses
pub async fn list_businesses(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<Business>>, ApiError> {
    query.validate()?;
    let rows = state.businesses.list(query.limit(), query.offset()).await?;
    let total = state.businesses.count().await?;
    Ok(Json(Paged {
        data: rows.into_iter().map(Into::into).collect(),
        pagination: query.pagination(total),
    }))
}

/// DELETE /api/v1/admin/businesses/:id
pub async fn delete_business(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.businesses.delete(id).await? {
        return Err(ApiError::NotFound("Business not found".to_string()));
    }
    info!(business_id = %id, admin_id = %admin.user_id, "Business deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/flagged-reviews
pub async fn list_flagged_reviews(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<FlaggedCaseItem>>, ApiError> {
    query.validate()?;
    Ok(Json(state.moderation.list_pending(&query).await?))
}

/// GET /api/v1/admin/flagged-reviews/:id
pub async fn get_flagged_review(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<FlaggedCaseItem>, ApiError> {
    Ok(Json(state.moderation.case_details(id).await?))
}

/// POST /api/v1/admin/flagged-reviews/:id/decision
///
/// `approve` upholds the flag and hides the review; `deny` keeps it visible.
pub async fn decide_flagged_review(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<FlaggedCaseResponse>, ApiError> {
    let verdict = request.verdict()?;
    let case = state
        .moderation
        .decide(id, admin.user_id, verdict, &request.notes)
        .await?;
    Ok(Json(case.into()))
}

/// GET /api/v1/admin/appeals
pub async fn list_appeals(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<FlaggedCaseItem>>, ApiError> {
    query.validate()?;
    Ok(Json(state.moderation.list_pending_appeals(&query).await?))
}

/// POST /api/v1/admin/appeals/:id/decision
pub async fn decide_appeal(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<FlaggedCaseResponse>, ApiError> {
    let verdict = request.verdict()?;
    let case = state
        .moderation
        .resolve_appeal(id, admin.user_id, verdict, &request.notes)
        .await?;
    Ok(Json(case.into()))
}
