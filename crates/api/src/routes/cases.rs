//! Business-owner side of a flagged review case.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::moderation::{AppealRequest, FlaggedCaseResponse};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// POST /api/v1/cases/:id/appeal
pub async fn file_appeal(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<AppealRequest>,
) -> Result<Json<FlaggedCaseResponse>, ApiError> {
    let case = state
        .moderation
        .file_appeal(id, auth.user_id, &request.reason)
        .await?;
    Ok(Json(case.into()))
}
