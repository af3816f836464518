//! Bearer-token authentication extractors.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// The authenticated caller, taken from a valid access token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// Token ID, for log correlation.
    pub jti: String,
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = state.jwt.validate_access_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;
        let user_id = shared::jwt::extract_user_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(UserAuth {
            user_id,
            jti: claims.jti,
        })
    }
}

/// An authenticated caller whose account carries the admin flag.
///
/// The flag is read from the database on every request so revoking it takes
/// effect without waiting for tokens to expire.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = UserAuth::from_request_parts(parts, state).await?;

        let user = state
            .users
            .find_by_id(auth.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

        if !user.is_admin {
            tracing::warn!(user_id = %auth.user_id, "Non-admin attempted an admin action");
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }

        Ok(AdminAuth {
            user_id: auth.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header_value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_rejected() {
        let parts = parts_with(None);
        assert!(matches!(
            bearer_token(&parts),
            Err(ApiError::Unauthorized(msg)) if msg.contains("Missing")
        ));
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer ", "bearer abc"] {
            let parts = parts_with(Some(value));
            assert!(bearer_token(&parts).is_err(), "{} should be rejected", value);
        }
    }
}
