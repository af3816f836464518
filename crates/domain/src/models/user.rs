//! User account domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone_number: String,
    pub email: String,
    #[serde(skip_serializing)] // Never serialize password hash to API responses
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// What the API returns about a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone_number: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            dob: user.dob,
            address: user.address,
            city: user.city,
            state: user.state,
            zip: user.zip,
            phone_number: user.phone_number,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Signup payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 20, message = "First name must be 1-20 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 20, message = "Last name must be 1-20 characters"))]
    pub last_name: String,
    pub dob: NaiveDate,
    #[validate(length(min = 1, max = 40, message = "Address must be 1-40 characters"))]
    pub address: String,
    #[validate(length(min = 1, max = 20, message = "City must be 1-20 characters"))]
    pub city: String,
    #[validate(custom(function = "shared::validation::validate_us_state"))]
    pub state: String,
    #[validate(custom(function = "shared::validation::validate_zip"))]
    pub zip: String,
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone_number: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub confirm_password: String,
    /// Registration code that grants admin rights when it matches the configured one.
    #[serde(default)]
    pub admin_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Profile edit. A new password is optional; when present it must be confirmed.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_password_confirmation"))]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 20, message = "First name must be 1-20 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 20, message = "Last name must be 1-20 characters"))]
    pub last_name: String,
    pub dob: NaiveDate,
    #[validate(length(min = 1, max = 40, message = "Address must be 1-40 characters"))]
    pub address: String,
    #[validate(length(min = 1, max = 20, message = "City must be 1-20 characters"))]
    pub city: String,
    #[validate(custom(function = "shared::validation::validate_us_state"))]
    pub state: String,
    #[validate(custom(function = "shared::validation::validate_zip"))]
    pub zip: String,
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone_number: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

fn validate_password_confirmation(
    req: &UpdateProfileRequest,
) -> Result<(), validator::ValidationError> {
    if req.new_password.is_some() && req.new_password != req.confirm_password {
        let mut err = validator::ValidationError::new("must_match");
        err.message = Some("Passwords must match".into());
        return Err(err);
    }
    Ok(())
}

/// Password confirmation for destructive account actions.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct PasswordConfirmation {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

pub type DeleteAccountRequest = PasswordConfirmation;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Response to register and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthResponse {
    pub user: UserProfile,
    pub tokens: AuthTokens,
}
