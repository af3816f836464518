//! Account registration, login and token issuing.

use domain::models::user::{AuthResponse, AuthTokens, LoginRequest, RegisterUserRequest};
use domain::models::{User, UserProfile};
use persistence::entities::UserInput;
use persistence::repositories::UserRepository;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_password, PasswordError};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{AdminConfig, JwtAuthConfig};
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("An account with this email or phone number already exists")]
    AccountExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Incorrect password")]
    WrongPassword,

    #[error("User not found")]
    UserNotFound,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AccountExists => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials | AuthError::WrongPassword => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::UserNotFound => ApiError::NotFound(err.to_string()),
            AuthError::Token(e) => ApiError::Internal(e.to_string()),
            AuthError::Password(e) => ApiError::Internal(e.to_string()),
            AuthError::Database(e) => e.into(),
        }
    }
}

/// PEM keys passed through environment variables often carry literal `\n`
/// sequences and surrounding quotes.
fn normalize_pem_key(key: &str) -> String {
    key.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .replace("\\n", "\n")
}

/// Builds the RS256 signer/verifier from configuration.
pub fn jwt_from_config(config: &JwtAuthConfig) -> Result<JwtConfig, JwtError> {
    JwtConfig::new(
        &normalize_pem_key(&config.private_key),
        &normalize_pem_key(&config.public_key),
        config.access_token_expiry_secs,
        config.leeway_secs,
    )
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtConfig>,
    admin: AdminConfig,
}

impl AuthService {
    pub fn new(users: UserRepository, jwt: Arc<JwtConfig>, admin: AdminConfig) -> Self {
        Self { users, jwt, admin }
    }

    /// Creates an account and signs it in. Input must already be validated.
    pub async fn register(&self, req: &RegisterUserRequest) -> Result<AuthResponse, AuthError> {
        if self
            .users
            .exists_by_email_or_phone(&req.email, &req.phone_number, None)
            .await?
        {
            return Err(AuthError::AccountExists);
        }

        let is_admin = self.admin.grants_admin(req.admin_code.as_deref());
        let password_hash = hash_password(&req.password)?;
        let input = UserInput {
            first_name: req.first_name.trim(),
            last_name: req.last_name.trim(),
            dob: req.dob,
            address: req.address.trim(),
            city: req.city.trim(),
            state: &req.state,
            zip: &req.zip,
            phone_number: &req.phone_number,
            email: req.email.trim(),
        };

        let user: User = match self.users.create(&input, &password_hash, is_admin).await {
            Ok(entity) => entity.into(),
            // Lost a race with a concurrent signup for the same email or phone.
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                return Err(AuthError::AccountExists)
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %user.id, is_admin, "User registered");
        self.sign_in(user)
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, AuthError> {
        let user: User = self
            .users
            .find_by_email(req.email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?
            .into();

        if !verify_password(&req.password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.sign_in(user)
    }

    /// Re-checks the caller's password before a destructive action.
    pub async fn confirm_password(&self, user_id: Uuid, password: &str) -> Result<User, AuthError> {
        let user: User = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?
            .into();

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::WrongPassword);
        }
        Ok(user)
    }

    fn sign_in(&self, user: User) -> Result<AuthResponse, AuthError> {
        let (access_token, _jti) = self.jwt.generate_access_token(user.id)?;
        Ok(AuthResponse {
            user: UserProfile::from(user),
            tokens: AuthTokens {
                access_token,
                token_type: "Bearer".to_string(),
                expires_in: self.jwt.access_token_expiry_secs,
            },
        })
    }
}
