//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{UserEntity, UserInput};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, first_name, last_name, dob, address, city, state, zip, \
                            phone_number, email, password_hash, is_admin, created_at";

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a user. Duplicate email or phone surfaces as a unique violation.
    pub async fn create(
        &self,
        input: &UserInput<'_>,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, dob, address, city, state, zip,
                               phone_number, email, password_hash, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, LOWER($9), $10, $11)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.dob)
        .bind(input.address)
        .bind(input.city)
        .bind(input.state)
        .bind(input.zip)
        .bind(input.phone_number)
        .bind(input.email)
        .bind(password_hash)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Case-insensitive lookup by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_phone");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone_number = $1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// True when another user (not `except`) already holds the email or phone number.
    pub async fn exists_by_email_or_phone(
        &self,
        email: &str,
        phone: &str,
        except: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("user_exists_by_email_or_phone");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE (email = LOWER($1) OR phone_number = $2)
                  AND ($3::UUID IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(email)
        .bind(phone)
        .bind(except)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        input: &UserInput<'_>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_profile");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, dob = $4, address = $5, city = $6,
                state = $7, zip = $8, phone_number = $9, email = LOWER($10)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.dob)
        .bind(input.address)
        .bind(input.city)
        .bind(input.state)
        .bind(input.zip)
        .bind(input.phone_number)
        .bind(input.email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_user_password");
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|_| ())
    }

    /// Deletes a user. Businesses, reviews, votes, likes and flags go with it
    /// through the foreign key cascades. Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }

    /// Lists users, newest first.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_users");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}
