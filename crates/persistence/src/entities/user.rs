//! User entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
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
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            first_name: entity.first_name,
            last_name: entity.last_name,
            dob: entity.dob,
            address: entity.address,
            city: entity.city,
            state: entity.state,
            zip: entity.zip,
            phone_number: entity.phone_number,
            email: entity.email,
            password_hash: entity.password_hash,
            is_admin: entity.is_admin,
            created_at: entity.created_at,
        }
    }
}

/// Column values for a new or edited user.
#[derive(Debug, Clone)]
pub struct UserInput<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub dob: NaiveDate,
    pub address: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub zip: &'a str,
    pub phone_number: &'a str,
    pub email: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_entity_to_domain() {
        let entity = UserEntity {
            id: Uuid::new_v4(),
            first_name: "Olive".to_string(),
            last_name: "Owner".to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 4, 1).unwrap(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
            phone_number: "2175550100".to_string(),
            email: "olive@example.com".to_string(),
            password_hash: "hash".to_string(),
            is_admin: true,
            created_at: Utc::now(),
        };
        let id = entity.id;
        let user: domain::models::User = entity.into();
        assert_eq!(user.id, id);
        assert!(user.is_admin);
        assert_eq!(user.email, "olive@example.com");
    }
}
