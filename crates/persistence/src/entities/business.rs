//! Business entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::BusinessHours;
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

/// Database row mapping for the businesses table.
#[derive(Debug, Clone, FromRow)]
pub struct BusinessEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub category: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub description: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub hours: String,
    pub time_zone: String,
    pub created_at: DateTime<Utc>,
}

impl From<BusinessEntity> for domain::models::Business {
    fn from(entity: BusinessEntity) -> Self {
        let hours = BusinessHours::parse(&entity.hours).unwrap_or_else(|e| {
            warn!(business_id = %entity.id, error = %e, "Unreadable stored hours");
            BusinessHours::default()
        });
        Self {
            id: entity.id,
            owner_id: entity.owner_id,
            name: entity.name,
            category: entity.category,
            address: entity.address,
            city: entity.city,
            state: entity.state,
            zip: entity.zip,
            description: entity.description,
            phone: entity.phone,
            website: entity.website,
            hours,
            time_zone: entity.time_zone,
            created_at: entity.created_at,
        }
    }
}

/// Search row: a business with figures computed over its visible reviews.
#[derive(Debug, Clone, FromRow)]
pub struct BusinessSummaryEntity {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub city: String,
    pub state: String,
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

impl From<BusinessSummaryEntity> for domain::models::BusinessSummary {
    fn from(entity: BusinessSummaryEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            category: entity.category,
            city: entity.city,
            state: entity.state,
            average_rating: domain::models::business::round_rating(entity.average_rating),
            review_count: entity.review_count,
        }
    }
}

/// Aggregates shown on a business's page.
#[derive(Debug, Clone, FromRow)]
pub struct BusinessStatsEntity {
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub like_count: i64,
}

/// Column values for a new or edited business.
#[derive(Debug, Clone)]
pub struct BusinessInput<'a> {
    pub name: &'a str,
    pub category: &'a str,
    pub address: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub zip: &'a str,
    pub description: &'a str,
    pub phone: Option<&'a str>,
    pub website: Option<&'a str>,
    pub hours: String,
    pub time_zone: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{Day, DaySchedule};

    fn entity(hours: &str) -> BusinessEntity {
        BusinessEntity {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Corner Bakery".to_string(),
            category: "Food & Dining".to_string(),
            address: "12 Elm St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
            description: "Bread".to_string(),
            phone: None,
            website: None,
            hours: hours.to_string(),
            time_zone: "UTC-05:00".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_business_entity_parses_hours() {
        let business: domain::models::Business =
            entity("Monday: 6:0 - 18:0, Sunday: Closed").into();
        assert_eq!(business.hours.get(Day::Sunday), Some(&DaySchedule::Closed));
        assert!(business.hours.get(Day::Monday).is_some());
    }

    #[test]
    fn test_business_entity_tolerates_bad_hours() {
        let business: domain::models::Business = entity("whenever").into();
        assert!(business.hours.is_empty());
    }

    #[test]
    fn test_summary_rounds_rating() {
        let summary: domain::models::BusinessSummary = BusinessSummaryEntity {
            id: Uuid::new_v4(),
            name: "Corner Bakery".to_string(),
            category: "Food & Dining".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            average_rating: Some(3.6666),
            review_count: 3,
        }
        .into();
        assert_eq!(summary.average_rating, Some(3.7));
    }
}
