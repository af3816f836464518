//! Business listing domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use super::business_hours::BusinessHours;

/// A listed business.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Business {
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
    pub hours: BusinessHours,
    pub time_zone: String,
    pub created_at: DateTime<Utc>,
}

/// Create and edit payload for a business.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateBusinessRequest {
    #[validate(length(min = 1, max = 30, message = "Business name must be 1-30 characters"))]
    pub name: String,
    #[validate(custom(function = "shared::validation::validate_business_category"))]
    pub category: String,
    #[validate(length(min = 1, max = 40, message = "Address must be 1-40 characters"))]
    pub address: String,
    #[validate(length(min = 1, max = 25, message = "City must be 1-25 characters"))]
    pub city: String,
    #[validate(custom(function = "shared::validation::validate_us_state"))]
    pub state: String,
    #[validate(custom(function = "shared::validation::validate_zip"))]
    pub zip: String,
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 15, message = "Phone number must be at most 15 characters"))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(
        url(message = "Website must be a valid URL"),
        length(max = 100, message = "Website must be at most 100 characters")
    )]
    pub website: Option<String>,
    #[validate(custom(function = "shared::validation::validate_time_zone"))]
    pub time_zone: String,
    #[serde(default)]
    #[validate(custom(function = "crate::models::business_hours::validate_hours"))]
    pub hours: BusinessHours,
}

pub type UpdateBusinessRequest = CreateBusinessRequest;

/// Sort order for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BusinessSort {
    #[default]
    Relevance,
    Highest,
    Lowest,
    MostReviews,
}

impl BusinessSort {
    /// ORDER BY fragment over the search projection.
    pub fn as_sql(&self) -> &'static str {
        match self {
            BusinessSort::Relevance => "b.name ASC",
            BusinessSort::Highest => "average_rating DESC NULLS LAST, b.name ASC",
            BusinessSort::Lowest => "average_rating ASC NULLS LAST, b.name ASC",
            BusinessSort::MostReviews => "review_count DESC, b.name ASC",
        }
    }
}

/// Search filters. All are optional; text filters match case-insensitive substrings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct BusinessSearchQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Minimum rating must be between 1 and 5"))]
    pub min_rating: Option<i32>,
    #[serde(default)]
    pub sort_by: BusinessSort,
}

impl BusinessSearchQuery {
    /// Drops blank filters so `?category=` means "any category".
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            name: keep(self.name),
            category: keep(self.category),
            city: keep(self.city),
            state: keep(self.state),
            zip: keep(self.zip),
            min_rating: self.min_rating,
            sort_by: self.sort_by,
        }
    }
}

/// Business with its public rating figures. Ratings only count visible reviews.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BusinessSummary {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub city: String,
    pub state: String,
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BusinessDetails {
    #[serde(flatten)]
    pub business: Business,
    pub formatted_hours: String,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub like_count: i64,
}

/// Filter for the caller's liked businesses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LikedBusinessesQuery {
    pub category: Option<String>,
}

/// Liked businesses grouped by category, categories in alphabetical order.
#[derive(Debug, Clone, Serialize)]
pub struct LikedBusinessesResponse {
    pub categories: BTreeMap<String, Vec<Business>>,
}

impl LikedBusinessesResponse {
    pub fn group(businesses: Vec<Business>) -> Self {
        let mut categories: BTreeMap<String, Vec<Business>> = BTreeMap::new();
        for business in businesses {
            categories
                .entry(business.category.clone())
                .or_default()
                .push(business);
        }
        Self { categories }
    }
}

/// Rounds an average rating to one decimal place.
pub fn round_rating(avg: Option<f64>) -> Option<f64> {
    avg.map(|v| (v * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::business_hours::{Day, DaySchedule};

    fn create_json() -> serde_json::Value {
        serde_json::json!({
            "name": "Corner Bakery",
            "category": "Food & Dining",
            "address": "12 Elm St",
            "city": "Springfield",
            "state": "IL",
            "zip": "62701",
            "description": "Bread and pastries",
            "time_zone": "UTC-05:00",
            "hours": {
                "monday": {
                    "status": "open",
                    "open": {"hour": 6, "minute": 0},
                    "close": {"hour": 18, "minute": 0}
                },
                "sunday": {"status": "closed"}
            }
        })
    }

    #[test]
    fn test_create_business_valid() {
        let req: CreateBusinessRequest = serde_json::from_value(create_json()).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.hours.get(Day::Sunday), Some(&DaySchedule::Closed));
    }

    #[test]
    fn test_create_business_rejects_bad_fields() {
        let mut json = create_json();
        json["name"] = "N".repeat(31).into();
        json["category"] = "Bakeries".into();
        json["time_zone"] = "UTC+03:00".into();
        json["website"] = "not a url".into();
        json["description"] = "   ".into();
        let req: CreateBusinessRequest = serde_json::from_value(json).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["name", "category", "time_zone", "website", "description"] {
            assert!(fields.contains_key(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_search_query_defaults_and_normalize() {
        let query: BusinessSearchQuery =
            serde_json::from_value(serde_json::json!({"category": "", "city": " spring "}))
                .unwrap();
        let query = query.normalized();
        assert!(query.category.is_none());
        assert_eq!(query.city.as_deref(), Some("spring"));
        assert_eq!(query.sort_by, BusinessSort::Relevance);
    }

    #[test]
    fn test_search_query_min_rating_range() {
        let query = BusinessSearchQuery {
            min_rating: Some(6),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_sort_deserialize() {
        let sort: BusinessSort = serde_json::from_str("\"most_reviews\"").unwrap();
        assert_eq!(sort, BusinessSort::MostReviews);
        assert!(sort.as_sql().starts_with("review_count DESC"));
    }

    #[test]
    fn test_round_rating() {
        assert_eq!(round_rating(Some(4.25)), Some(4.3));
        assert_eq!(round_rating(Some(3.0)), Some(3.0));
        assert_eq!(round_rating(None), None);
    }
}
