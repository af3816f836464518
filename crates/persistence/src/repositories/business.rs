//! Business repository for database operations.

use domain::models::{BusinessSearchQuery, BusinessSort};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{BusinessEntity, BusinessInput, BusinessStatsEntity, BusinessSummaryEntity};
use crate::metrics::QueryTimer;

const BUSINESS_COLUMNS: &str = "id, owner_id, name, category, address, city, state, zip, \
                                description, phone, website, hours, time_zone, created_at";

/// Repository for business-related database operations.
#[derive(Clone)]
pub struct BusinessRepository {
    pool: PgPool,
}

impl BusinessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        input: &BusinessInput<'_>,
    ) -> Result<BusinessEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_business");
        let result = sqlx::query_as::<_, BusinessEntity>(&format!(
            r#"
            INSERT INTO businesses (owner_id, name, category, address, city, state, zip,
                                    description, phone, website, hours, time_zone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {BUSINESS_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(input.name)
        .bind(input.category)
        .bind(input.address)
        .bind(input.city)
        .bind(input.state)
        .bind(input.zip)
        .bind(input.description)
        .bind(input.phone)
        .bind(input.website)
        .bind(&input.hours)
        .bind(input.time_zone)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<BusinessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_business_by_id");
        let result = sqlx::query_as::<_, BusinessEntity>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<BusinessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_business_by_name");
        let result = sqlx::query_as::<_, BusinessEntity>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &BusinessInput<'_>,
    ) -> Result<Option<BusinessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_business");
        let result = sqlx::query_as::<_, BusinessEntity>(&format!(
            r#"
            UPDATE businesses
            SET name = $2, category = $3, address = $4, city = $5, state = $6, zip = $7,
                description = $8, phone = $9, website = $10, hours = $11, time_zone = $12
            WHERE id = $1
            RETURNING {BUSINESS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name)
        .bind(input.category)
        .bind(input.address)
        .bind(input.city)
        .bind(input.state)
        .bind(input.zip)
        .bind(input.description)
        .bind(input.phone)
        .bind(input.website)
        .bind(&input.hours)
        .bind(input.time_zone)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes a business together with its reviews, votes, likes and flags
    /// (foreign key cascades). Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_business");
        let result = sqlx::query("DELETE FROM businesses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<BusinessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_businesses_by_owner");
        let result = sqlx::query_as::<_, BusinessEntity>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE owner_id = $1 ORDER BY name"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_businesses_by_owner");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM businesses WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<BusinessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_businesses");
        let result = sqlx::query_as::<_, BusinessEntity>(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_businesses");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM businesses")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Filters and sorts businesses. Ratings and counts only include visible reviews.
    pub async fn search(
        &self,
        query: &BusinessSearchQuery,
    ) -> Result<Vec<BusinessSummaryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("search_businesses");
        let sql = search_sql(query.sort_by);
        let result = sqlx::query_as::<_, BusinessSummaryEntity>(&sql)
            .bind(query.name.as_deref())
            .bind(query.category.as_deref())
            .bind(query.city.as_deref())
            .bind(query.state.as_deref())
            .bind(query.zip.as_deref())
            .bind(query.min_rating.map(f64::from))
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Average visible rating, visible review count and like count for one business.
    pub async fn stats(&self, id: Uuid) -> Result<BusinessStatsEntity, sqlx::Error> {
        let timer = QueryTimer::new("business_stats");
        let result = sqlx::query_as::<_, BusinessStatsEntity>(
            r#"
            SELECT
                (SELECT AVG(rating)::FLOAT8 FROM reviews
                 WHERE business_id = $1 AND is_visible) AS average_rating,
                (SELECT COUNT(*) FROM reviews
                 WHERE business_id = $1 AND is_visible) AS review_count,
                (SELECT COUNT(*) FROM business_likes WHERE business_id = $1) AS like_count
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

fn search_sql(sort: BusinessSort) -> String {
    format!(
        r#"
        SELECT b.id, b.name, b.category, b.city, b.state,
               AVG(r.rating)::FLOAT8 AS average_rating,
               COUNT(r.id) AS review_count
        FROM businesses b
        LEFT JOIN reviews r ON r.business_id = b.id AND r.is_visible
        WHERE ($1::TEXT IS NULL OR b.name ILIKE '%' || $1 || '%')
          AND ($2::TEXT IS NULL OR b.category = $2)
          AND ($3::TEXT IS NULL OR b.city ILIKE '%' || $3 || '%')
          AND ($4::TEXT IS NULL OR b.state = $4)
          AND ($5::TEXT IS NULL OR b.zip = $5)
        GROUP BY b.id
        HAVING ($6::FLOAT8 IS NULL OR COALESCE(AVG(r.rating), 0) >= $6)
        ORDER BY {}
        "#,
        sort.as_sql()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_sql_uses_sort_fragment() {
        let sql = search_sql(BusinessSort::Lowest);
        assert!(sql.contains("ORDER BY average_rating ASC NULLS LAST"));
        assert!(sql.contains("r.is_visible"));
    }

    #[test]
    fn test_search_sql_has_all_filters() {
        let sql = search_sql(BusinessSort::Relevance);
        for placeholder in ["$1", "$2", "$3", "$4", "$5", "$6"] {
            assert!(sql.contains(placeholder), "missing {}", placeholder);
        }
    }
}
