//! Review repository for database operations.

use domain::models::ReviewSort;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ReviewEntity, ReviewWithVotesEntity};
use crate::metrics::QueryTimer;

const REVIEW_COLUMNS: &str = "id, author_id, business_id, content, rating, response, \
                              response_at, is_visible, created_at";

/// Repository for review-related database operations.
#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a visible review. A second review of the same business by the
    /// same author violates `reviews_author_business_unique`.
    pub async fn create(
        &self,
        author_id: Uuid,
        business_id: Uuid,
        content: &str,
        rating: i16,
    ) -> Result<ReviewEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_review");
        let result = sqlx::query_as::<_, ReviewEntity>(&format!(
            r#"
            INSERT INTO reviews (author_id, business_id, content, rating)
            VALUES ($1, $2, $3, $4)
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(author_id)
        .bind(business_id)
        .bind(content)
        .bind(rating)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_review_by_id");
        let result = sqlx::query_as::<_, ReviewEntity>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_author_and_business(
        &self,
        author_id: Uuid,
        business_id: Uuid,
    ) -> Result<Option<ReviewEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_review_by_author_and_business");
        let result = sqlx::query_as::<_, ReviewEntity>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE author_id = $1 AND business_id = $2"
        ))
        .bind(author_id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Author edit. Visibility is left alone.
    pub async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        rating: i16,
    ) -> Result<Option<ReviewEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_review_content");
        let result = sqlx::query_as::<_, ReviewEntity>(&format!(
            r#"
            UPDATE reviews SET content = $2, rating = $3
            WHERE id = $1
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(content)
        .bind(rating)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Stores the business owner's reply and stamps `response_at`.
    pub async fn set_response(
        &self,
        id: Uuid,
        response: &str,
    ) -> Result<Option<ReviewEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_review_response");
        let result = sqlx::query_as::<_, ReviewEntity>(&format!(
            r#"
            UPDATE reviews SET response = $2, response_at = NOW()
            WHERE id = $1
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(response)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Visible reviews of a business with author names and vote tallies.
    pub async fn list_visible_for_business(
        &self,
        business_id: Uuid,
        sort: ReviewSort,
    ) -> Result<Vec<ReviewWithVotesEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_visible_reviews_for_business");
        let result = sqlx::query_as::<_, ReviewWithVotesEntity>(&format!(
            r#"
            SELECT r.id, r.author_id, r.business_id, r.content, r.rating, r.response,
                   r.response_at, r.is_visible, r.created_at,
                   u.first_name || ' ' || u.last_name AS author_name,
                   COUNT(v.id) FILTER (WHERE v.vote_type = 'up') AS up_votes,
                   COUNT(v.id) FILTER (WHERE v.vote_type = 'down') AS down_votes
            FROM reviews r
            JOIN users u ON u.id = r.author_id
            LEFT JOIN review_votes v ON v.review_id = r.id
            WHERE r.business_id = $1 AND r.is_visible
            GROUP BY r.id, u.first_name, u.last_name
            ORDER BY {}
            "#,
            sort.as_sql()
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_reviews");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}
