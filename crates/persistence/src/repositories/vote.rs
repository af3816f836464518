//! Review vote and business like repositories.

use domain::models::{VoteOutcome, VoteType};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{BusinessEntity, VoteCountsEntity, VoteEntity};
use crate::metrics::QueryTimer;

/// Repository for helpful/unhelpful votes on reviews.
#[derive(Clone)]
pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(
        &self,
        user_id: Uuid,
        review_id: Uuid,
    ) -> Result<Option<VoteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_vote");
        let result = sqlx::query_as::<_, VoteEntity>(
            r#"
            SELECT id, user_id, review_id, vote_type, created_at
            FROM review_votes
            WHERE user_id = $1 AND review_id = $2
            "#,
        )
        .bind(user_id)
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Applies the vote toggle in one transaction and returns what happened.
    ///
    /// No prior vote records it, the same type again withdraws it and the
    /// other type replaces it.
    pub async fn cast_vote(
        &self,
        user_id: Uuid,
        review_id: Uuid,
        vote_type: VoteType,
    ) -> Result<VoteOutcome, sqlx::Error> {
        let timer = QueryTimer::new("cast_vote");
        let result = async {
            let mut tx = self.pool.begin().await?;

            let existing = sqlx::query_scalar::<_, String>(
                r#"
                SELECT vote_type FROM review_votes
                WHERE user_id = $1 AND review_id = $2
                FOR UPDATE
                "#,
            )
            .bind(user_id)
            .bind(review_id)
            .fetch_optional(&mut *tx)
            .await?;

            let current = existing.as_deref().and_then(|v| v.parse::<VoteType>().ok());
            let outcome = VoteOutcome::toggle(current, vote_type);

            match outcome {
                VoteOutcome::Recorded => {
                    sqlx::query(
                        r#"
                        INSERT INTO review_votes (user_id, review_id, vote_type)
                        VALUES ($1, $2, $3)
                        "#,
                    )
                    .bind(user_id)
                    .bind(review_id)
                    .bind(vote_type.as_str())
                    .execute(&mut *tx)
                    .await?;
                }
                VoteOutcome::Changed => {
                    sqlx::query(
                        r#"
                        UPDATE review_votes SET vote_type = $3
                        WHERE user_id = $1 AND review_id = $2
                        "#,
                    )
                    .bind(user_id)
                    .bind(review_id)
                    .bind(vote_type.as_str())
                    .execute(&mut *tx)
                    .await?;
                }
                VoteOutcome::Removed => {
                    sqlx::query("DELETE FROM review_votes WHERE user_id = $1 AND review_id = $2")
                        .bind(user_id)
                        .bind(review_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }

            tx.commit().await?;
            Ok::<_, sqlx::Error>(outcome)
        }
        .await;
        timer.record();
        result
    }

    pub async fn counts(&self, review_id: Uuid) -> Result<VoteCountsEntity, sqlx::Error> {
        let timer = QueryTimer::new("count_votes_for_review");
        let result = sqlx::query_as::<_, VoteCountsEntity>(
            r#"
            SELECT COUNT(*) FILTER (WHERE vote_type = 'up') AS up,
                   COUNT(*) FILTER (WHERE vote_type = 'down') AS down
            FROM review_votes
            WHERE review_id = $1
            "#,
        )
        .bind(review_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

/// Repository for users' liked businesses.
#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Likes a business. Liking twice is a no-op; returns whether a like was added.
    pub async fn like(&self, user_id: Uuid, business_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("like_business");
        let result = sqlx::query(
            r#"
            INSERT INTO business_likes (user_id, business_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, business_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(business_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }

    /// Returns whether a like was removed.
    pub async fn unlike(&self, user_id: Uuid, business_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("unlike_business");
        let result =
            sqlx::query("DELETE FROM business_likes WHERE user_id = $1 AND business_id = $2")
                .bind(user_id)
                .bind(business_id)
                .execute(&self.pool)
                .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }

    /// Businesses the user liked, optionally limited to one category.
    pub async fn list_liked_businesses(
        &self,
        user_id: Uuid,
        category: Option<&str>,
    ) -> Result<Vec<BusinessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_liked_businesses");
        let result = sqlx::query_as::<_, BusinessEntity>(
            r#"
            SELECT b.id, b.owner_id, b.name, b.category, b.address, b.city, b.state, b.zip,
                   b.description, b.phone, b.website, b.hours, b.time_zone, b.created_at
            FROM business_likes l
            JOIN businesses b ON b.id = l.business_id
            WHERE l.user_id = $1 AND ($2::TEXT IS NULL OR b.category = $2)
            ORDER BY b.category, b.name
            "#,
        )
        .bind(user_id)
        .bind(category)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
