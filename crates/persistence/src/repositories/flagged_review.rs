//! Flagged review repository for database operations.
//!
//! Decision writes update the case and its review's visibility in one
//! transaction. Each update is guarded by the state it expects, so a racing
//! second decision matches no row and its transaction is rolled back.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::{FlaggedReviewContextEntity, FlaggedReviewEntity, ModerationDecisionDb};
use crate::metrics::QueryTimer;

const CASE_COLUMNS: &str = "id, review_id, flagger_id, reason, filed_at, admin_decision, \
                            admin_notes, appeal_reason, appeal_filed_at, appeal_decision, \
                            decided_at, appeal_resolved_at";

const CONTEXT_SELECT: &str = r#"
    SELECT f.id, f.review_id, f.flagger_id, f.reason, f.filed_at, f.admin_decision,
           f.admin_notes, f.appeal_reason, f.appeal_filed_at, f.appeal_decision,
           f.decided_at, f.appeal_resolved_at,
           r.author_id AS review_author_id, r.content AS review_content,
           r.rating AS review_rating, r.is_visible AS review_is_visible,
           b.id AS business_id, b.name AS business_name, b.owner_id AS business_owner_id
    FROM flagged_reviews f
    JOIN reviews r ON r.id = f.review_id
    JOIN businesses b ON b.id = r.business_id
"#;

/// Repository for moderation cases.
#[derive(Clone)]
pub struct FlaggedReviewRepository {
    pool: PgPool,
}

impl FlaggedReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Files a pending case. A repeat flag by the same user violates
    /// `flagged_reviews_review_flagger_unique`.
    pub async fn create(
        &self,
        review_id: Uuid,
        flagger_id: Uuid,
        reason: &str,
        filed_at: DateTime<Utc>,
    ) -> Result<FlaggedReviewEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_flagged_review");
        let result = sqlx::query_as::<_, FlaggedReviewEntity>(&format!(
            r#"
            INSERT INTO flagged_reviews (review_id, flagger_id, reason, filed_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(review_id)
        .bind(flagger_id)
        .bind(reason)
        .bind(filed_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<FlaggedReviewEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_flagged_review_by_id");
        let result = sqlx::query_as::<_, FlaggedReviewEntity>(&format!(
            "SELECT {CASE_COLUMNS} FROM flagged_reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// The case together with its review and the owning business.
    pub async fn find_with_context(
        &self,
        id: Uuid,
    ) -> Result<Option<FlaggedReviewContextEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_flagged_review_with_context");
        let result = sqlx::query_as::<_, FlaggedReviewContextEntity>(&format!(
            "{CONTEXT_SELECT} WHERE f.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn exists_for(&self, review_id: Uuid, flagger_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("flagged_review_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM flagged_reviews WHERE review_id = $1 AND flagger_id = $2)",
        )
        .bind(review_id)
        .bind(flagger_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Cases awaiting a first decision, oldest first.
    pub async fn list_pending(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FlaggedReviewContextEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pending_flagged_reviews");
        let result = sqlx::query_as::<_, FlaggedReviewContextEntity>(&format!(
            "{CONTEXT_SELECT} WHERE f.admin_decision = 'pending' \
             ORDER BY f.filed_at ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_pending(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_pending_flagged_reviews");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM flagged_reviews WHERE admin_decision = 'pending'",
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Cases with an appeal awaiting resolution, oldest appeal first.
    pub async fn list_pending_appeals(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FlaggedReviewContextEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pending_appeals");
        let result = sqlx::query_as::<_, FlaggedReviewContextEntity>(&format!(
            "{CONTEXT_SELECT} WHERE f.appeal_decision = 'pending' \
             ORDER BY f.appeal_filed_at ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_pending_appeals(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_pending_appeals");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM flagged_reviews WHERE appeal_decision = 'pending'",
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Every case raised against reviews of businesses the user owns.
    pub async fn list_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<FlaggedReviewContextEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_flagged_reviews_for_owner");
        let result = sqlx::query_as::<_, FlaggedReviewContextEntity>(&format!(
            "{CONTEXT_SELECT} WHERE b.owner_id = $1 ORDER BY f.filed_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Records the first decision and the review's new visibility atomically.
    ///
    /// Returns `None`, with nothing written, when the case is no longer pending.
    pub async fn record_decision(
        &self,
        id: Uuid,
        decision: ModerationDecisionDb,
        notes: &str,
        review_visible: bool,
        decided_at: DateTime<Utc>,
    ) -> Result<Option<FlaggedReviewEntity>, sqlx::Error> {
        let timer = QueryTimer::new("record_flag_decision");
        let result = async {
            let mut tx = self.pool.begin().await?;

            let updated = sqlx::query_as::<_, FlaggedReviewEntity>(&format!(
                r#"
                UPDATE flagged_reviews
                SET admin_decision = $2, admin_notes = $3, decided_at = $4
                WHERE id = $1 AND admin_decision = 'pending'
                RETURNING {CASE_COLUMNS}
                "#
            ))
            .bind(id)
            .bind(decision)
            .bind(notes)
            .bind(decided_at)
            .fetch_optional(&mut *tx)
            .await?;

            finish_with_visibility(tx, updated, review_visible).await
        }
        .await;
        timer.record();
        result
    }

    /// Files an appeal. Only a denied case without an appeal matches.
    pub async fn record_appeal(
        &self,
        id: Uuid,
        reason: &str,
        filed_at: DateTime<Utc>,
    ) -> Result<Option<FlaggedReviewEntity>, sqlx::Error> {
        let timer = QueryTimer::new("record_appeal");
        let result = sqlx::query_as::<_, FlaggedReviewEntity>(&format!(
            r#"
            UPDATE flagged_reviews
            SET appeal_reason = $2, appeal_filed_at = $3, appeal_decision = 'pending'
            WHERE id = $1 AND admin_decision = 'deny' AND appeal_decision IS NULL
            RETURNING {CASE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(reason)
        .bind(filed_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Resolves a pending appeal and sets the review's visibility atomically.
    ///
    /// Returns `None`, with nothing written, when no appeal is pending.
    pub async fn record_appeal_resolution(
        &self,
        id: Uuid,
        decision: ModerationDecisionDb,
        notes: &str,
        review_visible: bool,
        resolved_at: DateTime<Utc>,
    ) -> Result<Option<FlaggedReviewEntity>, sqlx::Error> {
        let timer = QueryTimer::new("record_appeal_resolution");
        let result = async {
            let mut tx = self.pool.begin().await?;

            let updated = sqlx::query_as::<_, FlaggedReviewEntity>(&format!(
                r#"
                UPDATE flagged_reviews
                SET appeal_decision = $2, admin_notes = $3, appeal_resolved_at = $4
                WHERE id = $1 AND appeal_decision = 'pending'
                RETURNING {CASE_COLUMNS}
                "#
            ))
            .bind(id)
            .bind(decision)
            .bind(notes)
            .bind(resolved_at)
            .fetch_optional(&mut *tx)
            .await?;

            finish_with_visibility(tx, updated, review_visible).await
        }
        .await;
        timer.record();
        result
    }
}

/// Writes the review visibility for an updated case and commits, or rolls
/// back when the guarded update matched nothing.
async fn finish_with_visibility(
    mut tx: Transaction<'_, Postgres>,
    updated: Option<FlaggedReviewEntity>,
    review_visible: bool,
) -> Result<Option<FlaggedReviewEntity>, sqlx::Error> {
    let Some(case) = updated else {
        tx.rollback().await?;
        return Ok(None);
    };

    let rows = sqlx::query("UPDATE reviews SET is_visible = $2 WHERE id = $1")
        .bind(case.review_id)
        .bind(review_visible)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if rows == 0 {
        // review deleted underneath us; the cascade will take the case too
        tx.rollback().await?;
        return Err(sqlx::Error::RowNotFound);
    }

    tx.commit().await?;
    Ok(Some(case))
}
