//! Site-wide counters for the admin dashboard.

use sqlx::{FromRow, PgPool};

use crate::metrics::QueryTimer;

#[derive(Debug, Clone, FromRow)]
pub struct AdminStatsEntity {
    pub users: i64,
    pub businesses: i64,
    pub reviews: i64,
    pub pending_flags: i64,
    pub pending_appeals: i64,
}

impl From<AdminStatsEntity> for domain::models::DashboardStats {
    fn from(entity: AdminStatsEntity) -> Self {
        Self {
            users: entity.users,
            businesses: entity.businesses,
            reviews: entity.reviews,
            pending_flags: entity.pending_flags,
            pending_appeals: entity.pending_appeals,
        }
    }
}

#[derive(Clone)]
pub struct AdminStatsRepository {
    pool: PgPool,
}

impl AdminStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn dashboard(&self) -> Result<AdminStatsEntity, sqlx::Error> {
        let timer = QueryTimer::new("admin_dashboard_stats");
        let result = sqlx::query_as::<_, AdminStatsEntity>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM businesses) AS businesses,
                (SELECT COUNT(*) FROM reviews) AS reviews,
                (SELECT COUNT(*) FROM flagged_reviews
                 WHERE admin_decision = 'pending') AS pending_flags,
                (SELECT COUNT(*) FROM flagged_reviews
                 WHERE appeal_decision = 'pending') AS pending_appeals
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
