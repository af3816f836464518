//! Flagged review entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::services::moderation::{Decision, FlaggedCase};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for moderation decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "moderation_decision", rename_all = "lowercase")]
pub enum ModerationDecisionDb {
    Pending,
    Approve,
    Deny,
}

impl From<ModerationDecisionDb> for Decision {
    fn from(db: ModerationDecisionDb) -> Self {
        match db {
            ModerationDecisionDb::Pending => Decision::Pending,
            ModerationDecisionDb::Approve => Decision::Approve,
            ModerationDecisionDb::Deny => Decision::Deny,
        }
    }
}

impl From<Decision> for ModerationDecisionDb {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Pending => ModerationDecisionDb::Pending,
            Decision::Approve => ModerationDecisionDb::Approve,
            Decision::Deny => ModerationDecisionDb::Deny,
        }
    }
}

/// Database row mapping for the flagged_reviews table.
#[derive(Debug, Clone, FromRow)]
pub struct FlaggedReviewEntity {
    pub id: Uuid,
    pub review_id: Uuid,
    pub flagger_id: Uuid,
    pub reason: String,
    pub filed_at: DateTime<Utc>,
    pub admin_decision: ModerationDecisionDb,
    pub admin_notes: Option<String>,
    pub appeal_reason: Option<String>,
    pub appeal_filed_at: Option<DateTime<Utc>>,
    pub appeal_decision: Option<ModerationDecisionDb>,
    pub decided_at: Option<DateTime<Utc>>,
    pub appeal_resolved_at: Option<DateTime<Utc>>,
}

impl From<FlaggedReviewEntity> for FlaggedCase {
    fn from(entity: FlaggedReviewEntity) -> Self {
        Self {
            id: entity.id,
            review_id: entity.review_id,
            flagger_id: entity.flagger_id,
            reason: entity.reason,
            filed_at: entity.filed_at,
            admin_decision: entity.admin_decision.into(),
            admin_notes: entity.admin_notes,
            appeal_reason: entity.appeal_reason,
            appeal_filed_at: entity.appeal_filed_at,
            appeal_decision: entity.appeal_decision.map(Into::into),
            decided_at: entity.decided_at,
            appeal_resolved_at: entity.appeal_resolved_at,
        }
    }
}

/// A case joined with its review and the business that review belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct FlaggedReviewContextEntity {
    pub id: Uuid,
    pub review_id: Uuid,
    pub flagger_id: Uuid,
    pub reason: String,
    pub filed_at: DateTime<Utc>,
    pub admin_decision: ModerationDecisionDb,
    pub admin_notes: Option<String>,
    pub appeal_reason: Option<String>,
    pub appeal_filed_at: Option<DateTime<Utc>>,
    pub appeal_decision: Option<ModerationDecisionDb>,
    pub decided_at: Option<DateTime<Utc>>,
    pub appeal_resolved_at: Option<DateTime<Utc>>,
    pub review_author_id: Uuid,
    pub review_content: String,
    pub review_rating: i16,
    pub review_is_visible: bool,
    pub business_id: Uuid,
    pub business_name: String,
    pub business_owner_id: Uuid,
}

impl FlaggedReviewContextEntity {
    pub fn case(&self) -> FlaggedCase {
        FlaggedCase {
            id: self.id,
            review_id: self.review_id,
            flagger_id: self.flagger_id,
            reason: self.reason.clone(),
            filed_at: self.filed_at,
            admin_decision: self.admin_decision.into(),
            admin_notes: self.admin_notes.clone(),
            appeal_reason: self.appeal_reason.clone(),
            appeal_filed_at: self.appeal_filed_at,
            appeal_decision: self.appeal_decision.map(Into::into),
            decided_at: self.decided_at,
            appeal_resolved_at: self.appeal_resolved_at,
        }
    }
}

impl From<FlaggedReviewContextEntity> for domain::models::moderation::FlaggedCaseItem {
    fn from(entity: FlaggedReviewContextEntity) -> Self {
        let case = entity.case();
        Self {
            state: case.state(),
            review: domain::models::moderation::CaseReviewInfo {
                id: entity.review_id,
                author_id: entity.review_author_id,
                content: entity.review_content,
                rating: entity.review_rating,
                is_visible: entity.review_is_visible,
            },
            business: domain::models::moderation::CaseBusinessInfo {
                id: entity.business_id,
                name: entity.business_name,
                owner_id: entity.business_owner_id,
            },
            case,
        }
    }
}
