//! Flag, decision and appeal orchestration.
//!
//! Rules live in [`domain::services::moderation`]; this service loads the
//! records a rule needs, applies it with the caller's id passed in explicitly,
//! and persists the outcome through the repository's guarded writes.

use chrono::Utc;
use domain::models::moderation::{FlaggedCaseItem, MyCasesResponse};
use domain::models::{ListQuery, Paged};
use domain::services::moderation::{authorize_flag, FlaggedCase, ModerationError, Verdict};
use persistence::repositories::{BusinessRepository, FlaggedReviewRepository, ReviewRepository};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::metrics::record_moderation_event;

#[derive(Debug, Error)]
pub enum ModerationServiceError {
    #[error("Review not found")]
    ReviewNotFound,

    #[error("Flagged review case not found")]
    CaseNotFound,

    #[error(transparent)]
    Rule(#[from] ModerationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ModerationServiceError> for ApiError {
    fn from(err: ModerationServiceError) -> Self {
        match err {
            ModerationServiceError::ReviewNotFound | ModerationServiceError::CaseNotFound => {
                ApiError::NotFound(err.to_string())
            }
            ModerationServiceError::Rule(rule) => rule.into(),
            ModerationServiceError::Database(e) => e.into(),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// `subject_id` is the case, or the review when no case exists yet.
fn rejected(
    kind: &'static str,
    subject_id: Uuid,
    actor_id: Uuid,
    err: ModerationError,
) -> ModerationServiceError {
    tracing::warn!(%subject_id, %actor_id, kind, reason = %err, "Moderation action rejected");
    record_moderation_event(kind, "rejected");
    err.into()
}

#[derive(Clone)]
pub struct ModerationService {
    flags: FlaggedReviewRepository,
    reviews: ReviewRepository,
    businesses: BusinessRepository,
}

impl ModerationService {
    pub fn new(
        flags: FlaggedReviewRepository,
        reviews: ReviewRepository,
        businesses: BusinessRepository,
    ) -> Self {
        Self {
            flags,
            reviews,
            businesses,
        }
    }

    /// The owner of the reviewed business flags a review.
    pub async fn submit_flag(
        &self,
        review_id: Uuid,
        flagger_id: Uuid,
        reason: &str,
    ) -> Result<FlaggedCase, ModerationServiceError> {
        let review = self
            .reviews
            .find_by_id(review_id)
            .await?
            .ok_or(ModerationServiceError::ReviewNotFound)?;
        let business = self
            .businesses
            .find_by_id(review.business_id)
            .await?
            .ok_or(ModerationServiceError::ReviewNotFound)?;

        let already_flagged = self.flags.exists_for(review_id, flagger_id).await?;
        let reason = authorize_flag(flagger_id, business.owner_id, already_flagged, reason)
            .map_err(|e| rejected("flag", review_id, flagger_id, e))?;

        let case: FlaggedCase = match self
            .flags
            .create(review_id, flagger_id, &reason, Utc::now())
            .await
        {
            Ok(entity) => entity.into(),
            Err(e) if is_unique_violation(&e) => {
                return Err(rejected(
                    "flag",
                    review_id,
                    flagger_id,
                    ModerationError::AlreadyFlagged,
                ))
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            case_id = %case.id,
            %review_id,
            %flagger_id,
            "Review flagged"
        );
        record_moderation_event("flag", "accepted");
        Ok(case)
    }

    /// An admin's first decision on a pending case.
    pub async fn decide(
        &self,
        case_id: Uuid,
        admin_id: Uuid,
        verdict: Verdict,
        notes: &str,
    ) -> Result<FlaggedCase, ModerationServiceError> {
        let case = self.load_case(case_id).await?;
        let transition = case
            .decide(verdict, notes, Utc::now())
            .map_err(|e| rejected("decision", case_id, admin_id, e))?;

        let saved = self
            .flags
            .record_decision(
                case_id,
                transition.case.admin_decision.into(),
                transition.case.admin_notes.as_deref().unwrap_or_default(),
                transition.review_visible,
                transition.case.decided_at.unwrap_or_else(Utc::now),
            )
            .await?
            .ok_or_else(|| {
                rejected("decision", case_id, admin_id, ModerationError::AlreadyResolved)
            })?;

        tracing::info!(
            %case_id,
            %admin_id,
            decision = %verdict,
            review_visible = transition.review_visible,
            "Flag decided"
        );
        record_moderation_event("decision", verdict.as_decision().as_str());
        Ok(saved.into())
    }

    /// The business owner appeals a `deny` decision.
    pub async fn file_appeal(
        &self,
        case_id: Uuid,
        requester_id: Uuid,
        reason: &str,
    ) -> Result<FlaggedCase, ModerationServiceError> {
        let context = self
            .flags
            .find_with_context(case_id)
            .await?
            .ok_or(ModerationServiceError::CaseNotFound)?;

        let appealed = context
            .case()
            .file_appeal(requester_id, context.business_owner_id, reason, Utc::now())
            .map_err(|e| rejected("appeal", case_id, requester_id, e))?;

        let saved = self
            .flags
            .record_appeal(
                case_id,
                appealed.appeal_reason.as_deref().unwrap_or_default(),
                appealed.appeal_filed_at.unwrap_or_else(Utc::now),
            )
            .await?
            .ok_or_else(|| {
                rejected("appeal", case_id, requester_id, ModerationError::AlreadyAppealed)
            })?;

        tracing::info!(%case_id, %requester_id, "Appeal filed");
        record_moderation_event("appeal", "accepted");
        Ok(saved.into())
    }

    /// An admin resolves a pending appeal.
    pub async fn resolve_appeal(
        &self,
        case_id: Uuid,
        admin_id: Uuid,
        verdict: Verdict,
        notes: &str,
    ) -> Result<FlaggedCase, ModerationServiceError> {
        let case = self.load_case(case_id).await?;
        let transition = case
            .resolve_appeal(verdict, notes, Utc::now())
            .map_err(|e| rejected("appeal_decision", case_id, admin_id, e))?;

        let saved = self
            .flags
            .record_appeal_resolution(
                case_id,
                verdict.as_decision().into(),
                transition.case.admin_notes.as_deref().unwrap_or_default(),
                transition.review_visible,
                transition.case.appeal_resolved_at.unwrap_or_else(Utc::now),
            )
            .await?
            .ok_or_else(|| {
                rejected(
                    "appeal_decision",
                    case_id,
                    admin_id,
                    ModerationError::AppealNotPending,
                )
            })?;

        tracing::info!(
            %case_id,
            %admin_id,
            decision = %verdict,
            review_visible = transition.review_visible,
            "Appeal resolved"
        );
        record_moderation_event("appeal_decision", verdict.as_decision().as_str());
        Ok(saved.into())
    }

    pub async fn case_details(
        &self,
        case_id: Uuid,
    ) -> Result<FlaggedCaseItem, ModerationServiceError> {
        self.flags
            .find_with_context(case_id)
            .await?
            .map(Into::into)
            .ok_or(ModerationServiceError::CaseNotFound)
    }

    /// Cases awaiting a first decision, oldest first.
    pub async fn list_pending(
        &self,
        query: &ListQuery,
    ) -> Result<Paged<FlaggedCaseItem>, ModerationServiceError> {
        let rows = self
            .flags
            .list_pending(query.limit(), query.offset())
            .await?;
        let total = self.flags.count_pending().await?;
        Ok(Paged {
            data: rows.into_iter().map(Into::into).collect(),
            pagination: query.pagination(total),
        })
    }

    /// Cases whose appeal awaits resolution, oldest appeal first.
    pub async fn list_pending_appeals(
        &self,
        query: &ListQuery,
    ) -> Result<Paged<FlaggedCaseItem>, ModerationServiceError> {
        let rows = self
            .flags
            .list_pending_appeals(query.limit(), query.offset())
            .await?;
        let total = self.flags.count_pending_appeals().await?;
        Ok(Paged {
            data: rows.into_iter().map(Into::into).collect(),
            pagination: query.pagination(total),
        })
    }

    /// Every case against reviews of businesses `owner_id` owns.
    pub async fn cases_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<MyCasesResponse, ModerationServiceError> {
        let rows = self.flags.list_for_owner(owner_id).await?;
        Ok(MyCasesResponse::from_items(
            rows.into_iter().map(Into::into).collect(),
        ))
    }

    async fn load_case(&self, case_id: Uuid) -> Result<FlaggedCase, ModerationServiceError> {
        self.flags
            .find_by_id(case_id)
            .await?
            .map(Into::into)
            .ok_or(ModerationServiceError::CaseNotFound)
    }
}
