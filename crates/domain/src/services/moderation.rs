//! Moderation workflow for flagged reviews.
//!
//! A case moves through these states:
//!
//! ```text
//! pending --decide(approve)--> resolved_hidden
//! pending --decide(deny)-----> resolved_visible
//! resolved_visible --file_appeal--> appeal_pending
//! appeal_pending --resolve_appeal(approve)--> appeal_resolved_hidden
//! appeal_pending --resolve_appeal(deny)-----> appeal_resolved_visible
//! ```
//!
//! `approve` upholds the flag and hides the review; `deny` rejects the flag
//! and shows it again. Only a `deny` outcome is open to appeal, and only the
//! owner of the reviewed business may file it.
//!
//! Everything here is pure: callers load the case, ask for a transition and
//! persist the returned case together with the review visibility it carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Shortest accepted flag or appeal reason, in characters after trimming.
pub const REASON_MIN_CHARS: usize = 10;
/// Longest accepted flag or appeal reason, in characters after trimming.
pub const REASON_MAX_CHARS: usize = 500;

/// Stored value of `admin_decision` and `appeal_decision`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Pending,
    Approve,
    Deny,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Pending => "pending",
            Decision::Approve => "approve",
            Decision::Deny => "deny",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Decision::Pending),
            "approve" => Ok(Decision::Approve),
            "deny" => Ok(Decision::Deny),
            _ => Err(format!("Invalid decision: {}", s)),
        }
    }
}

/// A verdict an admin can record. `pending` is not a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approve,
    Deny,
}

impl Verdict {
    /// Visibility the reviewed review gets once this verdict is applied.
    pub fn review_visible(self) -> bool {
        match self {
            Verdict::Approve => false,
            Verdict::Deny => true,
        }
    }

    pub fn as_decision(self) -> Decision {
        match self {
            Verdict::Approve => Decision::Approve,
            Verdict::Deny => Decision::Deny,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_decision().as_str())
    }
}

impl FromStr for Verdict {
    type Err = ModerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Verdict::Approve),
            "deny" => Ok(Verdict::Deny),
            _ => Err(ModerationError::Validation(
                "Decision must be 'approve' or 'deny'".to_string(),
            )),
        }
    }
}

/// Where a case sits in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseState {
    Pending,
    ResolvedHidden,
    ResolvedVisible,
    AppealPending,
    AppealResolvedHidden,
    AppealResolvedVisible,
}

impl CaseState {
    /// Visibility the case has imposed on its review, `None` while undecided.
    pub fn review_visibility(self) -> Option<bool> {
        match self {
            CaseState::Pending => None,
            CaseState::ResolvedHidden | CaseState::AppealResolvedHidden => Some(false),
            CaseState::ResolvedVisible
            | CaseState::AppealPending
            | CaseState::AppealResolvedVisible => Some(true),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CaseState::ResolvedHidden
                | CaseState::AppealResolvedHidden
                | CaseState::AppealResolvedVisible
        )
    }
}

/// Grouping used on the business owner's case overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerBucket {
    Pending,
    Resolved,
    Appeal,
}

/// Rule violations of the moderation workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModerationError {
    #[error("Only the owner of the reviewed business can flag this review")]
    NotAuthorized,

    #[error("You have already flagged this review")]
    AlreadyFlagged,

    #[error("This case has already been resolved")]
    AlreadyResolved,

    #[error("This case is not eligible for appeal")]
    NotEligible,

    #[error("An appeal has already been filed for this case")]
    AlreadyAppealed,

    #[error("This case has no pending appeal")]
    AppealNotPending,

    #[error("{0}")]
    Validation(String),
}

/// One flag raised against a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FlaggedCase {
    pub id: Uuid,
    pub review_id: Uuid,
    pub flagger_id: Uuid,
    pub reason: String,
    pub filed_at: DateTime<Utc>,
    pub admin_decision: Decision,
    pub admin_notes: Option<String>,
    pub appeal_reason: Option<String>,
    pub appeal_filed_at: Option<DateTime<Utc>>,
    pub appeal_decision: Option<Decision>,
    pub decided_at: Option<DateTime<Utc>>,
    pub appeal_resolved_at: Option<DateTime<Utc>>,
}

/// Result of a decision: the updated case and the visibility to write to its review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub case: FlaggedCase,
    pub review_visible: bool,
}

/// Trims and length-checks a flag or appeal reason.
pub fn validate_reason(reason: &str) -> Result<String, ModerationError> {
    let trimmed = reason.trim();
    let len = trimmed.chars().count();
    if !(REASON_MIN_CHARS..=REASON_MAX_CHARS).contains(&len) {
        return Err(ModerationError::Validation(format!(
            "Reason must be between {} and {} characters",
            REASON_MIN_CHARS, REASON_MAX_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_notes(notes: &str) -> Result<String, ModerationError> {
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Err(ModerationError::Validation(
            "Notes are required when recording a decision".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Checks whether `flagger_id` may flag a review of a business owned by
/// `business_owner_id`. Returns the trimmed reason on success.
pub fn authorize_flag(
    flagger_id: Uuid,
    business_owner_id: Uuid,
    already_flagged: bool,
    reason: &str,
) -> Result<String, ModerationError> {
    if flagger_id != business_owner_id {
        return Err(ModerationError::NotAuthorized);
    }
    if already_flagged {
        return Err(ModerationError::AlreadyFlagged);
    }
    validate_reason(reason)
}

impl FlaggedCase {
    /// A freshly filed case awaiting an admin decision.
    pub fn open(review_id: Uuid, flagger_id: Uuid, reason: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            review_id,
            flagger_id,
            reason,
            filed_at: now,
            admin_decision: Decision::Pending,
            admin_notes: None,
            appeal_reason: None,
            appeal_filed_at: None,
            appeal_decision: None,
            decided_at: None,
            appeal_resolved_at: None,
        }
    }

    pub fn state(&self) -> CaseState {
        match (self.admin_decision, self.appeal_decision) {
            (Decision::Pending, _) => CaseState::Pending,
            (Decision::Approve, _) => CaseState::ResolvedHidden,
            (Decision::Deny, None) => CaseState::ResolvedVisible,
            (Decision::Deny, Some(Decision::Pending)) => CaseState::AppealPending,
            (Decision::Deny, Some(Decision::Approve)) => CaseState::AppealResolvedHidden,
            (Decision::Deny, Some(Decision::Deny)) => CaseState::AppealResolvedVisible,
        }
    }

    pub fn owner_bucket(&self) -> OwnerBucket {
        if self.appeal_reason.is_some() {
            OwnerBucket::Appeal
        } else if self.admin_decision == Decision::Pending {
            OwnerBucket::Pending
        } else {
            OwnerBucket::Resolved
        }
    }

    /// Records the admin's first decision on a pending case.
    pub fn decide(
        &self,
        verdict: Verdict,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Transition, ModerationError> {
        if self.admin_decision != Decision::Pending {
            return Err(ModerationError::AlreadyResolved);
        }
        let notes = validate_notes(notes)?;

        let mut case = self.clone();
        case.admin_decision = verdict.as_decision();
        case.admin_notes = Some(notes);
        case.decided_at = Some(now);

        Ok(Transition {
            case,
            review_visible: verdict.review_visible(),
        })
    }

    /// Files the business owner's appeal against a `deny` decision.
    ///
    /// Visibility is not touched until the appeal is resolved.
    pub fn file_appeal(
        &self,
        requester_id: Uuid,
        business_owner_id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<FlaggedCase, ModerationError> {
        if requester_id != business_owner_id || self.admin_decision != Decision::Deny {
            return Err(ModerationError::NotEligible);
        }
        if self.appeal_decision.is_some() || self.appeal_reason.is_some() {
            return Err(ModerationError::AlreadyAppealed);
        }
        let reason = validate_reason(reason)?;

        let mut case = self.clone();
        case.appeal_reason = Some(reason);
        case.appeal_filed_at = Some(now);
        case.appeal_decision = Some(Decision::Pending);
        Ok(case)
    }

    /// Resolves a pending appeal. Uses the same visibility mapping as [`decide`](Self::decide).
    pub fn resolve_appeal(
        &self,
        verdict: Verdict,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Transition, ModerationError> {
        if self.appeal_decision != Some(Decision::Pending) {
            return Err(ModerationError::AppealNotPending);
        }
        let notes = validate_notes(notes)?;

        let mut case = self.clone();
        case.appeal_decision = Some(verdict.as_decision());
        case.admin_notes = Some(notes);
        case.appeal_resolved_at = Some(now);

        Ok(Transition {
            case,
            review_visible: verdict.review_visible(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_case(owner: Uuid) -> FlaggedCase {
        FlaggedCase::open(Uuid::new_v4(), owner, "Fake review, paid".to_string(), Utc::now())
    }

    fn denied_case(owner: Uuid) -> FlaggedCase {
        pending_case(owner)
            .decide(Verdict::Deny, "looks genuine", Utc::now())
            .unwrap()
            .case
    }

    #[test]
    fn test_decision_round_trip_str() {
        for d in [Decision::Pending, Decision::Approve, Decision::Deny] {
            assert_eq!(Decision::from_str(d.as_str()).unwrap(), d);
        }
        assert!(Decision::from_str("approved").is_err());
    }

    #[test]
    fn test_verdict_visibility_mapping() {
        assert!(!Verdict::Approve.review_visible());
        assert!(Verdict::Deny.review_visible());
    }

    #[test]
    fn test_verdict_deserialize() {
        let v: Verdict = serde_json::from_str("\"deny\"").unwrap();
        assert_eq!(v, Verdict::Deny);
        assert!(serde_json::from_str::<Verdict>("\"pending\"").is_err());
    }

    #[test]
    fn test_verdict_from_str() {
        assert_eq!("approve".parse::<Verdict>(), Ok(Verdict::Approve));
        assert_eq!("deny".parse::<Verdict>(), Ok(Verdict::Deny));
        assert!(matches!(
            "maybe".parse::<Verdict>(),
            Err(ModerationError::Validation(_))
        ));
        assert!("pending".parse::<Verdict>().is_err());
    }

    #[test]
    fn test_authorize_flag_owner_only() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        assert_eq!(
            authorize_flag(stranger, owner, false, "Fake review, paid"),
            Err(ModerationError::NotAuthorized)
        );
        assert_eq!(
            authorize_flag(owner, owner, false, "  Fake review, paid  ").unwrap(),
            "Fake review, paid"
        );
    }

    #[test]
    fn test_authorize_flag_error_order() {
        let owner = Uuid::new_v4();
        // authorization is checked before duplicates and input
        assert_eq!(
            authorize_flag(Uuid::new_v4(), owner, true, "short"),
            Err(ModerationError::NotAuthorized)
        );
        assert_eq!(
            authorize_flag(owner, owner, true, "short"),
            Err(ModerationError::AlreadyFlagged)
        );
        assert!(matches!(
            authorize_flag(owner, owner, false, "short"),
            Err(ModerationError::Validation(_))
        ));
    }

    #[test]
    fn test_reason_bounds() {
        assert!(validate_reason(&"a".repeat(9)).is_err());
        assert!(validate_reason(&"a".repeat(10)).is_ok());
        assert!(validate_reason(&"a".repeat(500)).is_ok());
        assert!(validate_reason(&"a".repeat(501)).is_err());
        // padding does not count toward the minimum
        assert!(validate_reason("   abcdefghi   ").is_err());
        // counted in characters, not bytes
        assert!(validate_reason(&"é".repeat(500)).is_ok());
    }

    #[test]
    fn test_new_case_is_pending() {
        let case = pending_case(Uuid::new_v4());
        assert_eq!(case.state(), CaseState::Pending);
        assert_eq!(case.state().review_visibility(), None);
        assert!(case.appeal_decision.is_none());
    }

    #[test]
    fn test_decide_approve_hides_review() {
        let case = pending_case(Uuid::new_v4());
        let t = case.decide(Verdict::Approve, "confirmed fake", Utc::now()).unwrap();

        assert!(!t.review_visible);
        assert_eq!(t.case.admin_decision, Decision::Approve);
        assert_eq!(t.case.admin_notes.as_deref(), Some("confirmed fake"));
        assert!(t.case.decided_at.is_some());
        assert_eq!(t.case.state(), CaseState::ResolvedHidden);
        assert!(t.case.state().is_terminal());
    }

    #[test]
    fn test_decide_deny_keeps_review_visible() {
        let t = pending_case(Uuid::new_v4())
            .decide(Verdict::Deny, "no evidence", Utc::now())
            .unwrap();
        assert!(t.review_visible);
        assert_eq!(t.case.state(), CaseState::ResolvedVisible);
        assert!(!t.case.state().is_terminal());
    }

    #[test]
    fn test_second_decide_rejected() {
        let decided = pending_case(Uuid::new_v4())
            .decide(Verdict::Approve, "confirmed fake", Utc::now())
            .unwrap()
            .case;
        let snapshot = decided.clone();

        assert_eq!(
            decided.decide(Verdict::Deny, "changed my mind", Utc::now()),
            Err(ModerationError::AlreadyResolved)
        );
        assert_eq!(decided, snapshot);
    }

    #[test]
    fn test_decide_requires_notes() {
        let case = pending_case(Uuid::new_v4());
        assert!(matches!(
            case.decide(Verdict::Approve, "   ", Utc::now()),
            Err(ModerationError::Validation(_))
        ));
        assert_eq!(case.admin_decision, Decision::Pending);
    }

    #[test]
    fn test_appeal_after_approve_not_eligible() {
        let owner = Uuid::new_v4();
        let approved = pending_case(owner)
            .decide(Verdict::Approve, "confirmed fake", Utc::now())
            .unwrap()
            .case;
        assert_eq!(
            approved.file_appeal(owner, owner, "Please reconsider this", Utc::now()),
            Err(ModerationError::NotEligible)
        );
    }

    #[test]
    fn test_appeal_on_pending_not_eligible() {
        let owner = Uuid::new_v4();
        assert_eq!(
            pending_case(owner).file_appeal(owner, owner, "Please reconsider this", Utc::now()),
            Err(ModerationError::NotEligible)
        );
    }

    #[test]
    fn test_appeal_by_non_owner_not_eligible() {
        let owner = Uuid::new_v4();
        let case = denied_case(owner);
        assert_eq!(
            case.file_appeal(Uuid::new_v4(), owner, "Please reconsider this", Utc::now()),
            Err(ModerationError::NotEligible)
        );
    }

    #[test]
    fn test_file_appeal_sets_pending() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let appealed = denied_case(owner)
            .file_appeal(owner, owner, "The reviewer never visited", now)
            .unwrap();

        assert_eq!(appealed.appeal_decision, Some(Decision::Pending));
        assert_eq!(appealed.appeal_reason.as_deref(), Some("The reviewer never visited"));
        assert_eq!(appealed.appeal_filed_at, Some(now));
        assert_eq!(appealed.state(), CaseState::AppealPending);
        assert_eq!(appealed.owner_bucket(), OwnerBucket::Appeal);
    }

    #[test]
    fn test_second_appeal_rejected() {
        let owner = Uuid::new_v4();
        let appealed = denied_case(owner)
            .file_appeal(owner, owner, "The reviewer never visited", Utc::now())
            .unwrap();
        assert_eq!(
            appealed.file_appeal(owner, owner, "Another attempt here", Utc::now()),
            Err(ModerationError::AlreadyAppealed)
        );
    }

    #[test]
    fn test_appeal_reason_validated() {
        let owner = Uuid::new_v4();
        assert!(matches!(
            denied_case(owner).file_appeal(owner, owner, "too short", Utc::now()),
            Err(ModerationError::Validation(_))
        ));
    }

    #[test]
    fn test_resolve_appeal_visibility() {
        let owner = Uuid::new_v4();
        let appealed = denied_case(owner)
            .file_appeal(owner, owner, "The reviewer never visited", Utc::now())
            .unwrap();

        let hidden = appealed.resolve_appeal(Verdict::Approve, "upheld", Utc::now()).unwrap();
        assert!(!hidden.review_visible);
        assert_eq!(hidden.case.state(), CaseState::AppealResolvedHidden);
        assert_eq!(hidden.case.admin_notes.as_deref(), Some("upheld"));
        assert_eq!(hidden.case.admin_decision, Decision::Deny);

        let visible = appealed.resolve_appeal(Verdict::Deny, "rejected", Utc::now()).unwrap();
        assert!(visible.review_visible);
        assert_eq!(visible.case.state(), CaseState::AppealResolvedVisible);
    }

    #[test]
    fn test_resolve_appeal_requires_pending_appeal() {
        let owner = Uuid::new_v4();
        assert_eq!(
            denied_case(owner).resolve_appeal(Verdict::Approve, "notes", Utc::now()),
            Err(ModerationError::AppealNotPending)
        );

        let resolved = denied_case(owner)
            .file_appeal(owner, owner, "The reviewer never visited", Utc::now())
            .unwrap()
            .resolve_appeal(Verdict::Deny, "rejected", Utc::now())
            .unwrap()
            .case;
        assert_eq!(
            resolved.resolve_appeal(Verdict::Approve, "again", Utc::now()),
            Err(ModerationError::AppealNotPending)
        );
        assert_eq!(
            resolved.file_appeal(owner, owner, "One more time please", Utc::now()),
            Err(ModerationError::AlreadyAppealed)
        );
    }

    #[test]
    fn test_owner_buckets() {
        let owner = Uuid::new_v4();
        assert_eq!(pending_case(owner).owner_bucket(), OwnerBucket::Pending);
        assert_eq!(denied_case(owner).owner_bucket(), OwnerBucket::Resolved);
        let approved = pending_case(owner)
            .decide(Verdict::Approve, "confirmed", Utc::now())
            .unwrap()
            .case;
        assert_eq!(approved.owner_bucket(), OwnerBucket::Resolved);
    }
}
