//! Request and response shapes for flagged reviews and appeals.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::moderation::{CaseState, FlaggedCase, ModerationError, OwnerBucket, Verdict};

/// Body of `POST /reviews/:id/flags`.
#[derive(Debug, Clone, Deserialize)]
pub struct FlagReviewRequest {
    pub reason: String,
}

/// Body of `POST /cases/:id/appeal`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppealRequest {
    pub reason: String,
}

/// Admin verdict on a case or on its appeal.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub decision: String,
    pub notes: String,
}

impl DecisionRequest {
    pub fn verdict(&self) -> Result<Verdict, ModerationError> {
        self.decision.trim().parse()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FlaggedCaseResponse {
    #[serde(flatten)]
    pub case: FlaggedCase,
    pub state: CaseState,
}

impl From<FlaggedCase> for FlaggedCaseResponse {
    fn from(case: FlaggedCase) -> Self {
        let state = case.state();
        Self { case, state }
    }
}

/// The flagged review as seen from a case.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CaseReviewInfo {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub rating: i16,
    pub is_visible: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CaseBusinessInfo {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
}

/// A case with the review and business it concerns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FlaggedCaseItem {
    #[serde(flatten)]
    pub case: FlaggedCase,
    pub state: CaseState,
    pub review: CaseReviewInfo,
    pub business: CaseBusinessInfo,
}

/// A business owner's cases, split the way the owner overview shows them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MyCasesResponse {
    pub pending: Vec<FlaggedCaseItem>,
    pub resolved: Vec<FlaggedCaseItem>,
    pub appeals: Vec<FlaggedCaseItem>,
}

impl MyCasesResponse {
    pub fn from_items(items: Vec<FlaggedCaseItem>) -> Self {
        let mut response = Self::default();
        for item in items {
            match item.case.owner_bucket() {
                OwnerBucket::Pending => response.pending.push(item),
                OwnerBucket::Resolved => response.resolved.push(item),
                OwnerBucket::Appeal => response.appeals.push(item),
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(case: FlaggedCase) -> FlaggedCaseItem {
        FlaggedCaseItem {
            state: case.state(),
            review: CaseReviewInfo {
                id: case.review_id,
                author_id: Uuid::new_v4(),
                content: "Terrible".to_string(),
                rating: 1,
                is_visible: true,
            },
            business: CaseBusinessInfo {
                id: Uuid::new_v4(),
                name: "Corner Bakery".to_string(),
                owner_id: case.flagger_id,
            },
            case,
        }
    }

    #[test]
    fn test_decision_request_deserialize() {
        let req: DecisionRequest =
            serde_json::from_str(r#"{"decision":"approve","notes":"confirmed fake"}"#).unwrap();
        assert_eq!(req.verdict().unwrap(), Verdict::Approve);

        let req: DecisionRequest =
            serde_json::from_str(r#"{"decision":"maybe","notes":"x"}"#).unwrap();
        assert!(matches!(req.verdict(), Err(ModerationError::Validation(_))));

        let req: DecisionRequest =
            serde_json::from_str(r#"{"decision":"pending","notes":"x"}"#).unwrap();
        assert!(req.verdict().is_err());
    }

    #[test]
    fn test_case_response_flattens_state() {
        let case = FlaggedCase::open(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Fake review".into(),
            Utc::now(),
        );
        let json = serde_json::to_value(FlaggedCaseResponse::from(case)).unwrap();
        assert_eq!(json["admin_decision"], "pending");
        assert_eq!(json["state"], "pending");
        assert!(json["appeal_decision"].is_null());
    }

    #[test]
    fn test_my_cases_grouping() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let pending = FlaggedCase::open(Uuid::new_v4(), owner, "Fake review, paid".into(), now);
        let approved = pending
            .decide(Verdict::Approve, "confirmed", now)
            .unwrap()
            .case;
        let denied = FlaggedCase::open(Uuid::new_v4(), owner, "Fake review, paid".into(), now)
            .decide(Verdict::Deny, "genuine", now)
            .unwrap()
            .case;
        let appealed = denied
            .file_appeal(owner, owner, "Please look again", now)
            .unwrap();

        let response = MyCasesResponse::from_items(vec![
            item(pending),
            item(approved),
            item(denied),
            item(appealed),
        ]);
        assert_eq!(response.pending.len(), 1);
        assert_eq!(response.resolved.len(), 2);
        assert_eq!(response.appeals.len(), 1);
    }
}
