//! Admin dashboard models.

use serde::{Deserialize, Serialize};

/// Site-wide counters shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardStats {
    pub users: i64,
    pub businesses: i64,
    pub reviews: i64,
    pub pending_flags: i64,
    pub pending_appeals: i64,
}
