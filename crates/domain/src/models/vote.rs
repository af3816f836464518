//! Helpful/unhelpful votes on reviews.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Up => "up",
            VoteType::Down => "down",
        }
    }
}

impl FromStr for VoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteType::Up),
            "down" => Ok(VoteType::Down),
            _ => Err(format!("Invalid vote type: {}", s)),
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What casting a vote did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteOutcome {
    Recorded,
    Changed,
    Removed,
}

impl VoteOutcome {
    /// Voting again with the same type withdraws the vote; the other type replaces it.
    pub fn toggle(existing: Option<VoteType>, cast: VoteType) -> Self {
        match existing {
            None => VoteOutcome::Recorded,
            Some(current) if current == cast => VoteOutcome::Removed,
            Some(_) => VoteOutcome::Changed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CastVoteRequest {
    pub vote_type: VoteType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VoteCounts {
    pub up: i64,
    pub down: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteResponse {
    pub outcome: VoteOutcome,
    pub up: i64,
    pub down: i64,
}
