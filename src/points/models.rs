//! Point award models and the shared rank-to-points table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bracket::{EventId, TeamId};

/// Award ID type
pub type AwardId = i64;

/// How an award came to be.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AwardCategory {
    /// Derived from event standings at finalize time. Never reviewed;
    /// recomputation replaces the full set for the event.
    Event,
    /// Manually entered bonus, reviewed by an operator.
    Bonus,
    /// Manually entered penalty, reviewed by an operator.
    Penalty,
}

impl AwardCategory {
    pub fn is_manual(&self) -> bool {
        matches!(self, AwardCategory::Bonus | AwardCategory::Penalty)
    }
}

impl fmt::Display for AwardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AwardCategory::Event => write!(f, "event"),
            AwardCategory::Bonus => write!(f, "bonus"),
            AwardCategory::Penalty => write!(f, "penalty"),
        }
    }
}

/// Review lifecycle of manually entered awards. Derived awards skip review
/// and are created approved.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AwardStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for AwardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AwardStatus::Pending => write!(f, "pending"),
            AwardStatus::Approved => write!(f, "approved"),
            AwardStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Points awarded to one team for one event.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PointsAward {
    /// Assigned by the store on insert.
    pub id: AwardId,
    pub event_id: EventId,
    pub team_id: TeamId,
    pub category: AwardCategory,
    pub value: i32,
    pub status: AwardStatus,
    pub created_at: DateTime<Utc>,
}

impl PointsAward {
    /// A derived award, created approved.
    pub fn derived(event_id: EventId, team_id: TeamId, value: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            event_id,
            team_id,
            category: AwardCategory::Event,
            value,
            status: AwardStatus::Approved,
            created_at: now,
        }
    }

    /// A manual award, created pending review.
    pub fn manual(
        event_id: EventId,
        team_id: TeamId,
        category: AwardCategory,
        value: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            event_id,
            team_id,
            category,
            value,
            status: AwardStatus::Pending,
            created_at: now,
        }
    }
}

/// Shared rank-to-points configuration consumed by every format's finalize
/// path. Ranks beyond the table earn zero.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PointsTable {
    values: Vec<i32>,
}

impl PointsTable {
    /// The standard descending table.
    pub fn standard() -> Self {
        Self {
            values: vec![15, 12, 10, 8, 7, 6, 5, 4, 3, 2, 1, 0],
        }
    }

    /// A custom table; values are expected in rank order.
    pub fn custom(values: Vec<i32>) -> Self {
        Self { values }
    }

    /// Points for a 1-based rank.
    pub fn value_for_rank(&self, rank: u32) -> i32 {
        if rank == 0 {
            return 0;
        }
        self.values.get(rank as usize - 1).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for PointsTable {
    fn default() -> Self {
        Self::standard()
    }
}
