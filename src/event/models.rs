//! Event lifecycle models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bracket::{EventId, TeamId};
use crate::errors::{EngineError, EngineResult};
use crate::ranking::TieBreakDecision;

/// Competition format of an event.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum EventFormat {
    /// Timed heats with up to four lanes.
    Heat,
    /// Double-elimination bracket over a pre-seeded graph.
    DoubleElimination,
    /// World Cup: four groups of three feeding a fixed knockout stage.
    GroupKnockout,
    /// Individually scored contest.
    Individual,
}

impl fmt::Display for EventFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventFormat::Heat => write!(f, "heat"),
            EventFormat::DoubleElimination => write!(f, "double_elimination"),
            EventFormat::GroupKnockout => write!(f, "group_knockout"),
            EventFormat::Individual => write!(f, "individual"),
        }
    }
}

/// Event status: a summary of whether standings have been finalized, not of
/// matches in progress.
///
/// Finalize moves SCHEDULED to COMPLETED once, when the stage closes; reset
/// moves it back. No other transition exists.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum EventStatus {
    Scheduled,
    Completed,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStatus::Scheduled => write!(f, "scheduled"),
            EventStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A tournament event.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub format: EventFormat,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Reject mutating operations against a finalized event.
    pub fn ensure_scheduled(&self) -> EngineResult<()> {
        if self.status != EventStatus::Scheduled {
            return Err(EngineError::InvalidEventState {
                event_id: self.id,
                expected: EventStatus::Scheduled,
                actual: self.status,
            });
        }
        Ok(())
    }
}

/// Operator inputs to an event finalize.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct FinalizeCommand {
    /// Group tie-break decisions; only meaningful for World Cup events.
    pub tie_breaks: Vec<TieBreakDecision>,
    /// Teams disqualified from the event; they trail the standings and earn
    /// zero points.
    pub disqualified: Vec<TeamId>,
}
