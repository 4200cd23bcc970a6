//! Engine error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bracket::{EventId, GroupName, MatchId, SlotIndex, TeamId};
use crate::event::{EventFormat, EventStatus};
use crate::points::AwardId;

/// Broad error categories surfaced to the request-handling layer.
///
/// The caller maps these to user-facing behavior: `NotReady` and
/// `InvalidState` explain what is missing, the rest are generic rejections.
/// No kind is fatal; every operation is retryable once the underlying
/// condition is fixed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    NotReady,
    InvalidParticipants,
    InvalidState,
    AlreadyExists,
}

/// Errors raised by the progression and standings engine.
///
/// The engine rejects a whole operation rather than applying a partial
/// update, so every variant means nothing was written.
#[derive(Clone, Debug, Deserialize, Error, PartialEq, Serialize)]
pub enum EngineError {
    #[error("event {0} does not exist")]
    EventNotFound(EventId),
    #[error("match {0} does not exist")]
    MatchNotFound(MatchId),
    #[error("award {0} does not exist")]
    AwardNotFound(AwardId),

    #[error("not all heats are completed: {completed} of {total}")]
    HeatsNotCompleted { completed: usize, total: usize },
    #[error("group stage is not finished: {completed} of {total} matches completed")]
    GroupStageNotFinished { completed: usize, total: usize },
    #[error("group {group} is tied with no tie-break decision")]
    GroupUndecided { group: GroupName },
    #[error("expected {expected} group winners, found {found}")]
    IncompleteGroups { expected: usize, found: usize },
    #[error("knockout matches have not been created")]
    KnockoutNotCreated,
    #[error("knockout stage is not finished: {completed} of {total} matches completed")]
    KnockoutNotFinished { completed: usize, total: usize },
    #[error("bracket is not finished: {completed} of {total} matches completed")]
    BracketNotFinished { completed: usize, total: usize },
    #[error("the bracket has no grand final")]
    GrandFinalMissing,

    #[error("team {team_id} is not a participant of match {match_id}")]
    InvalidParticipants { match_id: MatchId, team_id: TeamId },
    #[error("match {0} is missing a participant")]
    MissingParticipant(MatchId),
    #[error("tie-break winner {team_id} is not a member of group {group}")]
    InvalidTieBreak { group: GroupName, team_id: TeamId },

    #[error("event {event_id} is {actual}, expected {expected}")]
    InvalidEventState {
        event_id: EventId,
        expected: EventStatus,
        actual: EventStatus,
    },
    #[error("match {0} is already completed")]
    MatchAlreadyCompleted(MatchId),
    #[error("match {0} is not a head-to-head match")]
    NotHeadToHead(MatchId),
    #[error("match {match_id} has no slot {slot}")]
    SlotOutOfRange { match_id: MatchId, slot: SlotIndex },
    #[error("operation does not apply to a {format} event ({event_id})")]
    UnsupportedFormat {
        event_id: EventId,
        format: EventFormat,
    },
    #[error("award {0} is not reviewable")]
    AwardNotReviewable(AwardId),
    #[error("only bonus and penalty awards can be entered manually")]
    ManualCategoryRequired,

    #[error("knockout matches already exist for event {0}")]
    KnockoutAlreadyCreated(EventId),
}

impl EngineError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EventNotFound(_) | Self::MatchNotFound(_) | Self::AwardNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::HeatsNotCompleted { .. }
            | Self::GroupStageNotFinished { .. }
            | Self::GroupUndecided { .. }
            | Self::IncompleteGroups { .. }
            | Self::KnockoutNotCreated
            | Self::KnockoutNotFinished { .. }
            | Self::BracketNotFinished { .. }
            | Self::GrandFinalMissing => ErrorKind::NotReady,
            Self::InvalidParticipants { .. }
            | Self::MissingParticipant(_)
            | Self::InvalidTieBreak { .. } => ErrorKind::InvalidParticipants,
            Self::InvalidEventState { .. }
            | Self::MatchAlreadyCompleted(_)
            | Self::NotHeadToHead(_)
            | Self::SlotOutOfRange { .. }
            | Self::UnsupportedFormat { .. }
            | Self::AwardNotReviewable(_)
            | Self::ManualCategoryRequired => ErrorKind::InvalidState,
            Self::KnockoutAlreadyCreated(_) => ErrorKind::AlreadyExists,
        }
    }
}

/// Result type for pure engine operations
pub type EngineResult<T> = Result<T, EngineError>;
