//! Match and bracket graph models.
//!
//! A [`Match`] is the generic unit of play covering timed heats,
//! double-elimination matches, group matches, and World Cup knockout
//! matches. Bracket topology is an explicit directed graph: each match
//! carries typed, optional edges ([`SlotRef`]) to the slots its winner and
//! loser move into. The graph is built once at seed time and treated as
//! immutable configuration afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Team ID type
pub type TeamId = i64;

/// Event ID type
pub type EventId = i64;

/// Match ID type
pub type MatchId = i64;

/// Zero-based index of a team slot within a match.
pub type SlotIndex = usize;

/// Maximum number of lanes in a timed heat.
pub const MAX_HEAT_SLOTS: usize = 4;

/// Number of slots in a head-to-head match.
pub const HEAD_TO_HEAD_SLOTS: usize = 2;

/// A competing team. Identity and roster are owned by the surrounding
/// platform and immutable during tournament play.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

/// World Cup group label. The format fixes exactly four groups of three.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum GroupName {
    A,
    B,
    C,
    D,
}

impl GroupName {
    pub const ALL: [GroupName; 4] = [GroupName::A, GroupName::B, GroupName::C, GroupName::D];
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupName::A => write!(f, "A"),
            GroupName::B => write!(f, "B"),
            GroupName::C => write!(f, "C"),
            GroupName::D => write!(f, "D"),
        }
    }
}

/// Named round of the World Cup knockout stage. The two semifinals share a
/// round name and are told apart by their sequence number.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum KnockoutRound {
    Semifinal,
    ThirdPlace,
    Final,
}

impl fmt::Display for KnockoutRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnockoutRound::Semifinal => write!(f, "semifinal"),
            KnockoutRound::ThirdPlace => write!(f, "third_place"),
            KnockoutRound::Final => write!(f, "final"),
        }
    }
}

/// Bracket grouping of a match within its event.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BracketTag {
    /// Timed or individually scored lanes, no head-to-head result.
    Heat,
    /// Winner bracket of a double elimination event.
    Winner,
    /// Loser bracket of a double elimination event.
    Loser,
    /// Grand final of a double elimination event.
    GrandFinal,
    /// Round-robin group play.
    Group(GroupName),
    /// World Cup knockout stage.
    Knockout(KnockoutRound),
}

impl BracketTag {
    /// Whether matches under this tag resolve to a winner and a loser.
    pub fn is_head_to_head(&self) -> bool {
        !matches!(self, BracketTag::Heat)
    }
}

/// Reference to a team slot of another match in the bracket graph.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SlotRef {
    pub match_id: MatchId,
    pub slot: SlotIndex,
}

impl SlotRef {
    pub const fn new(match_id: MatchId, slot: SlotIndex) -> Self {
        Self { match_id, slot }
    }
}

/// A team slot within a match.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TeamSlot {
    /// `None` means TBD: the slot is filled once an upstream match resolves
    /// it, or at seed time.
    pub team_id: Option<TeamId>,
    /// Elapsed seconds for heats, raw score for individually scored events.
    /// Unused by head-to-head matches.
    pub measure: Option<f64>,
}

impl TeamSlot {
    /// An empty TBD slot.
    pub const fn empty() -> Self {
        Self {
            team_id: None,
            measure: None,
        }
    }

    /// A slot populated at bracket creation time.
    pub const fn seeded(team_id: TeamId) -> Self {
        Self {
            team_id: Some(team_id),
            measure: None,
        }
    }
}

/// Generic unit of play: a timed heat, a double elimination match, a group
/// match, or a World Cup knockout match.
///
/// Matches are created once when the bracket skeleton is seeded and mutated
/// in place as results arrive and propagation fills downstream slots. They
/// are only deleted by a full stage reset, and only when they were created
/// by a finalize step rather than by seeding.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Match {
    pub id: MatchId,
    pub event_id: EventId,
    /// Round within the bracket. Negative rounds are loser-bracket rounds in
    /// double elimination; larger magnitude means later play.
    pub round: i32,
    /// Sequence number within the round.
    pub sequence: i32,
    pub bracket: BracketTag,
    /// Up to four slots for heats, exactly two for head-to-head matches.
    pub slots: Vec<TeamSlot>,
    pub winner_id: Option<TeamId>,
    pub loser_id: Option<TeamId>,
    /// Slot the winner advances into. `None` for terminal matches.
    pub winner_to: Option<SlotRef>,
    /// Slot the loser drops into. `None` when a loss eliminates.
    pub loser_to: Option<SlotRef>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// A timed heat with the given teams in its lanes.
    pub fn heat(id: MatchId, event_id: EventId, sequence: i32, teams: &[TeamId]) -> Self {
        debug_assert!(teams.len() <= MAX_HEAT_SLOTS);
        Self {
            id,
            event_id,
            round: 1,
            sequence,
            bracket: BracketTag::Heat,
            slots: teams.iter().map(|&t| TeamSlot::seeded(t)).collect(),
            winner_id: None,
            loser_id: None,
            winner_to: None,
            loser_to: None,
            completed_at: None,
        }
    }

    /// A head-to-head match with two empty TBD slots.
    pub fn head_to_head(
        id: MatchId,
        event_id: EventId,
        round: i32,
        sequence: i32,
        bracket: BracketTag,
    ) -> Self {
        Self {
            id,
            event_id,
            round,
            sequence,
            bracket,
            slots: vec![TeamSlot::empty(); HEAD_TO_HEAD_SLOTS],
            winner_id: None,
            loser_id: None,
            winner_to: None,
            loser_to: None,
            completed_at: None,
        }
    }

    /// Seed both slots of a head-to-head match.
    pub fn with_teams(mut self, team1: TeamId, team2: TeamId) -> Self {
        self.slots = vec![TeamSlot::seeded(team1), TeamSlot::seeded(team2)];
        self
    }

    /// Set the winner destination edge.
    pub fn advances_to(mut self, target: SlotRef) -> Self {
        self.winner_to = Some(target);
        self
    }

    /// Set the loser destination edge.
    pub fn drops_to(mut self, target: SlotRef) -> Self {
        self.loser_to = Some(target);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Populated teams in slot order.
    pub fn slot_teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.slots.iter().filter_map(|s| s.team_id)
    }

    pub fn has_team(&self, team_id: TeamId) -> bool {
        self.slot_teams().any(|t| t == team_id)
    }
}
