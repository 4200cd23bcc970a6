//! Single-step result propagation through the bracket graph.
//!
//! Completing a match mutates the match itself and produces at most two
//! downstream slot writes. The engine never cascades: a downstream match
//! becomes playable only once both of its slots have been filled by
//! separate propagation events.

use chrono::{DateTime, Utc};

use super::models::{Match, SlotRef, TeamId};
use crate::errors::{EngineError, EngineResult};

/// A pending write of a team into a downstream slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotWrite {
    pub target: SlotRef,
    pub team_id: TeamId,
}

/// Downstream writes produced by completing one match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progression {
    pub winner_write: Option<SlotWrite>,
    pub loser_write: Option<SlotWrite>,
}

impl Progression {
    /// The writes in a fixed order: winner first, then loser.
    pub fn writes(&self) -> impl Iterator<Item = SlotWrite> + '_ {
        self.winner_write.into_iter().chain(self.loser_write)
    }
}

/// Apply a head-to-head result to a match.
///
/// Validates that `winner_id` and `loser_id` are exactly the match's two
/// populated slots, records the result with a completion timestamp, and
/// returns the downstream writes implied by the match's graph edges. The
/// caller commits the result and the writes as one atomic unit.
pub fn apply_result(
    m: &mut Match,
    winner_id: TeamId,
    loser_id: TeamId,
    now: DateTime<Utc>,
) -> EngineResult<Progression> {
    if !m.bracket.is_head_to_head() {
        return Err(EngineError::NotHeadToHead(m.id));
    }
    if m.is_completed() {
        return Err(EngineError::MatchAlreadyCompleted(m.id));
    }
    if m.slot_teams().count() < m.slots.len() {
        return Err(EngineError::MissingParticipant(m.id));
    }
    if !m.has_team(winner_id) {
        return Err(EngineError::InvalidParticipants {
            match_id: m.id,
            team_id: winner_id,
        });
    }
    if winner_id == loser_id || !m.has_team(loser_id) {
        return Err(EngineError::InvalidParticipants {
            match_id: m.id,
            team_id: loser_id,
        });
    }

    m.winner_id = Some(winner_id);
    m.loser_id = Some(loser_id);
    m.completed_at = Some(now);

    Ok(Progression {
        winner_write: m.winner_to.map(|target| SlotWrite {
            target,
            team_id: winner_id,
        }),
        loser_write: m.loser_to.map(|target| SlotWrite {
            target,
            team_id: loser_id,
        }),
    })
}

/// Write a propagated team into the destination slot of a downstream match.
///
/// An already-populated destination slot is overwritten (last write wins);
/// with a correct static topology only one upstream match ever feeds a slot.
pub fn apply_slot_write(m: &mut Match, write: SlotWrite) -> EngineResult<()> {
    debug_assert_eq!(m.id, write.target.match_id);
    let slot = m
        .slots
        .get_mut(write.target.slot)
        .ok_or(EngineError::SlotOutOfRange {
            match_id: m.id,
            slot: write.target.slot,
        })?;
    slot.team_id = Some(write.team_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::models::BracketTag;

    fn winner_match(id: i64) -> Match {
        Match::head_to_head(id, 10, 2, 1, BracketTag::Winner).with_teams(101, 102)
    }

    #[test]
    fn test_result_records_winner_and_loser() {
        let mut m = winner_match(7);
        let prog = apply_result(&mut m, 101, 102, Utc::now()).unwrap();
        assert_eq!(m.winner_id, Some(101));
        assert_eq!(m.loser_id, Some(102));
        assert!(m.is_completed());
        assert_eq!(prog.writes().count(), 0);
    }

    #[test]
    fn test_result_emits_downstream_writes() {
        let mut m = winner_match(7)
            .advances_to(SlotRef::new(9, 0))
            .drops_to(SlotRef::new(12, 1));
        let prog = apply_result(&mut m, 101, 102, Utc::now()).unwrap();
        assert_eq!(
            prog.winner_write,
            Some(SlotWrite {
                target: SlotRef::new(9, 0),
                team_id: 101,
            })
        );
        assert_eq!(
            prog.loser_write,
            Some(SlotWrite {
                target: SlotRef::new(12, 1),
                team_id: 102,
            })
        );
    }

    #[test]
    fn test_rejects_foreign_team() {
        let mut m = winner_match(7);
        let err = apply_result(&mut m, 999, 102, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidParticipants {
                match_id: 7,
                team_id: 999,
            }
        );
        assert!(!m.is_completed());
    }

    #[test]
    fn test_rejects_winner_equal_to_loser() {
        let mut m = winner_match(7);
        let err = apply_result(&mut m, 101, 101, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidParticipants {
                match_id: 7,
                team_id: 101,
            }
        );
    }

    #[test]
    fn test_rejects_tbd_slot() {
        let mut m = Match::head_to_head(7, 10, 2, 1, BracketTag::Winner);
        m.slots[0].team_id = Some(101);
        let err = apply_result(&mut m, 101, 102, Utc::now()).unwrap_err();
        assert_eq!(err, EngineError::MissingParticipant(7));
    }

    #[test]
    fn test_rejects_double_completion() {
        let mut m = winner_match(7);
        apply_result(&mut m, 101, 102, Utc::now()).unwrap();
        let err = apply_result(&mut m, 102, 101, Utc::now()).unwrap_err();
        assert_eq!(err, EngineError::MatchAlreadyCompleted(7));
    }

    #[test]
    fn test_rejects_heats() {
        let mut m = Match::heat(3, 10, 1, &[101, 102]);
        let err = apply_result(&mut m, 101, 102, Utc::now()).unwrap_err();
        assert_eq!(err, EngineError::NotHeadToHead(3));
    }

    #[test]
    fn test_slot_write_fills_destination() {
        let mut dest = Match::head_to_head(9, 10, 3, 1, BracketTag::Winner);
        apply_slot_write(
            &mut dest,
            SlotWrite {
                target: SlotRef::new(9, 0),
                team_id: 101,
            },
        )
        .unwrap();
        assert_eq!(dest.slots[0].team_id, Some(101));
        assert_eq!(dest.slots[1].team_id, None);
    }

    #[test]
    fn test_slot_write_out_of_range() {
        let mut dest = Match::head_to_head(9, 10, 3, 1, BracketTag::Winner);
        let err = apply_slot_write(
            &mut dest,
            SlotWrite {
                target: SlotRef::new(9, 5),
                team_id: 101,
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::SlotOutOfRange {
                match_id: 9,
                slot: 5,
            }
        );
    }
}
