//! Stage reset: inverts completion and propagation for one event.
//!
//! The plan distinguishes seeded slots from propagated slots using the
//! static bracket graph alone: a slot was filled by propagation iff some
//! match's winner or loser edge targets it. Clearing everything else would
//! erase the original seeding and leave the bracket unplayable.

use super::models::{BracketTag, Match, MatchId, SlotRef};

/// Everything the store must clear or delete to return an event to its
/// pre-completion state. Applied as a single atomic unit; a half-applied
/// reset leaves orphaned team references in the graph.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResetPlan {
    /// Matches whose result fields (winner, loser, measures, completion
    /// timestamp) are cleared.
    pub clear_results: Vec<MatchId>,
    /// Propagated slots returned to TBD. Seeded slots are never listed.
    pub clear_slots: Vec<SlotRef>,
    /// Matches deleted outright: knockout matches created by a group-stage
    /// finalize are artifacts, not seed.
    pub delete_matches: Vec<MatchId>,
}

impl ResetPlan {
    pub fn is_empty(&self) -> bool {
        self.clear_results.is_empty() && self.delete_matches.is_empty()
    }
}

/// Build the reset plan for one event's matches.
///
/// A never-started stage produces an empty plan; the caller treats that as
/// a no-op rather than an error.
pub fn reset_plan(matches: &[Match]) -> ResetPlan {
    let deleted: Vec<MatchId> = matches
        .iter()
        .filter(|m| matches!(m.bracket, BracketTag::Knockout(_)))
        .map(|m| m.id)
        .collect();

    let cleared: Vec<MatchId> = matches
        .iter()
        .filter(|m| m.is_completed() && !deleted.contains(&m.id))
        .map(|m| m.id)
        .collect();

    // Propagated slots are exactly the targets of surviving graph edges;
    // targets inside deleted matches vanish with them.
    let clear_slots: Vec<SlotRef> = matches
        .iter()
        .filter(|m| !deleted.contains(&m.id))
        .flat_map(|m| m.winner_to.into_iter().chain(m.loser_to))
        .filter(|target| !deleted.contains(&target.match_id))
        .collect();

    ResetPlan {
        clear_results: cleared,
        clear_slots,
        delete_matches: deleted,
    }
}
