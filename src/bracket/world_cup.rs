//! Fixed World Cup knockout topology.
//!
//! Four groups of three feed two semifinals: the group A winner meets the
//! group D winner, the group B winner meets the group C winner. Both
//! semifinals advance their winner into the final and drop their loser into
//! the third-place match. The knockout stage is always exactly these four
//! matches; there is no general pointer graph to configure.

use super::models::{BracketTag, EventId, GroupName, KnockoutRound, Match, MatchId, SlotRef, TeamId};
use crate::errors::{EngineError, EngineResult};

/// Number of groups in the group stage.
pub const GROUP_COUNT: usize = 4;

/// Teams per group.
pub const TEAMS_PER_GROUP: usize = 3;

/// Matches in the knockout stage: two semifinals, third place, final.
pub const KNOCKOUT_MATCH_COUNT: usize = 4;

/// Build the knockout stage for the given group winners.
///
/// `ids` are store-allocated match ids in order semifinal 1, semifinal 2,
/// third place, final; the internal graph edges are wired against them
/// before insert. `winners` must contain exactly one position-1 team per
/// group.
pub fn knockout_skeleton(
    event_id: EventId,
    ids: [MatchId; KNOCKOUT_MATCH_COUNT],
    winners: &[(GroupName, TeamId)],
) -> EngineResult<Vec<Match>> {
    let mut by_group = [None; GROUP_COUNT];
    for &(group, team) in winners {
        by_group[group as usize] = Some(team);
    }
    let found = by_group.iter().flatten().count();
    if winners.len() != GROUP_COUNT || found != GROUP_COUNT {
        return Err(EngineError::IncompleteGroups {
            expected: GROUP_COUNT,
            found,
        });
    }
    let winner_of = |group: GroupName| by_group[group as usize].unwrap_or_default();

    let [semi1_id, semi2_id, third_id, final_id] = ids;
    let semi1 = Match::head_to_head(
        semi1_id,
        event_id,
        1,
        1,
        BracketTag::Knockout(KnockoutRound::Semifinal),
    )
    .with_teams(winner_of(GroupName::A), winner_of(GroupName::D))
    .advances_to(SlotRef::new(final_id, 0))
    .drops_to(SlotRef::new(third_id, 0));
    let semi2 = Match::head_to_head(
        semi2_id,
        event_id,
        1,
        2,
        BracketTag::Knockout(KnockoutRound::Semifinal),
    )
    .with_teams(winner_of(GroupName::B), winner_of(GroupName::C))
    .advances_to(SlotRef::new(final_id, 1))
    .drops_to(SlotRef::new(third_id, 1));
    let third = Match::head_to_head(
        third_id,
        event_id,
        2,
        1,
        BracketTag::Knockout(KnockoutRound::ThirdPlace),
    );
    let final_match = Match::head_to_head(
        final_id,
        event_id,
        2,
        2,
        BracketTag::Knockout(KnockoutRound::Final),
    );

    Ok(vec![semi1, semi2, third, final_match])
}
