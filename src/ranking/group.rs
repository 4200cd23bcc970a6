//! Group stage standings with operator tie-breaks.
//!
//! Each group's metric is the win count over its round-robin matches. With
//! three teams per group the reachable win patterns are 2-1-0 and 1-1-1;
//! the 1-1-1 case is the only one an operator decision resolves. Every
//! other ordering falls back to ascending team id, which is deterministic
//! rather than skill-based.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bracket::{BracketTag, GROUP_COUNT, GroupName, Match, TeamId};
use crate::errors::{EngineError, EngineResult};

/// Operator-supplied resolution of a three-way tie within one group.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TieBreakDecision {
    pub group: GroupName,
    pub winner: TeamId,
}

/// Per-team position within one group.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GroupStanding {
    pub group: GroupName,
    pub team_id: TeamId,
    /// 1-based position within the group.
    pub position: u32,
    /// Win count including a synthetic tie-break win, if one was applied.
    pub wins: u32,
}

/// Compute positions for every group, ordered by group name then position.
///
/// Requires every group match to be completed. A 1-1-1 group without a
/// matching tie-break decision reports NotReady.
pub fn group_standings(
    matches: &[Match],
    tie_breaks: &[TieBreakDecision],
) -> EngineResult<Vec<GroupStanding>> {
    let group_matches: Vec<&Match> = matches
        .iter()
        .filter(|m| matches!(m.bracket, BracketTag::Group(_)))
        .collect();
    let completed = group_matches.iter().filter(|m| m.is_completed()).count();
    if completed < group_matches.len() || group_matches.is_empty() {
        return Err(EngineError::GroupStageNotFinished {
            completed,
            total: group_matches.len(),
        });
    }

    let mut groups: BTreeMap<GroupName, BTreeMap<TeamId, u32>> = BTreeMap::new();
    for m in &group_matches {
        let BracketTag::Group(name) = m.bracket else {
            continue;
        };
        let wins = groups.entry(name).or_default();
        for team in m.slot_teams() {
            wins.entry(team).or_insert(0);
        }
        if let Some(winner) = m.winner_id {
            *wins.entry(winner).or_insert(0) += 1;
        }
    }

    let mut standings = Vec::new();
    for (group, wins) in groups {
        standings.extend(rank_group(group, wins, tie_breaks)?);
    }
    Ok(standings)
}

fn rank_group(
    group: GroupName,
    wins: BTreeMap<TeamId, u32>,
    tie_breaks: &[TieBreakDecision],
) -> EngineResult<Vec<GroupStanding>> {
    let decision = tie_breaks.iter().find(|d| d.group == group);
    if let Some(d) = decision
        && !wins.contains_key(&d.winner)
    {
        return Err(EngineError::InvalidTieBreak {
            group,
            team_id: d.winner,
        });
    }

    // BTreeMap iteration gives ascending team id, which doubles as the
    // deterministic tie-break once the sort below is stable.
    let mut table: Vec<(TeamId, u32)> = wins.into_iter().collect();

    let three_way_tie = table.len() == 3 && table.iter().all(|&(_, w)| w == 1);
    if three_way_tie {
        let Some(d) = decision else {
            return Err(EngineError::GroupUndecided { group });
        };
        for entry in &mut table {
            if entry.0 == d.winner {
                entry.1 += 1;
            }
        }
    }

    table.sort_by_key(|&(_, w)| std::cmp::Reverse(w));
    Ok(table
        .into_iter()
        .enumerate()
        .map(|(i, (team_id, wins))| GroupStanding {
            group,
            team_id,
            position: i as u32 + 1,
            wins,
        })
        .collect())
}

/// Position-1 teams ordered by group name, for seeding the knockout stage.
pub fn group_winners(standings: &[GroupStanding]) -> EngineResult<Vec<(GroupName, TeamId)>> {
    let winners: Vec<(GroupName, TeamId)> = standings
        .iter()
        .filter(|s| s.position == 1)
        .map(|s| (s.group, s.team_id))
        .collect();
    if winners.len() != GROUP_COUNT {
        return Err(EngineError::IncompleteGroups {
            expected: GROUP_COUNT,
            found: winners.len(),
        });
    }
    Ok(winners)
}
