//! Bracket position to finish rank conversion.

use std::cmp::Reverse;

use super::group::{TieBreakDecision, group_standings};
use super::{RankMetric, RankingStrategy, StandingEntry};
use crate::bracket::{BracketTag, KnockoutRound, Match, TeamId};
use crate::errors::{EngineError, EngineResult};

fn decided(m: &Match) -> Option<(TeamId, TeamId)> {
    Some((m.winner_id?, m.loser_id?))
}

/// Double-elimination placement.
///
/// The grand final decides ranks 1 and 2; every other team is ranked by how
/// deep in the bracket it was eliminated, later rounds first. Ties within a
/// round break by match sequence, so placement is fully determined by
/// bracket position.
#[derive(Clone, Copy, Debug, Default)]
pub struct BracketPlacement;

impl RankingStrategy for BracketPlacement {
    fn standings(&self, matches: &[Match]) -> EngineResult<Vec<StandingEntry>> {
        let completed = matches.iter().filter(|m| m.is_completed()).count();
        if completed < matches.len() || matches.is_empty() {
            return Err(EngineError::BracketNotFinished {
                completed,
                total: matches.len(),
            });
        }
        let grand_final = matches
            .iter()
            .find(|m| m.bracket == BracketTag::GrandFinal)
            .ok_or(EngineError::GrandFinalMissing)?;
        let (champion, runner_up) = decided(grand_final).ok_or(EngineError::BracketNotFinished {
            completed,
            total: matches.len(),
        })?;

        // A loss only eliminates where no loser edge exists; everywhere else
        // the loser drops into the loser bracket and plays on.
        let mut eliminations: Vec<(i32, i32, TeamId)> = matches
            .iter()
            .filter(|m| m.id != grand_final.id && m.loser_to.is_none())
            .filter_map(|m| Some((m.round.abs(), m.sequence, m.loser_id?)))
            .collect();
        eliminations.sort_by_key(|&(depth, sequence, _)| (Reverse(depth), sequence));

        let mut standings = vec![
            StandingEntry::new(champion, 1, RankMetric::Placement(1)),
            StandingEntry::new(runner_up, 2, RankMetric::Placement(2)),
        ];
        standings.extend(eliminations.into_iter().enumerate().map(|(i, (_, _, team))| {
            let rank = i as u32 + 3;
            StandingEntry::new(team, rank, RankMetric::Placement(rank))
        }));
        Ok(standings)
    }
}

/// World Cup placement.
///
/// Ranks 1–4 come from the final and the third-place match. Group
/// runners-up take 5–8 and group thirds 9–12, ordered by group name within
/// each band, so every participant maps to a points table row.
#[derive(Clone, Debug, Default)]
pub struct WorldCupPlacement {
    pub tie_breaks: Vec<TieBreakDecision>,
}

impl RankingStrategy for WorldCupPlacement {
    fn standings(&self, matches: &[Match]) -> EngineResult<Vec<StandingEntry>> {
        let knockout: Vec<&Match> = matches
            .iter()
            .filter(|m| matches!(m.bracket, BracketTag::Knockout(_)))
            .collect();
        if knockout.is_empty() {
            return Err(EngineError::KnockoutNotCreated);
        }
        let completed = knockout.iter().filter(|m| m.is_completed()).count();
        let not_finished = EngineError::KnockoutNotFinished {
            completed,
            total: knockout.len(),
        };
        if completed < knockout.len() {
            return Err(not_finished);
        }

        let find_round = |round: KnockoutRound| {
            knockout
                .iter()
                .find(|m| m.bracket == BracketTag::Knockout(round))
                .copied()
                .ok_or(EngineError::KnockoutNotCreated)
        };
        let (first, second) = decided(find_round(KnockoutRound::Final)?)
            .ok_or_else(|| not_finished.clone())?;
        let (third, fourth) = decided(find_round(KnockoutRound::ThirdPlace)?)
            .ok_or_else(|| not_finished.clone())?;

        let mut standings: Vec<StandingEntry> = [first, second, third, fourth]
            .into_iter()
            .enumerate()
            .map(|(i, team)| {
                let rank = i as u32 + 1;
                StandingEntry::new(team, rank, RankMetric::Placement(rank))
            })
            .collect();

        let groups = group_standings(matches, &self.tie_breaks)?;
        let band = |position: u32| {
            groups
                .iter()
                .filter(move |s| s.position == position)
                .map(|s| (s.team_id, s.wins))
        };
        for (team_id, wins) in band(2).chain(band(3)) {
            let rank = standings.len() as u32 + 1;
            standings.push(StandingEntry::new(team_id, rank, RankMetric::Wins(wins)));
        }
        Ok(standings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::SlotRef;
    use chrono::Utc;

    fn completed(mut m: Match, winner: TeamId, loser: TeamId) -> Match {
        m.winner_id = Some(winner);
        m.loser_id = Some(loser);
        m.completed_at = Some(Utc::now());
        m
    }

    /// Four-team double elimination: two winner-bracket semis, a
    /// winner-bracket final, two loser-bracket rounds, and the grand final.
    fn four_team_bracket() -> Vec<Match> {
        vec![
            // Winner bracket round 1.
            completed(
                Match::head_to_head(1, 10, 1, 1, BracketTag::Winner)
                    .with_teams(101, 102)
                    .advances_to(SlotRef::new(3, 0))
                    .drops_to(SlotRef::new(4, 0)),
                101,
                102,
            ),
            completed(
                Match::head_to_head(2, 10, 1, 2, BracketTag::Winner)
                    .with_teams(103, 104)
                    .advances_to(SlotRef::new(3, 1))
                    .drops_to(SlotRef::new(4, 1)),
                103,
                104,
            ),
            // Winner bracket final: loser drops to the last loser round.
            completed(
                Match::head_to_head(3, 10, 2, 1, BracketTag::Winner)
                    .with_teams(101, 103)
                    .advances_to(SlotRef::new(6, 0))
                    .drops_to(SlotRef::new(5, 0)),
                101,
                103,
            ),
            // Loser bracket round 1: elimination.
            completed(
                Match::head_to_head(4, 10, -1, 1, BracketTag::Loser)
                    .with_teams(102, 104)
                    .advances_to(SlotRef::new(5, 1)),
                104,
                102,
            ),
            // Loser bracket round 2: elimination.
            completed(
                Match::head_to_head(5, 10, -2, 1, BracketTag::Loser)
                    .with_teams(103, 104)
                    .advances_to(SlotRef::new(6, 1)),
                103,
                104,
            ),
            // Grand final.
            completed(
                Match::head_to_head(6, 10, 3, 1, BracketTag::GrandFinal).with_teams(101, 103),
                101,
                103,
            ),
        ]
    }

    #[test]
    fn test_double_elim_placement() {
        let standings = BracketPlacement.standings(&four_team_bracket()).unwrap();
        let order: Vec<_> = standings.iter().map(|e| (e.team_id, e.rank)).collect();
        // 101 champion, 103 runner-up, 104 out in the last loser round,
        // 102 out in the first.
        assert_eq!(order, vec![(101, 1), (103, 2), (104, 3), (102, 4)]);
    }

    #[test]
    fn test_unfinished_bracket_is_not_ready() {
        let mut matches = four_team_bracket();
        matches[5].winner_id = None;
        matches[5].loser_id = None;
        matches[5].completed_at = None;
        let err = BracketPlacement.standings(&matches).unwrap_err();
        assert_eq!(
            err,
            EngineError::BracketNotFinished {
                completed: 5,
                total: 6,
            }
        );
    }

    #[test]
    fn test_missing_grand_final() {
        let mut matches = four_team_bracket();
        matches.pop();
        let err = BracketPlacement.standings(&matches).unwrap_err();
        assert_eq!(err, EngineError::GrandFinalMissing);
    }

    #[test]
    fn test_world_cup_requires_knockout_matches() {
        let err = WorldCupPlacement::default().standings(&[]).unwrap_err();
        assert_eq!(err, EngineError::KnockoutNotCreated);
    }
}
