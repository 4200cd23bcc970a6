//! Timed heat and individually scored rankings.
//!
//! Both formats flatten every (team, measure) pair across all matches of
//! the event into one pool and sort it. Equal measures receive successive
//! ranks in stable input order rather than a shared rank; the ordering is
//! strict, not a sports tie rule.

use super::{RankMetric, RankingStrategy, StandingEntry};
use crate::bracket::{Match, TeamId};
use crate::errors::{EngineError, EngineResult};

/// Ranks every (team, time) pair across all heats by ascending elapsed
/// time. Teams with no recorded time (did not finish) are excluded.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeatRanking;

impl RankingStrategy for HeatRanking {
    fn standings(&self, matches: &[Match]) -> EngineResult<Vec<StandingEntry>> {
        rank_by_measure(matches, false, RankMetric::Time)
    }
}

/// Ranks individually scored contests by descending score.
#[derive(Clone, Copy, Debug, Default)]
pub struct IndividualRanking;

impl RankingStrategy for IndividualRanking {
    fn standings(&self, matches: &[Match]) -> EngineResult<Vec<StandingEntry>> {
        rank_by_measure(matches, true, RankMetric::Score)
    }
}

fn rank_by_measure(
    matches: &[Match],
    descending: bool,
    metric: fn(f64) -> RankMetric,
) -> EngineResult<Vec<StandingEntry>> {
    let completed = matches.iter().filter(|m| m.is_completed()).count();
    if completed < matches.len() || matches.is_empty() {
        return Err(EngineError::HeatsNotCompleted {
            completed,
            total: matches.len(),
        });
    }

    let mut pool: Vec<(TeamId, f64)> = matches
        .iter()
        .flat_map(|m| &m.slots)
        .filter_map(|slot| Some((slot.team_id?, slot.measure?)))
        .collect();
    if descending {
        pool.sort_by(|a, b| b.1.total_cmp(&a.1));
    } else {
        pool.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    Ok(pool
        .into_iter()
        .enumerate()
        .map(|(i, (team_id, value))| StandingEntry::new(team_id, i as u32 + 1, metric(value)))
        .collect())
}
