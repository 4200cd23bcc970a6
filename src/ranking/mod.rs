//! Ranking calculators: raw results to ordered standings.
//!
//! Each event format maps to one strategy:
//! - Timed heats and individually scored contests sort by a per-team
//!   measure ([`heat`])
//! - World Cup groups rank on win counts with operator tie-breaks
//!   ([`group`])
//! - Double elimination and the World Cup knockout derive finish ranks
//!   from bracket position ([`placement`])
//!
//! Strategies are dispatched through the [`Ranker`] enum, so the event
//! manager can pick one from the event format without boxing.

pub mod group;
pub mod heat;
pub mod placement;

pub use group::{GroupStanding, TieBreakDecision, group_standings, group_winners};
pub use heat::{HeatRanking, IndividualRanking};
pub use placement::{BracketPlacement, WorldCupPlacement};

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::bracket::{Match, TeamId};
use crate::errors::EngineResult;
use crate::event::EventFormat;

/// Derived metric backing a standing entry.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub enum RankMetric {
    /// Elapsed seconds (timed heats).
    Time(f64),
    /// Raw score (individually scored contests).
    Score(f64),
    /// Win count (group stage).
    Wins(u32),
    /// Finish placement derived from bracket position.
    Placement(u32),
}

/// One row of derived standings for an event.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StandingEntry {
    pub team_id: TeamId,
    /// 1-based dense rank.
    pub rank: u32,
    pub metric: RankMetric,
    pub disqualified: bool,
}

impl StandingEntry {
    pub fn new(team_id: TeamId, rank: u32, metric: RankMetric) -> Self {
        Self {
            team_id,
            rank,
            metric,
            disqualified: false,
        }
    }
}

/// Strategy interface over the format-specific calculators.
#[enum_dispatch]
pub trait RankingStrategy {
    /// Compute standings from every match of the event.
    fn standings(&self, matches: &[Match]) -> EngineResult<Vec<StandingEntry>>;
}

/// Format-specific standings calculator.
#[enum_dispatch(RankingStrategy)]
pub enum Ranker {
    Heat(HeatRanking),
    Individual(IndividualRanking),
    DoubleElimination(BracketPlacement),
    WorldCup(WorldCupPlacement),
}

impl Ranker {
    /// The calculator for an event format. Tie-break decisions only matter
    /// to the World Cup path; other formats ignore them.
    pub fn for_format(format: EventFormat, tie_breaks: Vec<TieBreakDecision>) -> Self {
        match format {
            EventFormat::Heat => Ranker::Heat(HeatRanking),
            EventFormat::Individual => Ranker::Individual(IndividualRanking),
            EventFormat::DoubleElimination => Ranker::DoubleElimination(BracketPlacement),
            EventFormat::GroupKnockout => Ranker::WorldCup(WorldCupPlacement { tie_breaks }),
        }
    }
}

/// Mark the given teams disqualified and move them behind every ranked
/// team, preserving relative order within both partitions.
///
/// Ranks are reassigned densely over the actual participant count, so the
/// non-disqualified remainder keeps a clean 1..N ordering.
pub fn apply_disqualifications(entries: &mut Vec<StandingEntry>, disqualified: &[TeamId]) {
    if disqualified.is_empty() {
        return;
    }
    for entry in entries.iter_mut() {
        if disqualified.contains(&entry.team_id) {
            entry.disqualified = true;
        }
    }
    entries.sort_by_key(|e| e.disqualified);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }
}
