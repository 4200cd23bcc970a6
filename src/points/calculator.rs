//! Derives point awards from final standings.
//!
//! The output is the complete derived award set for the event: the caller
//! replaces (deletes then inserts) the previous EVENT-category awards with
//! it in one atomic unit, so recomputation never double-counts. Manual
//! bonus and penalty awards are a separate category and are never touched.

use chrono::{DateTime, Utc};

use super::models::{PointsAward, PointsTable};
use crate::bracket::EventId;
use crate::ranking::StandingEntry;

/// One derived EVENT award per team. Disqualified teams earn zero
/// regardless of rank.
pub fn awards_from_standings(
    event_id: EventId,
    standings: &[StandingEntry],
    table: &PointsTable,
    now: DateTime<Utc>,
) -> Vec<PointsAward> {
    standings
        .iter()
        .map(|entry| {
            let value = if entry.disqualified {
                0
            } else {
                table.value_for_rank(entry.rank)
            };
            PointsAward::derived(event_id, entry.team_id, value, now)
        })
        .collect()
}
