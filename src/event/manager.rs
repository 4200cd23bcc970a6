//! Event manager orchestrating progression, standings, and point awards.
//!
//! The manager is the only component that talks to storage. Every operation
//! is a short read-modify-write: fetch current state, run the pure engine,
//! persist through the repositories. The multi-record writes go through the
//! repositories' atomic entry points so a failure never leaves the match
//! graph half-updated.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use thiserror::Error;

use super::models::{Event, EventFormat, EventStatus, FinalizeCommand};
use crate::bracket::{
    self, BracketTag, EventId, KNOCKOUT_MATCH_COUNT, Match, MatchId, SlotWrite, TeamId,
};
use crate::errors::EngineError;
use crate::points::{self, AwardCategory, AwardId, AwardStatus, PointsAward, PointsTable};
use crate::ranking::{
    Ranker, RankingStrategy, StandingEntry, TieBreakDecision, apply_disqualifications,
    group_standings, group_winners,
};
use crate::store::{EventRepository, MatchRepository, PointsRepository, StoreError};

/// Event operation errors
#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

pub type EventResult<T> = Result<T, EventError>;

/// Orchestrates one event's lifecycle over the repository seam.
#[derive(Clone)]
pub struct EventManager {
    events: Arc<dyn EventRepository>,
    matches: Arc<dyn MatchRepository>,
    points: Arc<dyn PointsRepository>,
    table: PointsTable,
}

impl EventManager {
    /// Create a manager using the standard points table.
    pub fn new(
        events: Arc<dyn EventRepository>,
        matches: Arc<dyn MatchRepository>,
        points: Arc<dyn PointsRepository>,
    ) -> Self {
        Self {
            events,
            matches,
            points,
            table: PointsTable::standard(),
        }
    }

    /// Swap in a custom rank-to-points table.
    pub fn with_points_table(mut self, table: PointsTable) -> Self {
        self.table = table;
        self
    }

    async fn load_event(&self, id: EventId) -> EventResult<Event> {
        self.events
            .get_event(id)
            .await?
            .ok_or_else(|| EngineError::EventNotFound(id).into())
    }

    async fn load_match(&self, id: MatchId) -> EventResult<Match> {
        self.matches
            .get_match(id)
            .await?
            .ok_or_else(|| EngineError::MatchNotFound(id).into())
    }

    /// Record per-lane results for one heat (elapsed times) or one
    /// individually scored contest (scores). A team with no measure is a
    /// DNF and stays out of the standings.
    pub async fn record_heat_result(
        &self,
        match_id: MatchId,
        results: &[(TeamId, Option<f64>)],
    ) -> EventResult<()> {
        let mut m = self.load_match(match_id).await?;
        let event = self.load_event(m.event_id).await?;
        event.ensure_scheduled()?;
        if !matches!(event.format, EventFormat::Heat | EventFormat::Individual) {
            return Err(EngineError::UnsupportedFormat {
                event_id: event.id,
                format: event.format,
            }
            .into());
        }
        if m.is_completed() {
            return Err(EngineError::MatchAlreadyCompleted(match_id).into());
        }

        for &(team_id, measure) in results {
            let slot = m
                .slots
                .iter_mut()
                .find(|s| s.team_id == Some(team_id))
                .ok_or(EngineError::InvalidParticipants { match_id, team_id })?;
            slot.measure = measure;
        }
        m.completed_at = Some(Utc::now());
        self.matches.update_match(&m).await?;
        debug!("recorded heat result for match {match_id}");
        Ok(())
    }

    /// Record a head-to-head result and propagate the winner and loser into
    /// their downstream slots. One local step; the result and both slot
    /// writes commit together.
    pub async fn record_match_result(
        &self,
        match_id: MatchId,
        winner_id: TeamId,
        loser_id: TeamId,
    ) -> EventResult<()> {
        let mut m = self.load_match(match_id).await?;
        let event = self.load_event(m.event_id).await?;
        event.ensure_scheduled()?;

        let progression = bracket::apply_result(&mut m, winner_id, loser_id, Utc::now())?;
        let writes: Vec<SlotWrite> = progression.writes().collect();
        for write in &writes {
            let dest = self.load_match(write.target.match_id).await?;
            let slot = dest
                .slots
                .get(write.target.slot)
                .ok_or(EngineError::SlotOutOfRange {
                    match_id: dest.id,
                    slot: write.target.slot,
                })?;
            if let Some(previous) = slot.team_id {
                // Two upstream matches feeding one slot means broken
                // topology; last write wins.
                warn!(
                    "overwriting team {previous} in match {} slot {}",
                    dest.id, write.target.slot
                );
            }
        }

        self.matches.apply_progression(&m, &writes).await?;
        debug!("match {match_id} completed: winner {winner_id}, loser {loser_id}");
        Ok(())
    }

    /// Close the group stage of a World Cup event: compute group positions,
    /// then create the four knockout matches seeded with the group winners.
    pub async fn finalize_group_stage(
        &self,
        event_id: EventId,
        tie_breaks: &[TieBreakDecision],
    ) -> EventResult<Vec<Match>> {
        let event = self.load_event(event_id).await?;
        event.ensure_scheduled()?;
        if event.format != EventFormat::GroupKnockout {
            return Err(EngineError::UnsupportedFormat {
                event_id,
                format: event.format,
            }
            .into());
        }

        let matches = self.matches.get_matches_for_event(event_id).await?;
        if matches
            .iter()
            .any(|m| matches!(m.bracket, BracketTag::Knockout(_)))
        {
            return Err(EngineError::KnockoutAlreadyCreated(event_id).into());
        }

        let standings = group_standings(&matches, tie_breaks)?;
        let winners = group_winners(&standings)?;
        let ids = self.matches.allocate_match_ids(KNOCKOUT_MATCH_COUNT).await?;
        let ids: [MatchId; KNOCKOUT_MATCH_COUNT] = ids.try_into().map_err(|_| {
            StoreError::Database(sqlx::Error::Protocol(
                "match id allocation returned the wrong count".into(),
            ))
        })?;
        let skeleton = bracket::knockout_skeleton(event_id, ids, &winners)?;
        self.matches.insert_matches(&skeleton).await?;
        info!("created knockout stage for event {event_id}");
        Ok(skeleton)
    }

    /// Close an event: compute standings for its format, apply
    /// disqualifications, replace the derived awards, and mark the event
    /// completed. Repeating the call on a completed event is rejected;
    /// recomputation goes through reset first and never double-counts.
    pub async fn finalize_event(
        &self,
        event_id: EventId,
        command: FinalizeCommand,
    ) -> EventResult<Vec<StandingEntry>> {
        let event = self.load_event(event_id).await?;
        event.ensure_scheduled()?;

        let matches = self.matches.get_matches_for_event(event_id).await?;
        let ranker = Ranker::for_format(event.format, command.tie_breaks);
        let mut standings = ranker.standings(&matches)?;
        apply_disqualifications(&mut standings, &command.disqualified);

        let awards =
            points::awards_from_standings(event_id, &standings, &self.table, Utc::now());
        self.points
            .replace_event_results(event_id, &standings, &awards)
            .await?;
        self.events
            .set_event_status(event_id, EventStatus::Completed)
            .await?;
        info!(
            "event {event_id} finalized: {} teams ranked",
            standings.len()
        );
        Ok(standings)
    }

    /// Invert completion and propagation for one event: clear results and
    /// propagated slots, drop derived awards and standings, and return the
    /// event to scheduled. Resetting a never-started event is a no-op.
    pub async fn reset_event(&self, event_id: EventId) -> EventResult<()> {
        let event = self.load_event(event_id).await?;
        let matches = self.matches.get_matches_for_event(event_id).await?;
        let plan = bracket::reset_plan(&matches);
        if plan.is_empty() && event.status == EventStatus::Scheduled {
            debug!("reset of event {event_id} is a no-op");
            return Ok(());
        }

        self.matches.apply_reset(&plan).await?;
        self.points.clear_event_results(event_id).await?;
        self.events
            .set_event_status(event_id, EventStatus::Scheduled)
            .await?;
        info!(
            "event {event_id} reset: {} results cleared, {} matches deleted",
            plan.clear_results.len(),
            plan.delete_matches.len()
        );
        Ok(())
    }

    /// Enter a manual bonus or penalty award, pending operator review.
    pub async fn submit_manual_award(
        &self,
        event_id: EventId,
        team_id: TeamId,
        category: AwardCategory,
        value: i32,
    ) -> EventResult<PointsAward> {
        if !category.is_manual() {
            return Err(EngineError::ManualCategoryRequired.into());
        }
        self.load_event(event_id).await?;
        let mut award = PointsAward::manual(event_id, team_id, category, value, Utc::now());
        award.id = self.points.insert_award(&award).await?;
        Ok(award)
    }

    /// Approve or reject a pending manual award. Derived awards and awards
    /// already reviewed are not reviewable.
    pub async fn review_manual_award(
        &self,
        award_id: AwardId,
        approve: bool,
    ) -> EventResult<PointsAward> {
        let mut award = self
            .points
            .get_award(award_id)
            .await?
            .ok_or(EngineError::AwardNotFound(award_id))?;
        if !award.category.is_manual() || award.status != AwardStatus::Pending {
            return Err(EngineError::AwardNotReviewable(award_id).into());
        }
        award.status = if approve {
            AwardStatus::Approved
        } else {
            AwardStatus::Rejected
        };
        self.points.set_award_status(award_id, award.status).await?;
        Ok(award)
    }

    /// All awards recorded for an event, derived and manual.
    pub async fn event_awards(&self, event_id: EventId) -> EventResult<Vec<PointsAward>> {
        Ok(self.points.awards_for_event(event_id).await?)
    }

    /// The persisted standings of a finalized event.
    pub async fn event_standings(&self, event_id: EventId) -> EventResult<Vec<StandingEntry>> {
        Ok(self.points.standings_for_event(event_id).await?)
    }
}
