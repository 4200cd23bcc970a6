//! Repository trait definitions for testability and dependency injection.
//!
//! The engine composes storage through these traits; the `Pg*` types are
//! the default PostgreSQL implementations. Operations the match graph
//! cannot survive half-applied (result + propagation, derived award
//! replacement, stage reset) run inside a single transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use thiserror::Error;

use crate::bracket::{
    BracketTag, EventId, Match, MatchId, ResetPlan, SlotRef, SlotWrite, TeamSlot,
};
use crate::event::{Event, EventFormat, EventStatus};
use crate::points::{AwardCategory, AwardId, AwardStatus, PointsAward};
use crate::ranking::StandingEntry;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for repository operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for event repository operations
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Find an event by id
    async fn get_event(&self, id: EventId) -> StoreResult<Option<Event>>;

    /// Transition an event's status. Completed events carry a completion
    /// timestamp; moving back to scheduled clears it.
    async fn set_event_status(&self, id: EventId, status: EventStatus) -> StoreResult<()>;
}

/// Trait for match repository operations
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Find a match by id
    async fn get_match(&self, id: MatchId) -> StoreResult<Option<Match>>;

    /// All matches of an event in bracket order (round, sequence)
    async fn get_matches_for_event(&self, event_id: EventId) -> StoreResult<Vec<Match>>;

    /// Persist a match's mutable fields (slots and result)
    async fn update_match(&self, m: &Match) -> StoreResult<()>;

    /// Reserve ids for matches about to be created
    async fn allocate_match_ids(&self, count: usize) -> StoreResult<Vec<MatchId>>;

    /// Insert newly created matches (World Cup knockout stage)
    async fn insert_matches(&self, matches: &[Match]) -> StoreResult<()>;

    /// Commit a completed match and its downstream slot writes as one unit
    async fn apply_progression(&self, completed: &Match, writes: &[SlotWrite]) -> StoreResult<()>;

    /// Apply a stage reset plan as one unit
    async fn apply_reset(&self, plan: &ResetPlan) -> StoreResult<()>;
}

/// Trait for derived-result and award repository operations
#[async_trait]
pub trait PointsRepository: Send + Sync {
    /// Replace the derived EVENT-category awards and standings for an
    /// event: delete then insert, atomically, so recomputation never
    /// double-counts. Manual awards are untouched.
    async fn replace_event_results(
        &self,
        event_id: EventId,
        standings: &[StandingEntry],
        awards: &[PointsAward],
    ) -> StoreResult<()>;

    /// Delete the derived EVENT-category awards and standings for an event
    async fn clear_event_results(&self, event_id: EventId) -> StoreResult<()>;

    /// Insert a manual award, returning its id
    async fn insert_award(&self, award: &PointsAward) -> StoreResult<AwardId>;

    /// Find an award by id
    async fn get_award(&self, id: AwardId) -> StoreResult<Option<PointsAward>>;

    /// Update an award's review status
    async fn set_award_status(&self, id: AwardId, status: AwardStatus) -> StoreResult<()>;

    /// All awards for an event
    async fn awards_for_event(&self, event_id: EventId) -> StoreResult<Vec<PointsAward>>;

    /// Persisted standings for an event, in rank order
    async fn standings_for_event(&self, event_id: EventId) -> StoreResult<Vec<StandingEntry>>;
}

/// Default PostgreSQL implementation of `EventRepository`
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn format_from_str(s: &str) -> EventFormat {
    match s {
        "heat" => EventFormat::Heat,
        "double_elimination" => EventFormat::DoubleElimination,
        "group_knockout" => EventFormat::GroupKnockout,
        "individual" => EventFormat::Individual,
        _ => EventFormat::Heat,
    }
}

fn status_from_str(s: &str) -> EventStatus {
    match s {
        "completed" => EventStatus::Completed,
        _ => EventStatus::Scheduled,
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn get_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        let row = sqlx::query(
            "SELECT id, name, format, status, created_at, completed_at
             FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Event {
            id: r.get("id"),
            name: r.get("name"),
            format: format_from_str(r.get("format")),
            status: status_from_str(r.get("status")),
            created_at: r.get("created_at"),
            completed_at: r.get("completed_at"),
        }))
    }

    async fn set_event_status(&self, id: EventId, status: EventStatus) -> StoreResult<()> {
        let query = match status {
            EventStatus::Completed => {
                "UPDATE events SET status = 'completed', completed_at = NOW() WHERE id = $1"
            }
            EventStatus::Scheduled => {
                "UPDATE events SET status = 'scheduled', completed_at = NULL WHERE id = $1"
            }
        };
        sqlx::query(query).bind(id).execute(&self.pool).await?;
        Ok(())
    }
}

/// Default PostgreSQL implementation of `MatchRepository`
pub struct PgMatchRepository {
    pool: PgPool,
}

impl PgMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_match(
        tx: &mut Transaction<'_, Postgres>,
        id: MatchId,
    ) -> StoreResult<Option<Match>> {
        let row = sqlx::query(
            "SELECT id, event_id, round, sequence, bracket, slots,
                    winner_id, loser_id, winner_to, loser_to, completed_at
             FROM matches WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        row.map(match_from_row).transpose()
    }

    async fn store_match(tx: &mut Transaction<'_, Postgres>, m: &Match) -> StoreResult<()> {
        sqlx::query(
            "UPDATE matches
             SET slots = $2, winner_id = $3, loser_id = $4, completed_at = $5
             WHERE id = $1",
        )
        .bind(m.id)
        .bind(serde_json::to_value(&m.slots)?)
        .bind(m.winner_id)
        .bind(m.loser_id)
        .bind(m.completed_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn match_from_row(r: PgRow) -> StoreResult<Match> {
    let bracket: BracketTag = serde_json::from_value(r.get("bracket"))?;
    let slots: Vec<TeamSlot> = serde_json::from_value(r.get("slots"))?;
    let winner_to: Option<SlotRef> = r
        .get::<Option<serde_json::Value>, _>("winner_to")
        .map(serde_json::from_value)
        .transpose()?;
    let loser_to: Option<SlotRef> = r
        .get::<Option<serde_json::Value>, _>("loser_to")
        .map(serde_json::from_value)
        .transpose()?;

    Ok(Match {
        id: r.get("id"),
        event_id: r.get("event_id"),
        round: r.get("round"),
        sequence: r.get("sequence"),
        bracket,
        slots,
        winner_id: r.get("winner_id"),
        loser_id: r.get("loser_id"),
        winner_to,
        loser_to,
        completed_at: r.get("completed_at"),
    })
}

#[async_trait]
impl MatchRepository for PgMatchRepository {
    async fn get_match(&self, id: MatchId) -> StoreResult<Option<Match>> {
        let row = sqlx::query(
            "SELECT id, event_id, round, sequence, bracket, slots,
                    winner_id, loser_id, winner_to, loser_to, completed_at
             FROM matches WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(match_from_row).transpose()
    }

    async fn get_matches_for_event(&self, event_id: EventId) -> StoreResult<Vec<Match>> {
        let rows = sqlx::query(
            "SELECT id, event_id, round, sequence, bracket, slots,
                    winner_id, loser_id, winner_to, loser_to, completed_at
             FROM matches WHERE event_id = $1
             ORDER BY round, sequence, id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(match_from_row).collect()
    }

    async fn update_match(&self, m: &Match) -> StoreResult<()> {
        sqlx::query(
            "UPDATE matches
             SET slots = $2, winner_id = $3, loser_id = $4, completed_at = $5
             WHERE id = $1",
        )
        .bind(m.id)
        .bind(serde_json::to_value(&m.slots)?)
        .bind(m.winner_id)
        .bind(m.loser_id)
        .bind(m.completed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn allocate_match_ids(&self, count: usize) -> StoreResult<Vec<MatchId>> {
        let rows = sqlx::query(
            "SELECT nextval('matches_id_seq') AS id FROM generate_series(1, $1)",
        )
        .bind(count as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.get("id")).collect())
    }

    async fn insert_matches(&self, matches: &[Match]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for m in matches {
            sqlx::query(
                "INSERT INTO matches
                 (id, event_id, round, sequence, bracket, slots,
                  winner_id, loser_id, winner_to, loser_to, completed_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            )
            .bind(m.id)
            .bind(m.event_id)
            .bind(m.round)
            .bind(m.sequence)
            .bind(serde_json::to_value(m.bracket)?)
            .bind(serde_json::to_value(&m.slots)?)
            .bind(m.winner_id)
            .bind(m.loser_id)
            .bind(m.winner_to.map(serde_json::to_value).transpose()?)
            .bind(m.loser_to.map(serde_json::to_value).transpose()?)
            .bind(m.completed_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn apply_progression(&self, completed: &Match, writes: &[SlotWrite]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        Self::store_match(&mut tx, completed).await?;
        for write in writes {
            if let Some(mut dest) = Self::fetch_match(&mut tx, write.target.match_id).await?
                && let Some(slot) = dest.slots.get_mut(write.target.slot)
            {
                slot.team_id = Some(write.team_id);
                Self::store_match(&mut tx, &dest).await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn apply_reset(&self, plan: &ResetPlan) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for &id in &plan.clear_results {
            if let Some(mut m) = Self::fetch_match(&mut tx, id).await? {
                m.winner_id = None;
                m.loser_id = None;
                m.completed_at = None;
                for slot in &mut m.slots {
                    slot.measure = None;
                }
                Self::store_match(&mut tx, &m).await?;
            }
        }
        for target in &plan.clear_slots {
            if let Some(mut m) = Self::fetch_match(&mut tx, target.match_id).await?
                && let Some(slot) = m.slots.get_mut(target.slot)
            {
                slot.team_id = None;
                Self::store_match(&mut tx, &m).await?;
            }
        }
        if !plan.delete_matches.is_empty() {
            sqlx::query("DELETE FROM matches WHERE id = ANY($1)")
                .bind(&plan.delete_matches)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Default PostgreSQL implementation of `PointsRepository`
pub struct PgPointsRepository {
    pool: PgPool,
}

impl PgPointsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn category_from_str(s: &str) -> AwardCategory {
    match s {
        "bonus" => AwardCategory::Bonus,
        "penalty" => AwardCategory::Penalty,
        _ => AwardCategory::Event,
    }
}

fn award_status_from_str(s: &str) -> AwardStatus {
    match s {
        "pending" => AwardStatus::Pending,
        "rejected" => AwardStatus::Rejected,
        _ => AwardStatus::Approved,
    }
}

fn award_from_row(r: &PgRow) -> PointsAward {
    PointsAward {
        id: r.get("id"),
        event_id: r.get("event_id"),
        team_id: r.get("team_id"),
        category: category_from_str(r.get("category")),
        value: r.get("value"),
        status: award_status_from_str(r.get("status")),
        created_at: r.get::<DateTime<Utc>, _>("created_at"),
    }
}

async fn insert_award_tx(
    tx: &mut Transaction<'_, Postgres>,
    award: &PointsAward,
) -> StoreResult<AwardId> {
    let row = sqlx::query(
        "INSERT INTO points_awards (event_id, team_id, category, value, status, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(award.event_id)
    .bind(award.team_id)
    .bind(award.category.to_string())
    .bind(award.value)
    .bind(award.status.to_string())
    .bind(award.created_at)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row.get("id"))
}

#[async_trait]
impl PointsRepository for PgPointsRepository {
    async fn replace_event_results(
        &self,
        event_id: EventId,
        standings: &[StandingEntry],
        awards: &[PointsAward],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM points_awards WHERE event_id = $1 AND category = 'event'")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM standings WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        for entry in standings {
            sqlx::query(
                "INSERT INTO standings (event_id, team_id, rank, metric, disqualified)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(event_id)
            .bind(entry.team_id)
            .bind(entry.rank as i32)
            .bind(serde_json::to_value(entry.metric)?)
            .bind(entry.disqualified)
            .execute(&mut *tx)
            .await?;
        }
        for award in awards {
            insert_award_tx(&mut tx, award).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn clear_event_results(&self, event_id: EventId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM points_awards WHERE event_id = $1 AND category = 'event'")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM standings WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn insert_award(&self, award: &PointsAward) -> StoreResult<AwardId> {
        let mut tx = self.pool.begin().await?;
        let id = insert_award_tx(&mut tx, award).await?;
        tx.commit().await?;
        Ok(id)
    }

    async fn get_award(&self, id: AwardId) -> StoreResult<Option<PointsAward>> {
        let row = sqlx::query(
            "SELECT id, event_id, team_id, category, value, status, created_at
             FROM points_awards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| award_from_row(&r)))
    }

    async fn set_award_status(&self, id: AwardId, status: AwardStatus) -> StoreResult<()> {
        sqlx::query("UPDATE points_awards SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn awards_for_event(&self, event_id: EventId) -> StoreResult<Vec<PointsAward>> {
        let rows = sqlx::query(
            "SELECT id, event_id, team_id, category, value, status, created_at
             FROM points_awards WHERE event_id = $1
             ORDER BY id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(award_from_row).collect())
    }

    async fn standings_for_event(&self, event_id: EventId) -> StoreResult<Vec<StandingEntry>> {
        let rows = sqlx::query(
            "SELECT team_id, rank, metric, disqualified
             FROM standings WHERE event_id = $1
             ORDER BY rank",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|r| {
                Ok(StandingEntry {
                    team_id: r.get("team_id"),
                    rank: r.get::<i32, _>("rank") as u32,
                    metric: serde_json::from_value(r.get("metric"))?,
                    disqualified: r.get("disqualified"),
                })
            })
            .collect()
    }
}
