//! # Beer Olympics
//!
//! A tournament progression and standings engine for a multi-sport amateur
//! tournament. Events run in one of four formats — timed heats, double
//! elimination, World Cup group-plus-knockout, and individually scored
//! contests — and the engine advances results through the bracket graph,
//! derives standings, converts them to point awards, and can reset a stage
//! back to its pre-completion state.
//!
//! ## Architecture
//!
//! The core is pure: progression, ranking, and points are plain functions
//! over plain records. Persistence goes through repository traits, with a
//! PostgreSQL implementation included; the three multi-record writes that
//! must not be torn (result + propagation, award replacement, stage reset)
//! are each committed as one unit by the store.
//!
//! ## Core Modules
//!
//! - [`bracket`]: match graph, result propagation, World Cup topology, reset
//! - [`ranking`]: format-specific standings calculators
//! - [`points`]: rank-to-points table and award derivation
//! - [`event`]: event lifecycle and the orchestrating manager
//! - [`store`]: repository traits and PostgreSQL implementations
//!
//! ## Example
//!
//! ```
//! use beer_olympics::bracket::Match;
//! use beer_olympics::ranking::{HeatRanking, RankingStrategy};
//! use chrono::Utc;
//!
//! let mut heat = Match::heat(1, 10, 1, &[101, 102]);
//! heat.slots[0].measure = Some(48.7);
//! heat.slots[1].measure = Some(45.2);
//! heat.completed_at = Some(Utc::now());
//!
//! let standings = HeatRanking.standings(&[heat]).unwrap();
//! assert_eq!(standings[0].team_id, 102);
//! ```

/// Match graph, result propagation, and stage reset.
pub mod bracket;
pub use bracket::{BracketTag, EventId, GroupName, Match, MatchId, SlotRef, Team, TeamId};

/// Engine error types and the error-kind taxonomy.
pub mod errors;
pub use errors::{EngineError, EngineResult, ErrorKind};

/// Event lifecycle and the orchestrating manager.
pub mod event;
pub use event::{Event, EventFormat, EventManager, EventStatus, FinalizeCommand};

/// Point awards and the shared rank table.
pub mod points;
pub use points::{AwardCategory, AwardStatus, PointsAward, PointsTable};

/// Standings calculators.
pub mod ranking;
pub use ranking::{RankMetric, Ranker, RankingStrategy, StandingEntry, TieBreakDecision};

/// Storage collaborators.
pub mod store;
