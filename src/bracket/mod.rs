//! Bracket models, result propagation, and stage reset.
//!
//! This module provides the match graph and the progression engine:
//! - Match and slot models with typed destination edges
//! - Single-step result application and propagation
//! - The fixed World Cup knockout topology
//! - Reset planning that inverts completion and propagation

pub mod models;
pub mod progression;
pub mod reset;
pub mod world_cup;

pub use models::{
    BracketTag, EventId, GroupName, HEAD_TO_HEAD_SLOTS, KnockoutRound, MAX_HEAT_SLOTS, Match,
    MatchId, SlotIndex, SlotRef, Team, TeamId, TeamSlot,
};
pub use progression::{Progression, SlotWrite, apply_result, apply_slot_write};
pub use reset::{ResetPlan, reset_plan};
pub use world_cup::{GROUP_COUNT, KNOCKOUT_MATCH_COUNT, TEAMS_PER_GROUP, knockout_skeleton};
