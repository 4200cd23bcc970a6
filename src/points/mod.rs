//! Point awards: the shared rank table and the derivation from standings.

pub mod calculator;
pub mod models;

pub use calculator::awards_from_standings;
pub use models::{AwardCategory, AwardId, AwardStatus, PointsAward, PointsTable};
