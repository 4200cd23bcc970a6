//! Event lifecycle and the orchestrating manager.
//!
//! An event moves SCHEDULED -> COMPLETED through finalize and back through
//! reset; no other transition exists. The [`EventManager`] wires the pure
//! engine (progression, ranking, points) to the repository seam.
//!
//! ## Example
//!
//! ```no_run
//! use beer_olympics::event::{EventManager, FinalizeCommand};
//! use beer_olympics::store::{
//!     Database, DatabaseConfig, PgEventRepository, PgMatchRepository, PgPointsRepository,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()).await?;
//!     let manager = EventManager::new(
//!         Arc::new(PgEventRepository::new(db.pool().clone())),
//!         Arc::new(PgMatchRepository::new(db.pool().clone())),
//!         Arc::new(PgPointsRepository::new(db.pool().clone())),
//!     );
//!
//!     // Record a heat, then close the event.
//!     manager.record_heat_result(1, &[(101, Some(48.7)), (102, Some(52.1))]).await?;
//!     let standings = manager.finalize_event(10, FinalizeCommand::default()).await?;
//!     println!("{} teams ranked", standings.len());
//!
//!     Ok(())
//! }
//! ```

pub mod manager;
pub mod models;

pub use manager::{EventError, EventManager, EventResult};
pub use models::{Event, EventFormat, EventStatus, FinalizeCommand};
