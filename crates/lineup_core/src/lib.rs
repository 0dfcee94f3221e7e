//! # lineup_core - Gymnastics Lineup Assignment Engine
//!
//! Assigns athletes to per-event slots across a set of named lineups and
//! computes event and team totals from their metrics.
//!
//! ## Features
//! - Six slots per event: four main, one all-around, one alternate
//! - Duplicate, row-full and 12-athlete main-slot cap checks; rejected
//!   commands never change state
//! - Saved lineups with an active pointer; roster edits clear stale slots
//!   in every lineup
//! - Snapshot persistence as JSON or packed MessagePack + LZ4
//! - JSON command API for UI clients

pub mod api;
pub mod config;
pub mod error;
pub mod lineup;
pub mod models;
pub mod roster;
pub mod save;
pub mod state;
pub mod summary;

pub use api::{execute_command_json, snapshot_json, summary_json, Command};
pub use config::EngineConfig;
pub use error::{LineupError, Result};
pub use lineup::{Outcome, Rejection, SlotSource};
pub use models::{Athlete, AthleteId, EventId, EventMetrics, LineupId, Metric};
pub use state::LineupEngine;
