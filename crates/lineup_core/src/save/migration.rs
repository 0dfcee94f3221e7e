use super::error::SaveError;
use super::format::{PackedSnapshot, Snapshot};
use super::SNAPSHOT_VERSION;
use crate::lineup::SavedLineup;
use crate::models::{AthleteId, EventCatalog, LineupId};
use serde::Serialize;
use std::collections::HashSet;

/// What [`repair_snapshot`] had to fix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub rows_added: usize,
    pub rows_dropped: usize,
    pub dangling_cleared: usize,
    pub duplicates_cleared: usize,
    pub lineup_created: bool,
    pub active_reset: bool,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Accepts envelopes from this version only; there is no older packed layout
pub fn migrate_packed(envelope: PackedSnapshot) -> Result<Snapshot, SaveError> {
    match envelope.version {
        SNAPSHOT_VERSION => Ok(envelope.snapshot),
        found => Err(SaveError::VersionMismatch { found, expected: SNAPSHOT_VERSION }),
    }
}

/// Brings foreign data in line with the engine's invariants:
///
/// 1. every grid has exactly the catalog's rows, in catalog order
/// 2. no athlete twice in one row (later copies cleared)
/// 3. no slot references an athlete missing from the roster
/// 4. at least one lineup, and the active id names one of them
pub fn repair_snapshot(snapshot: &mut Snapshot, catalog: &EventCatalog, default_title: &str) -> RepairReport {
    let mut report = RepairReport::default();
    let roster: HashSet<&AthleteId> = snapshot.athletes.iter().map(|a| &a.id).collect();

    for (lineup_id, saved) in snapshot.saved_lineups.iter_mut() {
        let (added, dropped) = saved.lineup.conform_to(catalog);
        report.rows_added += added;
        report.rows_dropped += dropped;
        report.duplicates_cleared += saved.lineup.dedupe_rows();

        let dangling = saved.lineup.clear_where(|_, athlete| !roster.contains(athlete));
        if dangling > 0 {
            log::warn!("Lineup '{}' referenced {} unknown athlete slot(s), cleared", lineup_id, dangling);
        }
        report.dangling_cleared += dangling;
    }

    if snapshot.saved_lineups.is_empty() {
        let id = LineupId::generate();
        snapshot.saved_lineups.insert(id.clone(), SavedLineup::new(default_title, catalog));
        snapshot.active_lineup_id = Some(id);
        report.lineup_created = true;
    }

    let active_ok = snapshot
        .active_lineup_id
        .as_ref()
        .is_some_and(|id| snapshot.saved_lineups.contains_key(id));
    if !active_ok {
        snapshot.active_lineup_id = snapshot.saved_lineups.keys().next().cloned();
        report.active_reset = true;
    }

    if !report.is_clean() {
        log::info!("Snapshot repaired: {:?}", report);
    }
    report
}
