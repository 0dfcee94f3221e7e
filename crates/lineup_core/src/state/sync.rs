//! Staging for bulk loads from a remote store.
//!
//! A fetch is started with a ticket; only the newest ticket may commit, so a
//! slow response to an older request is dropped instead of overwriting the
//! newer one.

use crate::error::{LineupError, Result};
use crate::lineup::{LineupGrid, SavedLineup};
use crate::models::{Athlete, AthleteId, EventCatalog, EventId, LineupId};
use crate::save::Snapshot;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Generation number handed out by [`SyncTracker::issue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SyncTicket(u64);

impl SyncTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyncTracker {
    latest: u64,
}

impl SyncTracker {
    pub fn issue(&mut self) -> SyncTicket {
        self.latest += 1;
        SyncTicket(self.latest)
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn check(&self, ticket: SyncTicket) -> Result<()> {
        if ticket.0 != self.latest {
            return Err(LineupError::StaleSync { ticket: ticket.0, latest: self.latest });
        }
        Ok(())
    }
}

/// One occupied slot as a remote store lists it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSlot {
    pub event_id: EventId,
    pub slot_index: usize,
    pub athlete_id: AthleteId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteLineup {
    pub id: LineupId,
    pub title: String,
    #[serde(default)]
    pub slots: Vec<RemoteSlot>,
}

impl RemoteLineup {
    /// Rebuilds full rows from the flat slot list. Slots for unknown events or
    /// past the last index are skipped; the count of skipped slots is returned.
    pub fn into_saved(self, catalog: &EventCatalog) -> (SavedLineup, usize) {
        let mut grid = LineupGrid::empty(catalog);
        let mut skipped = 0;
        for slot in self.slots {
            if !grid.set_slot(&slot.event_id, slot.slot_index, Some(slot.athlete_id)) {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!(lineup = %self.id, skipped, "remote slots outside the catalog skipped");
        }
        (SavedLineup { title: self.title, lineup: grid }, skipped)
    }
}

/// Everything a remote store returns for one team
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemotePayload {
    pub athletes: Vec<Athlete>,
    #[serde(default)]
    pub lineups: Vec<RemoteLineup>,
}

impl RemotePayload {
    /// Assembles an unrepaired snapshot; the first lineup is active
    pub fn into_snapshot(self, catalog: &EventCatalog) -> Snapshot {
        let mut saved_lineups = IndexMap::with_capacity(self.lineups.len());
        for remote in self.lineups {
            let id = remote.id.clone();
            let (saved, _) = remote.into_saved(catalog);
            saved_lineups.insert(id, saved);
        }
        let active_lineup_id = saved_lineups.keys().next().cloned();
        Snapshot { athletes: self.athletes, saved_lineups, active_lineup_id }
    }
}
