use crate::models::{AthleteId, EventCatalog, EventId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Slots per event row: 4 main + all-around + alternate
pub const SLOTS_PER_EVENT: usize = 6;
/// Indices `0..MAIN_SLOTS` count toward the cap and team scoring
pub const MAIN_SLOTS: usize = 4;
pub const ALL_AROUND_SLOT: usize = 4;
pub const ALTERNATE_SLOT: usize = 5;

pub type EventRow = [Option<AthleteId>; SLOTS_PER_EVENT];

const EMPTY_ROW: EventRow = [None, None, None, None, None, None];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Main,
    AllAround,
    Alternate,
}

impl SlotKind {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            i if i < MAIN_SLOTS => Some(SlotKind::Main),
            ALL_AROUND_SLOT => Some(SlotKind::AllAround),
            ALTERNATE_SLOT => Some(SlotKind::Alternate),
            _ => None,
        }
    }

    pub fn is_main(self) -> bool {
        self == SlotKind::Main
    }
}

/// One row of six slots per catalog event.
///
/// Rows are shared behind `Arc` and copied on write, so cloning a grid to
/// stage a mutation only duplicates the row that is actually touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineupGrid {
    rows: IndexMap<EventId, Arc<EventRow>>,
}

impl LineupGrid {
    /// All-empty grid with a row for every catalog event, in catalog order
    pub fn empty(catalog: &EventCatalog) -> Self {
        let empty = Arc::new(EMPTY_ROW);
        let rows = catalog.ids().map(|id| (id.clone(), Arc::clone(&empty))).collect();
        Self { rows }
    }

    pub fn row(&self, event_id: &EventId) -> Option<&EventRow> {
        self.rows.get(event_id).map(|row| row.as_ref())
    }

    pub fn rows(&self) -> impl Iterator<Item = (&EventId, &EventRow)> {
        self.rows.iter().map(|(id, row)| (id, row.as_ref()))
    }

    pub fn has_event(&self, event_id: &EventId) -> bool {
        self.rows.contains_key(event_id)
    }

    pub fn occupant(&self, event_id: &EventId, slot_index: usize) -> Option<&AthleteId> {
        self.row(event_id)?.get(slot_index)?.as_ref()
    }

    /// Writes one slot. Returns false when the address does not exist.
    pub fn set_slot(&mut self, event_id: &EventId, slot_index: usize, athlete: Option<AthleteId>) -> bool {
        if slot_index >= SLOTS_PER_EVENT {
            return false;
        }
        match self.rows.get_mut(event_id) {
            Some(row) => {
                Arc::make_mut(row)[slot_index] = athlete;
                true
            }
            None => false,
        }
    }

    pub fn clear_row(&mut self, event_id: &EventId) -> bool {
        match self.rows.get_mut(event_id) {
            Some(row) => {
                *row = Arc::new(EMPTY_ROW);
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        let empty = Arc::new(EMPTY_ROW);
        for row in self.rows.values_mut() {
            *row = Arc::clone(&empty);
        }
    }

    pub fn row_contains(&self, event_id: &EventId, athlete: &AthleteId) -> bool {
        self.row(event_id)
            .is_some_and(|row| row.iter().any(|slot| slot.as_ref() == Some(athlete)))
    }

    pub fn first_empty_slot(&self, event_id: &EventId) -> Option<usize> {
        self.row(event_id)?.iter().position(Option::is_none)
    }

    /// Distinct athletes occupying main slots across every event
    pub fn main_athletes(&self) -> BTreeSet<&AthleteId> {
        self.rows
            .values()
            .flat_map(|row| row[..MAIN_SLOTS].iter().flatten())
            .collect()
    }

    pub fn unique_main_count(&self) -> usize {
        self.main_athletes().len()
    }

    /// Slots the athlete occupies anywhere in the grid
    pub fn usage_count(&self, athlete: &AthleteId) -> usize {
        self.rows
            .values()
            .flat_map(|row| row.iter())
            .filter(|slot| slot.as_ref() == Some(athlete))
            .count()
    }

    /// Empties every slot for which `predicate(event_id, occupant)` holds.
    /// Rows with no match are left shared. Returns the number of cleared slots.
    pub fn clear_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&EventId, &AthleteId) -> bool,
    {
        let mut cleared = 0;
        for (event_id, row) in self.rows.iter_mut() {
            let hits: Vec<usize> = row
                .iter()
                .enumerate()
                .filter_map(|(idx, slot)| match slot {
                    Some(athlete) if predicate(event_id, athlete) => Some(idx),
                    _ => None,
                })
                .collect();
            if hits.is_empty() {
                continue;
            }
            let row = Arc::make_mut(row);
            for idx in hits {
                row[idx] = None;
                cleared += 1;
            }
        }
        cleared
    }

    /// True when some athlete appears twice within one event row
    pub fn has_duplicates(&self) -> bool {
        self.rows.values().any(|row| {
            let mut seen = BTreeSet::new();
            row.iter().flatten().any(|athlete| !seen.insert(athlete))
        })
    }

    /// True when the rows are exactly the catalog events, in catalog order
    pub fn matches_catalog(&self, catalog: &EventCatalog) -> bool {
        self.rows.len() == catalog.len() && self.rows.keys().zip(catalog.ids()).all(|(a, b)| a == b)
    }

    /// Reshapes the grid to the catalog: unknown rows are dropped, missing
    /// rows are added empty, order follows the catalog. Returns
    /// `(rows_added, rows_dropped)`.
    pub fn conform_to(&mut self, catalog: &EventCatalog) -> (usize, usize) {
        let mut old = std::mem::take(&mut self.rows);
        let mut added = 0;
        for id in catalog.ids() {
            let row = old.shift_remove(id).unwrap_or_else(|| {
                added += 1;
                Arc::new(EMPTY_ROW)
            });
            self.rows.insert(id.clone(), row);
        }
        (added, old.len())
    }

    /// Clears the later copy of any athlete repeated within a row
    pub(crate) fn dedupe_rows(&mut self) -> usize {
        let mut cleared = 0;
        for row in self.rows.values_mut() {
            let repeats: Vec<usize> = {
                let mut seen = BTreeSet::new();
                row.iter()
                    .enumerate()
                    .filter_map(|(idx, slot)| slot.as_ref().filter(|a| !seen.insert(*a)).map(|_| idx))
                    .collect()
            };
            if repeats.is_empty() {
                continue;
            }
            let row = Arc::make_mut(row);
            for idx in repeats {
                row[idx] = None;
                cleared += 1;
            }
        }
        cleared
    }
}
