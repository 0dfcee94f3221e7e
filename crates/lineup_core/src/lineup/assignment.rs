//! Assignment rules for one lineup grid.
//!
//! Every operation stages its change on a copy of the grid and hands the copy
//! back only when all checks pass. The caller swaps it in; a rejection leaves
//! the caller's grid untouched.

use super::grid::{LineupGrid, SLOTS_PER_EVENT};
use crate::models::{AthleteId, EventId, LineupId};
use crate::roster::RosterStore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distinct athletes allowed across all main slots of one lineup
pub const MAX_ATHLETES_IN_LINEUP: usize = 12;

/// Where a dragged athlete came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SlotSource {
    /// The athlete pool; whoever sits in the target slot is displaced back to it
    #[serde(rename = "pool")]
    Unplaced,
    Slot { event_id: EventId, slot_index: usize },
}

impl SlotSource {
    pub fn slot(event_id: impl Into<EventId>, slot_index: usize) -> Self {
        SlotSource::Slot { event_id: event_id.into(), slot_index }
    }
}

/// Why an operation left the lineup unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    DuplicateInEvent,
    CapExceeded { limit: usize },
    RowFull,
    /// Dropped back onto the slot it was dragged from
    SameSlot,
    /// The drag source slot does not hold the dragged athlete
    SourceMismatch,
    UnknownEvent { event_id: EventId },
    InvalidSlot { slot_index: usize },
    UnknownAthlete { athlete_id: AthleteId },
    UnknownLineup { lineup_id: LineupId },
    LastLineup,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::DuplicateInEvent => write!(f, "Athlete is already in this event"),
            Rejection::CapExceeded { limit } => {
                write!(f, "Lineup already has {} athletes in main slots", limit)
            }
            Rejection::RowFull => write!(f, "No open slot in this event"),
            Rejection::SameSlot => write!(f, "Athlete dropped on the slot it came from"),
            Rejection::SourceMismatch => write!(f, "Drag source does not hold this athlete"),
            Rejection::UnknownEvent { event_id } => write!(f, "Unknown event: {}", event_id),
            Rejection::InvalidSlot { slot_index } => write!(f, "Invalid slot index: {}", slot_index),
            Rejection::UnknownAthlete { athlete_id } => write!(f, "Unknown athlete: {}", athlete_id),
            Rejection::UnknownLineup { lineup_id } => write!(f, "Unknown lineup: {}", lineup_id),
            Rejection::LastLineup => write!(f, "Cannot delete the only saved lineup"),
        }
    }
}

/// Result of an engine command. Rejections never mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[must_use]
pub enum Outcome {
    Accepted,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Accepted => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }
}

impl<T> From<Result<T, Rejection>> for Outcome {
    fn from(result: Result<T, Rejection>) -> Self {
        match result {
            Ok(_) => Outcome::Accepted,
            Err(reason) => Outcome::Rejected(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentRules {
    pub max_main_athletes: usize,
}

impl Default for AssignmentRules {
    fn default() -> Self {
        Self { max_main_athletes: MAX_ATHLETES_IN_LINEUP }
    }
}

impl AssignmentRules {
    pub fn new(max_main_athletes: usize) -> Self {
        Self { max_main_athletes }
    }

    /// Quick add: first empty slot of the event row, main slots first
    pub fn place(
        &self,
        grid: &LineupGrid,
        roster: &RosterStore,
        event_id: &EventId,
        athlete_id: &AthleteId,
    ) -> Result<LineupGrid, Rejection> {
        ensure_event(grid, event_id)?;
        ensure_athlete(roster, athlete_id)?;

        if grid.row_contains(event_id, athlete_id) {
            return Err(Rejection::DuplicateInEvent);
        }
        let slot_index = grid.first_empty_slot(event_id).ok_or(Rejection::RowFull)?;

        let mut staged = grid.clone();
        staged.set_slot(event_id, slot_index, Some(athlete_id.clone()));
        self.check_cap(grid, &staged)?;
        Ok(staged)
    }

    /// Drag-and-drop: the target slot gets the athlete and, when dragged out
    /// of a slot, the previous target occupant takes that slot (a swap).
    pub fn move_or_swap(
        &self,
        grid: &LineupGrid,
        roster: &RosterStore,
        source: &SlotSource,
        target_event_id: &EventId,
        target_slot_index: usize,
        athlete_id: &AthleteId,
    ) -> Result<LineupGrid, Rejection> {
        ensure_slot(grid, target_event_id, target_slot_index)?;
        if let SlotSource::Slot { event_id, slot_index } = source {
            ensure_slot(grid, event_id, *slot_index)?;
            if event_id == target_event_id && *slot_index == target_slot_index {
                return Err(Rejection::SameSlot);
            }
            if grid.occupant(event_id, *slot_index) != Some(athlete_id) {
                return Err(Rejection::SourceMismatch);
            }
        }
        ensure_athlete(roster, athlete_id)?;

        let within_target_event =
            matches!(source, SlotSource::Slot { event_id, .. } if event_id == target_event_id);
        if grid.row_contains(target_event_id, athlete_id) && !within_target_event {
            return Err(Rejection::DuplicateInEvent);
        }

        let mut staged = grid.clone();
        let occupant = grid.occupant(target_event_id, target_slot_index).cloned();
        staged.set_slot(target_event_id, target_slot_index, Some(athlete_id.clone()));

        if let SlotSource::Slot { event_id, slot_index } = source {
            staged.set_slot(event_id, *slot_index, occupant.clone());
            // The displaced athlete may already sit elsewhere in the source row
            if event_id != target_event_id {
                if let Some(displaced) = &occupant {
                    let copies = staged
                        .row(event_id)
                        .map_or(0, |row| row.iter().filter(|s| s.as_ref() == Some(displaced)).count());
                    if copies > 1 {
                        return Err(Rejection::DuplicateInEvent);
                    }
                }
            }
        }

        self.check_cap(grid, &staged)?;
        Ok(staged)
    }

    pub fn remove_from_slot(
        &self,
        grid: &LineupGrid,
        event_id: &EventId,
        slot_index: usize,
    ) -> Result<LineupGrid, Rejection> {
        ensure_slot(grid, event_id, slot_index)?;
        let mut staged = grid.clone();
        staged.set_slot(event_id, slot_index, None);
        Ok(staged)
    }

    pub fn clear_event(&self, grid: &LineupGrid, event_id: &EventId) -> Result<LineupGrid, Rejection> {
        ensure_event(grid, event_id)?;
        let mut staged = grid.clone();
        staged.clear_row(event_id);
        Ok(staged)
    }

    pub fn reset_all(&self, grid: &LineupGrid) -> LineupGrid {
        let mut staged = grid.clone();
        staged.clear_all();
        staged
    }

    /// Rejects a change that pushes the main-slot count past the cap by
    /// bringing in someone who held no main slot before. Only main-slot
    /// occupancy counts as "already in"; all-around and alternate do not.
    fn check_cap(&self, before: &LineupGrid, after: &LineupGrid) -> Result<(), Rejection> {
        let after_main = after.main_athletes();
        if after_main.len() <= self.max_main_athletes {
            return Ok(());
        }
        let before_main = before.main_athletes();
        if after_main.iter().any(|athlete| !before_main.contains(athlete)) {
            return Err(Rejection::CapExceeded { limit: self.max_main_athletes });
        }
        Ok(())
    }
}

fn ensure_event(grid: &LineupGrid, event_id: &EventId) -> Result<(), Rejection> {
    if grid.has_event(event_id) {
        Ok(())
    } else {
        Err(Rejection::UnknownEvent { event_id: event_id.clone() })
    }
}

fn ensure_slot(grid: &LineupGrid, event_id: &EventId, slot_index: usize) -> Result<(), Rejection> {
    ensure_event(grid, event_id)?;
    if slot_index < SLOTS_PER_EVENT {
        Ok(())
    } else {
        Err(Rejection::InvalidSlot { slot_index })
    }
}

fn ensure_athlete(roster: &RosterStore, athlete_id: &AthleteId) -> Result<(), Rejection> {
    if roster.contains(athlete_id) {
        Ok(())
    } else {
        Err(Rejection::UnknownAthlete { athlete_id: athlete_id.clone() })
    }
}
