// Lineup grids, assignment rules and the saved-lineup collection

pub mod assignment;
pub mod grid;
pub mod saved;

pub use assignment::{AssignmentRules, Outcome, Rejection, SlotSource, MAX_ATHLETES_IN_LINEUP};
pub use grid::{
    EventRow, LineupGrid, SlotKind, ALL_AROUND_SLOT, ALTERNATE_SLOT, MAIN_SLOTS, SLOTS_PER_EVENT,
};
pub use saved::{SavedLineup, SavedLineupCollection};
