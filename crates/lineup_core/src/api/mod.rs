// Command boundary for UI clients
// One tagged command per request, answered with an Outcome

pub mod lineup_json;

pub use lineup_json::{execute_command_json, snapshot_json, summary_json, CommandResponse, SummaryResponse};

use crate::lineup::{Outcome, SlotSource};
use crate::models::{AthleteId, EventId, LineupId};
use crate::state::LineupEngine;
use serde::{Deserialize, Serialize};

/// A single UI event against the active lineup or the saved-lineup collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Place {
        event_id: EventId,
        athlete_id: AthleteId,
    },
    MoveOrSwap {
        source: SlotSource,
        target_event_id: EventId,
        target_slot_index: usize,
        athlete_id: AthleteId,
    },
    RemoveFromSlot {
        event_id: EventId,
        slot_index: usize,
    },
    ClearEvent {
        event_id: EventId,
    },
    ResetAll,
    CreateLineup {
        /// Falls back to the configured default title
        #[serde(default)]
        title: Option<String>,
    },
    RenameLineup {
        title: String,
    },
    SetActiveLineup {
        lineup_id: LineupId,
    },
    DeleteLineup,
}

impl LineupEngine {
    pub fn execute(&mut self, command: Command) -> Outcome {
        match command {
            Command::Place { event_id, athlete_id } => self.place(&event_id, &athlete_id),
            Command::MoveOrSwap { source, target_event_id, target_slot_index, athlete_id } => {
                self.move_or_swap(&source, &target_event_id, target_slot_index, &athlete_id)
            }
            Command::RemoveFromSlot { event_id, slot_index } => self.remove_from_slot(&event_id, slot_index),
            Command::ClearEvent { event_id } => self.clear_event(&event_id),
            Command::ResetAll => self.reset_all(),
            Command::CreateLineup { title } => {
                let title = title.unwrap_or_else(|| self.config().default_lineup_title.clone());
                self.create_lineup(title);
                Outcome::Accepted
            }
            Command::RenameLineup { title } => self.rename_active_lineup(title),
            Command::SetActiveLineup { lineup_id } => self.set_active_lineup(&lineup_id),
            Command::DeleteLineup => self.delete_active_lineup(),
        }
    }
}
