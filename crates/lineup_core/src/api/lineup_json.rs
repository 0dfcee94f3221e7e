// JSON request/response functions for UI clients
// Every function returns a JSON string; failures are reported in-band

use super::Command;
use crate::lineup::Outcome;
use crate::models::{EventId, LineupId};
use crate::state::LineupEngine;
use crate::summary::MetricTotal;
use serde::{Deserialize, Serialize};

const SERIALIZATION_FAILED: &str = r#"{"success":false,"error":"Serialization failed"}"#;

// ========== Request/Response Structures ==========

#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    pub outcome: Option<Outcome>,
    pub active_lineup_id: LineupId,
    /// Distinct athletes in main slots of the active lineup
    pub unique_count: usize,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventTotalView {
    pub event_id: EventId,
    pub abbr: String,
    pub total: MetricTotal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub lineup_id: LineupId,
    pub title: String,
    pub unique_count: usize,
    pub max_main_athletes: usize,
    pub events: Vec<EventTotalView>,
    pub team: MetricTotal,
}

// ========== Public API Functions ==========

/// Parses one [`Command`], applies it and reports the outcome
pub fn execute_command_json(engine: &mut LineupEngine, request_json: &str) -> String {
    let response = match serde_json::from_str::<Command>(request_json) {
        Ok(command) => {
            let outcome = engine.execute(command);
            CommandResponse {
                success: outcome.is_accepted(),
                error: outcome.rejection().map(|reason| reason.to_string()),
                outcome: Some(outcome),
                active_lineup_id: engine.active_lineup_id().clone(),
                unique_count: engine.unique_main_count(),
            }
        }
        Err(e) => CommandResponse {
            success: false,
            outcome: None,
            active_lineup_id: engine.active_lineup_id().clone(),
            unique_count: engine.unique_main_count(),
            error: Some(format!("Invalid request format: {}", e)),
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|_| SERIALIZATION_FAILED.to_string())
}

/// Per-event totals and the team summary in the engine's display metrics
pub fn summary_json(engine: &LineupEngine) -> String {
    let events = engine
        .catalog()
        .iter()
        .filter_map(|event| {
            engine.event_total(&event.id).map(|total| EventTotalView {
                event_id: event.id.clone(),
                abbr: event.abbr.clone(),
                total,
            })
        })
        .collect();

    let response = SummaryResponse {
        success: true,
        lineup_id: engine.active_lineup_id().clone(),
        title: engine.lineups().active().title.clone(),
        unique_count: engine.unique_main_count(),
        max_main_athletes: engine.rules().max_main_athletes,
        events,
        team: engine.team_summary(),
    };

    serde_json::to_string(&response).unwrap_or_else(|_| SERIALIZATION_FAILED.to_string())
}

/// Full snapshot in its persisted JSON shape
pub fn snapshot_json(engine: &LineupEngine) -> String {
    engine.snapshot().to_json().unwrap_or_else(|_| SERIALIZATION_FAILED.to_string())
}
