//! Aggregation over the main slots of a lineup.
//!
//! Pure functions of (grid, roster, catalog); nothing here is cached, so every
//! read reflects the last committed state.

use crate::lineup::{LineupGrid, MAIN_SLOTS};
use crate::models::{EventCatalog, EventDefinition, EventId, Metric};
use crate::roster::RosterStore;
use serde::{Deserialize, Serialize};

/// A computed total with its display form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTotal {
    pub metric: Metric,
    pub label: String,
    /// Sum for d_score / avg_score, mean for consistency
    pub value: f64,
    /// Number of (athlete, event) pairs that contributed
    pub contributors: usize,
    pub display: String,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    d_score: f64,
    consistency: f64,
    avg_score: f64,
    count: usize,
}

impl Accumulator {
    fn add_event(&mut self, grid: &LineupGrid, roster: &RosterStore, event: &EventDefinition) {
        let Some(row) = grid.row(&event.id) else {
            return;
        };
        for athlete_id in row[..MAIN_SLOTS].iter().flatten() {
            let metrics = roster.get(athlete_id).and_then(|a| a.metrics_for(&event.abbr));
            if let Some(m) = metrics {
                self.d_score += m.d_score;
                self.consistency += m.consistency;
                self.avg_score += m.avg_score;
                self.count += 1;
            }
        }
    }

    fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::DScore => self.d_score,
            Metric::AvgScore => self.avg_score,
            Metric::Consistency if self.count == 0 => 0.0,
            Metric::Consistency => self.consistency / self.count as f64,
        }
    }
}

/// "5.4", "87.5%", "13.25"
pub fn format_metric(metric: Metric, value: f64) -> String {
    match metric {
        Metric::DScore => format!("{:.1}", round_half_up(value, 1)),
        Metric::Consistency => format!("{:.1}%", round_half_up(value, 1)),
        Metric::AvgScore => format!("{:.2}", round_half_up(value, 2)),
    }
}

/// `{:.N}` alone rounds exact ties to even; ties go away from zero here.
fn round_half_up(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

pub fn event_label(metric: Metric) -> &'static str {
    match metric {
        Metric::DScore => "Total D-Score",
        Metric::Consistency => "Avg. Consistency",
        Metric::AvgScore => "Total Avg. Score",
    }
}

pub fn team_label(metric: Metric) -> &'static str {
    match metric {
        Metric::DScore => "Total Team D-Score",
        Metric::Consistency => "Team Average Consistency",
        Metric::AvgScore => "Total Team Average Score",
    }
}

fn total(acc: &Accumulator, metric: Metric, label: &str) -> MetricTotal {
    let value = acc.value(metric);
    MetricTotal {
        metric,
        label: label.to_string(),
        value,
        contributors: acc.count,
        display: format_metric(metric, value),
    }
}

/// Total of one event's main slots. `None` when the event is not in the catalog.
///
/// Athletes without metrics for the event contribute nothing and do not
/// count toward the consistency mean.
pub fn event_total(
    grid: &LineupGrid,
    roster: &RosterStore,
    catalog: &EventCatalog,
    event_id: &EventId,
    metric: Metric,
) -> Option<MetricTotal> {
    let event = catalog.get(event_id)?;
    let mut acc = Accumulator::default();
    acc.add_event(grid, roster, event);
    Some(total(&acc, metric, event_label(metric)))
}

/// Team-wide total over every event's main slots. Consistency is one mean
/// over all contributing pairs, not a mean of per-event means.
pub fn team_summary(grid: &LineupGrid, roster: &RosterStore, catalog: &EventCatalog, metric: Metric) -> MetricTotal {
    let mut acc = Accumulator::default();
    for event in catalog.iter() {
        acc.add_event(grid, roster, event);
    }
    total(&acc, metric, team_label(metric))
}
