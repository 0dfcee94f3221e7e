//! Roster Store
//!
//! Holds the known athletes and their per-event metrics. Every edit that
//! takes something away returns a [`RosterDelta`]; the caller is responsible
//! for handing it to the saved lineups in the same step.

mod delta;

pub use delta::RosterDelta;

use crate::error::{LineupError, Result};
use crate::models::{Athlete, AthleteId, EventCatalog, EventMetrics, Metric};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Names seeded into a fresh roster
pub const DEFAULT_ROSTER_NAMES: [&str; 24] = [
    "Boone Washburn",
    "Caden Clinton",
    "Chase Davenport-Mills",
    "Danila Leykin",
    "David Rauch",
    "Dexter Roettker",
    "Eli Hoban",
    "Euan Sullivan",
    "Garrett Schooley",
    "Hasan Aydogdu",
    "Jaren Gibble",
    "Kai Uemura",
    "Kiran Mandava",
    "Landon Wu",
    "Max O'Claer",
    "Maxwell Odden",
    "Nathan Grigsby",
    "Preston Ngai",
    "Solen Chiodi",
    "Tristan Flores",
    "Troy Nako",
    "Vahe Petrosyan",
    "Wade Nelson",
    "Xander Hong",
];

/// Anything that can hand over a full athlete list (a remote store, an editor)
pub trait RosterSource {
    fn list_athletes(&self) -> Vec<Athlete>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterStore {
    athletes: Vec<Athlete>,
}

impl RosterSource for RosterStore {
    fn list_athletes(&self) -> Vec<Athlete> {
        self.athletes.clone()
    }
}

impl RosterStore {
    pub fn new(athletes: Vec<Athlete>) -> Result<Self> {
        let mut store = Self::default();
        for athlete in athletes {
            store.insert(athlete)?;
        }
        Ok(store)
    }

    /// 24 named athletes with no events, ids `athlete-default-<n>`
    pub fn default_roster() -> Self {
        let athletes = DEFAULT_ROSTER_NAMES
            .iter()
            .enumerate()
            .map(|(idx, name)| Athlete::new(AthleteId::new(format!("athlete-default-{}", idx)), *name))
            .collect();
        Self { athletes }
    }

    pub fn get(&self, id: &AthleteId) -> Option<&Athlete> {
        self.athletes.iter().find(|a| &a.id == id)
    }

    pub fn contains(&self, id: &AthleteId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Athlete> {
        self.athletes.iter()
    }

    pub fn athletes(&self) -> &[Athlete] {
        &self.athletes
    }

    pub fn len(&self) -> usize {
        self.athletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.athletes.is_empty()
    }

    pub fn insert(&mut self, athlete: Athlete) -> Result<()> {
        if self.contains(&athlete.id) {
            return Err(LineupError::InvalidParameter(format!(
                "athlete id '{}' already on roster",
                athlete.id
            )));
        }
        for metrics in athlete.events.values() {
            metrics.validate()?;
        }
        self.athletes.push(athlete);
        Ok(())
    }

    /// Appends a blank athlete with a generated id and returns that id
    pub fn add_athlete(&mut self, name: impl Into<String>) -> AthleteId {
        let athlete = Athlete::new(AthleteId::generate(), name);
        let id = athlete.id.clone();
        debug!(athlete = %id, "athlete added");
        self.athletes.push(athlete);
        id
    }

    pub fn rename_athlete(&mut self, id: &AthleteId, name: impl Into<String>) -> Result<()> {
        let athlete = self.get_mut(id)?;
        athlete.name = name.into();
        Ok(())
    }

    /// Enrolls the athlete in an event or replaces their metrics there
    pub fn set_event_metrics(
        &mut self,
        id: &AthleteId,
        abbr: &str,
        metrics: EventMetrics,
        catalog: &EventCatalog,
    ) -> Result<()> {
        if catalog.by_abbr(abbr).is_none() {
            return Err(LineupError::UnknownEvent(abbr.to_string()));
        }
        metrics.validate()?;
        let athlete = self.get_mut(id)?;
        athlete.events.insert(abbr.to_string(), metrics);
        Ok(())
    }

    /// Drops an event from the athlete's metrics. Revoking an event the
    /// athlete never had is not an error and yields an empty delta.
    pub fn revoke_event(&mut self, id: &AthleteId, abbr: &str) -> Result<RosterDelta> {
        let athlete = self.get_mut(id)?;
        if athlete.events.remove(abbr).is_some() {
            debug!(athlete = %id, abbr, "event participation revoked");
            Ok(RosterDelta::revoked(id.clone(), abbr))
        } else {
            Ok(RosterDelta::default())
        }
    }

    pub fn remove_athlete(&mut self, id: &AthleteId) -> Result<RosterDelta> {
        let idx = self
            .athletes
            .iter()
            .position(|a| &a.id == id)
            .ok_or_else(|| LineupError::UnknownAthlete(id.to_string()))?;
        self.athletes.remove(idx);
        debug!(athlete = %id, "athlete removed");
        Ok(RosterDelta::removed(id.clone()))
    }

    /// Bulk replacement from a roster editor.
    ///
    /// Rows whose trimmed name is blank are discarded. The delta lists every
    /// athlete that disappeared plus every event an existing athlete lost.
    pub fn replace_all(&mut self, rows: Vec<Athlete>) -> Result<RosterDelta> {
        let mut next = Vec::with_capacity(rows.len());
        let mut seen = HashSet::new();
        for mut row in rows {
            row.name = row.name.trim().to_string();
            if row.name.is_empty() {
                continue;
            }
            if !seen.insert(row.id.clone()) {
                return Err(LineupError::InvalidParameter(format!(
                    "athlete id '{}' appears twice",
                    row.id
                )));
            }
            for metrics in row.events.values() {
                metrics.validate()?;
            }
            next.push(row);
        }

        let delta = Self::diff(&self.athletes, &next);
        self.athletes = next;
        debug!(
            removed = delta.removed.len(),
            revoked = delta.revoked.len(),
            "roster replaced"
        );
        Ok(delta)
    }

    /// Alphabetical by name, case-insensitive
    pub fn sort_by_name(&mut self) {
        self.athletes.sort_by_key(|a| a.name.to_lowercase());
    }

    /// Athletes competing in `abbr`, best first by the chosen metric
    pub fn specialists(&self, abbr: &str, metric: Metric) -> Vec<&Athlete> {
        let mut specialists: Vec<(&Athlete, f64)> = self
            .athletes
            .iter()
            .filter_map(|a| a.metrics_for(abbr).map(|m| (a, m.value(metric))))
            .collect();
        specialists.sort_by(|a, b| b.1.total_cmp(&a.1));
        specialists.into_iter().map(|(a, _)| a).collect()
    }

    fn get_mut(&mut self, id: &AthleteId) -> Result<&mut Athlete> {
        self.athletes
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| LineupError::UnknownAthlete(id.to_string()))
    }

    fn diff(before: &[Athlete], after: &[Athlete]) -> RosterDelta {
        let mut delta = RosterDelta::default();
        for old in before {
            match after.iter().find(|a| a.id == old.id) {
                None => {
                    delta.removed.insert(old.id.clone());
                }
                Some(new) => {
                    for abbr in old.events.keys() {
                        if !new.events.contains_key(abbr) {
                            delta.revoked.insert((old.id.clone(), abbr.clone()));
                        }
                    }
                }
            }
        }
        delta
    }
}
