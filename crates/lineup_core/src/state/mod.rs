//! Lineup Engine
//!
//! [`LineupEngine`] owns everything a lineup builder session works on: the
//! event catalog, the roster, the saved lineups and the display preferences.
//! There is no global instance; callers create one and route every UI event
//! through it.
//!
//! Grid edits go through [`AssignmentRules`] on a staged copy and are swapped
//! in only when accepted. Roster edits clear invalidated slots in every saved
//! lineup before returning.

pub mod sync;

pub use sync::{RemoteLineup, RemotePayload, RemoteSlot, SyncTicket, SyncTracker};

use crate::config::EngineConfig;
use crate::error::{LineupError, Result};
use crate::lineup::{AssignmentRules, LineupGrid, Outcome, Rejection, SavedLineupCollection, SlotSource};
use crate::models::{Athlete, AthleteId, EventCatalog, EventId, EventMetrics, LineupId, Metric};
use crate::roster::{RosterDelta, RosterSource, RosterStore};
use crate::save::{repair_snapshot, PersistenceSink, RepairReport, SaveError, Snapshot};
use crate::summary::{self, MetricTotal};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Which metric each total is shown in. Defaults to d_score everywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayPrefs {
    pub event_metrics: BTreeMap<EventId, Metric>,
    pub summary_metric: Metric,
}

impl DisplayPrefs {
    pub fn metric_for(&self, event_id: &EventId) -> Metric {
        self.event_metrics.get(event_id).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct LineupEngine {
    config: EngineConfig,
    catalog: EventCatalog,
    rules: AssignmentRules,
    roster: RosterStore,
    lineups: SavedLineupCollection,
    prefs: DisplayPrefs,
    sync: SyncTracker,
}

impl LineupEngine {
    /// Fresh session: seed roster (if configured) and one empty lineup
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let catalog = config.catalog()?;
        let roster = if config.seed_default_roster {
            RosterStore::default_roster()
        } else {
            RosterStore::default()
        };
        let lineups = SavedLineupCollection::new(config.default_lineup_title.clone(), &catalog);
        Ok(Self::assemble(config, catalog, roster, lineups))
    }

    /// Restores a session from a snapshot, repairing whatever does not fit
    /// the configured catalog or roster.
    pub fn from_snapshot(config: EngineConfig, mut snapshot: Snapshot) -> Result<(Self, RepairReport)> {
        config.validate()?;
        let catalog = config.catalog()?;
        snapshot.validate()?;

        let report = repair_snapshot(&mut snapshot, &catalog, &config.default_lineup_title);
        if report.dangling_cleared > 0 {
            warn!(cleared = report.dangling_cleared, "snapshot referenced unknown athletes");
        }

        let roster = RosterStore::new(snapshot.athletes)?;
        let active = snapshot.active_lineup_id.ok_or(LineupError::EmptyCollection)?;
        let lineups = SavedLineupCollection::from_parts(snapshot.saved_lineups, active)?;
        Ok((Self::assemble(config, catalog, roster, lineups), report))
    }

    /// Loads from `sink`, falling back to a fresh session when nothing is
    /// stored or the stored data cannot be used. Only an invalid config fails.
    pub fn load_or_default(config: EngineConfig, sink: &dyn PersistenceSink) -> Result<Self> {
        config.validate()?;
        match sink.load() {
            Ok(Some(snapshot)) => match Self::from_snapshot(config.clone(), snapshot) {
                Ok((engine, _)) => return Ok(engine),
                Err(e) => warn!(error = %e, "stored snapshot rejected, starting fresh"),
            },
            Ok(None) => debug!("no stored snapshot, starting fresh"),
            Err(e) => warn!(error = %e, "failed to load snapshot, starting fresh"),
        }
        Self::new(config)
    }

    fn assemble(
        config: EngineConfig,
        catalog: EventCatalog,
        roster: RosterStore,
        lineups: SavedLineupCollection,
    ) -> Self {
        let rules = AssignmentRules::new(config.max_main_athletes);
        Self { config, catalog, rules, roster, lineups, prefs: DisplayPrefs::default(), sync: SyncTracker::default() }
    }

    pub fn snapshot(&self) -> Snapshot {
        let saved_lineups: IndexMap<_, _> =
            self.lineups.iter().map(|(id, saved)| (id.clone(), saved.clone())).collect();
        Snapshot {
            athletes: self.roster.athletes().to_vec(),
            saved_lineups,
            active_lineup_id: Some(self.lineups.active_id().clone()),
        }
    }

    pub fn save_to(&self, sink: &mut dyn PersistenceSink) -> std::result::Result<(), SaveError> {
        sink.store(&self.snapshot())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &AssignmentRules {
        &self.rules
    }

    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    pub fn lineups(&self) -> &SavedLineupCollection {
        &self.lineups
    }

    pub fn active_lineup_id(&self) -> &LineupId {
        self.lineups.active_id()
    }

    pub fn active_grid(&self) -> &LineupGrid {
        self.lineups.active_grid()
    }

    pub fn prefs(&self) -> &DisplayPrefs {
        &self.prefs
    }

    // ---- Assignment -------------------------------------------------------

    pub fn place(&mut self, event_id: &EventId, athlete_id: &AthleteId) -> Outcome {
        let staged = self.rules.place(self.lineups.active_grid(), &self.roster, event_id, athlete_id);
        self.commit("place", staged)
    }

    pub fn move_or_swap(
        &mut self,
        source: &SlotSource,
        target_event_id: &EventId,
        target_slot_index: usize,
        athlete_id: &AthleteId,
    ) -> Outcome {
        let staged = self.rules.move_or_swap(
            self.lineups.active_grid(),
            &self.roster,
            source,
            target_event_id,
            target_slot_index,
            athlete_id,
        );
        self.commit("move_or_swap", staged)
    }

    pub fn remove_from_slot(&mut self, event_id: &EventId, slot_index: usize) -> Outcome {
        let staged = self.rules.remove_from_slot(self.lineups.active_grid(), event_id, slot_index);
        self.commit("remove_from_slot", staged)
    }

    pub fn clear_event(&mut self, event_id: &EventId) -> Outcome {
        let staged = self.rules.clear_event(self.lineups.active_grid(), event_id);
        self.commit("clear_event", staged)
    }

    pub fn reset_all(&mut self) -> Outcome {
        let staged = self.rules.reset_all(self.lineups.active_grid());
        self.commit("reset_all", Ok(staged))
    }

    fn commit(&mut self, op: &'static str, staged: std::result::Result<LineupGrid, Rejection>) -> Outcome {
        match staged {
            Ok(grid) => {
                self.lineups.replace_active_grid(grid);
                debug!(op, lineup = %self.lineups.active_id(), "accepted");
                Outcome::Accepted
            }
            Err(reason) => {
                debug!(op, %reason, "rejected");
                Outcome::Rejected(reason)
            }
        }
    }

    // ---- Saved lineups ----------------------------------------------------

    pub fn create_lineup(&mut self, title: impl Into<String>) -> LineupId {
        self.lineups.create(title, &self.catalog)
    }

    pub fn rename_active_lineup(&mut self, title: impl Into<String>) -> Outcome {
        self.lineups.rename_active(title);
        Outcome::Accepted
    }

    pub fn set_active_lineup(&mut self, id: &LineupId) -> Outcome {
        self.lineups.set_active(id)
    }

    pub fn delete_active_lineup(&mut self) -> Outcome {
        self.lineups.delete_active()
    }

    // ---- Roster -----------------------------------------------------------

    pub fn add_athlete(&mut self, name: impl Into<String>) -> AthleteId {
        self.roster.add_athlete(name)
    }

    pub fn rename_athlete(&mut self, id: &AthleteId, name: impl Into<String>) -> Result<()> {
        self.roster.rename_athlete(id, name)
    }

    pub fn set_event_metrics(&mut self, id: &AthleteId, abbr: &str, metrics: EventMetrics) -> Result<()> {
        self.roster.set_event_metrics(id, abbr, metrics, &self.catalog)
    }

    /// Returns the number of lineup slots cleared
    pub fn revoke_event(&mut self, id: &AthleteId, abbr: &str) -> Result<usize> {
        let delta = self.roster.revoke_event(id, abbr)?;
        Ok(self.apply_roster_delta(&delta))
    }

    /// Returns the number of lineup slots cleared
    pub fn remove_athlete(&mut self, id: &AthleteId) -> Result<usize> {
        let delta = self.roster.remove_athlete(id)?;
        Ok(self.apply_roster_delta(&delta))
    }

    /// Bulk save from a roster editor. Returns the number of lineup slots cleared.
    pub fn replace_roster(&mut self, rows: Vec<Athlete>) -> Result<usize> {
        let delta = self.roster.replace_all(rows)?;
        Ok(self.apply_roster_delta(&delta))
    }

    pub fn sync_roster_from(&mut self, source: &dyn RosterSource) -> Result<usize> {
        self.replace_roster(source.list_athletes())
    }

    pub fn sort_roster(&mut self) {
        self.roster.sort_by_name();
    }

    /// Clears every slot in every saved lineup that `delta` invalidates
    pub fn apply_roster_delta(&mut self, delta: &RosterDelta) -> usize {
        let cleared = self.lineups.on_roster_changed(delta, &self.catalog);
        if cleared > 0 {
            info!(cleared, "lineup slots cleared after roster change");
        }
        cleared
    }

    // ---- Views ------------------------------------------------------------

    pub fn unique_main_count(&self) -> usize {
        self.active_grid().unique_main_count()
    }

    pub fn usage_count(&self, athlete_id: &AthleteId) -> usize {
        self.active_grid().usage_count(athlete_id)
    }

    /// Athletes with metrics for the event, best first
    pub fn specialists(&self, event_id: &EventId, metric: Metric) -> Result<Vec<&Athlete>> {
        let event = self
            .catalog
            .get(event_id)
            .ok_or_else(|| LineupError::UnknownEvent(event_id.to_string()))?;
        Ok(self.roster.specialists(&event.abbr, metric))
    }

    /// Event total in the event's preferred metric
    pub fn event_total(&self, event_id: &EventId) -> Option<MetricTotal> {
        self.event_total_for(event_id, self.prefs.metric_for(event_id))
    }

    pub fn event_total_for(&self, event_id: &EventId, metric: Metric) -> Option<MetricTotal> {
        summary::event_total(self.active_grid(), &self.roster, &self.catalog, event_id, metric)
    }

    /// Team summary in the preferred summary metric
    pub fn team_summary(&self) -> MetricTotal {
        self.team_summary_for(self.prefs.summary_metric)
    }

    pub fn team_summary_for(&self, metric: Metric) -> MetricTotal {
        summary::team_summary(self.active_grid(), &self.roster, &self.catalog, metric)
    }

    pub fn set_event_display_metric(&mut self, event_id: &EventId, metric: Metric) -> Result<()> {
        if !self.catalog.contains(event_id) {
            return Err(LineupError::UnknownEvent(event_id.to_string()));
        }
        self.prefs.event_metrics.insert(event_id.clone(), metric);
        Ok(())
    }

    pub fn set_summary_display_metric(&mut self, metric: Metric) {
        self.prefs.summary_metric = metric;
    }

    // ---- Remote sync ------------------------------------------------------

    pub fn begin_sync(&mut self) -> SyncTicket {
        self.sync.issue()
    }

    /// Replaces roster and saved lineups with a remote payload in one step.
    /// Stale tickets are refused without touching state.
    pub fn commit_sync(&mut self, ticket: SyncTicket, payload: RemotePayload) -> Result<RepairReport> {
        self.sync.check(ticket)?;

        let mut snapshot = payload.into_snapshot(&self.catalog);
        let report = repair_snapshot(&mut snapshot, &self.catalog, &self.config.default_lineup_title);

        let roster = RosterStore::new(snapshot.athletes)?;
        let active = snapshot.active_lineup_id.ok_or(LineupError::EmptyCollection)?;
        let lineups = SavedLineupCollection::from_parts(snapshot.saved_lineups, active)?;

        self.roster = roster;
        self.lineups = lineups;
        info!(generation = ticket.generation(), lineups = self.lineups.len(), "remote sync committed");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::{ALL_AROUND_SLOT, SLOTS_PER_EVENT};
    use crate::save::MemorySink;

    fn engine() -> LineupEngine {
        LineupEngine::new(EngineConfig::default()).unwrap()
    }

    fn ev(id: &str) -> EventId {
        EventId::new(id)
    }

    fn default_athlete(n: usize) -> AthleteId {
        AthleteId::new(format!("athlete-default-{}", n))
    }

    #[test]
    fn test_fresh_engine() {
        let engine = engine();
        assert_eq!(engine.roster().len(), 24);
        assert_eq!(engine.lineups().len(), 1);
        assert_eq!(engine.lineups().active().title, "Untitled Lineup");
        assert_eq!(engine.unique_main_count(), 0);

        let blank = LineupEngine::new(EngineConfig::blank()).unwrap();
        assert!(blank.roster().is_empty());
    }

    #[test]
    fn test_rejection_leaves_grid_untouched() {
        let mut engine = engine();
        let a1 = default_athlete(1);
        assert!(engine.place(&ev("event-1"), &a1).is_accepted());
        let before = engine.active_grid().clone();

        let outcome = engine.place(&ev("event-1"), &a1);
        assert_eq!(outcome, Outcome::Rejected(Rejection::DuplicateInEvent));
        assert_eq!(engine.active_grid(), &before);

        let outcome = engine.place(&ev("event-1"), &AthleteId::new("nobody"));
        assert!(matches!(outcome, Outcome::Rejected(Rejection::UnknownAthlete { .. })));
        assert_eq!(engine.active_grid(), &before);
    }

    #[test]
    fn test_edits_apply_to_active_lineup_only() {
        let mut engine = engine();
        let first = engine.active_lineup_id().clone();
        let a1 = default_athlete(1);
        assert!(engine.place(&ev("event-2"), &a1).is_accepted());

        let second = engine.create_lineup("Away Meet");
        assert_eq!(engine.active_lineup_id(), &second);
        assert_eq!(engine.usage_count(&a1), 0);

        assert!(engine.set_active_lineup(&first).is_accepted());
        assert_eq!(engine.usage_count(&a1), 1);
    }

    #[test]
    fn test_remove_athlete_clears_every_lineup() {
        let mut engine = engine();
        let a3 = default_athlete(3);
        let a4 = default_athlete(4);
        let vault = ev("event-4");

        assert!(engine.move_or_swap(&SlotSource::Unplaced, &vault, 2, &a3).is_accepted());
        assert!(engine.place(&vault, &a4).is_accepted());
        let other_lineup_grid = engine.active_grid().clone();
        engine.create_lineup("Copy");
        engine.lineups.replace_active_grid(other_lineup_grid);

        assert_eq!(engine.remove_athlete(&a3).unwrap(), 2);
        for (_, saved) in engine.lineups().iter() {
            assert_eq!(saved.lineup.occupant(&vault, 2), None);
            assert_eq!(saved.lineup.occupant(&vault, 0), Some(&a4));
        }
        assert!(engine.remove_athlete(&a3).is_err());
    }

    #[test]
    fn test_revoke_event_clears_only_that_event() {
        let mut engine = engine();
        let a1 = default_athlete(1);
        let metrics = EventMetrics::new(5.0, 80.0, 13.0).unwrap();
        engine.set_event_metrics(&a1, "FX", metrics).unwrap();
        engine.set_event_metrics(&a1, "PH", metrics).unwrap();
        assert!(engine.place(&ev("event-1"), &a1).is_accepted());
        assert!(engine.place(&ev("event-2"), &a1).is_accepted());

        assert_eq!(engine.revoke_event(&a1, "FX").unwrap(), 1);
        assert!(!engine.active_grid().row_contains(&ev("event-1"), &a1));
        assert!(engine.active_grid().row_contains(&ev("event-2"), &a1));
    }

    #[test]
    fn test_prefs_drive_totals() {
        let mut engine = LineupEngine::new(EngineConfig::blank()).unwrap();
        let id = engine.add_athlete("Kai Uemura");
        engine.set_event_metrics(&id, "FX", EventMetrics::new(5.5, 90.0, 13.75).unwrap()).unwrap();
        assert!(engine.place(&ev("event-1"), &id).is_accepted());

        assert_eq!(engine.event_total(&ev("event-1")).unwrap().display, "5.5");
        engine.set_event_display_metric(&ev("event-1"), Metric::Consistency).unwrap();
        assert_eq!(engine.event_total(&ev("event-1")).unwrap().display, "90.0%");
        assert!(engine.set_event_display_metric(&ev("event-9"), Metric::AvgScore).is_err());

        engine.set_summary_display_metric(Metric::AvgScore);
        let summary = engine.team_summary();
        assert_eq!(summary.label, "Total Team Average Score");
        assert_eq!(summary.display, "13.75");
    }

    #[test]
    fn test_specialists_by_event() {
        let mut engine = LineupEngine::new(EngineConfig::blank()).unwrap();
        let low = engine.add_athlete("Low");
        let high = engine.add_athlete("High");
        engine.add_athlete("None");
        engine.set_event_metrics(&low, "SR", EventMetrics::new(4.0, 70.0, 12.0).unwrap()).unwrap();
        engine.set_event_metrics(&high, "SR", EventMetrics::new(5.8, 95.0, 14.1).unwrap()).unwrap();

        let list = engine.specialists(&ev("event-3"), Metric::DScore).unwrap();
        let ids: Vec<&AthleteId> = list.iter().map(|a| &a.id).collect();
        assert_eq!(ids, vec![&high, &low]);
        assert!(engine.specialists(&ev("event-42"), Metric::DScore).is_err());
    }

    #[test]
    fn test_snapshot_round_trip_through_sink() {
        let mut engine = engine();
        assert!(engine.place(&ev("event-5"), &default_athlete(7)).is_accepted());
        engine.create_lineup("Second");
        assert!(engine.rename_active_lineup("Renamed").is_accepted());

        let mut sink = MemorySink::new();
        engine.save_to(&mut sink).unwrap();

        let restored = LineupEngine::load_or_default(EngineConfig::default(), &sink).unwrap();
        assert_eq!(restored.snapshot(), engine.snapshot());
        assert_eq!(restored.lineups().active().title, "Renamed");
    }

    #[test]
    fn test_load_or_default_survives_garbage() {
        let sink = MemorySink::with_bytes("not a snapshot");
        let engine = LineupEngine::load_or_default(EngineConfig::default(), &sink).unwrap();
        assert_eq!(engine.lineups().len(), 1);
        assert_eq!(engine.roster().len(), 24);
    }

    #[test]
    fn test_from_snapshot_repairs_dangling_slots() {
        let engine = engine();
        let mut snapshot = engine.snapshot();
        let active = snapshot.active_lineup_id.clone().unwrap();
        let grid = &mut snapshot.saved_lineups[&active].lineup;
        grid.set_slot(&ev("event-1"), 0, Some(AthleteId::new("ghost")));

        let (restored, report) = LineupEngine::from_snapshot(EngineConfig::default(), snapshot).unwrap();
        assert_eq!(report.dangling_cleared, 1);
        assert_eq!(restored.active_grid().occupant(&ev("event-1"), 0), None);
        for (_, row) in restored.active_grid().rows() {
            assert_eq!(row.len(), SLOTS_PER_EVENT);
        }
    }

    #[test]
    fn test_commit_sync_replaces_state() {
        let mut engine = engine();
        let stale = engine.begin_sync();
        let ticket = engine.begin_sync();

        let payload = RemotePayload {
            athletes: vec![Athlete::new(AthleteId::new("r1"), "Remote One")],
            lineups: vec![RemoteLineup {
                id: LineupId::new("remote-lineup"),
                title: "From Server".to_string(),
                slots: vec![
                    RemoteSlot { event_id: ev("event-1"), slot_index: ALL_AROUND_SLOT, athlete_id: AthleteId::new("r1") },
                    RemoteSlot { event_id: ev("event-2"), slot_index: 0, athlete_id: AthleteId::new("gone") },
                ],
            }],
        };

        let before = engine.snapshot();
        assert!(matches!(
            engine.commit_sync(stale, payload.clone()),
            Err(LineupError::StaleSync { .. })
        ));
        assert_eq!(engine.snapshot(), before);

        let report = engine.commit_sync(ticket, payload).unwrap();
        assert_eq!(report.dangling_cleared, 1);
        assert_eq!(engine.roster().len(), 1);
        assert_eq!(engine.active_lineup_id(), &LineupId::new("remote-lineup"));
        assert_eq!(engine.active_grid().occupant(&ev("event-1"), ALL_AROUND_SLOT), Some(&AthleteId::new("r1")));
    }

    #[test]
    fn test_commit_sync_without_lineups_creates_one() {
        let mut engine = engine();
        let ticket = engine.begin_sync();
        let report = engine.commit_sync(ticket, RemotePayload::default()).unwrap();
        assert!(report.lineup_created);
        assert_eq!(engine.lineups().len(), 1);
        assert_eq!(engine.lineups().active().title, "Untitled Lineup");
    }
}
