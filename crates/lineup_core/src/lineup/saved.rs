use super::assignment::{Outcome, Rejection};
use super::grid::LineupGrid;
use crate::error::{LineupError, Result};
use crate::models::{EventCatalog, LineupId};
use crate::roster::RosterDelta;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLineup {
    pub title: String,
    pub lineup: LineupGrid,
}

impl SavedLineup {
    pub fn new(title: impl Into<String>, catalog: &EventCatalog) -> Self {
        Self { title: title.into(), lineup: LineupGrid::empty(catalog) }
    }
}

/// Named lineups plus the active pointer.
///
/// Never empty, and `active` always names a member. Insertion order is kept
/// so that deleting the active lineup promotes a predictable successor.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedLineupCollection {
    lineups: IndexMap<LineupId, SavedLineup>,
    active: LineupId,
}

impl SavedLineupCollection {
    /// A collection holding one empty lineup
    pub fn new(title: impl Into<String>, catalog: &EventCatalog) -> Self {
        let id = LineupId::generate();
        let mut lineups = IndexMap::new();
        lineups.insert(id.clone(), SavedLineup::new(title, catalog));
        Self { lineups, active: id }
    }

    /// Rebuilds a collection from stored parts. Fails when `lineups` is empty
    /// or `active` is not one of its keys.
    pub fn from_parts(lineups: IndexMap<LineupId, SavedLineup>, active: LineupId) -> Result<Self> {
        if lineups.is_empty() {
            return Err(LineupError::EmptyCollection);
        }
        if !lineups.contains_key(&active) {
            return Err(LineupError::UnknownLineup(active.to_string()));
        }
        Ok(Self { lineups, active })
    }

    pub fn into_parts(self) -> (IndexMap<LineupId, SavedLineup>, LineupId) {
        (self.lineups, self.active)
    }

    pub fn active_id(&self) -> &LineupId {
        &self.active
    }

    pub fn active(&self) -> &SavedLineup {
        // `active` is kept a member by every mutator
        &self.lineups[&self.active]
    }

    pub fn active_grid(&self) -> &LineupGrid {
        &self.active().lineup
    }

    pub fn get(&self, id: &LineupId) -> Option<&SavedLineup> {
        self.lineups.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LineupId, &SavedLineup)> {
        self.lineups.iter()
    }

    pub fn len(&self) -> usize {
        self.lineups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lineups.is_empty()
    }

    /// Adds an empty lineup and makes it active
    pub fn create(&mut self, title: impl Into<String>, catalog: &EventCatalog) -> LineupId {
        let id = LineupId::generate();
        self.lineups.insert(id.clone(), SavedLineup::new(title, catalog));
        self.active = id.clone();
        info!(lineup = %id, "lineup created");
        id
    }

    /// Blank titles are accepted; validation belongs to the caller
    pub fn rename_active(&mut self, title: impl Into<String>) {
        let active = self.active.clone();
        if let Some(saved) = self.lineups.get_mut(&active) {
            saved.title = title.into();
        }
    }

    pub fn set_active(&mut self, id: &LineupId) -> Outcome {
        if !self.lineups.contains_key(id) {
            return Outcome::Rejected(Rejection::UnknownLineup { lineup_id: id.clone() });
        }
        self.active = id.clone();
        Outcome::Accepted
    }

    /// Removes the active lineup; the first remaining one takes over
    pub fn delete_active(&mut self) -> Outcome {
        if self.lineups.len() <= 1 {
            return Outcome::Rejected(Rejection::LastLineup);
        }
        let removed = self.active.clone();
        self.lineups.shift_remove(&removed);
        if let Some((first, _)) = self.lineups.first() {
            self.active = first.clone();
        }
        info!(lineup = %removed, next = %self.active, "lineup deleted");
        Outcome::Accepted
    }

    /// Commits a staged grid to the active lineup
    pub fn replace_active_grid(&mut self, grid: LineupGrid) {
        let active = self.active.clone();
        if let Some(saved) = self.lineups.get_mut(&active) {
            saved.lineup = grid;
        }
    }

    /// Clears every slot, in every lineup, that the delta invalidates.
    /// Returns the number of slots cleared.
    pub fn on_roster_changed(&mut self, delta: &RosterDelta, catalog: &EventCatalog) -> usize {
        if delta.is_empty() {
            return 0;
        }
        let mut cleared = 0;
        for (lineup_id, saved) in self.lineups.iter_mut() {
            let count = saved.lineup.clear_where(|event_id, athlete| {
                let abbr = catalog.get(event_id).map_or("", |e| e.abbr.as_str());
                delta.affects(athlete, abbr)
            });
            if count > 0 {
                debug!(lineup = %lineup_id, cleared = count, "stale slots cleared");
            }
            cleared += count;
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AthleteId, EventId};

    fn catalog() -> EventCatalog {
        EventCatalog::default()
    }

    #[test]
    fn test_new_collection_has_one_active_lineup() {
        let collection = SavedLineupCollection::new("Untitled Lineup", &catalog());
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.active().title, "Untitled Lineup");
        assert!(collection.active_grid().matches_catalog(&catalog()));
    }

    #[test]
    fn test_create_sets_active_and_delete_promotes_first() {
        let catalog = catalog();
        let mut collection = SavedLineupCollection::new("Meet 1", &catalog);
        let first = collection.active_id().clone();
        let second = collection.create("Meet 2", &catalog);
        let third = collection.create("Meet 3", &catalog);
        assert_eq!(collection.active_id(), &third);

        assert!(collection.set_active(&second).is_accepted());
        assert!(collection.delete_active().is_accepted());
        assert_eq!(collection.active_id(), &first);
        assert_eq!(collection.len(), 2);
        assert!(collection.get(&second).is_none());
    }

    #[test]
    fn test_delete_last_lineup_rejected() {
        let mut collection = SavedLineupCollection::new("Only", &catalog());
        let active = collection.active_id().clone();

        assert_eq!(collection.delete_active(), Outcome::Rejected(Rejection::LastLineup));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.active_id(), &active);
    }

    #[test]
    fn test_set_active_unknown_rejected() {
        let mut collection = SavedLineupCollection::new("Only", &catalog());
        let before = collection.active_id().clone();
        let outcome = collection.set_active(&LineupId::new("lineup-missing"));
        assert!(matches!(outcome, Outcome::Rejected(Rejection::UnknownLineup { .. })));
        assert_eq!(collection.active_id(), &before);
    }

    #[test]
    fn test_rename_accepts_blank_title() {
        let mut collection = SavedLineupCollection::new("Meet 1", &catalog());
        collection.rename_active("");
        assert_eq!(collection.active().title, "");
    }

    #[test]
    fn test_from_parts_validates() {
        assert!(matches!(
            SavedLineupCollection::from_parts(IndexMap::new(), LineupId::new("x")),
            Err(LineupError::EmptyCollection)
        ));

        let mut lineups = IndexMap::new();
        lineups.insert(LineupId::new("a"), SavedLineup::new("A", &catalog()));
        assert!(SavedLineupCollection::from_parts(lineups.clone(), LineupId::new("b")).is_err());
        assert!(SavedLineupCollection::from_parts(lineups, LineupId::new("a")).is_ok());
    }

    #[test]
    fn test_roster_change_clears_inactive_lineups_too() {
        let catalog = catalog();
        let vault = EventId::new("event-4");
        let floor = EventId::new("event-1");
        let a1 = AthleteId::new("a1");
        let a2 = AthleteId::new("a2");

        let mut collection = SavedLineupCollection::new("Meet 1", &catalog);
        let mut grid = collection.active_grid().clone();
        grid.set_slot(&vault, 2, Some(a1.clone()));
        grid.set_slot(&floor, 0, Some(a1.clone()));
        grid.set_slot(&floor, 1, Some(a2.clone()));
        collection.replace_active_grid(grid.clone());

        collection.create("Meet 2", &catalog);
        collection.replace_active_grid(grid);

        // a1 loses vault only
        let cleared = collection.on_roster_changed(&RosterDelta::revoked(a1.clone(), "VT"), &catalog);
        assert_eq!(cleared, 2);
        for (_, saved) in collection.iter() {
            assert_eq!(saved.lineup.occupant(&vault, 2), None);
            assert_eq!(saved.lineup.occupant(&floor, 0), Some(&a1));
            assert_eq!(saved.lineup.occupant(&floor, 1), Some(&a2));
        }

        let cleared = collection.on_roster_changed(&RosterDelta::removed(a1.clone()), &catalog);
        assert_eq!(cleared, 2);
        for (_, saved) in collection.iter() {
            assert_eq!(saved.lineup.usage_count(&a1), 0);
            assert_eq!(saved.lineup.occupant(&floor, 1), Some(&a2));
        }
    }
}
