use super::ids::EventId;
use crate::error::{LineupError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: EventId,
    pub name: String,
    /// Join key into `Athlete::events`
    pub abbr: String,
}

impl EventDefinition {
    pub fn new(id: &str, name: &str, abbr: &str) -> Self {
        Self { id: EventId::new(id), name: name.to_string(), abbr: abbr.to_string() }
    }
}

/// Men's artistic gymnastics, in competition order
pub static DEFAULT_EVENTS: Lazy<Vec<EventDefinition>> = Lazy::new(|| {
    vec![
        EventDefinition::new("event-1", "Floor Exercise", "FX"),
        EventDefinition::new("event-2", "Pommel Horse", "PH"),
        EventDefinition::new("event-3", "Still Rings", "SR"),
        EventDefinition::new("event-4", "Vault", "VT"),
        EventDefinition::new("event-5", "Parallel Bars", "PB"),
        EventDefinition::new("event-6", "Horizontal Bar", "HB"),
    ]
});

/// Fixed, ordered list of events. Static for the life of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCatalog {
    events: Vec<EventDefinition>,
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self { events: DEFAULT_EVENTS.clone() }
    }
}

impl EventCatalog {
    pub fn new(events: Vec<EventDefinition>) -> Result<Self> {
        let catalog = Self { events };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<()> {
        if self.events.is_empty() {
            return Err(LineupError::InvalidConfig("event catalog is empty".to_string()));
        }

        let mut ids = HashSet::new();
        let mut abbrs = HashSet::new();
        for event in &self.events {
            if event.abbr.trim().is_empty() {
                return Err(LineupError::InvalidConfig(format!(
                    "event '{}' has a blank abbreviation",
                    event.id
                )));
            }
            if !ids.insert(&event.id) {
                return Err(LineupError::InvalidConfig(format!("duplicate event id '{}'", event.id)));
            }
            if !abbrs.insert(event.abbr.as_str()) {
                return Err(LineupError::InvalidConfig(format!(
                    "duplicate event abbreviation '{}'",
                    event.abbr
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &EventId) -> Option<&EventDefinition> {
        self.events.iter().find(|e| &e.id == id)
    }

    pub fn by_abbr(&self, abbr: &str) -> Option<&EventDefinition> {
        self.events.iter().find(|e| e.abbr == abbr)
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventDefinition> {
        self.events.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EventId> {
        self.events.iter().map(|e| &e.id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
