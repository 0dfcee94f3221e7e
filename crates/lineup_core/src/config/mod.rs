//! # Engine Configuration
//!
//! Tunables for a [`LineupEngine`](crate::state::LineupEngine): the event
//! catalog, the main-slot cap and the seed data for a fresh snapshot.
//!
//! ```rust
//! use lineup_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.max_main_athletes, 12);
//! ```

mod env;

pub use env::{load_from_env, CONFIG_PATH_ENV};

use crate::error::{LineupError, Result};
use crate::lineup::MAX_ATHLETES_IN_LINEUP;
use crate::models::{EventCatalog, EventDefinition, DEFAULT_EVENTS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_LINEUP_TITLE: &str = "Untitled Lineup";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Distinct athletes allowed across all main slots
    pub max_main_athletes: usize,
    /// Title of the lineup created for a fresh or recovered snapshot
    pub default_lineup_title: String,
    pub events: Vec<EventDefinition>,
    /// Seed a fresh snapshot with the default 24-athlete roster
    pub seed_default_roster: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_main_athletes: MAX_ATHLETES_IN_LINEUP,
            default_lineup_title: DEFAULT_LINEUP_TITLE.to_string(),
            events: DEFAULT_EVENTS.clone(),
            seed_default_roster: true,
        }
    }
}

impl EngineConfig {
    /// Empty roster, default catalog. Handy for tests and embedding.
    pub fn blank() -> Self {
        Self { seed_default_roster: false, ..Self::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_main_athletes == 0 {
            return Err(LineupError::InvalidConfig("max_main_athletes must be at least 1".to_string()));
        }
        self.catalog().map(|_| ())
    }

    pub fn catalog(&self) -> Result<EventCatalog> {
        EventCatalog::new(self.events.clone())
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a `.json` file as JSON and anything else as YAML
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.events.len(), 6);
        assert!(cfg.seed_default_roster);
        assert!(!EngineConfig::blank().seed_default_roster);
    }

    #[test]
    fn test_yaml_partial_override() {
        let cfg = EngineConfig::from_yaml("max_main_athletes: 10\nseed_default_roster: false\n").unwrap();
        assert_eq!(cfg.max_main_athletes, 10);
        assert!(!cfg.seed_default_roster);
        assert_eq!(cfg.default_lineup_title, DEFAULT_LINEUP_TITLE);
        assert_eq!(cfg.events.len(), 6);
    }

    #[test]
    fn test_custom_catalog_from_json() {
        let json = r#"{
            "events": [
                { "id": "event-1", "name": "Vault", "abbr": "VT" },
                { "id": "event-2", "name": "Uneven Bars", "abbr": "UB" },
                { "id": "event-3", "name": "Balance Beam", "abbr": "BB" },
                { "id": "event-4", "name": "Floor Exercise", "abbr": "FX" }
            ]
        }"#;
        let cfg = EngineConfig::from_json(json).unwrap();
        assert_eq!(cfg.catalog().unwrap().len(), 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(EngineConfig::from_yaml("max_main_athletes: 0\n").is_err());
        assert!(EngineConfig::from_yaml("events: []\n").is_err());
    }
}
