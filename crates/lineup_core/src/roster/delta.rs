use crate::models::AthleteId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a roster edit took away.
///
/// Every saved lineup must drop slots matching either set before the edit is
/// considered committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDelta {
    /// Athletes no longer on the roster
    pub removed: BTreeSet<AthleteId>,
    /// (athlete, event abbreviation) pairs whose metrics entry was deleted
    pub revoked: BTreeSet<(AthleteId, String)>,
}

impl RosterDelta {
    pub fn removed(id: AthleteId) -> Self {
        let mut delta = Self::default();
        delta.removed.insert(id);
        delta
    }

    pub fn revoked(id: AthleteId, abbr: impl Into<String>) -> Self {
        let mut delta = Self::default();
        delta.revoked.insert((id, abbr.into()));
        delta
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.revoked.is_empty()
    }

    pub fn merge(&mut self, other: RosterDelta) {
        self.removed.extend(other.removed);
        self.revoked.extend(other.revoked);
    }

    /// True when `athlete` may no longer sit in an event with abbreviation `abbr`
    pub fn affects(&self, athlete: &AthleteId, abbr: &str) -> bool {
        if self.removed.contains(athlete) {
            return true;
        }
        // Tuple lookup without cloning the id
        self.revoked
            .iter()
            .any(|(id, revoked_abbr)| id == athlete && revoked_abbr == abbr)
    }
}
