// Roster and catalog value types

pub mod athlete;
pub mod event;
pub mod ids;

pub use athlete::{Athlete, EventMetrics, Metric};
pub use event::{EventCatalog, EventDefinition, DEFAULT_EVENTS};
pub use ids::{AthleteId, EventId, LineupId};
