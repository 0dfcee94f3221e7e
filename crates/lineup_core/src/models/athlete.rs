use super::ids::AthleteId;
use crate::error::{LineupError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which of the three per-event numbers a total or a sort is based on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    DScore,
    Consistency,
    AvgScore,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::DScore, Metric::Consistency, Metric::AvgScore];

    pub fn key(self) -> &'static str {
        match self {
            Metric::DScore => "d_score",
            Metric::Consistency => "consistency",
            Metric::AvgScore => "avg_score",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Performance numbers for one athlete on one event.
///
/// Replaced wholesale on edit; the engine never patches a single field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EventMetrics {
    /// Difficulty score, non-negative
    pub d_score: f64,
    /// Hit rate in percent (0-100)
    pub consistency: f64,
    /// Average final score, non-negative
    pub avg_score: f64,
}

impl EventMetrics {
    pub fn new(d_score: f64, consistency: f64, avg_score: f64) -> Result<Self> {
        let metrics = Self { d_score, consistency, avg_score };
        metrics.validate()?;
        Ok(metrics)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.d_score.is_finite() || self.d_score < 0.0 {
            return Err(LineupError::InvalidMetrics(format!(
                "d_score must be a non-negative number, got {}",
                self.d_score
            )));
        }
        if !self.consistency.is_finite() || !(0.0..=100.0).contains(&self.consistency) {
            return Err(LineupError::InvalidMetrics(format!(
                "consistency must be within 0-100, got {}",
                self.consistency
            )));
        }
        if !self.avg_score.is_finite() || self.avg_score < 0.0 {
            return Err(LineupError::InvalidMetrics(format!(
                "avg_score must be a non-negative number, got {}",
                self.avg_score
            )));
        }
        Ok(())
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::DScore => self.d_score,
            Metric::Consistency => self.consistency,
            Metric::AvgScore => self.avg_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: AthleteId,
    pub name: String,
    /// Keyed by event abbreviation; absent means the athlete does not compete there
    #[serde(default)]
    pub events: BTreeMap<String, EventMetrics>,
}

impl Athlete {
    pub fn new(id: AthleteId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), events: BTreeMap::new() }
    }

    pub fn with_event(mut self, abbr: impl Into<String>, metrics: EventMetrics) -> Self {
        self.events.insert(abbr.into(), metrics);
        self
    }

    pub fn metrics_for(&self, abbr: &str) -> Option<&EventMetrics> {
        self.events.get(abbr)
    }

    pub fn competes_in(&self, abbr: &str) -> bool {
        self.events.contains_key(abbr)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_validation() {
        assert!(EventMetrics::new(5.4, 85.0, 13.2).is_ok());
        assert!(EventMetrics::new(-0.1, 85.0, 13.2).is_err());
        assert!(EventMetrics::new(5.4, 100.5, 13.2).is_err());
        assert!(EventMetrics::new(5.4, 50.0, f64::NAN).is_err());
    }

    #[test]
    fn test_metric_keys_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::parse(metric.key()), Some(metric));
        }
        assert_eq!(Metric::parse("difficulty"), None);
        assert_eq!(serde_json::to_string(&Metric::AvgScore).unwrap(), "\"avg_score\"");
    }

    #[test]
    fn test_athlete_events_keyed_by_abbreviation() {
        let athlete = Athlete::new(AthleteId::new("a1"), "Kai Uemura")
            .with_event("FX", EventMetrics { d_score: 5.0, consistency: 90.0, avg_score: 13.1 });

        assert!(athlete.competes_in("FX"));
        assert!(!athlete.competes_in("PH"));
        assert_eq!(athlete.metrics_for("FX").map(|m| m.value(Metric::DScore)), Some(5.0));
    }
}
