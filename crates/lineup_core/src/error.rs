use std::fmt;

#[derive(Debug)]
pub enum LineupError {
    InvalidConfig(String),
    InvalidParameter(String),
    InvalidMetrics(String),
    UnknownEvent(String),
    UnknownAthlete(String),
    UnknownLineup(String),
    EmptyCollection,
    StaleSync { ticket: u64, latest: u64 },
    SerializationError(String),
    DeserializationError(String),
    IoError(String),
    Persistence(String),
}

impl fmt::Display for LineupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineupError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            LineupError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            LineupError::InvalidMetrics(msg) => write!(f, "Invalid event metrics: {}", msg),
            LineupError::UnknownEvent(id) => write!(f, "Unknown event: {}", id),
            LineupError::UnknownAthlete(id) => write!(f, "Unknown athlete: {}", id),
            LineupError::UnknownLineup(id) => write!(f, "Unknown lineup: {}", id),
            LineupError::EmptyCollection => {
                write!(f, "Saved lineup collection must contain at least one lineup")
            }
            LineupError::StaleSync { ticket, latest } => {
                write!(f, "Stale sync result: generation {} superseded by {}", ticket, latest)
            }
            LineupError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            LineupError::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            LineupError::IoError(msg) => write!(f, "IO error: {}", msg),
            LineupError::Persistence(msg) => write!(f, "Persistence error: {}", msg),
        }
    }
}

impl std::error::Error for LineupError {}

impl From<serde_json::Error> for LineupError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            LineupError::DeserializationError(err.to_string())
        } else {
            LineupError::SerializationError(err.to_string())
        }
    }
}

impl From<serde_yaml::Error> for LineupError {
    fn from(err: serde_yaml::Error) -> Self {
        LineupError::DeserializationError(err.to_string())
    }
}

impl From<std::io::Error> for LineupError {
    fn from(err: std::io::Error) -> Self {
        LineupError::IoError(err.to_string())
    }
}

impl From<crate::save::SaveError> for LineupError {
    fn from(err: crate::save::SaveError) -> Self {
        LineupError::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LineupError>;
