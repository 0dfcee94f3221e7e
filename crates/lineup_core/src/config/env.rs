use super::EngineConfig;
use crate::error::{LineupError, Result};
use std::env;
use std::path::Path;

pub const CONFIG_PATH_ENV: &str = "LINEUP_CONFIG_PATH";

/// Loads the config named by `LINEUP_CONFIG_PATH`, or the defaults when the
/// variable is unset or blank.
pub fn load_from_env() -> Result<EngineConfig> {
    let Ok(path) = env::var(CONFIG_PATH_ENV) else {
        return Ok(EngineConfig::default());
    };

    let path = path.trim();
    if path.is_empty() {
        return Ok(EngineConfig::default());
    }

    EngineConfig::load(Path::new(path)).map_err(|e| {
        LineupError::InvalidConfig(format!("failed to load {CONFIG_PATH_ENV}='{path}': {e}"))
    })
}
