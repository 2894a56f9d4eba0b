pub mod config_cmd;
pub mod gather;

use ctxpack_config::EngineConfig;
use std::path::Path;

/// Load the config from `path` if given, else from the default location.
/// Environment overrides apply either way.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            let mut config = EngineConfig::load_from(path)?;
            config.apply_env_overrides()?;
            config
        }
        None => EngineConfig::load()?,
    };
    Ok(config)
}
