//! `ctxpack config`: configuration inspection.

use super::load_config;
use clap::Subcommand;
use ctxpack_config::EngineConfig;
use std::path::Path;

#[derive(Subcommand, Default, Clone, Copy)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    #[default]
    Show,
    /// Check the configuration and report problems
    Validate,
    /// Print the default config file location
    Path,
}

pub fn run(action: ConfigAction, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = load_config(path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Validate => {
            let config = load_config(path).map_err(|e| format!("Config error: {e}"))?;
            println!("Configuration OK");
            println!("  Max tokens:  {}", config.default_max_tokens);
            println!("  Timeout:     {}ms", config.gather.collaborator_timeout_ms);
            println!("  Tree depth:  {}", config.gather.tree_depth);
            println!(
                "  Results:     {}/{}/{} (shallow/medium/deep)",
                config.gather.shallow_results,
                config.gather.medium_results,
                config.gather.deep_results
            );
        }
        ConfigAction::Path => {
            println!("{}", EngineConfig::config_dir().join("config.toml").display());
        }
    }
    Ok(())
}
