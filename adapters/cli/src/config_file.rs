//! Versioned TOML configuration files.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use maze_pursuit_simulation::SimulationConfig;
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    version: u32,
    #[serde(default)]
    simulation: SimulationConfig,
}

/// Reads and validates the configuration stored at `path`.
pub(crate) fn load(path: &Path) -> Result<SimulationConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid config at {}", path.display()))
}

fn parse(contents: &str) -> Result<SimulationConfig> {
    let file: ConfigFile =
        toml::from_str(contents).context("failed to parse config toml contents")?;
    if file.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported config version {}; expected {}",
            file.version,
            SUPPORTED_CONFIG_VERSION
        );
    }
    file.simulation
        .validate()
        .context("config values rejected")?;
    Ok(file.simulation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = parse("version = 1\n").expect("minimal config parses");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn simulation_table_overrides_values() {
        let config = parse(
            "version = 1\n\
             [simulation]\n\
             immortal = true\n\
             rng_seed = 42\n\
             starting_level = 3\n\
             [simulation.phases]\n\
             ready_ticks = 10\n",
        )
        .expect("config parses");
        assert!(config.immortal);
        assert!(config.emulate_overflow_bug);
        assert_eq!(config.rng_seed, 42);
        assert_eq!(config.starting_level, 3);
        assert_eq!(config.phases.ready_ticks, 10);
        assert_eq!(config.phases.pursuer_eaten_ticks, 60);
    }

    #[test]
    fn unsupported_versions_are_rejected() {
        let error = parse("version = 2\n").expect_err("version 2 is unknown");
        assert!(error.to_string().contains("unsupported config version 2"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse("version = 1\n[simulation]\nghosts = 5\n").is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse("version = 1\n[simulation]\nstarting_lives = 0\n").is_err());
    }
}
