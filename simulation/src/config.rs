use maze_pursuit_system_game_flow::PhaseDurations;
use maze_pursuit_world::Rules;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every toggle the simulation reads, threaded explicitly into [`crate::Simulation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Reproduces the arcade's Up-projection overflow when targeting.
    pub emulate_overflow_bug: bool,
    /// Hunting pursuers cannot catch the player.
    pub immortal: bool,
    /// Base seed for frightened fleeing.
    pub rng_seed: u64,
    /// Lives granted by a new game.
    pub starting_lives: u8,
    /// Score that awards the extra life; zero disables it.
    pub extra_life_score: u32,
    /// Level a new game starts on.
    pub starting_level: u32,
    /// Lengths of the timed phases.
    pub phases: PhaseDurations,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            emulate_overflow_bug: true,
            immortal: false,
            rng_seed: 1,
            starting_lives: 3,
            extra_life_score: 10_000,
            starting_level: 1,
            phases: PhaseDurations::default(),
        }
    }
}

/// Configuration values the simulation refuses to run with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A game needs at least one life.
    #[error("starting_lives must be at least 1")]
    NoLives,
    /// Levels are numbered from one.
    #[error("starting_level must be at least 1, found {0}")]
    InvalidLevel(u32),
}

impl SimulationConfig {
    /// Checks the values a session cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if self.starting_level == 0 {
            return Err(ConfigError::InvalidLevel(self.starting_level));
        }
        Ok(())
    }

    pub(crate) fn rules(&self) -> Rules {
        Rules {
            extra_life_score: self.extra_life_score,
            immortal: self.immortal,
        }
    }
}
