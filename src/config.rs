use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::TICKS_PER_SECOND;
use crate::error::ConfigError;
use crate::types::PursuerMode;

/// Per-mode pursuer speeds in units per tick.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ModeSpeeds {
    pub patrol: f64,
    pub pursue: f64,
    pub vulnerable: f64,
}

impl ModeSpeeds {
    pub fn for_mode(&self, mode: PursuerMode) -> f64 {
        match mode {
            PursuerMode::Patrol => self.patrol,
            PursuerMode::Pursue => self.pursue,
            PursuerMode::Vulnerable => self.vulnerable,
        }
    }
}

/// Mode durations in seconds, as supplied by level tuning data.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ModeSeconds {
    pub patrol: u32,
    pub pursue: u32,
    pub vulnerable: u32,
}

/// Mode durations converted to ticks; what the engine actually consumes.
#[derive(Clone, Copy, Debug)]
pub struct ModeTicks {
    pub patrol: u32,
    pub pursue: u32,
    pub vulnerable: u32,
}

impl ModeSeconds {
    pub fn to_ticks(self) -> ModeTicks {
        ModeTicks {
            patrol: self.patrol * TICKS_PER_SECOND,
            pursue: self.pursue * TICKS_PER_SECOND,
            vulnerable: self.vulnerable * TICKS_PER_SECOND,
        }
    }
}

impl ModeTicks {
    pub fn scheduled_for(&self, mode: PursuerMode) -> u32 {
        match mode {
            PursuerMode::Patrol => self.patrol,
            PursuerMode::Pursue => self.pursue,
            PursuerMode::Vulnerable => self.vulnerable,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LevelTuning {
    #[serde(rename = "playerSpeed")]
    pub player_speed: f64,
    #[serde(rename = "pursuerSpeeds")]
    pub pursuer_speeds: ModeSpeeds,
    #[serde(rename = "modeSeconds")]
    pub mode_seconds: ModeSeconds,
}

impl LevelTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let speeds = [
            ("playerSpeed", self.player_speed),
            ("pursuerSpeeds.patrol", self.pursuer_speeds.patrol),
            ("pursuerSpeeds.pursue", self.pursuer_speeds.pursue),
            ("pursuerSpeeds.vulnerable", self.pursuer_speeds.vulnerable),
        ];
        for (name, speed) in speeds {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(ConfigError::InvalidTuning(format!(
                    "{name} must be a positive finite number, got {speed}"
                )));
            }
        }
        let seconds = [
            ("modeSeconds.patrol", self.mode_seconds.patrol),
            ("modeSeconds.pursue", self.mode_seconds.pursue),
            ("modeSeconds.vulnerable", self.mode_seconds.vulnerable),
        ];
        for (name, value) in seconds {
            if value == 0 {
                return Err(ConfigError::InvalidTuning(format!(
                    "{name} must be at least one second"
                )));
            }
        }
        Ok(())
    }
}

/// Top-level game configuration: where the map lives, how many lives a level
/// starts with, and one tuning record per level.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GameConfig {
    #[serde(rename = "mapFile")]
    pub map_file: String,
    #[serde(rename = "numLives")]
    pub num_lives: u32,
    pub levels: Vec<LevelTuning>,
}

impl GameConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        if self.num_lives == 0 {
            return Err(ConfigError::InvalidTuning(
                "numLives must be at least one".to_string(),
            ));
        }
        for level in &self.levels {
            level.validate()?;
        }
        Ok(())
    }
}
