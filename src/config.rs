// Configuration module for reading Snake.toml
// This module provides configuration management for the bot, the headless
// game host and the batch simulator

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub search: SearchConfig,
    pub game: GameConfig,
    pub simulation: SimulationConfig,
    pub debug: DebugConfig,
}

/// Move search constants
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    /// Look-ahead used when the caller does not ask for a specific depth
    pub default_depth: usize,
    /// Depth used once free space drops below the endgame threshold
    pub endgame_depth: usize,
    pub endgame_free_space_threshold: usize,
    /// Re-check incremental distance fields against full rebuilds (debug builds only)
    pub verify_incremental_fields: bool,
}

impl SearchConfig {
    /// Depth to search given the caller's request and the current free space
    pub fn effective_depth(&self, requested: usize, free_cells: usize) -> usize {
        if free_cells < self.endgame_free_space_threshold {
            self.endgame_depth
        } else {
            requested
        }
    }
}

/// Headless game host constants
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub food_count: usize,
    pub max_turns: usize,
    /// Depth the host asks the bot for on every tick
    pub host_search_depth: usize,
    pub seed: u64,
}

/// Batch simulation constants
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SimulationConfig {
    pub games: usize,
    pub base_seed: u64,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            search: SearchConfig {
                default_depth: 2,
                endgame_depth: 16,
                endgame_free_space_threshold: 10,
                verify_incremental_fields: false,
            },
            game: GameConfig {
                rows: 15,
                cols: 16,
                food_count: 1,
                max_turns: 20_000,
                host_search_depth: 4,
                seed: 1,
            },
            simulation: SimulationConfig {
                games: 8,
                base_seed: 1,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "tail_chaser_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Rejects values the bot or the host cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if self.game.rows == 0 || self.game.cols == 0 {
            return Err(format!(
                "Grid must have at least one cell, got {}x{}",
                self.game.rows, self.game.cols
            ));
        }
        if self.game.food_count == 0 {
            return Err("food_count must be at least 1".to_string());
        }
        if self.game.food_count >= self.game.rows * self.game.cols {
            return Err(format!(
                "food_count {} leaves no room for the snake on a {}x{} grid",
                self.game.food_count, self.game.rows, self.game.cols
            ));
        }
        if self.search.default_depth == 0 || self.search.endgame_depth == 0 {
            return Err("Search depths must be at least 1".to_string());
        }
        Ok(())
    }
}
