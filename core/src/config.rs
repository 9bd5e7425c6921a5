//! World generation and simulation tuning.

use crate::error::{SimError, SimResult};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    /// Sector grid dimensions.
    pub sector_rows: usize,
    pub sector_cols: usize,
    /// Size of every sector, in world units.
    pub sector_width:  f32,
    pub sector_height: f32,
    pub ship_count: usize,
    /// When false, ships cross sector walls directly instead of using gates.
    pub use_jumpgates: bool,
    /// Minimum distance from sector walls for spawned ships.
    pub wall_buffer: f32,
    pub max_stations_per_sector: usize,
    /// Probability weight of a sector having no stations at all.
    pub no_stations_frequency: f64,
    pub player_frequency: f64,
    pub friend_frequency: f64,
    pub enemy_frequency:  f64,
    /// Chance that a ship picks an arbitrary point instead of a gate/station.
    pub misc_destination_chance: f64,
    /// Seconds a ship stays docked after repair.
    pub dock_time: f32,
    /// Seconds between death and respawn.
    pub respawn_time: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            sector_rows: 10,
            sector_cols: 10,
            sector_width: 20.0,
            sector_height: 20.0,
            ship_count: 500,
            use_jumpgates: true,
            wall_buffer: 0.1,
            max_stations_per_sector: 5,
            no_stations_frequency: 0.25,
            player_frequency: 0.01,
            friend_frequency: 0.20,
            enemy_frequency: 0.10,
            misc_destination_chance: 0.1,
            dock_time: 3.0,
            respawn_time: 10.0,
        }
    }
}

impl WorldConfig {
    /// Load from a JSON file. Missing fields are an error — configs are
    /// written out whole.
    pub fn load(path: &str) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("cannot read {path}: {e}")))?;
        let config: WorldConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Small world for unit and integration tests.
    pub fn default_test() -> Self {
        Self {
            sector_rows: 3,
            sector_cols: 3,
            ship_count: 40,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.sector_rows == 0 || self.sector_cols == 0 {
            return Err(SimError::Config("sector grid must be non-empty".into()));
        }
        if self.sector_width <= 0.0 || self.sector_height <= 0.0 {
            return Err(SimError::Config("sector size must be positive".into()));
        }
        if self.ship_count == 0 {
            return Err(SimError::Config("ship_count must be at least 1".into()));
        }
        Ok(())
    }
}
