//! Tunable generation parameters.
//!
//! Defaults are the empirically tuned constants of the game. Any subset can
//! be overridden from a JSON file; missing fields keep their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GenResult;

/// Fractal river settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverParams {
    /// A split spawns a branch with probability `1/branch_chance`
    pub branch_chance: i32,
    /// Base width is drawn from `1..=width_range`
    pub width_range: i32,
}

impl Default for RiverParams {
    fn default() -> Self {
        Self {
            branch_chance: 50,
            width_range: 2,
        }
    }
}

/// Mineral vein settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamerParams {
    /// Walk steps before giving up
    pub max_attempts: u32,
    /// Cells converted per walk step
    pub density: u32,
    /// Scatter radius around the walk position
    pub range: i32,
    /// Direction changes with probability `1/turn_chance` per step
    pub turn_chance: i32,
    /// Treasure chance for magma veins
    pub magma_gold_chance: i32,
    /// Treasure chance for quartz veins
    pub quartz_gold_chance: i32,
}

impl Default for StreamerParams {
    fn default() -> Self {
        Self {
            max_attempts: 5000,
            density: 5,
            range: 5,
            turn_chance: 10,
            magma_gold_chance: 90,
            quartz_gold_chance: 40,
        }
    }
}

/// Plasma fractal settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlasmaParams {
    /// Maximum perturbation per step
    pub roughness: i16,
}

impl Default for PlasmaParams {
    fn default() -> Self {
        Self { roughness: 1 }
    }
}

/// Wilderness assembly settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WildernessParams {
    /// Dungeon entrances keep this far from the tile edge
    pub entrance_margin: i32,
    /// Lit cells are also memorized in daylight
    pub view_perma_grids: bool,
    pub plasma: PlasmaParams,
}

impl Default for WildernessParams {
    fn default() -> Self {
        Self {
            entrance_margin: 6,
            view_perma_grids: true,
            plasma: PlasmaParams::default(),
        }
    }
}

/// Tree clusters and level destruction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorParams {
    /// Percent roll below which an outer cell becomes a tree
    pub tree_percent: i32,
    /// Percent roll below which a centre cell is treated as outer ring
    pub center_tree_percent: i32,
    /// Up staircase appears with probability `1/up_stair_chance`
    pub up_stair_chance: i32,
    pub max_epicenters: i32,
    pub epicenter_margin: i32,
    pub destruction_radius: i32,
}

impl Default for DecorParams {
    fn default() -> Self {
        Self {
            tree_percent: 75,
            center_tree_percent: 25,
            up_stair_chance: 3,
            max_epicenters: 5,
            epicenter_margin: 5,
            destruction_radius: 15,
        }
    }
}

/// Every tunable in one place.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenParams {
    pub river: RiverParams,
    pub streamer: StreamerParams,
    pub wilderness: WildernessParams,
    pub decor: DecorParams,
}

impl GenParams {
    /// Load overrides from a JSON file.
    pub fn load(path: &Path) -> GenResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let params: GenParams = serde_json::from_str(r#"{ "streamer": { "max_attempts": 12 } }"#).unwrap();
        assert_eq!(params.streamer.max_attempts, 12);
        assert_eq!(params.streamer.density, 5);
        assert_eq!(params.river.branch_chance, 50);
        assert_eq!(params.wilderness.plasma.roughness, 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{ "decor": { "destruction_radius": 9 }, "river": { "width_range": 4 } }"#).unwrap();

        let params = GenParams::load(&path).unwrap();
        assert_eq!(params.decor.destruction_radius, 9);
        assert_eq!(params.river.width_range, 4);
        assert_eq!(params.decor.max_epicenters, 5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GenParams::load(Path::new("/nonexistent/params.json")).unwrap_err();
        assert!(matches!(err, crate::error::GenError::Io(_)));
    }
}
