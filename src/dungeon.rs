//! Dungeon definitions
//!
//! Each dungeon carries the weighted floor/wall lists that feed the
//! probability tables, its wall features, and where its entrance sits on
//! the wilderness map.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::feature::{feat, FeatureId};
use crate::prob_table::FeatProb;

/// Static description of one dungeon.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DungeonInfo {
    pub id: u16,
    pub name: String,
    /// Weighted ground features
    pub floor: Vec<FeatProb>,
    /// Weighted filler walls
    pub fill: Vec<FeatProb>,
    pub outer_wall: FeatureId,
    pub inner_wall: FeatureId,
    /// Levels are unlit: rivers and clearings do not glow
    #[serde(default)]
    pub darkness: bool,
    /// Entrance only appears once the game has been won
    #[serde(default)]
    pub winner_only: bool,
    /// Entrance position on the wilderness map
    #[serde(default)]
    pub wild_x: usize,
    #[serde(default)]
    pub wild_y: usize,
    #[serde(default)]
    pub min_depth: i16,
    /// 0 for pseudo-dungeons without levels (the surface itself)
    #[serde(default)]
    pub max_depth: i16,
}

impl DungeonInfo {
    /// Whether the dungeon has real levels and so an entrance.
    pub fn has_levels(&self) -> bool {
        self.max_depth > 0
    }
}

/// All dungeons, indexed by id. Id 0 is the surface.
#[derive(Clone, Debug)]
pub struct DungeonRegistry {
    dungeons: Vec<DungeonInfo>,
}

impl DungeonRegistry {
    pub fn new(dungeons: Vec<DungeonInfo>) -> GenResult<Self> {
        for (i, d) in dungeons.iter().enumerate() {
            if d.id as usize != i {
                return Err(GenError::Dungeon(format!(
                    "dungeon '{}' has id {} but sits at position {}",
                    d.name, d.id, i
                )));
            }
            if d.floor.is_empty() || d.fill.is_empty() {
                return Err(GenError::Dungeon(format!("dungeon '{}' has an empty floor or fill list", d.name)));
            }
        }
        Ok(Self { dungeons })
    }

    pub fn load(path: &Path) -> GenResult<Self> {
        let text = fs::read_to_string(path)?;
        let dungeons: Vec<DungeonInfo> = serde_json::from_str(&text)?;
        Self::new(dungeons)
    }

    pub fn get(&self, id: u16) -> Option<&DungeonInfo> {
        self.dungeons.get(id as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DungeonInfo> {
        self.dungeons.iter()
    }

    /// Whether a dungeon's entrance is only shown to winners.
    pub fn is_winner_only(&self, id: u16) -> bool {
        self.get(id).map(|d| d.winner_only).unwrap_or(false)
    }

    /// Built-in set used by the CLI and tests.
    pub fn standard() -> Self {
        let dungeon = |id: u16, name: &str, floor: Vec<FeatProb>, fill: Vec<FeatProb>| DungeonInfo {
            id,
            name: name.to_string(),
            floor,
            fill,
            outer_wall: feat::GRANITE,
            inner_wall: feat::GRANITE,
            darkness: false,
            winner_only: false,
            wild_x: 0,
            wild_y: 0,
            min_depth: 0,
            max_depth: 0,
        };

        let dungeons = vec![
            dungeon(0, "Surface", vec![FeatProb::new(feat::FLOOR, 100)], vec![FeatProb::new(feat::GRANITE, 100)]),
            DungeonInfo {
                wild_x: 3,
                wild_y: 2,
                min_depth: 1,
                max_depth: 40,
                ..dungeon(
                    1,
                    "Old Mine",
                    vec![FeatProb::new(feat::FLOOR, 90), FeatProb::new(feat::DIRT, 10)],
                    vec![FeatProb::new(feat::GRANITE, 85), FeatProb::new(feat::MAGMA, 10), FeatProb::new(feat::QUARTZ, 5)],
                )
            },
            DungeonInfo {
                darkness: true,
                wild_x: 6,
                wild_y: 5,
                min_depth: 20,
                max_depth: 60,
                ..dungeon(
                    2,
                    "Lava Caverns",
                    vec![FeatProb::new(feat::FLOOR, 80), FeatProb::new(feat::SHALLOW_LAVA, 20)],
                    vec![FeatProb::new(feat::GRANITE, 70), FeatProb::new(feat::MAGMA, 30)],
                )
            },
            DungeonInfo {
                winner_only: true,
                wild_x: 8,
                wild_y: 1,
                min_depth: 100,
                max_depth: 127,
                ..dungeon(
                    3,
                    "Sealed Vault",
                    vec![FeatProb::new(feat::FLOOR, 100)],
                    vec![FeatProb::new(feat::GRANITE, 100)],
                )
            },
        ];
        Self { dungeons }
    }
}
