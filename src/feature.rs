//! Terrain features and their capability records
//!
//! A feature is a static terrain kind (floor, granite, deep water...). Cells
//! refer to features by [`FeatureId`]; generators ask the registry for the
//! feature's [`FeatureFlags`] once per cell and test named predicates.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};

/// Index into the feature registry. `FeatureId(0)` is "nothing" and doubles
/// as the "no mimic" marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub u16);

impl FeatureId {
    pub const NONE: FeatureId = FeatureId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Capability record for a feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Solid rock or vein
    pub wall: bool,
    /// Never altered by generation
    pub permanent: bool,
    /// Creatures can walk through it
    pub movable: bool,
    pub water: bool,
    pub lava: bool,
    /// Veins that can be turned into treasure veins
    pub may_have_gold: bool,
    /// Objects may lie on it
    pub drop: bool,
    /// Monsters may be placed on it
    pub place: bool,
    pub closed_door: bool,
    /// Stays memorized once seen
    pub remember: bool,
    /// Dungeon entrance on the surface
    pub entrance: bool,
}

impl FeatureFlags {
    /// Water or lava that creatures move through. Streamers never overwrite these.
    pub fn is_flowing_liquid(&self) -> bool {
        self.movable && (self.water || self.lava)
    }

    /// Breakable wall, the only thing wall streamers replace.
    pub fn is_diggable_wall(&self) -> bool {
        self.wall && !self.permanent
    }
}

/// Feature transitions requested by generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlterAction {
    /// Embed visible treasure in a vein
    AddTreasure,
    /// Hide whatever the feature shows
    Conceal,
}

/// Static description of one feature.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub name: String,
    /// Character used by text dumps
    pub glyph: char,
    /// RGB colour used by image dumps
    pub color: [u8; 3],
    #[serde(default)]
    pub flags: FeatureFlags,
    /// Result of [`AlterAction::AddTreasure`]
    #[serde(default)]
    pub treasure: Option<FeatureId>,
    /// Result of [`AlterAction::Conceal`]
    #[serde(default)]
    pub secret: Option<FeatureId>,
}

/// Read-only feature lookup shared by every floor.
#[derive(Clone, Debug)]
pub struct FeatureRegistry {
    features: Vec<Feature>,
}

impl FeatureRegistry {
    /// Build a registry; feature `i` must carry `FeatureId(i)` and every
    /// transition must point at a known feature.
    pub fn new(features: Vec<Feature>) -> GenResult<Self> {
        if features.is_empty() {
            return Err(GenError::Registry("no features defined".to_string()));
        }
        for (i, f) in features.iter().enumerate() {
            if f.id.index() != i {
                return Err(GenError::Registry(format!(
                    "feature '{}' has id {} but sits at position {}",
                    f.name, f.id.0, i
                )));
            }
            for target in [f.treasure, f.secret].into_iter().flatten() {
                if target.index() >= features.len() {
                    return Err(GenError::Registry(format!(
                        "feature '{}' transitions to unknown id {}",
                        f.name, target.0
                    )));
                }
            }
        }
        Ok(Self { features })
    }

    /// Load a registry from a JSON array of features.
    pub fn load(path: &Path) -> GenResult<Self> {
        let text = fs::read_to_string(path)?;
        let features: Vec<Feature> = serde_json::from_str(&text)?;
        Self::new(features)
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id.index())
    }

    /// Capabilities of a feature; unknown ids have none.
    pub fn flags(&self, id: FeatureId) -> FeatureFlags {
        self.get(id).map(|f| f.flags).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Apply a transition. Features without that transition stay unchanged.
    pub fn alter(&self, id: FeatureId, action: AlterAction) -> FeatureId {
        let Some(feature) = self.get(id) else {
            return id;
        };
        let target = match action {
            AlterAction::AddTreasure => feature.treasure,
            AlterAction::Conceal => feature.secret,
        };
        target.unwrap_or(id)
    }

    pub fn glyph(&self, id: FeatureId) -> char {
        self.get(id).map(|f| f.glyph).unwrap_or('?')
    }

    pub fn color(&self, id: FeatureId) -> [u8; 3] {
        self.get(id).map(|f| f.color).unwrap_or([255, 0, 255])
    }

    /// Built-in feature set matching [`feat`] ids.
    pub fn standard() -> Self {
        let features = standard_features();
        Self { features }
    }
}

/// Ids of the built-in feature set.
pub mod feat {
    use super::FeatureId;

    pub const NOTHING: FeatureId = FeatureId(0);
    pub const FLOOR: FeatureId = FeatureId(1);
    pub const GRANITE: FeatureId = FeatureId(2);
    pub const PERMANENT: FeatureId = FeatureId(3);
    pub const MAGMA: FeatureId = FeatureId(4);
    pub const QUARTZ: FeatureId = FeatureId(5);
    pub const MAGMA_TREASURE: FeatureId = FeatureId(6);
    pub const QUARTZ_TREASURE: FeatureId = FeatureId(7);
    pub const MAGMA_HIDDEN: FeatureId = FeatureId(8);
    pub const QUARTZ_HIDDEN: FeatureId = FeatureId(9);
    pub const DEEP_WATER: FeatureId = FeatureId(10);
    pub const SHALLOW_WATER: FeatureId = FeatureId(11);
    pub const DEEP_LAVA: FeatureId = FeatureId(12);
    pub const SHALLOW_LAVA: FeatureId = FeatureId(13);
    pub const DIRT: FeatureId = FeatureId(14);
    pub const GRASS: FeatureId = FeatureId(15);
    pub const FLOWER: FeatureId = FeatureId(16);
    pub const BRAKE: FeatureId = FeatureId(17);
    pub const TREE: FeatureId = FeatureId(18);
    pub const MOUNTAIN: FeatureId = FeatureId(19);
    pub const SWAMP: FeatureId = FeatureId(20);
    pub const RUBBLE: FeatureId = FeatureId(21);
    pub const UP_STAIR: FeatureId = FeatureId(22);
    pub const DOWN_STAIR: FeatureId = FeatureId(23);
    pub const ENTRANCE: FeatureId = FeatureId(24);
    pub const TOWN: FeatureId = FeatureId(25);
    pub const CLOSED_DOOR: FeatureId = FeatureId(26);
}

fn standard_features() -> Vec<Feature> {
    let ground = FeatureFlags {
        movable: true,
        drop: true,
        place: true,
        ..FeatureFlags::default()
    };
    let rock = FeatureFlags {
        wall: true,
        remember: true,
        ..FeatureFlags::default()
    };
    let vein = FeatureFlags {
        may_have_gold: true,
        ..rock
    };
    let water = FeatureFlags {
        water: true,
        remember: true,
        ..ground
    };
    let lava = FeatureFlags {
        lava: true,
        drop: false,
        remember: true,
        ..ground
    };
    let marker = FeatureFlags {
        remember: true,
        ..ground
    };

    let f = |id: FeatureId, name: &str, glyph: char, color: [u8; 3], flags: FeatureFlags| Feature {
        id,
        name: name.to_string(),
        glyph,
        color,
        flags,
        treasure: None,
        secret: None,
    };

    vec![
        f(feat::NOTHING, "nothing", ' ', [0, 0, 0], FeatureFlags::default()),
        f(feat::FLOOR, "open floor", '.', [200, 200, 200], ground),
        f(feat::GRANITE, "granite wall", '#', [120, 120, 120], rock),
        f(feat::PERMANENT, "permanent wall", '#', [60, 60, 60], FeatureFlags { permanent: true, ..rock }),
        Feature { treasure: Some(feat::MAGMA_TREASURE), ..f(feat::MAGMA, "magma vein", '%', [110, 80, 70], vein) },
        Feature { treasure: Some(feat::QUARTZ_TREASURE), ..f(feat::QUARTZ, "quartz vein", '%', [190, 190, 210], vein) },
        Feature { secret: Some(feat::MAGMA_HIDDEN), ..f(feat::MAGMA_TREASURE, "magma vein with treasure", '*', [230, 150, 30], rock) },
        Feature { secret: Some(feat::QUARTZ_HIDDEN), ..f(feat::QUARTZ_TREASURE, "quartz vein with treasure", '*', [240, 200, 40], rock) },
        f(feat::MAGMA_HIDDEN, "magma vein with hidden treasure", '%', [110, 80, 70], rock),
        f(feat::QUARTZ_HIDDEN, "quartz vein with hidden treasure", '%', [190, 190, 210], rock),
        f(feat::DEEP_WATER, "deep water", '~', [20, 40, 160], water),
        f(feat::SHALLOW_WATER, "shallow water", '~', [70, 120, 220], water),
        f(feat::DEEP_LAVA, "deep lava", '~', [200, 30, 0], lava),
        f(feat::SHALLOW_LAVA, "shallow lava", '~', [240, 110, 20], lava),
        f(feat::DIRT, "dirt", '.', [140, 100, 60], ground),
        f(feat::GRASS, "grass", '.', [60, 170, 60], ground),
        f(feat::FLOWER, "flower", ',', [220, 120, 200], ground),
        f(feat::BRAKE, "brake", ':', [110, 140, 50], ground),
        f(feat::TREE, "tree", 'T', [20, 110, 30], FeatureFlags { remember: true, ..ground }),
        f(feat::MOUNTAIN, "mountain chain", '^', [150, 130, 110], rock),
        f(feat::SWAMP, "swamp", '"', [70, 90, 60], ground),
        f(feat::RUBBLE, "rubble", ':', [130, 110, 90], FeatureFlags { remember: true, ..FeatureFlags::default() }),
        f(feat::UP_STAIR, "up staircase", '<', [255, 255, 255], marker),
        f(feat::DOWN_STAIR, "down staircase", '>', [255, 255, 255], marker),
        f(feat::ENTRANCE, "dungeon entrance", '>', [255, 220, 0], FeatureFlags { entrance: true, permanent: true, ..marker }),
        f(feat::TOWN, "town", '&', [255, 255, 255], marker),
        f(feat::CLOSED_DOOR, "closed door", '+', [160, 110, 40], FeatureFlags { closed_door: true, remember: true, ..FeatureFlags::default() }),
    ]
}

/// Named features the generators stamp directly, independent of tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub permanent: FeatureId,
    pub floor: FeatureId,
    pub granite: FeatureId,
    pub magma: FeatureId,
    pub quartz: FeatureId,
    pub tree: FeatureId,
    pub rubble: FeatureId,
    pub up_stair: FeatureId,
    pub entrance: FeatureId,
    pub town: FeatureId,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            permanent: feat::PERMANENT,
            floor: feat::FLOOR,
            granite: feat::GRANITE,
            magma: feat::MAGMA,
            quartz: feat::QUARTZ,
            tree: feat::TREE,
            rubble: feat::RUBBLE,
            up_stair: feat::UP_STAIR,
            entrance: feat::ENTRANCE,
            town: feat::TOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_is_consistent() {
        let registry = FeatureRegistry::standard();
        let rebuilt = FeatureRegistry::new(standard_features());
        assert!(rebuilt.is_ok());
        assert_eq!(registry.len(), 27);
        assert!(registry.flags(feat::PERMANENT).permanent);
        assert!(registry.flags(feat::DEEP_LAVA).is_flowing_liquid());
        assert!(registry.flags(feat::GRANITE).is_diggable_wall());
        assert!(!registry.flags(feat::PERMANENT).is_diggable_wall());
    }

    #[test]
    fn test_treasure_transitions() {
        let registry = FeatureRegistry::standard();
        let visible = registry.alter(feat::MAGMA, AlterAction::AddTreasure);
        assert_eq!(visible, feat::MAGMA_TREASURE);
        assert_eq!(registry.alter(visible, AlterAction::Conceal), feat::MAGMA_HIDDEN);
        // Features without a transition are left alone
        assert_eq!(registry.alter(feat::GRANITE, AlterAction::AddTreasure), feat::GRANITE);
    }

    #[test]
    fn test_registry_rejects_misnumbered_features() {
        let mut features = standard_features();
        features.swap(1, 2);
        assert!(matches!(FeatureRegistry::new(features), Err(GenError::Registry(_))));
        assert!(FeatureRegistry::new(Vec::new()).is_err());
    }

    #[test]
    fn test_unknown_id_has_no_capabilities() {
        let registry = FeatureRegistry::standard();
        assert_eq!(registry.flags(FeatureId(999)), FeatureFlags::default());
        assert_eq!(registry.glyph(FeatureId(999)), '?');
    }

    #[test]
    fn test_registry_loads_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.json");
        let json = serde_json::to_string(&standard_features()).unwrap();
        std::fs::write(&path, json).unwrap();

        let registry = FeatureRegistry::load(&path).unwrap();
        assert_eq!(registry.len(), 27);
        assert_eq!(registry.glyph(feat::TREE), 'T');
    }
}
