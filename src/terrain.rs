//! Wilderness terrain kinds and their height-to-feature lookup tables
//!
//! A wilderness tile is first generated as a height field with values in
//! `0..MAX_FEAT_IN_TERRAIN`; each terrain kind then maps every height to a
//! concrete feature. Tables are written as run-lengths ("12 deep water, then
//! 6 shallow water") and must cover all slots exactly.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{GenError, GenResult};
use crate::feature::{feat, FeatureId};

/// Number of height levels per terrain.
pub const MAX_FEAT_IN_TERRAIN: usize = 18;

/// Terrain kind of a wilderness tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    /// Impassable map border
    Edge,
    Town,
    DeepWater,
    ShallowWater,
    Swamp,
    Dirt,
    Grass,
    Trees,
    Desert,
    ShallowLava,
    DeepLava,
    Mountain,
}

impl TerrainKind {
    pub const COUNT: usize = 12;

    pub fn all() -> [TerrainKind; Self::COUNT] {
        [
            TerrainKind::Edge,
            TerrainKind::Town,
            TerrainKind::DeepWater,
            TerrainKind::ShallowWater,
            TerrainKind::Swamp,
            TerrainKind::Dirt,
            TerrainKind::Grass,
            TerrainKind::Trees,
            TerrainKind::Desert,
            TerrainKind::ShallowLava,
            TerrainKind::DeepLava,
            TerrainKind::Mountain,
        ]
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Lookup table for one terrain kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainTable {
    /// Feature shown for the whole tile on the overview map
    pub global: FeatureId,
    pub table: [FeatureId; MAX_FEAT_IN_TERRAIN],
}

impl TerrainTable {
    /// Expand `(feature, run_length)` pairs. The runs must sum to exactly
    /// [`MAX_FEAT_IN_TERRAIN`].
    pub fn from_runs(terrain: TerrainKind, global: FeatureId, runs: &[(FeatureId, usize)]) -> GenResult<Self> {
        let covered: usize = runs.iter().map(|&(_, n)| n).sum();
        if covered != MAX_FEAT_IN_TERRAIN {
            error!(?terrain, covered, "terrain run-lengths do not cover the table");
            return Err(GenError::TerrainTableSize {
                terrain,
                covered,
                expected: MAX_FEAT_IN_TERRAIN,
            });
        }

        let mut table = [FeatureId::NONE; MAX_FEAT_IN_TERRAIN];
        let mut cur = 0;
        for &(feat, n) in runs {
            table[cur..cur + n].fill(feat);
            cur += n;
        }
        Ok(Self { global, table })
    }

    /// Feature for a height; heights past the top clamp to the last slot.
    pub fn lookup(&self, height: i16) -> FeatureId {
        let idx = (height.max(0) as usize).min(MAX_FEAT_IN_TERRAIN - 1);
        self.table[idx]
    }
}

/// Serializable run-length description of one terrain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainMix {
    pub terrain: TerrainKind,
    pub global: FeatureId,
    pub runs: Vec<(FeatureId, usize)>,
}

/// Lookup tables for every terrain kind.
#[derive(Clone, Debug)]
pub struct TerrainTables {
    tables: Vec<TerrainTable>,
}

impl TerrainTables {
    /// Build from run-length mixes; every terrain kind must be described once.
    pub fn from_mixes(mixes: &[TerrainMix]) -> GenResult<Self> {
        let mut slots: Vec<Option<TerrainTable>> = vec![None; TerrainKind::COUNT];
        for mix in mixes {
            let table = TerrainTable::from_runs(mix.terrain, mix.global, &mix.runs)?;
            slots[mix.terrain.index()] = Some(table);
        }

        let mut tables = Vec::with_capacity(TerrainKind::COUNT);
        for (kind, slot) in TerrainKind::all().into_iter().zip(slots) {
            match slot {
                Some(t) => tables.push(t),
                None => return Err(GenError::TerrainTableSize { terrain: kind, covered: 0, expected: MAX_FEAT_IN_TERRAIN }),
            }
        }
        Ok(Self { tables })
    }

    pub fn load(path: &Path) -> GenResult<Self> {
        let text = fs::read_to_string(path)?;
        let mixes: Vec<TerrainMix> = serde_json::from_str(&text)?;
        Self::from_mixes(&mixes)
    }

    pub fn table(&self, terrain: TerrainKind) -> &TerrainTable {
        &self.tables[terrain.index()]
    }

    pub fn lookup(&self, terrain: TerrainKind, height: i16) -> FeatureId {
        self.table(terrain).lookup(height)
    }

    pub fn global(&self, terrain: TerrainKind) -> FeatureId {
        self.table(terrain).global
    }

    /// The game's terrain mix.
    pub fn standard() -> GenResult<Self> {
        Self::from_mixes(&standard_mixes())
    }
}

/// Run-lengths of the built-in terrains.
pub fn standard_mixes() -> Vec<TerrainMix> {
    use TerrainKind::*;
    const N: usize = MAX_FEAT_IN_TERRAIN;

    let mix = |terrain: TerrainKind, global: FeatureId, runs: Vec<(FeatureId, usize)>| TerrainMix { terrain, global, runs };

    vec![
        mix(Edge, feat::PERMANENT, vec![(feat::PERMANENT, N)]),
        mix(Town, feat::TOWN, vec![(feat::FLOOR, N)]),
        mix(DeepWater, feat::DEEP_WATER, vec![(feat::DEEP_WATER, 12), (feat::SHALLOW_WATER, N - 12)]),
        mix(
            ShallowWater,
            feat::SHALLOW_WATER,
            vec![
                (feat::DEEP_WATER, 3),
                (feat::SHALLOW_WATER, 12),
                (feat::FLOOR, 1),
                (feat::DIRT, 1),
                (feat::GRASS, N - 17),
            ],
        ),
        mix(
            Swamp,
            feat::SWAMP,
            vec![
                (feat::DIRT, 2),
                (feat::GRASS, 3),
                (feat::TREE, 1),
                (feat::BRAKE, 1),
                (feat::SHALLOW_WATER, 4),
                (feat::SWAMP, N - 11),
            ],
        ),
        mix(
            Dirt,
            feat::DIRT,
            vec![
                (feat::FLOOR, 3),
                (feat::DIRT, 10),
                (feat::FLOWER, 1),
                (feat::BRAKE, 1),
                (feat::GRASS, 1),
                (feat::TREE, N - 16),
            ],
        ),
        mix(
            Grass,
            feat::GRASS,
            vec![
                (feat::FLOOR, 2),
                (feat::DIRT, 2),
                (feat::GRASS, 9),
                (feat::FLOWER, 1),
                (feat::BRAKE, 2),
                (feat::TREE, N - 16),
            ],
        ),
        mix(
            Trees,
            feat::TREE,
            vec![
                (feat::FLOOR, 2),
                (feat::DIRT, 1),
                (feat::TREE, 11),
                (feat::BRAKE, 2),
                (feat::GRASS, N - 16),
            ],
        ),
        mix(Desert, feat::DIRT, vec![(feat::FLOOR, 2), (feat::DIRT, 13), (feat::GRASS, N - 15)]),
        mix(
            ShallowLava,
            feat::SHALLOW_LAVA,
            vec![(feat::SHALLOW_LAVA, 14), (feat::DEEP_LAVA, 3), (feat::MOUNTAIN, N - 17)],
        ),
        mix(
            DeepLava,
            feat::DEEP_LAVA,
            vec![
                (feat::DIRT, 3),
                (feat::SHALLOW_LAVA, 3),
                (feat::DEEP_LAVA, 10),
                (feat::MOUNTAIN, N - 16),
            ],
        ),
        mix(
            Mountain,
            feat::MOUNTAIN,
            vec![
                (feat::FLOOR, 1),
                (feat::BRAKE, 1),
                (feat::GRASS, 2),
                (feat::DIRT, 2),
                (feat::TREE, 2),
                (feat::MOUNTAIN, N - 8),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tables_fully_populated() {
        let tables = TerrainTables::standard().unwrap();
        for kind in TerrainKind::all() {
            let t = tables.table(kind);
            assert!(t.table.iter().all(|f| !f.is_none()), "{kind:?} has an empty slot");
        }
        assert_eq!(tables.global(TerrainKind::Desert), feat::DIRT);
    }

    #[test]
    fn test_runs_expand_in_order() {
        let t = TerrainTable::from_runs(
            TerrainKind::DeepWater,
            feat::DEEP_WATER,
            &[(feat::DEEP_WATER, 12), (feat::SHALLOW_WATER, 6)],
        )
        .unwrap();
        assert_eq!(t.lookup(0), feat::DEEP_WATER);
        assert_eq!(t.lookup(11), feat::DEEP_WATER);
        assert_eq!(t.lookup(12), feat::SHALLOW_WATER);
        assert_eq!(t.lookup(17), feat::SHALLOW_WATER);
    }

    #[test]
    fn test_short_runs_fail_loudly() {
        let err = TerrainTable::from_runs(TerrainKind::Grass, feat::GRASS, &[(feat::GRASS, 10), (feat::TREE, 5)]).unwrap_err();
        assert!(matches!(err, GenError::TerrainTableSize { covered: 15, expected: 18, .. }));
    }

    #[test]
    fn test_long_runs_fail_loudly() {
        assert!(TerrainTable::from_runs(TerrainKind::Grass, feat::GRASS, &[(feat::GRASS, 19)]).is_err());
    }

    #[test]
    fn test_missing_terrain_rejected() {
        let mut mixes = standard_mixes();
        mixes.retain(|s| s.terrain != TerrainKind::Swamp);
        let err = TerrainTables::from_mixes(&mixes).unwrap_err();
        assert!(matches!(err, GenError::TerrainTableSize { terrain: TerrainKind::Swamp, .. }));
    }

    #[test]
    fn test_lookup_clamps_out_of_range_heights() {
        let tables = TerrainTables::standard().unwrap();
        assert_eq!(tables.lookup(TerrainKind::Mountain, -3), feat::FLOOR);
        assert_eq!(tables.lookup(TerrainKind::Mountain, 40), feat::MOUNTAIN);
    }
}
