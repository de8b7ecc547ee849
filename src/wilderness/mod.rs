//! Wilderness surface
//!
//! The surface is a grid of world tiles. Each tile is generated on demand
//! from its own seed as a plasma-fractal terrain mapped through its terrain
//! table, with roads, a possible dungeon entrance, and a boundary ring that
//! mirrors the neighbouring tiles so walking across tiles looks seamless.

pub mod area;
pub mod atlas;
pub mod border;
pub mod layout;
pub mod overview;
pub mod tile;

use std::sync::Arc;

use crate::config::WildernessParams;
use crate::dungeon::DungeonRegistry;
use crate::feature::{FeatureRegistry, Palette};
use crate::grid::Floor;
use crate::terrain::TerrainTables;

pub use area::{generate_area, AreaMode, PlainTowns, TownLayout};
pub use atlas::pregenerate;
pub use border::{wilderness_gen, BorderCache};
pub use layout::{LegendEntry, WildernessLayout};
pub use overview::overview;
pub use tile::{WildernessMap, WildernessTile};

/// Height of one wilderness tile in cells.
pub const TILE_HEIGHT: usize = 66;
/// Width of one wilderness tile in cells.
pub const TILE_WIDTH: usize = 198;
/// Smallest tile with an interior: one cell inside the boundary ring.
pub const MIN_TILE_SIZE: usize = 3;

/// Everything needed to generate surface tiles.
#[derive(Clone, Debug)]
pub struct Wilderness {
    pub map: WildernessMap,
    pub terrains: TerrainTables,
    pub dungeons: DungeonRegistry,
    pub registry: Arc<FeatureRegistry>,
    pub palette: Palette,
    pub params: WildernessParams,
    /// The game has been won; winner-only entrances become visible
    pub total_winner: bool,
    pub tile_width: usize,
    pub tile_height: usize,
}

impl Wilderness {
    pub fn new(
        map: WildernessMap,
        terrains: TerrainTables,
        dungeons: DungeonRegistry,
        registry: Arc<FeatureRegistry>,
        params: WildernessParams,
    ) -> Self {
        Self {
            map,
            terrains,
            dungeons,
            registry,
            palette: Palette::default(),
            params,
            total_winner: false,
            tile_width: TILE_WIDTH,
            tile_height: TILE_HEIGHT,
        }
    }

    /// Use smaller tiles. Mostly for tests and previews. Sizes below
    /// [`MIN_TILE_SIZE`] are raised to it.
    pub fn with_tile_size(mut self, width: usize, height: usize) -> Self {
        self.tile_width = width.max(MIN_TILE_SIZE);
        self.tile_height = height.max(MIN_TILE_SIZE);
        self
    }

    /// Fresh buffer sized for one tile.
    pub fn new_floor(&self) -> Floor {
        Floor::new(self.tile_width, self.tile_height, Arc::clone(&self.registry))
    }

    /// Whether the tile shows its dungeon entrance.
    pub fn entrance_visible(&self, tile: &WildernessTile) -> bool {
        tile.entrance != 0
            && tile.town == 0
            && (self.total_winner || !self.dungeons.is_winner_only(tile.entrance))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::rng::GenRng;
    use crate::terrain::TerrainKind;

    /// Small surface used across the wilderness tests.
    pub fn small_wilderness(seed: u64) -> Wilderness {
        let (mut map, _) = WildernessLayout::demo().build().unwrap();
        let mut rng = GenRng::from_seed(seed);
        let dungeons = DungeonRegistry::standard();
        map.seed_all(&mut rng);
        map.apply_entrances(&dungeons);
        Wilderness::new(
            map,
            TerrainTables::standard().unwrap(),
            dungeons,
            Arc::new(FeatureRegistry::standard()),
            WildernessParams::default(),
        )
        .with_tile_size(65, 33)
    }

    pub fn first_tile(wild: &Wilderness, terrain: TerrainKind) -> (i32, i32) {
        wild.map
            .iter()
            .find(|(_, _, t)| t.terrain == terrain && t.town == 0)
            .map(|(x, y, _)| (x as i32, y as i32))
            .unwrap()
    }
}
