//! World tiles and the wilderness map.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dungeon::DungeonRegistry;
use crate::rng::GenRng;
use crate::terrain::TerrainKind;
use crate::tilemap::Tilemap;

/// Exclusive upper bound of per-tile seeds.
const SEED_RANGE: i32 = 0x1000_0000;

/// One world tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildernessTile {
    pub terrain: TerrainKind,
    /// Town number, 0 when not a town
    pub town: u16,
    /// Danger level
    pub level: i16,
    pub road: bool,
    /// Seed the tile's terrain is regenerated from
    pub seed: u32,
    /// Dungeon whose entrance lies here, 0 when none
    pub entrance: u16,
    pub name: String,
}

impl Default for WildernessTile {
    fn default() -> Self {
        Self {
            terrain: TerrainKind::Edge,
            town: 0,
            level: 0,
            road: false,
            seed: 0,
            entrance: 0,
            name: String::new(),
        }
    }
}

/// Grid of world tiles. Reads outside the grid return an edge tile.
#[derive(Clone, Debug)]
pub struct WildernessMap {
    tiles: Tilemap<WildernessTile>,
    edge: WildernessTile,
}

impl WildernessMap {
    /// Map filled with edge tiles.
    pub fn new(width: usize, height: usize) -> Self {
        Self::from_tiles(Tilemap::new(width, height))
    }

    pub fn from_tiles(tiles: Tilemap<WildernessTile>) -> Self {
        Self {
            tiles,
            edge: WildernessTile::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.tiles.width
    }

    pub fn height(&self) -> usize {
        self.tiles.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.tiles.contains(x, y)
    }

    /// Tile at a position; edge terrain outside the map.
    pub fn tile(&self, x: i32, y: i32) -> &WildernessTile {
        self.tiles.get_signed(x, y).unwrap_or(&self.edge)
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut WildernessTile> {
        self.tiles.get_signed_mut(x, y)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &WildernessTile)> {
        self.tiles.iter()
    }

    /// Give every tile a fresh terrain seed and forget entrances.
    pub fn seed_all(&mut self, rng: &mut GenRng) {
        for (_, _, tile) in self.tiles.iter_mut() {
            tile.seed = rng.randint0(SEED_RANGE) as u32;
            tile.entrance = 0;
        }
    }

    /// Mark the tile of every dungeon with levels as its entrance. Non-town
    /// entrance tiles take the dungeon's shallowest depth as their level.
    pub fn apply_entrances(&mut self, dungeons: &DungeonRegistry) {
        for dungeon in dungeons.iter().filter(|d| d.has_levels()) {
            let Some(tile) = self.tiles.get_signed_mut(dungeon.wild_x as i32, dungeon.wild_y as i32) else {
                debug!(dungeon = %dungeon.name, x = dungeon.wild_x, y = dungeon.wild_y, "entrance lies outside the wilderness");
                continue;
            };
            tile.entrance = dungeon.id;
            if tile.town == 0 {
                tile.level = dungeon.min_depth;
            }
        }
    }
}
