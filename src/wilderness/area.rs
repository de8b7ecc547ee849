//! Generation of a single wilderness tile.

use tracing::debug;

use crate::feature::Palette;
use crate::grid::Floor;
use crate::plasma::{plasma_fill, HeightField};
use crate::rng::GenRng;
use crate::terrain::{TerrainKind, MAX_FEAT_IN_TERRAIN};

use super::Wilderness;

/// How much of a tile to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AreaMode {
    /// The tile the player stands on
    Full,
    /// Edge neighbour: its facing row or column feeds the boundary ring
    Border,
    /// Diagonal neighbour: only the four corner cells are needed
    Corner,
}

/// Source of town maps.
pub trait TownLayout {
    fn build_town(&self, floor: &mut Floor, town: u16, mode: AreaMode, rng: &mut GenRng);
}

/// Towns as open paved squares.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTowns {
    pub palette: Palette,
}

impl TownLayout for PlainTowns {
    fn build_town(&self, floor: &mut Floor, _town: u16, _mode: AreaMode, _rng: &mut GenRng) {
        floor.fill(self.palette.floor);
    }
}

/// Generate tile `(x, y)` of the wilderness into `floor`.
///
/// Terrain comes from a scope seeded with the tile seed, so a tile always
/// regenerates identically and the caller's RNG sequence is untouched.
/// Returns the entrance position when one was placed.
pub fn generate_area(
    wild: &Wilderness,
    floor: &mut Floor,
    x: i32,
    y: i32,
    mode: AreaMode,
    towns: &dyn TownLayout,
    rng: &mut GenRng,
) -> Option<(i32, i32)> {
    let tile = wild.map.tile(x, y);
    let palette = &wild.palette;

    floor.town = tile.town;
    floor.base_level = tile.level;
    floor.darkness = false;

    if tile.town != 0 {
        towns.build_town(floor, tile.town, mode, rng);
    } else {
        generate_terrain(wild, floor, tile.terrain, tile.seed, mode, rng);
    }

    if mode != AreaMode::Corner && tile.town == 0 && tile.road {
        lay_roads(wild, floor, x, y);
    }

    if !wild.entrance_visible(tile) {
        return None;
    }

    let mut scope = rng.scoped(tile.seed as u64);
    let margin = wild.params.entrance_margin;
    let dy = scope.rand_range(margin, floor.height() - margin);
    let dx = scope.rand_range(margin, floor.width() - margin);

    let cell = floor.cell_mut(dx, dy)?;
    cell.feat = palette.entrance;
    cell.special = tile.entrance;
    debug!(tile = ?(x, y), dungeon = tile.entrance, at = ?(dx, dy), "entrance placed");
    Some((dx, dy))
}

/// Plasma terrain for a non-town tile.
fn generate_terrain(
    wild: &Wilderness,
    floor: &mut Floor,
    terrain: TerrainKind,
    seed: u32,
    mode: AreaMode,
    rng: &mut GenRng,
) {
    floor.fill(wild.palette.permanent);
    if terrain == TerrainKind::Edge {
        return;
    }

    let table = wild.terrains.table(terrain);
    let (w, h) = (floor.cells().width, floor.cells().height);
    let table_size = MAX_FEAT_IN_TERRAIN as i32;

    let mut scope = rng.scoped(seed as u64);

    // NW, SW, NE, SE
    let corners = [(1, 1), (1, h - 2), (w - 2, 1), (w - 2, h - 2)];
    let heights = corners.map(|_| scope.randint0(table_size) as i16);

    if mode == AreaMode::Corner {
        for ((cx, cy), height) in corners.into_iter().zip(heights) {
            floor.cells_mut().get_mut(cx, cy).feat = table.lookup(height);
        }
        return;
    }

    let mut field = HeightField::new_with(w, h, (MAX_FEAT_IN_TERRAIN / 2) as i16);
    for ((cx, cy), height) in corners.into_iter().zip(heights) {
        field.set(cx, cy, height);
    }

    plasma_fill(&mut field, 1, 1, w - 2, h - 2, (table_size - 1) as i16, wild.params.plasma.roughness, &mut scope);

    // Non-square tiles can disturb the corners near the end of the recursion
    for ((cx, cy), height) in corners.into_iter().zip(heights) {
        field.set(cx, cy, height);
    }

    for cy in 1..h - 1 {
        for cx in 1..w - 1 {
            floor.cells_mut().get_mut(cx, cy).feat = table.lookup(*field.get(cx, cy));
        }
    }
}

/// Centre crossroad plus a corridor towards every neighbour with a road.
fn lay_roads(wild: &Wilderness, floor: &mut Floor, x: i32, y: i32) {
    let road = wild.palette.floor;
    let (w, h) = (floor.width(), floor.height());
    let (mx, my) = (w / 2, h / 2);

    floor.try_set(mx, my, road);

    if wild.map.tile(x, y - 1).road {
        for ry in 1..my {
            floor.try_set(mx, ry, road);
        }
    }
    if wild.map.tile(x, y + 1).road {
        for ry in my..h - 1 {
            floor.try_set(mx, ry, road);
        }
    }
    if wild.map.tile(x + 1, y).road {
        for rx in mx..w - 1 {
            floor.try_set(rx, my, road);
        }
    }
    if wild.map.tile(x - 1, y).road {
        for rx in 1..mx {
            floor.try_set(rx, my, road);
        }
    }
}
