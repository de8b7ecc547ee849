//! Border stitching between neighbouring wilderness tiles
//!
//! Before generating the current tile the eight neighbours are generated
//! into the same buffer: edge neighbours in border mode, diagonal ones in
//! corner mode. The cells that face the current tile are recorded and later
//! shown (as mimics) on the permanent boundary ring, so the view across a
//! tile edge matches what the player finds after crossing it.

use tracing::info;

use crate::feature::FeatureId;
use crate::grid::{CellFlags, Floor};
use crate::rng::GenRng;

use super::area::{generate_area, AreaMode, TownLayout};
use super::Wilderness;

/// Neighbour cells shown on the boundary ring of a tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BorderCache {
    /// Indexed by x, length = tile width
    pub north: Vec<FeatureId>,
    pub south: Vec<FeatureId>,
    /// Indexed by y, length = tile height
    pub west: Vec<FeatureId>,
    pub east: Vec<FeatureId>,
    pub north_west: FeatureId,
    pub north_east: FeatureId,
    pub south_west: FeatureId,
    pub south_east: FeatureId,
}

impl BorderCache {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            north: vec![FeatureId::NONE; width],
            south: vec![FeatureId::NONE; width],
            west: vec![FeatureId::NONE; height],
            east: vec![FeatureId::NONE; height],
            north_west: FeatureId::NONE,
            north_east: FeatureId::NONE,
            south_west: FeatureId::NONE,
            south_east: FeatureId::NONE,
        }
    }
}

/// Row `y` without its two ring cells, padded back to full width.
fn inner_row(floor: &Floor, y: usize) -> Vec<FeatureId> {
    without_ends(floor.cells().row(y).iter().map(|c| c.feat).collect())
}

fn inner_column(floor: &Floor, x: usize) -> Vec<FeatureId> {
    without_ends(floor.cells().column(x).iter().map(|c| c.feat).collect())
}

fn without_ends(mut line: Vec<FeatureId>) -> Vec<FeatureId> {
    if let Some(first) = line.first_mut() {
        *first = FeatureId::NONE;
    }
    if let Some(last) = line.last_mut() {
        *last = FeatureId::NONE;
    }
    line
}

/// Generate the tile at `(x, y)` with a boundary ring mirroring its
/// neighbours, then light it for day or night.
pub fn wilderness_gen(
    wild: &Wilderness,
    floor: &mut Floor,
    x: i32,
    y: i32,
    daytime: bool,
    towns: &dyn TownLayout,
    rng: &mut GenRng,
) -> BorderCache {
    let (w, h) = (floor.cells().width, floor.cells().height);
    let mut border = BorderCache::new(w, h);

    // Edge neighbours
    generate_area(wild, floor, x, y - 1, AreaMode::Border, towns, rng);
    border.north = inner_row(floor, h - 2);

    generate_area(wild, floor, x, y + 1, AreaMode::Border, towns, rng);
    border.south = inner_row(floor, 1);

    generate_area(wild, floor, x - 1, y, AreaMode::Border, towns, rng);
    border.west = inner_column(floor, w - 2);

    generate_area(wild, floor, x + 1, y, AreaMode::Border, towns, rng);
    border.east = inner_column(floor, 1);

    // Diagonal neighbours
    generate_area(wild, floor, x - 1, y - 1, AreaMode::Corner, towns, rng);
    border.north_west = floor.cells().get(w - 2, h - 2).feat;

    generate_area(wild, floor, x + 1, y - 1, AreaMode::Corner, towns, rng);
    border.north_east = floor.cells().get(1, h - 2).feat;

    generate_area(wild, floor, x - 1, y + 1, AreaMode::Corner, towns, rng);
    border.south_west = floor.cells().get(w - 2, 1).feat;

    generate_area(wild, floor, x + 1, y + 1, AreaMode::Corner, towns, rng);
    border.south_east = floor.cells().get(1, 1).feat;

    // The tile itself
    generate_area(wild, floor, x, y, AreaMode::Full, towns, rng);
    apply_border(floor, &border, wild.palette.permanent);
    apply_lighting(floor, daytime, wild.params.view_perma_grids);

    info!(tile = ?(x, y), daytime, "wilderness tile generated");
    border
}

/// Rewrite the outer ring as permanent cells showing the neighbour terrain.
fn apply_border(floor: &mut Floor, border: &BorderCache, permanent: FeatureId) {
    let (w, h) = (floor.cells().width, floor.cells().height);
    let cells = floor.cells_mut();

    for x in 0..w {
        for (y, mimic) in [(0, border.north[x]), (h - 1, border.south[x])] {
            let cell = cells.get_mut(x, y);
            cell.feat = permanent;
            cell.mimic = mimic;
        }
    }
    for y in 0..h {
        for (x, mimic) in [(0, border.west[y]), (w - 1, border.east[y])] {
            let cell = cells.get_mut(x, y);
            cell.feat = permanent;
            cell.mimic = mimic;
        }
    }

    cells.get_mut(0, 0).mimic = border.north_west;
    cells.get_mut(w - 1, 0).mimic = border.north_east;
    cells.get_mut(0, h - 1).mimic = border.south_west;
    cells.get_mut(w - 1, h - 1).mimic = border.south_east;
}

/// Daylight lights and memorizes everything. At night only entrances stay
/// lit, and features not worth remembering are forgotten.
fn apply_lighting(floor: &mut Floor, daytime: bool, view_perma_grids: bool) {
    let registry = floor.shared_registry();
    let lit = if view_perma_grids { CellFlags::GLOW | CellFlags::MARK } else { CellFlags::GLOW };

    for (_, _, cell) in floor.cells_mut().iter_mut() {
        if daytime {
            cell.info.insert(lit);
            continue;
        }

        let shown = registry.flags(cell.shown_feat());
        if shown.entrance {
            cell.info.insert(lit);
            continue;
        }

        cell.info.remove(CellFlags::GLOW);
        if !shown.remember {
            cell.info.remove(CellFlags::MARK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::feat;
    use crate::wilderness::area::PlainTowns;
    use crate::wilderness::testing::small_wilderness;

    #[test]
    fn test_ring_is_permanent_and_mirrors_neighbours() {
        let wild = small_wilderness(11);
        let mut floor = wild.new_floor();
        let (x, y) = (2, 4);
        let border = wilderness_gen(&wild, &mut floor, x, y, true, &PlainTowns::default(), &mut GenRng::from_seed(0));

        let (w, h) = (floor.width(), floor.height());
        for cx in 0..w {
            assert_eq!(floor.feat(cx, 0), feat::PERMANENT);
            assert_eq!(floor.feat(cx, h - 1), feat::PERMANENT);
        }

        // The north neighbour's second-to-last row shows on our top ring
        let mut north = wild.new_floor();
        generate_area(&wild, &mut north, x, y - 1, AreaMode::Full, &PlainTowns::default(), &mut GenRng::from_seed(0));
        for cx in 1..w - 1 {
            assert_eq!(floor.cell(cx, 0).unwrap().mimic, north.feat(cx, h - 2));
            assert_eq!(border.north[cx as usize], north.feat(cx, h - 2));
        }

        // The east neighbour's second column shows on our right ring
        let mut east = wild.new_floor();
        generate_area(&wild, &mut east, x + 1, y, AreaMode::Full, &PlainTowns::default(), &mut GenRng::from_seed(0));
        for cy in 1..h - 1 {
            assert_eq!(floor.cell(w - 1, cy).unwrap().mimic, east.feat(1, cy));
        }
    }

    #[test]
    fn test_ring_corners_show_diagonal_neighbours() {
        let wild = small_wilderness(12);
        let mut floor = wild.new_floor();
        let (x, y) = (3, 3);
        wilderness_gen(&wild, &mut floor, x, y, true, &PlainTowns::default(), &mut GenRng::from_seed(0));
        let (w, h) = (floor.width(), floor.height());

        let mut nw = wild.new_floor();
        generate_area(&wild, &mut nw, x - 1, y - 1, AreaMode::Full, &PlainTowns::default(), &mut GenRng::from_seed(0));
        assert_eq!(floor.cell(0, 0).unwrap().mimic, nw.feat(w - 2, h - 2));

        let mut se = wild.new_floor();
        generate_area(&wild, &mut se, x + 1, y + 1, AreaMode::Full, &PlainTowns::default(), &mut GenRng::from_seed(0));
        assert_eq!(floor.cell(w - 1, h - 1).unwrap().mimic, se.feat(1, 1));
    }

    #[test]
    fn test_interior_matches_plain_generation() {
        let wild = small_wilderness(13);
        let mut stitched = wild.new_floor();
        wilderness_gen(&wild, &mut stitched, 4, 4, true, &PlainTowns::default(), &mut GenRng::from_seed(0));

        let mut plain = wild.new_floor();
        generate_area(&wild, &mut plain, 4, 4, AreaMode::Full, &PlainTowns::default(), &mut GenRng::from_seed(0));

        let (w, h) = (plain.width(), plain.height());
        for cy in 1..h - 1 {
            for cx in 1..w - 1 {
                assert_eq!(stitched.feat(cx, cy), plain.feat(cx, cy));
            }
        }
    }

    #[test]
    fn test_daylight_lights_everything() {
        let wild = small_wilderness(14);
        let mut floor = wild.new_floor();
        wilderness_gen(&wild, &mut floor, 2, 2, true, &PlainTowns::default(), &mut GenRng::from_seed(0));
        assert!(floor.cells().iter().all(|(_, _, c)| c.info.contains(CellFlags::GLOW | CellFlags::MARK)));
    }

    #[test]
    fn test_night_keeps_only_entrances_lit() {
        let wild = small_wilderness(15);
        let mut floor = wild.new_floor();
        // Old Mine entrance tile
        wilderness_gen(&wild, &mut floor, 3, 2, false, &PlainTowns::default(), &mut GenRng::from_seed(0));

        let mut entrances = 0;
        for (_, _, cell) in floor.cells().iter() {
            let flags = floor.registry().flags(cell.shown_feat());
            if flags.entrance {
                entrances += 1;
                assert!(cell.info.contains(CellFlags::GLOW));
            } else {
                assert!(!cell.info.contains(CellFlags::GLOW));
                if !flags.remember {
                    assert!(!cell.info.contains(CellFlags::MARK));
                }
            }
        }
        assert_eq!(entrances, 1);
    }

    #[test]
    fn test_undersized_tile_raised_to_minimum() {
        use crate::wilderness::MIN_TILE_SIZE;

        let wild = small_wilderness(17).with_tile_size(1, 0);
        assert_eq!((wild.tile_width, wild.tile_height), (MIN_TILE_SIZE, MIN_TILE_SIZE));

        // (2, 2) borders the Old Mine entrance tile to the east
        let mut floor = wild.new_floor();
        wilderness_gen(&wild, &mut floor, 2, 2, true, &PlainTowns::default(), &mut GenRng::from_seed(0));
        assert_eq!((floor.width(), floor.height()), (3, 3));
        for (x, y, cell) in floor.cells().iter() {
            if x != 1 || y != 1 {
                assert_eq!(cell.feat, feat::PERMANENT);
            }
        }
    }

    #[test]
    fn test_caller_rng_untouched_by_stitching() {
        let wild = small_wilderness(16);
        let mut reference = GenRng::from_seed(8);
        let expected: Vec<i32> = (0..4).map(|_| reference.randint0(1000)).collect();

        let mut rng = GenRng::from_seed(8);
        let mut floor = wild.new_floor();
        wilderness_gen(&wild, &mut floor, 6, 4, true, &PlainTowns::default(), &mut rng);
        let drawn: Vec<i32> = (0..4).map(|_| rng.randint0(1000)).collect();
        assert_eq!(drawn, expected);
    }
}
