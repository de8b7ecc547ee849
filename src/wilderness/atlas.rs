//! Parallel pregeneration of many wilderness tiles
//!
//! Tiles are independent: each worker owns its floor and RNG and only reads
//! the shared wilderness description.

use rayon::prelude::*;
use tracing::info;

use crate::grid::Floor;
use crate::rng::GenRng;

use super::area::TownLayout;
use super::border::wilderness_gen;
use super::Wilderness;

/// Generate fully stitched tiles for `coords`, in the same order.
pub fn pregenerate<T>(wild: &Wilderness, coords: &[(i32, i32)], daytime: bool, towns: &T, base_seed: u64) -> Vec<Floor>
where
    T: TownLayout + Sync,
{
    info!(tiles = coords.len(), "pregenerating wilderness tiles");

    coords
        .par_iter()
        .enumerate()
        .map(|(i, &(x, y))| {
            let mut rng = GenRng::from_seed(base_seed.wrapping_add(i as u64));
            let mut floor = wild.new_floor();
            wilderness_gen(wild, &mut floor, x, y, daytime, towns, &mut rng);
            floor
        })
        .collect()
}

/// Every tile of the map, row by row.
pub fn all_tiles(wild: &Wilderness) -> Vec<(i32, i32)> {
    let (w, h) = (wild.map.width() as i32, wild.map.height() as i32);
    (0..h).flat_map(|y| (0..w).map(move |x| (x, y))).collect()
}
