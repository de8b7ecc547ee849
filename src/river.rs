//! Fractal rivers
//!
//! A river is a jittered midpoint subdivision of the straight line between
//! two points. Segments longer than four cells are split at a midpoint pushed
//! sideways by up to half the segment; short segments are painted as a band
//! of `center` feature edged with `edge` feature.

use tracing::debug;

use crate::config::RiverParams;
use crate::feature::FeatureId;
use crate::grid::{distance, CellFlags, Floor};
use crate::rng::GenRng;

/// Below this length a segment is painted instead of split.
const MIN_SPLIT_LENGTH: i32 = 4;

/// Branch endpoints are projected this many half-segments along the parent.
const BRANCH_REACH: i32 = 8;

/// Carve a river from `(x1, y1)` to `(x2, y2)`.
///
/// Cells already holding either river feature are left alone, as are
/// permanent cells. Every painted cell is marked `ICKY`; with a lava centre
/// on a lit floor it also glows.
#[allow(clippy::too_many_arguments)]
pub fn place_river(
    floor: &mut Floor,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    center: FeatureId,
    edge: FeatureId,
    width: i32,
    params: &RiverParams,
    rng: &mut GenRng,
) {
    let length = distance(x1, y1, x2, y2);

    if length > MIN_SPLIT_LENGTH {
        let dx = (x2 - x1) / 2;
        let dy = (y2 - y1) / 2;

        // Perpendicular jitter
        let mut changex = if dy != 0 { rng.randint1(dy.abs()) * 2 - dy.abs() } else { 0 };
        let mut changey = if dx != 0 { rng.randint1(dx.abs()) * 2 - dx.abs() } else { 0 };

        if !floor.in_bounds(x1 + dx + changex, y1 + dy + changey) {
            changex = 0;
            changey = 0;
        }

        let mx = x1 + dx + changex;
        let my = y1 + dy + changey;

        place_river(floor, x1, y1, mx, my, center, edge, width, params, rng);
        place_river(floor, mx, my, x2, y2, center, edge, width, params, rng);

        if rng.one_in(params.branch_chance) && width > 0 {
            let bx = x1 + BRANCH_REACH * (dx + changex);
            let by = y1 + BRANCH_REACH * (dy + changey);
            debug!(from = ?(mx, my), to = ?(bx, by), width = width - 1, "river branch");
            place_river(floor, mx, my, bx, by, center, edge, width - 1, params, rng);
        }
        return;
    }

    paint_segment(floor, x1, y1, x2, y2, center, edge, width, rng);
}

#[allow(clippy::too_many_arguments)]
fn paint_segment(
    floor: &mut Floor,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    center: FeatureId,
    edge: FeatureId,
    width: i32,
    rng: &mut GenRng,
) {
    let length = distance(x1, y1, x2, y2);
    let glows = floor.registry().flags(center).lava && !floor.darkness;

    for l in 0..length {
        let x = x1 + l * (x2 - x1) / length;
        let y = y1 + l * (y2 - y1) / length;

        for ty in (y - width - 1)..=(y + width + 1) {
            for tx in (x - width - 1)..=(x + width + 1) {
                if !floor.in_bounds2(tx, ty) {
                    continue;
                }
                let current = floor.feat(tx, ty);
                if current == center || current == edge {
                    continue;
                }

                let dist = distance(tx, ty, x, y);
                if dist > rng.rand_spread(width, 1) {
                    continue;
                }
                if floor.is_permanent(tx, ty) {
                    continue;
                }

                let Some(cell) = floor.cell_mut(tx, ty) else {
                    continue;
                };
                cell.feat = if dist > width { edge } else { center };
                cell.mimic = FeatureId::NONE;
                if glows {
                    cell.info.insert(CellFlags::GLOW);
                }
                cell.info.insert(CellFlags::ICKY);
            }
        }
    }
}

/// Run a river from a random point on the level boundary to a random point in
/// the lower-right quadrant. Returns the end point, which callers register as
/// a room centre for tunnelling.
pub fn add_river(
    floor: &mut Floor,
    center: FeatureId,
    edge: FeatureId,
    params: &RiverParams,
    rng: &mut GenRng,
) -> (i32, i32) {
    let (w, h) = (floor.width(), floor.height());

    let y2 = rng.randint1(h / 2 - 2) + h / 2;
    let x2 = rng.randint1(w / 2 - 2) + w / 2;

    let (x1, y1) = match rng.randint1(4) {
        1 => (rng.randint1(w - 2) + 1, 1),
        2 => (1, rng.randint1(h - 2) + 1),
        3 => (w - 1, rng.randint1(h - 2) + 1),
        _ => (rng.randint1(w - 2) + 1, h - 1),
    };

    let width = rng.randint1(params.width_range);
    debug!(start = ?(x1, y1), end = ?(x2, y2), width, "adding river");
    place_river(floor, x1, y1, x2, y2, center, edge, width, params, rng);

    (x2, y2)
}
