//! Plasma fractal height fields
//!
//! Recursive midpoint subdivision over a rectangle whose four corners are
//! already set. Each step writes the centre from the corner average, then the
//! four edge midpoints from their two corners and the new centre, and recurses
//! into the quadrants. Heights stay in `[0, depth_max]`.

use crate::rng::GenRng;
use crate::tilemap::Tilemap;

/// Integer heights, later mapped through a terrain table.
pub type HeightField = Tilemap<i16>;

/// Fill `[x1, x2] x [y1, y2]` from its four corner values.
///
/// The corners must be set before the call. On square `2^n + 1` regions they
/// are never written; on other shapes the degenerate quadrants near the end of
/// the recursion may rewrite them, so callers that need exact corners save and
/// restore them.
pub fn plasma_fill(
    field: &mut HeightField,
    x1: usize,
    y1: usize,
    x2: usize,
    y2: usize,
    depth_max: i16,
    rough: i16,
    rng: &mut GenRng,
) {
    if x1 + 1 >= x2 {
        return;
    }

    let xmid = (x2 - x1) / 2 + x1;
    let ymid = (y2 - y1) / 2 + y1;

    let nw = *field.get(x1, y1);
    let sw = *field.get(x1, y2);
    let ne = *field.get(x2, y1);
    let se = *field.get(x2, y2);
    perturb_mid(field, [nw, sw, ne, se], xmid, ymid, rough, depth_max, rng);

    // Top, right, bottom, left. Each edge reads the corners after the
    // previous edge was written.
    let edges = [
        ((x1, y1), (x2, y1), (xmid, y1)),
        ((x2, y1), (x2, y2), (x2, ymid)),
        ((x2, y2), (x1, y2), (xmid, y2)),
        ((x1, y2), (x1, y1), (x1, ymid)),
    ];
    for ((ax, ay), (bx, by), (tx, ty)) in edges {
        let a = *field.get(ax, ay);
        let b = *field.get(bx, by);
        let mid = *field.get(xmid, ymid);
        perturb_end(field, [a, b, mid], tx, ty, rough, depth_max, rng);
    }

    plasma_fill(field, x1, y1, xmid, ymid, depth_max, rough, rng);
    plasma_fill(field, xmid, y1, x2, ymid, depth_max, rough, rng);
    plasma_fill(field, x1, ymid, xmid, y2, depth_max, rough, rng);
    plasma_fill(field, xmid, ymid, x2, y2, depth_max, rough, rng);
}

/// Centre point: four-corner average, rounded up when the remainder exceeds
/// one, perturbed by up to `rough` either way.
fn perturb_mid(
    field: &mut HeightField,
    corners: [i16; 4],
    x: usize,
    y: usize,
    rough: i16,
    depth_max: i16,
    rng: &mut GenRng,
) {
    let rough = rough as i32;
    let noise = rng.randint1(rough * 2 + 1) - (rough + 1);

    let sum: i32 = corners.iter().map(|&c| c as i32).sum();
    let mut avg = sum / 4 + noise;
    if sum % 4 > 1 {
        avg += 1;
    }

    field.set(x, y, avg.clamp(0, depth_max as i32) as i16);
}

/// Edge point: three-value average, rounded up on any remainder.
fn perturb_end(
    field: &mut HeightField,
    values: [i16; 3],
    x: usize,
    y: usize,
    rough: i16,
    depth_max: i16,
    rng: &mut GenRng,
) {
    let rough = rough as i32;
    let noise = rng.randint0(rough * 2 + 1) - rough;

    let sum: i32 = values.iter().map(|&v| v as i32).sum();
    let mut avg = sum / 3 + noise;
    if sum % 3 != 0 {
        avg += 1;
    }

    field.set(x, y, avg.clamp(0, depth_max as i32) as i16);
}
