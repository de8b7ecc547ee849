//! Mineral veins and other streamers
//!
//! A streamer is a random walk from near the level centre. At every step a
//! handful of cells around the walker are converted to the streamer feature;
//! the walk drifts in a compass direction and occasionally turns. It ends
//! when the walker leaves the level interior or the attempt budget runs out.

use tracing::{debug, warn};

use crate::config::StreamerParams;
use crate::feature::{AlterAction, FeatureId};
use crate::grid::{CellFlags, Floor};
use crate::occupants::Occupants;
use crate::rng::GenRng;

/// Compass ring as `(dx, dy)`: S, SE, E, NE, N, NW, W, SW.
pub const COMPASS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Result of one streamer walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamerOutcome {
    /// Cells converted
    pub placed: usize,
    /// The walk hit its attempt budget instead of leaving the level
    pub exhausted: bool,
}

/// Walk a streamer of `feat` across the floor.
///
/// Veins that may carry gold become visible treasure with probability
/// `1/gold_chance` per cell, or hidden treasure with `1/(gold_chance/4)`.
pub fn build_streamer(
    floor: &mut Floor,
    feat: FeatureId,
    gold_chance: i32,
    occupants: &mut dyn Occupants,
    params: &StreamerParams,
    rng: &mut GenRng,
) -> StreamerOutcome {
    let streamer = floor.registry().flags(feat);
    let is_wall = streamer.is_diggable_wall();
    let (w, h) = (floor.width(), floor.height());

    let mut outcome = StreamerOutcome::default();
    if w < 1 || h < 1 {
        outcome.exhausted = true;
        return outcome;
    }

    let mut y = rng.rand_spread(h / 2, h / 6);
    let mut x = rng.rand_spread(w / 2, w / 6);
    let mut dir = rng.randint0(COMPASS.len() as i32) as usize;

    for attempt in 1..=params.max_attempts {
        for _ in 0..params.density {
            let (tx, ty) = loop {
                let ty = rng.rand_spread(y, params.range);
                let tx = rng.rand_spread(x, params.range);
                if floor.in_bounds2(tx, ty) {
                    break (tx, ty);
                }
            };

            let here = floor.flags_at(tx, ty);
            if here.is_flowing_liquid() || floor.is_permanent(tx, ty) {
                continue;
            }

            let Some(cell) = floor.cell(tx, ty) else {
                continue;
            };
            if is_wall && (!cell.info.intersects(CellFlags::GRANITE_KINDS) || here.closed_door) {
                continue;
            }

            let monster = cell.monster;
            let object = cell.object;

            if let Some(m) = monster {
                if !(streamer.place && occupants.monster_can_cross(m, feat)) {
                    occupants.delete_monster(m);
                    if let Some(cell) = floor.cell_mut(tx, ty) {
                        cell.monster = None;
                    }
                }
            }

            if let Some(head) = object {
                if !streamer.drop {
                    for removed in occupants.remove_objects(head).iter().filter(|o| o.is_artifact()) {
                        debug!(artifact = %removed.name, x = tx, y = ty, "artifact deleted by streamer");
                    }
                    if let Some(cell) = floor.cell_mut(tx, ty) {
                        cell.object = None;
                    }
                }
            }

            let mut placed = feat;
            if streamer.may_have_gold {
                if rng.one_in(gold_chance) {
                    placed = floor.registry().alter(placed, AlterAction::AddTreasure);
                } else if rng.one_in(gold_chance / 4) {
                    placed = floor.registry().alter(placed, AlterAction::AddTreasure);
                    placed = floor.registry().alter(placed, AlterAction::Conceal);
                }
            }

            if let Some(cell) = floor.cell_mut(tx, ty) {
                cell.feat = placed;
                cell.mimic = FeatureId::NONE;
                outcome.placed += 1;
            }
        }

        if attempt == params.max_attempts {
            break;
        }

        let (dx, dy) = COMPASS[dir];
        x += dx;
        y += dy;

        if rng.one_in(params.turn_chance) {
            dir = if rng.one_in(2) { (dir + 1) % 8 } else { (dir + 7) % 8 };
        }

        if !floor.in_bounds(x, y) {
            debug!(placed = outcome.placed, steps = attempt, "streamer left the level");
            return outcome;
        }
    }

    warn!(feat = feat.0, placed = outcome.placed, "failed to place streamer");
    outcome.exhausted = true;
    outcome
}
