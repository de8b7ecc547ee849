//! Decorations: tree clusters and destroyed levels.

use tracing::{debug, info};

use crate::config::DecorParams;
use crate::feature::{FeatureId, Palette};
use crate::grid::{distance, CellFlags, Floor};
use crate::occupants::Occupants;
use crate::rng::GenRng;

/// Scatter an oval cluster of trees around `(x, y)`, with rubble near the
/// centre, and sometimes an up staircase in the middle.
///
/// Returns whether the staircase was placed.
pub fn place_trees(
    floor: &mut Floor,
    x: i32,
    y: i32,
    palette: &Palette,
    params: &DecorParams,
    ironman_downward: bool,
    rng: &mut GenRng,
) -> bool {
    let lit = !floor.darkness;

    for i in (x - 3)..(x + 4) {
        for j in (y - 3)..(y + 4) {
            if !floor.in_bounds(i, j) {
                continue;
            }
            let Some(cell) = floor.cell(i, j) else {
                continue;
            };
            if cell.info.contains(CellFlags::ICKY) || cell.object.is_some() {
                continue;
            }

            let dist = distance(i, j, x, y);
            if dist >= 4 || floor.is_permanent(i, j) {
                continue;
            }

            let feat = if dist > 1 || rng.randint1(100) < params.center_tree_percent {
                if rng.randint1(100) < params.tree_percent {
                    Some(palette.tree)
                } else {
                    None
                }
            } else {
                Some(palette.rubble)
            };

            if let Some(cell) = floor.cell_mut(i, j) {
                if let Some(feat) = feat {
                    cell.feat = feat;
                }
                cell.mimic = FeatureId::NONE;
                if lit {
                    cell.info.insert(CellFlags::GLOW | CellFlags::ROOM);
                }
            }
        }
    }

    !ironman_downward && rng.one_in(params.up_stair_chance) && floor.try_set(x, y, palette.up_stair)
}

/// Primitive that wrecks a circular area.
pub trait AreaDestroyer {
    fn destroy_area(&mut self, floor: &mut Floor, x: i32, y: i32, radius: i32, rng: &mut GenRng);
}

/// Destroyer that turns an area into broken rock and rubble-strewn floor,
/// deleting whatever stood there.
pub struct ShatterArea<'a> {
    pub palette: Palette,
    pub occupants: &'a mut dyn Occupants,
}

impl<'a> ShatterArea<'a> {
    pub fn new(palette: Palette, occupants: &'a mut dyn Occupants) -> Self {
        Self { palette, occupants }
    }
}

impl AreaDestroyer for ShatterArea<'_> {
    fn destroy_area(&mut self, floor: &mut Floor, x: i32, y: i32, radius: i32, rng: &mut GenRng) {
        for ty in (y - radius)..=(y + radius) {
            for tx in (x - radius)..=(x + radius) {
                if !floor.in_bounds(tx, ty) || distance(tx, ty, x, y) > radius {
                    continue;
                }
                if floor.is_permanent(tx, ty) {
                    continue;
                }

                let roll = rng.randint0(200);
                let (feat, extra) = match roll {
                    0..=19 => (self.palette.granite, true),
                    20..=69 => (self.palette.quartz, false),
                    70..=99 => (self.palette.magma, false),
                    _ => (self.palette.floor, false),
                };

                let Some(cell) = floor.cell_mut(tx, ty) else {
                    continue;
                };
                if let Some(m) = cell.monster.take() {
                    self.occupants.delete_monster(m);
                }
                if let Some(head) = cell.object.take() {
                    for lost in self.occupants.remove_objects(head).iter().filter(|o| o.is_artifact()) {
                        debug!(artifact = %lost.name, x = tx, y = ty, "artifact lost in destruction");
                    }
                }

                cell.info.remove(CellFlags::ICKY | CellFlags::ROOM | CellFlags::GLOW | CellFlags::MARK);
                cell.feat = feat;
                cell.mimic = FeatureId::NONE;
                if extra {
                    cell.info.insert(CellFlags::EXTRA);
                }
            }
        }
    }
}

/// Wreck a handful of random epicentres across the level. Returns the
/// epicentres used.
pub fn destroy_level(
    floor: &mut Floor,
    destroyer: &mut dyn AreaDestroyer,
    params: &DecorParams,
    rng: &mut GenRng,
) -> Vec<(i32, i32)> {
    let count = rng.randint1(params.max_epicenters);
    info!(epicenters = count, "destroying level");

    let margin = params.epicenter_margin;
    let mut centers = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let x = rng.rand_range(margin, floor.width() - 1 - margin);
        let y = rng.rand_range(margin, floor.height() - 1 - margin);
        destroyer.destroy_area(floor, x, y, params.destruction_radius, rng);
        centers.push((x, y));
    }
    centers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{feat, FeatureRegistry};
    use crate::occupants::{NoOccupants, OccupantLedger};
    use std::sync::Arc;

    fn grass_floor(w: usize, h: usize) -> Floor {
        let mut floor = Floor::new(w, h, Arc::new(FeatureRegistry::standard()));
        floor.fill(feat::GRASS);
        floor
    }

    #[test]
    fn test_trees_stay_within_radius() {
        let mut floor = grass_floor(30, 30);
        let mut rng = GenRng::from_seed(9);
        place_trees(&mut floor, 15, 15, &Palette::default(), &DecorParams::default(), true, &mut rng);

        for (x, y, cell) in floor.cells().iter() {
            if cell.feat == feat::TREE || cell.feat == feat::RUBBLE {
                assert!(distance(x as i32, y as i32, 15, 15) < 4);
            }
        }
        assert!(floor.count_feat(feat::TREE) > 0);
    }

    #[test]
    fn test_trees_light_area_unless_dark() {
        let mut lit = grass_floor(20, 20);
        place_trees(&mut lit, 10, 10, &Palette::default(), &DecorParams::default(), true, &mut GenRng::from_seed(1));
        assert!(lit.cell(10, 10).unwrap().info.contains(CellFlags::GLOW | CellFlags::ROOM));

        let mut dark = grass_floor(20, 20);
        dark.darkness = true;
        place_trees(&mut dark, 10, 10, &Palette::default(), &DecorParams::default(), true, &mut GenRng::from_seed(1));
        assert!(dark.cells().iter().all(|(_, _, c)| !c.info.intersects(CellFlags::GLOW)));
    }

    #[test]
    fn test_trees_skip_icky_and_object_cells() {
        let mut floor = grass_floor(20, 20);
        floor.cell_mut(11, 10).unwrap().info.insert(CellFlags::ICKY);
        floor.cell_mut(9, 10).unwrap().object = Some(crate::grid::ObjectRef(1));
        floor.cell_mut(10, 11).unwrap().feat = feat::PERMANENT;

        for seed in 0..10 {
            place_trees(&mut floor, 10, 10, &Palette::default(), &DecorParams::default(), true, &mut GenRng::from_seed(seed));
        }
        assert_eq!(floor.feat(11, 10), feat::GRASS);
        assert_eq!(floor.feat(9, 10), feat::GRASS);
        assert_eq!(floor.feat(10, 11), feat::PERMANENT);
    }

    #[test]
    fn test_ironman_never_gets_up_stairs() {
        for seed in 0..30 {
            let mut floor = grass_floor(20, 20);
            let placed = place_trees(&mut floor, 10, 10, &Palette::default(), &DecorParams::default(), true, &mut GenRng::from_seed(seed));
            assert!(!placed);
            assert_eq!(floor.count_feat(feat::UP_STAIR), 0);
        }
    }

    #[test]
    fn test_up_stairs_appear_sometimes() {
        let params = DecorParams { up_stair_chance: 1, ..DecorParams::default() };
        let mut floor = grass_floor(20, 20);
        assert!(place_trees(&mut floor, 10, 10, &Palette::default(), &params, false, &mut GenRng::from_seed(0)));
        assert_eq!(floor.feat(10, 10), feat::UP_STAIR);
    }

    #[test]
    fn test_destroy_level_keeps_permanent_boundary() {
        let mut floor = grass_floor(80, 40);
        for (x, y, cell) in floor.cells_mut().iter_mut() {
            if x == 0 || y == 0 || x == 79 || y == 39 {
                cell.feat = feat::PERMANENT;
            }
            cell.info.insert(CellFlags::GLOW | CellFlags::MARK);
        }

        let mut occupants = NoOccupants;
        let mut shatter = ShatterArea::new(Palette::default(), &mut occupants);
        let mut rng = GenRng::from_seed(17);
        let centers = destroy_level(&mut floor, &mut shatter, &DecorParams::default(), &mut rng);

        assert!((1..=5).contains(&centers.len()));
        for &(x, y) in &centers {
            assert!((5..=74).contains(&x));
            assert!((5..=34).contains(&y));
            let cell = floor.cell(x, y).unwrap();
            assert!(!cell.info.intersects(CellFlags::GLOW | CellFlags::MARK));
        }
        for x in 0..80 {
            assert_eq!(floor.feat(x, 0), feat::PERMANENT);
            assert_eq!(floor.feat(x, 39), feat::PERMANENT);
        }
    }

    #[test]
    fn test_shatter_removes_occupants() {
        let mut floor = grass_floor(40, 40);
        let mut ledger = OccupantLedger::new();
        let m = ledger.spawn_monster(&[feat::GRASS]);
        floor.cell_mut(20, 20).unwrap().monster = Some(m);

        {
            let mut shatter = ShatterArea::new(Palette::default(), &mut ledger);
            shatter.destroy_area(&mut floor, 20, 20, 5, &mut GenRng::from_seed(2));
        }
        assert!(floor.cell(20, 20).unwrap().monster.is_none());
        assert!(!ledger.has_monster(m));
        let wrecked = [feat::GRANITE, feat::QUARTZ, feat::MAGMA, feat::FLOOR];
        assert!(wrecked.contains(&floor.feat(20, 20)));
    }
}
