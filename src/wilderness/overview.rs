//! Small-scale map of the whole wilderness, one cell per tile.

use crate::grid::{CellFlags, Floor};

use super::Wilderness;

/// Build the overview floor: towns, roads and visible entrances first, then
/// each tile's global terrain feature. Every cell is lit and remembered.
pub fn overview(wild: &Wilderness) -> Floor {
    let palette = &wild.palette;
    let mut floor = Floor::new(wild.map.width(), wild.map.height(), wild.registry.clone());
    floor.fill(palette.permanent);

    for (x, y, tile) in wild.map.iter() {
        let (feat, special) = if tile.town != 0 {
            (palette.town, tile.town)
        } else if tile.road {
            (palette.floor, 0)
        } else if wild.entrance_visible(tile) {
            (palette.entrance, tile.entrance)
        } else {
            (wild.terrains.global(tile.terrain), 0)
        };

        let cell = floor.cells_mut().get_mut(x, y);
        cell.feat = feat;
        cell.special = special;
        cell.info.insert(CellFlags::GLOW | CellFlags::MARK);
    }

    floor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::feat;
    use crate::wilderness::testing::small_wilderness;

    #[test]
    fn test_overview_marks_towns_roads_and_entrances() {
        let wild = small_wilderness(1);
        let map = overview(&wild);

        assert_eq!((map.width(), map.height()), (12, 8));
        assert_eq!(map.feat(0, 0), feat::PERMANENT);

        let town = map.cell(5, 3).unwrap();
        assert_eq!(town.feat, feat::TOWN);
        assert_eq!(town.special, 1);

        assert_eq!(map.feat(5, 2), feat::FLOOR);

        let mine = map.cell(3, 2).unwrap();
        assert_eq!(mine.feat, feat::ENTRANCE);
        assert_eq!(mine.special, 1);

        // Winner-only vault shows plain terrain
        assert_eq!(map.feat(8, 1), feat::DEEP_WATER);
        assert_eq!(map.feat(1, 1), feat::MOUNTAIN);

        assert!(map.cells().iter().all(|(_, _, c)| c.info.contains(CellFlags::GLOW | CellFlags::MARK)));
    }

    #[test]
    fn test_overview_shows_vault_after_winning() {
        let mut wild = small_wilderness(1);
        wild.total_winner = true;
        let map = overview(&wild);
        assert_eq!(map.feat(8, 1), feat::ENTRANCE);
        assert_eq!(map.cell(8, 1).unwrap().special, 3);
    }
}
