//! Grid store: cells, cell flags and the floor buffer every generator mutates.

use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::feature::{FeatureFlags, FeatureId, FeatureRegistry};
use crate::prob_table::FloorWallTypes;
use crate::rng::GenRng;
use crate::tilemap::Tilemap;

/// Per-cell bit flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellFlags(pub u16);

impl CellFlags {
    pub const NONE: CellFlags = CellFlags(0);
    /// Lit
    pub const GLOW: CellFlags = CellFlags(1 << 0);
    /// Remembered by the player
    pub const MARK: CellFlags = CellFlags(1 << 1);
    /// No teleport target, part of a vault or river
    pub const ICKY: CellFlags = CellFlags(1 << 2);
    pub const ROOM: CellFlags = CellFlags(1 << 3);
    /// Indestructible regardless of feature
    pub const PERMANENT: CellFlags = CellFlags(1 << 4);
    /// Granite filler laid down before rooms are carved
    pub const EXTRA: CellFlags = CellFlags(1 << 5);
    /// Inner room wall
    pub const INNER: CellFlags = CellFlags(1 << 6);
    /// Outer room wall
    pub const OUTER: CellFlags = CellFlags(1 << 7);
    /// Wall that must not be pierced by tunnels
    pub const SOLID: CellFlags = CellFlags(1 << 8);

    /// Any of the granite wall kinds.
    pub const GRANITE_KINDS: CellFlags =
        CellFlags(Self::EXTRA.0 | Self::INNER.0 | Self::OUTER.0 | Self::SOLID.0);

    #[inline]
    pub fn contains(self, other: CellFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn intersects(self, other: CellFlags) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn insert(&mut self, other: CellFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: CellFlags) {
        self.0 &= !other.0;
    }
}

impl BitOr for CellFlags {
    type Output = CellFlags;

    fn bitor(self, rhs: CellFlags) -> CellFlags {
        CellFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for CellFlags {
    fn bitor_assign(&mut self, rhs: CellFlags) {
        self.0 |= rhs.0;
    }
}

/// Handle of a monster owned by the occupant subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonsterRef(pub u32);

/// Handle of the head of an object stack owned by the occupant subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef(pub u32);

/// One grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// Current terrain
    pub feat: FeatureId,
    /// Displayed terrain override, `FeatureId::NONE` when unused
    pub mimic: FeatureId,
    pub info: CellFlags,
    /// Dungeon id of an entrance or town id on the overview map
    pub special: u16,
    pub monster: Option<MonsterRef>,
    pub object: Option<ObjectRef>,
}

impl Cell {
    /// Feature used for display and flag lookups.
    pub fn shown_feat(&self) -> FeatureId {
        if self.mimic.is_none() {
            self.feat
        } else {
            self.mimic
        }
    }
}

/// Integer distance used throughout generation.
///
/// Starts from the `max + min/2` approximation and refines it with integer
/// Newton steps towards the true Euclidean length.
pub fn distance(x1: i32, y1: i32, x2: i32, y2: i32) -> i32 {
    let dy = (y1 - y2).abs();
    let dx = (x1 - x2).abs();
    let target = dy * dy + dx * dx;
    let mut d = if dy > dx { dy + (dx >> 1) } else { dx + (dy >> 1) };

    if dy == 0 || dx == 0 {
        return d;
    }

    loop {
        let err = (target - d * d) / (2 * d);
        if err == 0 {
            break;
        }
        d += err;
    }
    d
}

/// A level or wilderness tile: the cell buffer plus the context generators
/// read while writing into it.
#[derive(Clone, Debug)]
pub struct Floor {
    cells: Tilemap<Cell>,
    registry: Arc<FeatureRegistry>,
    /// Containing dungeon is globally dark; suppresses lighting side effects
    pub darkness: bool,
    /// Danger level of the area
    pub base_level: i16,
    /// Town number when the floor is a town, 0 otherwise
    pub town: u16,
}

impl Floor {
    pub fn new(width: usize, height: usize, registry: Arc<FeatureRegistry>) -> Self {
        Self {
            cells: Tilemap::new(width, height),
            registry,
            darkness: false,
            base_level: 0,
            town: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.cells.width as i32
    }

    pub fn height(&self) -> i32 {
        self.cells.height as i32
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    pub fn shared_registry(&self) -> Arc<FeatureRegistry> {
        Arc::clone(&self.registry)
    }

    /// Strict interior: the outer ring is excluded.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x > 0 && y > 0 && x < self.width() - 1 && y < self.height() - 1
    }

    /// Anywhere in the buffer, outer ring included.
    #[inline]
    pub fn in_bounds2(&self, x: i32, y: i32) -> bool {
        self.cells.contains(x, y)
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cells.get_signed(x, y)
    }

    pub fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.cells.get_signed_mut(x, y)
    }

    /// Feature at a position; `FeatureId::NONE` outside the buffer.
    pub fn feat(&self, x: i32, y: i32) -> FeatureId {
        self.cell(x, y).map(|c| c.feat).unwrap_or_default()
    }

    /// Capabilities of the feature at a position.
    pub fn flags_at(&self, x: i32, y: i32) -> FeatureFlags {
        self.registry.flags(self.feat(x, y))
    }

    /// Whether generation must leave this cell alone. Positions outside the
    /// buffer count as permanent.
    pub fn is_permanent(&self, x: i32, y: i32) -> bool {
        match self.cell(x, y) {
            Some(cell) => {
                cell.info.contains(CellFlags::PERMANENT) || self.registry.flags(cell.feat).permanent
            }
            None => true,
        }
    }

    /// Set a feature unless the cell is permanent. Returns whether it was written.
    pub fn try_set(&mut self, x: i32, y: i32, feat: FeatureId) -> bool {
        if self.is_permanent(x, y) {
            return false;
        }
        match self.cell_mut(x, y) {
            Some(cell) => {
                cell.feat = feat;
                true
            }
            None => false,
        }
    }

    /// Overwrite every cell's feature, ignoring permanence. Used when a
    /// buffer is recycled for a new level or tile.
    pub fn fill(&mut self, feat: FeatureId) {
        self.cells.fill(Cell {
            feat,
            ..Cell::default()
        });
    }

    /// Lay down a fresh level: permanent outer ring, interior filled from the
    /// dungeon's wall table and flagged as granite filler.
    pub fn fill_with_walls(&mut self, walls: &FloorWallTypes, permanent: FeatureId, rng: &mut GenRng) {
        let (w, h) = (self.width(), self.height());
        for y in 0..h {
            for x in 0..w {
                let boundary = x == 0 || y == 0 || x == w - 1 || y == h - 1;
                let cell = Cell {
                    feat: if boundary { permanent } else { walls.random_fill(rng) },
                    info: if boundary { CellFlags::NONE } else { CellFlags::EXTRA },
                    ..Cell::default()
                };
                self.cells.set(x as usize, y as usize, cell);
            }
        }
    }

    pub fn cells(&self) -> &Tilemap<Cell> {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut Tilemap<Cell> {
        &mut self.cells
    }

    /// Number of cells holding a feature.
    pub fn count_feat(&self, feat: FeatureId) -> usize {
        self.cells.iter().filter(|(_, _, c)| c.feat == feat).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::feat;

    fn floor(w: usize, h: usize) -> Floor {
        Floor::new(w, h, Arc::new(FeatureRegistry::standard()))
    }

    #[test]
    fn test_distance_matches_euclid_on_axes_and_diagonals() {
        assert_eq!(distance(0, 0, 0, 0), 0);
        assert_eq!(distance(0, 0, 5, 0), 5);
        assert_eq!(distance(0, 0, 0, -7), 7);
        assert_eq!(distance(0, 0, 3, 4), 5);
        assert_eq!(distance(2, 2, 5, 6), 5);
        assert_eq!(distance(0, 0, 1, 1), 1);
    }

    #[test]
    fn test_distance_is_symmetric() {
        for (a, b, c, d) in [(1, 2, 9, 4), (-3, 5, 7, -2), (10, 10, 3, 1)] {
            assert_eq!(distance(a, b, c, d), distance(c, d, a, b));
        }
    }

    #[test]
    fn test_bounds() {
        let f = floor(10, 6);
        assert!(f.in_bounds(1, 1));
        assert!(f.in_bounds(8, 4));
        assert!(!f.in_bounds(0, 3));
        assert!(!f.in_bounds(9, 3));
        assert!(f.in_bounds2(0, 0));
        assert!(f.in_bounds2(9, 5));
        assert!(!f.in_bounds2(10, 5));
        assert!(!f.in_bounds2(-1, 0));
    }

    #[test]
    fn test_try_set_skips_permanent_cells() {
        let mut f = floor(5, 5);
        f.fill(feat::GRANITE);
        assert!(f.try_set(2, 2, feat::FLOOR));
        assert_eq!(f.feat(2, 2), feat::FLOOR);

        // Permanent feature
        f.cell_mut(1, 1).unwrap().feat = feat::PERMANENT;
        assert!(!f.try_set(1, 1, feat::FLOOR));
        assert_eq!(f.feat(1, 1), feat::PERMANENT);

        // Permanent cell flag on an ordinary feature
        f.cell_mut(3, 3).unwrap().info.insert(CellFlags::PERMANENT);
        assert!(!f.try_set(3, 3, feat::FLOOR));
        assert_eq!(f.feat(3, 3), feat::GRANITE);

        assert!(!f.try_set(7, 7, feat::FLOOR));
    }

    #[test]
    fn test_fill_with_walls_marks_granite_filler() {
        let registry = FeatureRegistry::standard();
        let dungeons = crate::dungeon::DungeonRegistry::standard();
        let walls = FloorWallTypes::for_dungeon(dungeons.get(1).unwrap()).unwrap();
        let mut f = Floor::new(12, 8, Arc::new(registry));
        let mut rng = GenRng::from_seed(4);
        f.fill_with_walls(&walls, feat::PERMANENT, &mut rng);

        assert_eq!(f.feat(0, 0), feat::PERMANENT);
        assert_eq!(f.feat(11, 7), feat::PERMANENT);
        let inner = f.cell(5, 4).unwrap();
        assert!(inner.info.contains(CellFlags::EXTRA));
        assert!(f.registry().flags(inner.feat).wall);
    }

    #[test]
    fn test_cell_flag_ops() {
        let mut flags = CellFlags::GLOW | CellFlags::ROOM;
        assert!(flags.contains(CellFlags::GLOW));
        assert!(!flags.contains(CellFlags::GLOW | CellFlags::ICKY));
        flags.remove(CellFlags::GLOW);
        assert!(!flags.intersects(CellFlags::GLOW));
        flags |= CellFlags::INNER;
        assert!(flags.intersects(CellFlags::GRANITE_KINDS));
    }

    #[test]
    fn test_shown_feat_prefers_mimic() {
        let mut cell = Cell {
            feat: feat::PERMANENT,
            ..Cell::default()
        };
        assert_eq!(cell.shown_feat(), feat::PERMANENT);
        cell.mimic = feat::GRASS;
        assert_eq!(cell.shown_feat(), feat::GRASS);
    }
}
