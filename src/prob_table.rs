//! Weighted feature tables
//!
//! A dungeon lists its floor and wall features as `(feature, percent)` pairs.
//! Those are expanded once into a dense 100-slot table so a feature can be
//! drawn with a single `randint0(100)`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dungeon::DungeonInfo;
use crate::error::{GenError, GenResult};
use crate::feature::FeatureId;
use crate::rng::GenRng;

/// Slots in a dense probability table.
pub const PROB_TABLE_SIZE: usize = 100;

/// One weighted entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatProb {
    pub feat: FeatureId,
    pub percent: u8,
}

impl FeatProb {
    pub fn new(feat: FeatureId, percent: u8) -> Self {
        Self { feat, percent }
    }
}

/// Expand weights into a dense table.
///
/// Entries occupy consecutive slots in declaration order. When the weights
/// sum to less than 100 the last entry absorbs the remainder; past 100 the
/// tail is cut off. Zero-percent entries never appear.
pub fn build_prob_table(weights: &[FeatProb]) -> GenResult<[FeatureId; PROB_TABLE_SIZE]> {
    let Some(last) = weights.len().checked_sub(1) else {
        return Err(GenError::EmptyProbTable);
    };

    let mut lim = Vec::with_capacity(weights.len());
    let mut total = 0usize;
    for w in weights {
        total += w.percent as usize;
        lim.push(total);
    }
    if total > PROB_TABLE_SIZE {
        warn!(total, "weighted feature table exceeds 100%, tail entries truncated");
    }
    if lim[last] < PROB_TABLE_SIZE {
        lim[last] = PROB_TABLE_SIZE;
    }

    let mut table = [FeatureId::NONE; PROB_TABLE_SIZE];
    let mut cur = 0;
    for (i, slot) in table.iter_mut().enumerate() {
        while i == lim[cur] {
            cur += 1;
        }
        *slot = weights[cur].feat;
    }
    Ok(table)
}

/// Floor and wall features of the dungeon currently being built.
#[derive(Clone, Debug)]
pub struct FloorWallTypes {
    pub ground: [FeatureId; PROB_TABLE_SIZE],
    pub fill: [FeatureId; PROB_TABLE_SIZE],
    pub outer: FeatureId,
    pub inner: FeatureId,
    pub solid: FeatureId,
}

impl FloorWallTypes {
    pub fn for_dungeon(dungeon: &DungeonInfo) -> GenResult<Self> {
        Ok(Self {
            ground: build_prob_table(&dungeon.floor)?,
            fill: build_prob_table(&dungeon.fill)?,
            outer: dungeon.outer_wall,
            inner: dungeon.inner_wall,
            solid: dungeon.outer_wall,
        })
    }

    pub fn random_ground(&self, rng: &mut GenRng) -> FeatureId {
        self.ground[rng.randint0(PROB_TABLE_SIZE as i32) as usize]
    }

    pub fn random_fill(&self, rng: &mut GenRng) -> FeatureId {
        self.fill[rng.randint0(PROB_TABLE_SIZE as i32) as usize]
    }
}
