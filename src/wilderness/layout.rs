//! Wilderness layouts loaded from JSON
//!
//! A layout is a legend mapping single characters to tile templates plus
//! rows of those characters:
//!
//! ```json
//! {
//!   "legend": { "#": { "terrain": "edge" }, ".": { "terrain": "grass", "level": 2 } },
//!   "rows": ["###", "#.#", "###"],
//!   "start": [1, 1]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::terrain::TerrainKind;
use crate::tilemap::Tilemap;

use super::tile::{WildernessMap, WildernessTile};

/// Template for every tile drawn with one legend symbol.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LegendEntry {
    pub terrain: TerrainKind,
    #[serde(default)]
    pub level: i16,
    #[serde(default)]
    pub town: u16,
    #[serde(default)]
    pub road: bool,
    #[serde(default)]
    pub name: String,
}

impl LegendEntry {
    fn to_tile(&self) -> WildernessTile {
        WildernessTile {
            terrain: self.terrain,
            town: self.town,
            level: self.level,
            road: self.road,
            name: self.name.clone(),
            ..WildernessTile::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WildernessLayout {
    /// Single-character symbol -> tile template
    pub legend: BTreeMap<String, LegendEntry>,
    pub rows: Vec<String>,
    /// Starting tile `(x, y)`
    #[serde(default)]
    pub start: Option<(usize, usize)>,
}

impl WildernessLayout {
    pub fn load(path: &Path) -> GenResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Build the map and resolve the starting tile. Without an explicit start
    /// the first town is used, falling back to the map centre.
    pub fn build(&self) -> GenResult<(WildernessMap, (usize, usize))> {
        let mut legend: BTreeMap<char, &LegendEntry> = BTreeMap::new();
        for (key, entry) in &self.legend {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    legend.insert(c, entry);
                }
                _ => return Err(GenError::Layout(format!("legend key '{key}' is not a single character"))),
            }
        }

        let height = self.rows.len();
        let width = self.rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(GenError::Layout("layout has no tiles".to_string()));
        }

        let mut tiles: Tilemap<WildernessTile> = Tilemap::new(width, height);
        for (y, row) in self.rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(GenError::Layout(format!(
                    "row {y} has {} tiles, expected {width}",
                    row.chars().count()
                )));
            }
            for (x, symbol) in row.chars().enumerate() {
                let entry = legend.get(&symbol).ok_or(GenError::UnknownSymbol { symbol, row: y })?;
                tiles.set(x, y, entry.to_tile());
            }
        }

        let start = match self.start {
            Some((x, y)) if x < width && y < height => (x, y),
            Some((x, y)) => return Err(GenError::StartOutOfBounds { x, y, width, height }),
            None => tiles
                .iter()
                .find(|(_, _, t)| t.town != 0)
                .map(|(x, y, _)| (x, y))
                .unwrap_or((width / 2, height / 2)),
        };

        Ok((WildernessMap::from_tiles(tiles), start))
    }

    /// Built-in surface with a town, roads, water, lava and mountains.
    pub fn demo() -> Self {
        let entry = |terrain: TerrainKind, level: i16| LegendEntry {
            terrain,
            level,
            town: 0,
            road: false,
            name: String::new(),
        };

        let legend = [
            ("#", entry(TerrainKind::Edge, 0)),
            ("^", entry(TerrainKind::Mountain, 8)),
            ("T", entry(TerrainKind::Trees, 3)),
            (".", entry(TerrainKind::Grass, 1)),
            (",", entry(TerrainKind::Dirt, 2)),
            ("~", entry(TerrainKind::DeepWater, 4)),
            ("-", entry(TerrainKind::ShallowWater, 2)),
            ("%", entry(TerrainKind::Swamp, 5)),
            ("s", entry(TerrainKind::Desert, 6)),
            ("L", entry(TerrainKind::ShallowLava, 12)),
            ("l", entry(TerrainKind::DeepLava, 15)),
            ("=", LegendEntry { road: true, ..entry(TerrainKind::Grass, 1) }),
            (
                "1",
                LegendEntry {
                    town: 1,
                    road: true,
                    name: "Outpost".to_string(),
                    ..entry(TerrainKind::Town, 0)
                },
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let rows = [
            "############",
            "#^^TT...~~-#",
            "#^TT.=..--.#",
            "#T..=1=...%#",
            "#...=.=.,%%#",
            "#ss.=.LlL,.#",
            "#sss=====..#",
            "############",
        ]
        .iter()
        .map(|r| r.to_string())
        .collect();

        Self { legend, rows, start: None }
    }
}
