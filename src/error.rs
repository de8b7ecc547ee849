//! Error types for floor generation.
//!
//! Generation itself never fails: retry budgets and bounds checks are plain
//! branches. Errors come from building tables and loading configuration.

use thiserror::Error;

use crate::terrain::TerrainKind;

/// Errors raised while building generation tables or loading data files.
#[derive(Error, Debug)]
pub enum GenError {
    /// A weighted feature list had no entries.
    #[error("cannot build a probability table from an empty weight list")]
    EmptyProbTable,

    /// Terrain run-lengths did not cover the lookup table exactly.
    #[error("terrain table for {terrain:?} covers {covered} slots, expected {expected}")]
    TerrainTableSize {
        /// Terrain being built.
        terrain: TerrainKind,
        /// Slots covered by the run-lengths.
        covered: usize,
        /// Required table size.
        expected: usize,
    },

    /// Feature registry contents are inconsistent.
    #[error("invalid feature registry: {0}")]
    Registry(String),

    /// A dungeon definition is inconsistent.
    #[error("invalid dungeon definition: {0}")]
    Dungeon(String),

    /// Layout row used a symbol missing from the legend.
    #[error("unknown symbol '{symbol}' in wilderness layout row {row}")]
    UnknownSymbol {
        /// Offending character.
        symbol: char,
        /// Row index in the layout.
        row: usize,
    },

    /// Layout is structurally malformed.
    #[error("invalid wilderness layout: {0}")]
    Layout(String),

    /// Starting position lies outside the wilderness.
    #[error("start position ({x}, {y}) lies outside the {width}x{height} wilderness")]
    StartOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Result alias used across the crate.
pub type GenResult<T> = Result<T, GenError>;
