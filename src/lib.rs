//! Floor generation library
//!
//! Terrain generation core: rivers, mineral streamers, tree clusters, level
//! destruction and plasma-fractal wilderness tiles stitched into a seamless
//! surface.

pub mod ascii;
pub mod config;
pub mod decor;
pub mod dungeon;
pub mod error;
pub mod export;
pub mod feature;
pub mod grid;
pub mod occupants;
pub mod plasma;
pub mod prob_table;
pub mod river;
pub mod rng;
pub mod streamer;
pub mod terrain;
pub mod tilemap;
pub mod wilderness;
