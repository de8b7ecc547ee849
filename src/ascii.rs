//! ASCII rendering and export for floors
//!
//! Provides functions to render a generated floor as text and write it,
//! together with a legend and feature counts, to a file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::feature::FeatureId;
use crate::grid::{CellFlags, Floor};

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsciiMode {
    /// What the player sees: mimics applied
    Shown,
    /// The real features underneath
    Actual,
    /// Lighting and no-teleport flags
    Flags,
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Shown => "Shown",
            AsciiMode::Actual => "Actual",
            AsciiMode::Flags => "Flags",
        }
    }
}

/// Flag overlay character: `*` lit and remembered, `+` lit, `m` remembered,
/// `!` no-teleport, space otherwise.
pub fn flag_char(info: CellFlags) -> char {
    if info.contains(CellFlags::ICKY) {
        '!'
    } else if info.contains(CellFlags::GLOW | CellFlags::MARK) {
        '*'
    } else if info.contains(CellFlags::GLOW) {
        '+'
    } else if info.contains(CellFlags::MARK) {
        'm'
    } else {
        ' '
    }
}

pub fn render_ascii_floor(floor: &Floor, mode: AsciiMode) -> String {
    let cells = floor.cells();
    let registry = floor.registry();
    let mut result = String::with_capacity((cells.width + 1) * cells.height);

    for y in 0..cells.height {
        for x in 0..cells.width {
            let cell = cells.get(x, y);
            let ch = match mode {
                AsciiMode::Shown => registry.glyph(cell.shown_feat()),
                AsciiMode::Actual => registry.glyph(cell.feat),
                AsciiMode::Flags => flag_char(cell.info),
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}

/// Cell count per shown feature.
pub fn calculate_feature_stats(floor: &Floor) -> BTreeMap<FeatureId, usize> {
    let mut stats = BTreeMap::new();
    for (_, _, cell) in floor.cells().iter() {
        *stats.entry(cell.shown_feat()).or_insert(0) += 1;
    }
    stats
}

/// Legend for the features present on the floor.
pub fn floor_legend(floor: &Floor) -> String {
    let registry = floor.registry();
    let mut legend = String::new();
    legend.push_str("=== LEGEND ===\n");
    for (feat, count) in calculate_feature_stats(floor) {
        let name = registry.get(feat).map(|f| f.name.as_str()).unwrap_or("unknown");
        legend.push_str(&format!("  {} {:<32} {:>6}\n", registry.glyph(feat), name, count));
    }
    legend
}

/// Write the floor, its legend and its flag overlay to a text file.
pub fn export_floor_file(floor: &Floor, title: &str, seed: u64, path: &Path) -> io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "=== {} ===", title)?;
    writeln!(file, "Seed: {}", seed)?;
    writeln!(file, "Size: {}x{}", floor.width(), floor.height())?;
    writeln!(file, "Level: {}", floor.base_level)?;
    writeln!(file)?;

    writeln!(file, "=== MAP ({} View) ===", AsciiMode::Shown.name())?;
    write!(file, "{}", render_ascii_floor(floor, AsciiMode::Shown))?;
    writeln!(file)?;

    write!(file, "{}", floor_legend(floor))?;
    writeln!(file)?;

    writeln!(file, "=== MAP ({} View) ===", AsciiMode::Flags.name())?;
    write!(file, "{}", render_ascii_floor(floor, AsciiMode::Flags))?;

    Ok(())
}

/// Print ASCII map to stdout
pub fn print_ascii_floor(floor: &Floor, mode: AsciiMode) {
    print!("{}", render_ascii_floor(floor, mode));
}

// ============================================================================
// COLORIZED ASCII RENDERING
// ============================================================================

/// Format a single character with ANSI true color (24-bit) foreground
pub fn ansi_fg_char(ch: char, fg: [u8; 3]) -> String {
    format!("\x1b[38;2;{};{};{}m{}\x1b[0m", fg[0], fg[1], fg[2], ch)
}

/// Shown view with each glyph in its feature colour. Unlit cells are dimmed.
pub fn render_colored_ascii_floor(floor: &Floor) -> String {
    let cells = floor.cells();
    let registry = floor.registry();
    let mut result = String::new();

    for y in 0..cells.height {
        for x in 0..cells.width {
            let cell = cells.get(x, y);
            let feat = cell.shown_feat();
            let mut color = registry.color(feat);
            if !cell.info.contains(CellFlags::GLOW) {
                color = color.map(|c| c / 2);
            }
            result.push_str(&ansi_fg_char(registry.glyph(feat), color));
        }
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{feat, FeatureRegistry};
    use std::sync::Arc;

    fn sample() -> Floor {
        let mut floor = Floor::new(4, 3, Arc::new(FeatureRegistry::standard()));
        floor.fill(feat::GRASS);
        let cell = floor.cell_mut(0, 0).unwrap();
        cell.feat = feat::PERMANENT;
        cell.mimic = feat::TREE;
        floor.cell_mut(2, 1).unwrap().info.insert(CellFlags::GLOW);
        floor
    }

    #[test]
    fn test_render_modes() {
        let floor = sample();
        assert_eq!(render_ascii_floor(&floor, AsciiMode::Shown), "T...\n....\n....\n");
        assert_eq!(render_ascii_floor(&floor, AsciiMode::Actual), "#...\n....\n....\n");
        assert_eq!(render_ascii_floor(&floor, AsciiMode::Flags), "    \n  + \n    \n");
    }

    #[test]
    fn test_feature_stats_use_shown_feature() {
        let stats = calculate_feature_stats(&sample());
        assert_eq!(stats.get(&feat::TREE), Some(&1));
        assert_eq!(stats.get(&feat::GRASS), Some(&11));
        assert_eq!(stats.get(&feat::PERMANENT), None);
    }

    #[test]
    fn test_export_floor_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("floor.txt");
        export_floor_file(&sample(), "TEST FLOOR", 42, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("=== TEST FLOOR ===\nSeed: 42\nSize: 4x3\n"));
        assert!(text.contains("T..."));
        assert!(text.contains("grass"));
    }
}
