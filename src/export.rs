//! PNG export for floors, tile atlases and plasma height fields.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};

use crate::error::GenResult;
use crate::grid::{CellFlags, Floor};
use crate::plasma::HeightField;

/// Colour of a cell: its shown feature, halved when unlit and `dim_unlit` is set.
pub fn cell_color(floor: &Floor, x: usize, y: usize, dim_unlit: bool) -> [u8; 3] {
    let cell = floor.cells().get(x, y);
    let color = floor.registry().color(cell.shown_feat());
    if dim_unlit && !cell.info.contains(CellFlags::GLOW) {
        color.map(|c| c / 2)
    } else {
        color
    }
}

/// Render a floor to an image, each cell as a `scale`x`scale` block.
pub fn render_floor(floor: &Floor, scale: u32, dim_unlit: bool) -> RgbImage {
    let scale = scale.max(1);
    let cells = floor.cells();
    let mut img: RgbImage = ImageBuffer::new(cells.width as u32 * scale, cells.height as u32 * scale);

    for y in 0..cells.height {
        for x in 0..cells.width {
            let color = Rgb(cell_color(floor, x, y, dim_unlit));
            for py in 0..scale {
                for px in 0..scale {
                    img.put_pixel(x as u32 * scale + px, y as u32 * scale + py, color);
                }
            }
        }
    }

    img
}

/// Export a floor as a PNG.
pub fn export_floor_png(floor: &Floor, scale: u32, dim_unlit: bool, path: &Path) -> GenResult<()> {
    render_floor(floor, scale, dim_unlit).save(path)?;
    Ok(())
}

/// Stitch tiles into one image, `columns` tiles per row, in order.
/// All tiles are assumed to share the first tile's size.
pub fn render_atlas(tiles: &[Floor], columns: usize, dim_unlit: bool) -> RgbImage {
    let Some(first) = tiles.first() else {
        return ImageBuffer::new(0, 0);
    };
    let columns = columns.max(1);
    let rows = tiles.len().div_ceil(columns);
    let (tw, th) = (first.cells().width, first.cells().height);
    let mut img: RgbImage = ImageBuffer::new((tw * columns) as u32, (th * rows) as u32);

    for (i, tile) in tiles.iter().enumerate() {
        let (ox, oy) = ((i % columns) * tw, (i / columns) * th);
        for y in 0..th.min(tile.cells().height) {
            for x in 0..tw.min(tile.cells().width) {
                img.put_pixel((ox + x) as u32, (oy + y) as u32, Rgb(cell_color(tile, x, y, dim_unlit)));
            }
        }
    }

    img
}

pub fn export_atlas_png(tiles: &[Floor], columns: usize, dim_unlit: bool, path: &Path) -> GenResult<()> {
    render_atlas(tiles, columns, dim_unlit).save(path)?;
    Ok(())
}

/// Export a height field as grayscale, `max_height` mapping to white.
pub fn export_heightfield(field: &HeightField, max_height: i16, path: &Path) -> GenResult<()> {
    let mut img: RgbImage = ImageBuffer::new(field.width as u32, field.height as u32);
    let max = max_height.max(1) as f32;

    for y in 0..field.height {
        for x in 0..field.width {
            let h = (*field.get(x, y)).clamp(0, max_height) as f32;
            let v = (h * 255.0 / max) as u8;
            img.put_pixel(x as u32, y as u32, Rgb([v, v, v]));
        }
    }

    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{feat, FeatureRegistry};
    use std::sync::Arc;

    fn floor(w: usize, h: usize, f: crate::feature::FeatureId) -> Floor {
        let mut floor = Floor::new(w, h, Arc::new(FeatureRegistry::standard()));
        floor.fill(f);
        floor
    }

    #[test]
    fn test_render_floor_scales_and_dims() {
        let mut f = floor(3, 2, feat::GRASS);
        f.cell_mut(0, 0).unwrap().info.insert(CellFlags::GLOW);
        let grass = f.registry().color(feat::GRASS);

        let img = render_floor(&f, 2, true);
        assert_eq!(img.dimensions(), (6, 4));
        assert_eq!(img.get_pixel(1, 1).0, grass);
        assert_eq!(img.get_pixel(2, 0).0, grass.map(|c| c / 2));

        let bright = render_floor(&f, 1, false);
        assert_eq!(bright.get_pixel(2, 1).0, grass);
    }

    #[test]
    fn test_mimic_colour_is_shown() {
        let mut f = floor(2, 2, feat::PERMANENT);
        f.cell_mut(1, 1).unwrap().mimic = feat::TREE;
        assert_eq!(cell_color(&f, 1, 1, false), f.registry().color(feat::TREE));
    }

    #[test]
    fn test_atlas_layout() {
        let tiles = vec![floor(2, 2, feat::GRASS), floor(2, 2, feat::DEEP_WATER), floor(2, 2, feat::TREE)];
        let img = render_atlas(&tiles, 2, false);
        let registry = FeatureRegistry::standard();
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(img.get_pixel(3, 0).0, registry.color(feat::DEEP_WATER));
        assert_eq!(img.get_pixel(1, 3).0, registry.color(feat::TREE));
        assert_eq!(img.get_pixel(3, 3).0, [0, 0, 0]);
        assert_eq!(render_atlas(&[], 4, false).dimensions(), (0, 0));
    }

    #[test]
    fn test_png_files_written() {
        let dir = tempfile::tempdir().unwrap();
        let f = floor(4, 4, feat::GRASS);
        let floor_path = dir.path().join("floor.png");
        export_floor_png(&f, 1, false, &floor_path).unwrap();
        assert!(floor_path.exists());

        let field = HeightField::new_with(4, 4, 9);
        let height_path = dir.path().join("height.png");
        export_heightfield(&field, 17, &height_path).unwrap();
        let img = image::open(&height_path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [135, 135, 135]);
    }
}
