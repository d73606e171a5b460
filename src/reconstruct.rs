//! Rebuilds a source image from an atlas and a tile map.
use crate::{
    atlas::Atlas,
    error::{Error, Result},
    grid::{Grid, TileSize},
    tileset::{TileId, EMPTY_TILE},
    tmx::MapDocument,
};
use image::{imageops, RgbaImage};
use std::path::Path;

/// Pastes the atlas tile of every cell back at the cell's position. Cells
/// with the empty id stay fully transparent.
pub fn reconstruct(atlas: &Atlas, grid: &Grid, gids: &[TileId]) -> Result<RgbaImage> {
    if gids.len() != grid.cell_count() {
        return Err(Error::MapSizeMismatch {
            expected: grid.cell_count(),
            found: gids.len(),
        });
    }
    let mut image = RgbaImage::new(grid.image_width, grid.image_height);
    for (cell, &gid) in grid.cells().zip(gids) {
        if gid == EMPTY_TILE {
            continue;
        }
        let tile = atlas.tile(gid, cell.width, cell.height).ok_or_else(|| {
            Error::MalformedMap(format!(
                "gid {gid} at cell ({}, {}) is outside the atlas",
                cell.column, cell.row
            ))
        })?;
        imageops::replace(&mut image, &tile, cell.x as i64, cell.y as i64);
    }
    Ok(image)
}

/// Position of the first pixel that differs, scanning row by row.
pub fn first_difference(image: &RgbaImage, other: &RgbaImage) -> Option<(u32, u32)> {
    if image.dimensions() != other.dimensions() {
        return Some((0, 0));
    }
    image
        .enumerate_pixels()
        .find(|(x, y, pixel)| other.get_pixel(*x, *y) != *pixel)
        .map(|(x, y, _)| (x, y))
}

/// Reads back a written atlas and map and checks they rebuild `source`.
pub fn verify(
    source: &RgbaImage,
    atlas_path: &Path,
    map_path: &Path,
    tile_size: TileSize,
) -> Result<()> {
    let document = MapDocument::load(map_path)?;
    if document.tile_width != tile_size.width || document.tile_height != tile_size.height {
        return Err(Error::MalformedMap(format!(
            "tile size {}x{} does not match {tile_size}",
            document.tile_width, document.tile_height
        )));
    }
    let atlas = Atlas::load(atlas_path, tile_size)?;
    let grid = Grid::for_image(source, tile_size);
    let rebuilt = reconstruct(&atlas, &grid, &document.gids)?;
    match first_difference(source, &rebuilt) {
        Some((x, y)) => Err(Error::VerifyMismatch { x, y }),
        None => Ok(()),
    }
}
