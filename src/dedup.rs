//! Slices an image into tiles and assigns every cell a tile id.
use crate::{
    grid::{Cell, Grid, TileSize},
    tileset::{content_hash, SearchStrategy, TileId, TileSet},
};
use image::RgbaImage;
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

/// Output of a scan: the unique tiles and one id per grid cell in scan order.
pub struct Deduplicated {
    pub grid: Grid,
    pub tileset: TileSet,
    pub map: Vec<TileId>,
}

/// Scans `image` cell by cell. `on_progress` gets the completed percentage at
/// the start of every grid row.
pub fn scan<F>(
    image: &RgbaImage,
    tile_size: TileSize,
    strategy: SearchStrategy,
    mut on_progress: F,
) -> Deduplicated
where
    F: FnMut(u32),
{
    let grid = Grid::for_image(image, tile_size);
    let mut tileset = TileSet::new(tile_size, strategy);
    let mut map = Vec::with_capacity(grid.cell_count());

    let cells: Vec<Cell> = grid.cells().collect();
    // Cropping and hashing don't depend on the tile set, only interning does.
    let tiles = crop_cells(image, &cells);

    for (cell, (tile, hash)) in cells.iter().zip(tiles) {
        if cell.column == 0 {
            on_progress(100 * cell.y / grid.image_height);
        }
        map.push(tileset.intern(tile, hash));
    }

    Deduplicated { grid, tileset, map }
}

#[cfg(feature = "parallel")]
fn crop_cells(image: &RgbaImage, cells: &[Cell]) -> Vec<(RgbaImage, u64)> {
    cells
        .par_iter()
        .map(|cell| crop_and_hash(image, cell))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn crop_cells(image: &RgbaImage, cells: &[Cell]) -> Vec<(RgbaImage, u64)> {
    cells.iter().map(|cell| crop_and_hash(image, cell)).collect()
}

fn crop_and_hash(image: &RgbaImage, cell: &Cell) -> (RgbaImage, u64) {
    let tile = cell.crop(image);
    let hash = content_hash(&tile);
    (tile, hash)
}
