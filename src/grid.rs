//! Geometry of a source image cut into a row-major grid of tile cells.
use image::{imageops, RgbaImage};

pub const DEFAULT_TILE_WIDTH: u32 = 8;
pub const DEFAULT_TILE_HEIGHT: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub fn new(width: u32, height: u32) -> Self {
        TileSize { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for TileSize {
    fn default() -> Self {
        TileSize::new(DEFAULT_TILE_WIDTH, DEFAULT_TILE_HEIGHT)
    }
}

impl std::fmt::Display for TileSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One grid cell. `width`/`height` are smaller than the tile size for a
/// trailing column or row that runs past the image edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub column: u32,
    pub row: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub image_width: u32,
    pub image_height: u32,
    pub tile: TileSize,
}

impl Grid {
    pub fn new(image_width: u32, image_height: u32, tile: TileSize) -> Self {
        Grid {
            image_width,
            image_height,
            tile,
        }
    }

    pub fn for_image(image: &RgbaImage, tile: TileSize) -> Self {
        Grid::new(image.width(), image.height(), tile)
    }

    /// Columns including a cropped trailing column.
    pub fn columns(&self) -> u32 {
        if self.tile.is_empty() {
            return 0;
        }
        self.image_width.div_ceil(self.tile.width)
    }

    /// Rows including a cropped trailing row.
    pub fn rows(&self) -> u32 {
        if self.tile.is_empty() {
            return 0;
        }
        self.image_height.div_ceil(self.tile.height)
    }

    /// Columns made of whole tiles only.
    pub fn full_columns(&self) -> u32 {
        self.image_width.checked_div(self.tile.width).unwrap_or(0)
    }

    /// Rows made of whole tiles only.
    pub fn full_rows(&self) -> u32 {
        self.image_height.checked_div(self.tile.height).unwrap_or(0)
    }

    pub fn cell_count(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    pub fn cell(&self, column: u32, row: u32) -> Cell {
        let x = column * self.tile.width;
        let y = row * self.tile.height;
        Cell {
            column,
            row,
            x,
            y,
            width: self.tile.width.min(self.image_width - x),
            height: self.tile.height.min(self.image_height - y),
        }
    }

    /// Cells in scan order: top row first, left to right within a row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let columns = self.columns();
        (0..self.rows()).flat_map(move |row| (0..columns).map(move |column| self.cell(column, row)))
    }
}

impl Cell {
    pub fn crop(&self, image: &RgbaImage) -> RgbaImage {
        imageops::crop_imm(image, self.x, self.y, self.width, self.height).to_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiple() {
        let grid = Grid::new(32, 16, TileSize::default());
        assert_eq!((grid.columns(), grid.rows()), (4, 2));
        assert_eq!((grid.full_columns(), grid.full_rows()), (4, 2));
        assert_eq!(grid.cell_count(), 8);
    }

    #[test]
    fn trailing_cells_are_cropped() {
        let grid = Grid::new(20, 9, TileSize::default());
        assert_eq!((grid.columns(), grid.rows()), (3, 2));
        assert_eq!((grid.full_columns(), grid.full_rows()), (2, 1));

        let last = grid.cells().last().unwrap();
        assert_eq!(
            last,
            Cell {
                column: 2,
                row: 1,
                x: 16,
                y: 8,
                width: 4,
                height: 1
            }
        );
    }

    #[test]
    fn scan_order_is_row_major() {
        let grid = Grid::new(16, 16, TileSize::default());
        let order: Vec<(u32, u32)> = grid.cells().map(|c| (c.column, c.row)).collect();
        assert_eq!(order, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn degenerate_sizes_have_no_cells() {
        assert_eq!(Grid::new(0, 0, TileSize::default()).cell_count(), 0);
        assert_eq!(Grid::new(16, 16, TileSize::new(0, 8)).cell_count(), 0);
        assert_eq!(Grid::new(16, 16, TileSize::new(8, 0)).full_rows(), 0);
    }
}
