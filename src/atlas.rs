//! Packs the unique tiles into a square, power-of-two atlas image.
use crate::{
    error::{Error, Result},
    grid::TileSize,
    tileset::{TileId, TileSet, EMPTY_TILE},
};
use image::{imageops, Rgba, RgbaImage};
use png::{BitDepth, ColorType, Encoder};
use std::{fs::File, io::BufWriter, path::Path};

/// Largest number of unique tiles an atlas is built for (256 x 256 cells).
pub const MAX_ATLAS_TILES: usize = 1 << 16;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Smallest power of two `p` with `p * p >= tiles`. One for no tiles.
pub fn tiles_per_side(tiles: usize) -> u32 {
    let mut side: u32 = 1;
    while (side as usize) * (side as usize) < tiles {
        side *= 2;
    }
    side
}

/// Pixel offset of the atlas cell holding `id`. The empty tile, ids past the
/// last cell and offsets that overflow have no cell.
pub fn cell_origin(id: TileId, tiles_per_side: u32, tile_size: TileSize) -> Option<(u32, u32)> {
    if id == EMPTY_TILE {
        return None;
    }
    let index = id - 1;
    let cells = u64::from(tiles_per_side) * u64::from(tiles_per_side);
    if u64::from(index) >= cells {
        return None;
    }
    Some((
        (index % tiles_per_side).checked_mul(tile_size.width)?,
        (index / tiles_per_side).checked_mul(tile_size.height)?,
    ))
}

pub struct Atlas {
    pub image: RgbaImage,
    pub tiles_per_side: u32,
    pub tile_size: TileSize,
}

/// Lays out every non-empty tile at the cell its id maps to, over an opaque
/// black background.
pub fn pack(tileset: &TileSet) -> Result<Atlas> {
    let count = tileset.unique_tiles();
    if count > MAX_ATLAS_TILES {
        return Err(Error::AtlasOverflow {
            count,
            max: MAX_ATLAS_TILES,
        });
    }
    let tile_size = tileset.tile_size();
    let tiles_per_side = tiles_per_side(count);
    let overflow = || Error::AtlasOverflow {
        count,
        max: MAX_ATLAS_TILES,
    };
    let width = tile_size
        .width
        .checked_mul(tiles_per_side)
        .ok_or_else(overflow)?;
    let height = tile_size
        .height
        .checked_mul(tiles_per_side)
        .ok_or_else(overflow)?;

    let mut image = RgbaImage::from_pixel(width, height, BACKGROUND);
    for (id, tile) in tileset.tiles() {
        if let Some((x, y)) = cell_origin(id, tiles_per_side, tile_size) {
            imageops::replace(&mut image, tile, x as i64, y as i64);
        }
    }

    Ok(Atlas {
        image,
        tiles_per_side,
        tile_size,
    })
}

impl Atlas {
    /// Reads an atlas written by `save`. Tiles per side follow from its width.
    pub fn load(path: &Path, tile_size: TileSize) -> Result<Atlas> {
        let image = image::open(path)?.to_rgba8();
        let tiles_per_side = image.width().checked_div(tile_size.width).unwrap_or(0);
        if tiles_per_side == 0 || image.height() < tile_size.height {
            return Err(Error::MalformedMap(format!(
                "atlas {}x{} holds no {tile_size} tile",
                image.width(),
                image.height()
            )));
        }
        Ok(Atlas {
            image,
            tiles_per_side,
            tile_size,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The tile stored for `id`, cropped to `width` x `height`.
    /// `None` for the empty tile or ids past the last cell.
    pub fn tile(&self, id: TileId, width: u32, height: u32) -> Option<RgbaImage> {
        let (x, y) = cell_origin(id, self.tiles_per_side, self.tile_size)?;
        if width > self.tile_size.width
            || height > self.tile_size.height
            || x.checked_add(width)? > self.width()
            || y.checked_add(height)? > self.height()
        {
            return None;
        }
        Some(imageops::crop_imm(&self.image, x, y, width, height).to_image())
    }

    /// Writes the atlas as an 8-bit RGBA PNG.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut encoder = Encoder::new(
            BufWriter::new(File::create(path)?),
            self.width(),
            self.height(),
        );
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(self.image.as_raw())?;
        writer.finish()?;
        Ok(())
    }
}
