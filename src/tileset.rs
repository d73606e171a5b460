//! The set of unique tile images seen so far, keyed by tile id.
use crate::grid::TileSize;
use image::RgbaImage;
use std::{
    collections::HashMap,
    hash::{BuildHasherDefault, Hasher},
};
use twox_hash::XxHash64;

pub type TileId = u32;

/// Reserved id of the fully transparent tile. Also the TMX "no tile" gid.
pub const EMPTY_TILE: TileId = 0;

const CONTENT_HASH_SEED: u64 = 0;

/// How the tile set is searched for a duplicate. Both give the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Linear scan, most recently matched tile first, moving hits to the front.
    Recency,
    /// Content hash pre-filter with exact comparison on candidates.
    #[default]
    Hashed,
}

/// Hash of a tile's dimensions and pixel bytes.
pub fn content_hash(image: &RgbaImage) -> u64 {
    let mut hasher = XxHash64::with_seed(CONTENT_HASH_SEED);
    hasher.write_u32(image.width());
    hasher.write_u32(image.height());
    hasher.write(image.as_raw());
    hasher.finish()
}

/// Exact equality: same dimensions and identical bytes on all four channels.
pub fn same(image: &RgbaImage, other: &RgbaImage) -> bool {
    image.dimensions() == other.dimensions() && image.as_raw() == other.as_raw()
}

pub struct TileSet {
    tile_size: TileSize,
    strategy: SearchStrategy,
    /// Indexed by tile id.
    images: Vec<RgbaImage>,
    /// Search order, front is most recent.
    recency: Vec<TileId>,
    by_hash: HashMap<u64, Vec<TileId>, BuildHasherDefault<XxHash64>>,
}

impl TileSet {
    /// A tile set holding only the empty tile.
    pub fn new(tile_size: TileSize, strategy: SearchStrategy) -> Self {
        let mut tileset = TileSet {
            tile_size,
            strategy,
            images: Vec::new(),
            recency: Vec::new(),
            by_hash: HashMap::with_hasher(BuildHasherDefault::<XxHash64>::default()),
        };
        let empty = RgbaImage::new(tile_size.width, tile_size.height);
        let hash = content_hash(&empty);
        tileset.insert(empty, hash);
        tileset
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Number of entries, the empty tile included.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Always false, the empty tile is always present.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Number of entries excluding the empty tile.
    pub fn unique_tiles(&self) -> usize {
        self.images.len() - 1
    }

    pub fn get(&self, id: TileId) -> Option<&RgbaImage> {
        self.images.get(id as usize)
    }

    /// Entries in id order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &RgbaImage)> {
        self.images
            .iter()
            .enumerate()
            .map(|(id, image)| (id as TileId, image))
    }

    /// Ids in current search order.
    pub fn search_order(&self) -> &[TileId] {
        &self.recency
    }

    /// Returns the id of the tile equal to `image`, adding it under the next
    /// free id if it is new. `hash` must be `content_hash(&image)`.
    pub fn intern(&mut self, image: RgbaImage, hash: u64) -> TileId {
        match self.strategy {
            SearchStrategy::Recency => {
                if let Some(position) = self.find_recent(&image) {
                    self.recency[..=position].rotate_right(1);
                    return self.recency[0];
                }
            }
            SearchStrategy::Hashed => {
                if let Some(id) = self.find_hashed(&image, hash) {
                    return id;
                }
            }
        }
        self.insert(image, hash)
    }

    fn find_recent(&self, image: &RgbaImage) -> Option<usize> {
        self.recency
            .iter()
            .position(|&id| same(&self.images[id as usize], image))
    }

    fn find_hashed(&self, image: &RgbaImage, hash: u64) -> Option<TileId> {
        self.by_hash
            .get(&hash)?
            .iter()
            .copied()
            .find(|&id| same(&self.images[id as usize], image))
    }

    fn insert(&mut self, image: RgbaImage, hash: u64) -> TileId {
        let id = self.images.len() as TileId;
        self.images.push(image);
        self.recency.insert(0, id);
        self.by_hash.entry(hash).or_default().push(id);
        id
    }
}
