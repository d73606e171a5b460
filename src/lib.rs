//! Tileset extraction: cut a tiled raster into unique tiles, pack them into an
//! atlas and describe the original image as a TMX tile map.

pub mod atlas;
pub mod config;
pub mod dedup;
pub mod error;
pub mod grid;
pub mod log;
pub mod pipeline;
pub mod reconstruct;
pub mod report;
pub mod tileset;
pub mod tmx;
pub mod transparency;
