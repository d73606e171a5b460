#[cfg(feature = "report")]
use crate::error::Result;
#[cfg(feature = "report")]
use serde::Serialize;
use std::path::PathBuf;

/// What a finished run produced.
#[cfg_attr(feature = "report", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub input: PathBuf,
    pub atlas_path: PathBuf,
    pub map_path: PathBuf,
    pub columns: u32,
    pub rows: u32,
    pub cells: usize,
    /// Unique tiles, the empty tile excluded.
    pub unique_tiles: usize,
    pub tiles_per_side: u32,
    pub atlas_width: u32,
    pub atlas_height: u32,
    pub verified: bool,
}

#[cfg(feature = "report")]
impl Summary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
