//! Settings for one run of the pipeline.
use crate::{
    error::{Error, Result},
    grid::TileSize,
    tileset::SearchStrategy,
    transparency::Rgb,
};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

pub const ATLAS_EXTENSION: &str = "png";
pub const MAP_EXTENSION: &str = "tmx";

#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    /// Base path, `.png` and `.tmx` are appended to it.
    pub output: PathBuf,
    pub tile_size: TileSize,
    pub transparent: Option<Rgb>,
    pub search: SearchStrategy,
    pub verify: bool,
}

impl Config {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Config {
            input: input.into(),
            output: output.into(),
            tile_size: TileSize::default(),
            transparent: None,
            search: SearchStrategy::default(),
            verify: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_size.is_empty() {
            return Err(Error::InvalidTileSize {
                width: self.tile_size.width,
                height: self.tile_size.height,
            });
        }
        self.base_name()?;
        Ok(())
    }

    /// File name part of the output path, used as the tileset name.
    pub fn base_name(&self) -> Result<String> {
        match self.output.file_name() {
            Some(name) if !name.is_empty() => Ok(name.to_string_lossy().into_owned()),
            _ => Err(Error::InvalidFilename),
        }
    }

    pub fn atlas_path(&self) -> PathBuf {
        with_suffix(&self.output, ATLAS_EXTENSION)
    }

    pub fn map_path(&self) -> PathBuf {
        with_suffix(&self.output, MAP_EXTENSION)
    }
}

/// Appends `.suffix` without touching any dot already in the file name.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths_append_extensions() {
        let config = Config::new("in.png", "out/level.v2");
        assert_eq!(config.atlas_path(), PathBuf::from("out/level.v2.png"));
        assert_eq!(config.map_path(), PathBuf::from("out/level.v2.tmx"));
        assert_eq!(config.base_name().unwrap(), "level.v2");
    }

    #[test]
    fn rejects_zero_tile_size() {
        let mut config = Config::new("in.png", "out");
        config.tile_size = TileSize::new(8, 0);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidTileSize { width: 8, height: 0 })
        ));
    }

    #[test]
    fn rejects_output_without_file_name() {
        let config = Config::new("in.png", "..");
        assert!(matches!(config.validate(), Err(Error::InvalidFilename)));
        assert!(Config::new("in.png", "maps/level").validate().is_ok());
    }
}
