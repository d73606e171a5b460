use std::{fmt, io, num::ParseIntError, result};

use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

/// Pipeline step an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Load,
    Pack,
    Export,
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Stage::Config => "config",
            Stage::Load => "load",
            Stage::Pack => "pack",
            Stage::Export => "export",
            Stage::Verify => "verify",
        })
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid tile size {width}x{height}: tile dimensions must be positive.")]
    InvalidTileSize { width: u32, height: u32 },
    #[error("Invalid or empty output name specified.")]
    InvalidFilename,
    #[error("{count} unique tiles do not fit in an atlas (limit is {max}).")]
    AtlasOverflow { count: usize, max: usize },
    #[error("Malformed map document: {0}")]
    MalformedMap(String),
    #[error("Map holds {found} tiles but the grid has {expected} cells.")]
    MapSizeMismatch { expected: usize, found: usize },
    #[error("Reconstructed image differs from the source at pixel ({x}, {y}).")]
    VerifyMismatch { x: u32, y: u32 },
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    ImageEncoding(#[from] png::EncodingError),
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    ParseIntError(#[from] ParseIntError),
    #[cfg(feature = "report")]
    #[error(transparent)]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// The stage this error was tagged with, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Tags the error of a fallible stage with the stage name.
pub trait StageContext<T> {
    fn stage(self, stage: Stage) -> Result<T>;
}

impl<T, E: Into<Error>> StageContext<T> for result::Result<T, E> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|error| Error::Stage {
            stage,
            source: Box::new(error.into()),
        })
    }
}

impl From<Error> for String {
    fn from(error: Error) -> String {
        error.to_string()
    }
}
