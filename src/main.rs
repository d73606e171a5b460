//! tileforge command-line interface.

use clap::{Parser, ValueEnum};
use std::{path::PathBuf, process};
use tileforge::{
    config::Config,
    error::Error,
    grid::{TileSize, DEFAULT_TILE_HEIGHT, DEFAULT_TILE_WIDTH},
    log, pipeline,
    tileset::SearchStrategy,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Search {
    /// Linear scan, most recently matched tiles first
    Recency,
    /// Content hash lookup with exact comparison
    Hashed,
}

impl From<Search> for SearchStrategy {
    fn from(search: Search) -> Self {
        match search {
            Search::Recency => SearchStrategy::Recency,
            Search::Hashed => SearchStrategy::Hashed,
        }
    }
}

#[derive(Parser)]
#[command(name = "tileforge", version)]
#[command(about = "Extract a tileset atlas and a TMX map from a tiled image", long_about = None)]
struct Args {
    /// Source image
    #[arg(long)]
    input: PathBuf,

    /// Output base name, writes <output>.png and <output>.tmx
    #[arg(long)]
    output: PathBuf,

    /// Tile width in pixels
    #[arg(long = "tileWidth", default_value_t = DEFAULT_TILE_WIDTH)]
    tile_width: u32,

    /// Tile height in pixels
    #[arg(long = "tileHeight", default_value_t = DEFAULT_TILE_HEIGHT)]
    tile_height: u32,

    /// Color made fully transparent before slicing
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"])]
    transparent: Option<Vec<u8>>,

    /// Duplicate search strategy
    #[arg(long, value_enum, default_value = "hashed")]
    search: Search,

    /// Rebuild the image from the written files and compare it to the source
    #[arg(long)]
    verify: bool,

    /// Also append log lines to this file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,

    /// Print a JSON summary of the run on stdout
    #[cfg(feature = "report")]
    #[arg(long)]
    json: bool,
}

impl Args {
    fn to_config(&self) -> Config {
        let mut config = Config::new(&self.input, &self.output);
        config.tile_size = TileSize::new(self.tile_width, self.tile_height);
        config.transparent = self
            .transparent
            .as_deref()
            .and_then(|rgb| <[u8; 3]>::try_from(rgb).ok());
        config.search = self.search.into();
        config.verify = self.verify;
        config
    }
}

fn main() {
    let args = Args::parse();
    log::set_quiet(args.quiet);

    if let Some(path) = &args.log {
        if let Err(err) = log::open(path) {
            eprintln!("Error: failed to open log file '{}': {err}", path.display());
            process::exit(1);
        }
    }

    let result = pipeline::run(&args.to_config());
    match result {
        Ok(_summary) => {
            #[cfg(feature = "report")]
            if args.json {
                match _summary.to_json() {
                    Ok(json) => println!("{json}"),
                    Err(err) => exit_with(&err),
                }
            }
            log::close();
        }
        Err(err) => exit_with(&err),
    }
}

fn exit_with(err: &Error) -> ! {
    // stderr gets the untimestamped message, the log file the usual line
    log::set_quiet(true);
    log::write(&format!("Error: {err}"));
    log::close();
    eprintln!("Error: {err}");
    process::exit(1)
}
