use super::{generic_check, path_str, run_tileforge, write_source};
use image::{GenericImageView, Rgba, RgbaImage};
use std::path::Path;
use tempfile::TempDir;
use tileforge::{
    atlas::Atlas,
    grid::{Grid, TileSize},
    reconstruct::reconstruct,
    tmx::MapDocument,
};

/// A map-like picture: a few distinct tiles repeated in runs, a transparent
/// sky and a ragged right and bottom edge.
fn level(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let (column, row) = (x / 8, y / 8);
        if row < 2 {
            return Rgba([0, 0, 0, 0]);
        }
        let kind = (column / 3 + row) % 4;
        let shade = ((x % 8) * 16 + (y % 8) * 4) as u8;
        match kind {
            0 => Rgba([shade, 120, 40, 255]),
            1 => Rgba([90, shade, 90, 255]),
            2 => Rgba([30, 30, shade, 200]),
            _ => Rgba([255, 255, 255, 255]),
        }
    })
}

#[test]
fn rebuilds_source_from_outputs() {
    for (width, height) in [(96, 64), (101, 59)] {
        let dir = TempDir::new().unwrap();
        let source = level(width, height);
        let input = write_source(&dir, "level.png", &source);
        let output = dir.path().join("out");

        generic_check(&run_tileforge(&[
            "--input",
            path_str(&input),
            "--output",
            path_str(&output),
        ]));

        let rebuilt = rebuild(dir.path(), "out", &source, TileSize::default());
        if let Some(diff) = compare_images(&source, &rebuilt) {
            panic!("{width}x{height} rebuild differs from source at pixels: {diff}");
        }
    }
}

#[test]
fn runs_are_deterministic() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "level.png", &level(80, 48));
    for (name, search) in [("a", "hashed"), ("b", "hashed"), ("c", "recency")] {
        generic_check(&run_tileforge(&[
            "--input",
            path_str(&input),
            "--output",
            path_str(&dir.path().join(name)),
            "--search",
            search,
        ]));
    }

    let atlas = |name: &str| std::fs::read(dir.path().join(format!("{name}.png"))).unwrap();
    let gids = |name: &str| {
        MapDocument::load(&dir.path().join(format!("{name}.tmx")))
            .unwrap()
            .gids
    };
    assert_eq!(atlas("a"), atlas("b"));
    assert_eq!(atlas("a"), atlas("c"));
    assert_eq!(gids("a"), gids("b"));
    assert_eq!(gids("a"), gids("c"));
}

#[test]
fn tall_tiles_round_trip() {
    let dir = TempDir::new().unwrap();
    let source = level(64, 64);
    let input = write_source(&dir, "level.png", &source);
    let tile_size = TileSize::new(16, 8);

    generic_check(&run_tileforge(&[
        "--input",
        path_str(&input),
        "--output",
        path_str(&dir.path().join("wide")),
        "--tileWidth",
        "16",
        "--tileHeight",
        "8",
        "--verify",
    ]));

    let document = MapDocument::load(&dir.path().join("wide.tmx")).unwrap();
    assert_eq!((document.width, document.height), (4, 8));
    assert_eq!(document.gids.len(), 32);
    let rebuilt = rebuild(dir.path(), "wide", &source, tile_size);
    assert_eq!(compare_images(&source, &rebuilt), None);
}

fn rebuild(dir: &Path, name: &str, source: &RgbaImage, tile_size: TileSize) -> RgbaImage {
    let document = MapDocument::load(&dir.join(format!("{name}.tmx"))).unwrap();
    assert_eq!(document.image_source, format!("{name}.png"));
    let atlas = Atlas::load(&dir.join(&document.image_source), tile_size).unwrap();
    assert_eq!(atlas.width(), document.image_width);
    assert_eq!(atlas.height(), document.image_height);
    assert!(atlas.tiles_per_side.is_power_of_two());

    let grid = Grid::for_image(source, tile_size);
    reconstruct(&atlas, &grid, &document.gids).unwrap()
}

/// Lists up to seven differing pixels with the channels that differ.
fn compare_images(expected: &RgbaImage, actual: &RgbaImage) -> Option<String> {
    if expected.dimensions() != actual.dimensions() {
        return Some(format!(
            "size {:?} vs {:?}",
            expected.dimensions(),
            actual.dimensions()
        ));
    }
    let mut image_differences: Vec<String> = Vec::new();
    'rows: for y in 0..expected.height() {
        for x in 0..expected.width() {
            let expected_pixel = expected.get_pixel(x, y);
            let actual_pixel = actual.get_pixel(x, y);
            if expected_pixel == actual_pixel {
                continue;
            }
            let mut channels = String::with_capacity(4);
            for (channel, name) in ["R", "G", "B", "A"].iter().enumerate() {
                channels.push_str(if expected_pixel[channel] != actual_pixel[channel] {
                    *name
                } else {
                    "#"
                });
            }
            if image_differences.len() < 7 {
                image_differences.push(format!("({x},{y}:{channels})"));
            } else {
                image_differences.push(String::from("..."));
                break 'rows;
            }
        }
    }
    if image_differences.is_empty() {
        None
    } else {
        Some(image_differences.join(";"))
    }
}

#[test]
fn comparison_reports_channels() {
    let image = RgbaImage::new(2, 2);
    let mut other = image.clone();
    other.put_pixel(1, 0, Rgba([0, 9, 0, 9]));
    assert_eq!(compare_images(&image, &other).unwrap(), "(1,0:#G#A)");
    assert_eq!(compare_images(&image, &image.view(0, 0, 2, 2).to_image()), None);
}
