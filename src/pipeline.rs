//! Load, filter, deduplicate, pack, export, and optionally verify.
use crate::{
    atlas::{self, Atlas},
    config::{with_suffix, Config},
    dedup,
    error::{Result, Stage, StageContext},
    log,
    reconstruct,
    report::Summary,
    transparency,
    tmx::MapDocument,
};
use image::RgbaImage;
use std::{fs, path::Path};

const TEMP_SUFFIX: &str = "tmp";

pub fn run(config: &Config) -> Result<Summary> {
    config.validate().stage(Stage::Config)?;
    let name = config.base_name().stage(Stage::Config)?;
    let atlas_path = config.atlas_path();
    let map_path = config.map_path();

    log::write(&format!("Opening image {}", config.input.display()));
    let mut image = load_source(&config.input).stage(Stage::Load)?;

    if let Some(color) = config.transparent {
        log::write(&format!(
            "Making {},{},{} transparent",
            color[0], color[1], color[2]
        ));
    }
    transparency::make_transparent(&mut image, config.transparent);

    let result = dedup::scan(&image, config.tile_size, config.search, log::progress);
    log::write(&format!("{} unique tiles found", result.tileset.len()));

    let atlas = atlas::pack(&result.tileset).stage(Stage::Pack)?;
    let document = MapDocument::new(
        &name,
        &file_name(&atlas_path),
        &atlas,
        &result.grid,
        &result.map,
    );

    export(&atlas, &atlas_path, &document, &map_path).stage(Stage::Export)?;
    log::write(&format!(
        "Wrote {} and {}",
        atlas_path.display(),
        map_path.display()
    ));

    if config.verify {
        reconstruct::verify(&image, &atlas_path, &map_path, config.tile_size)
            .stage(Stage::Verify)?;
        log::write("Round trip verified");
    }

    Ok(Summary {
        input: config.input.clone(),
        columns: result.grid.columns(),
        rows: result.grid.rows(),
        cells: result.map.len(),
        unique_tiles: result.tileset.unique_tiles(),
        tiles_per_side: atlas.tiles_per_side,
        atlas_width: atlas.width(),
        atlas_height: atlas.height(),
        atlas_path,
        map_path,
        verified: config.verify,
    })
}

/// Decodes the source and widens it to RGBA8, opaque where it had no alpha.
pub fn load_source(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)?;
    if !image.color().has_alpha() {
        log::write(&format!("Format is {:?}, converting to RGBA", image.color()));
    }
    Ok(image.to_rgba8())
}

/// Writes both artifacts next to their targets first and only renames them
/// into place once both writes succeeded.
fn export(atlas: &Atlas, atlas_path: &Path, document: &MapDocument, map_path: &Path) -> Result<()> {
    if let Some(parent) = atlas_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let atlas_temp = with_suffix(atlas_path, TEMP_SUFFIX);
    let map_temp = with_suffix(map_path, TEMP_SUFFIX);

    let written = atlas
        .save(&atlas_temp)
        .and_then(|_| document.save(&map_temp));
    if let Err(err) = written {
        let _ = fs::remove_file(&atlas_temp);
        let _ = fs::remove_file(&map_temp);
        return Err(err);
    }

    if let Err(err) = fs::rename(&atlas_temp, atlas_path) {
        let _ = fs::remove_file(&atlas_temp);
        let _ = fs::remove_file(&map_temp);
        return Err(err.into());
    }
    if let Err(err) = fs::rename(&map_temp, map_path) {
        // An atlas from an earlier run was already replaced, so none is left.
        let _ = fs::remove_file(atlas_path);
        let _ = fs::remove_file(&map_temp);
        return Err(err.into());
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
