//! TMX map document: one orthogonal map, one tileset, one tile layer.
use crate::{
    atlas::Atlas,
    error::{Error, Result},
    grid::Grid,
    tileset::TileId,
};
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, Event},
    Reader, Writer,
};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

pub const VERSION: &str = "1.0";
pub const ORIENTATION: &str = "orthogonal";
pub const RENDER_ORDER: &str = "right-down";
pub const FIRST_GID: TileId = 1;
pub const LAYER_NAME: &str = "Platforms";
/// Kept for older readers, nothing depends on its value.
pub const LEGACY_TRANSPARENT_KEY: &str = "FF0FF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDocument {
    /// Whole tile columns of the source image.
    pub width: u32,
    /// Whole tile rows of the source image.
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tileset_name: String,
    pub image_source: String,
    pub image_width: u32,
    pub image_height: u32,
    /// One gid per grid cell in scan order, 0 for no tile.
    pub gids: Vec<TileId>,
}

impl MapDocument {
    pub fn new(
        tileset_name: &str,
        image_source: &str,
        atlas: &Atlas,
        grid: &Grid,
        map: &[TileId],
    ) -> Self {
        MapDocument {
            width: grid.full_columns(),
            height: grid.full_rows(),
            tile_width: grid.tile.width,
            tile_height: grid.tile.height,
            tileset_name: tileset_name.to_owned(),
            image_source: image_source.to_owned(),
            image_width: atlas.width(),
            image_height: atlas.height(),
            gids: map.to_vec(),
        }
    }

    pub fn write<W: Write>(&self, output: W) -> Result<()> {
        let mut writer = Writer::new_with_indent(output, b'\t', 1);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        writer.write_event(Event::Start(element(
            "map",
            &[
                ("version", VERSION.to_owned()),
                ("orientation", ORIENTATION.to_owned()),
                ("renderorder", RENDER_ORDER.to_owned()),
                ("width", self.width.to_string()),
                ("height", self.height.to_string()),
                ("tilewidth", self.tile_width.to_string()),
                ("tileheight", self.tile_height.to_string()),
            ],
        )))?;

        writer.write_event(Event::Start(element(
            "tileset",
            &[
                ("firstgid", FIRST_GID.to_string()),
                ("name", self.tileset_name.clone()),
                ("tilewidth", self.tile_width.to_string()),
                ("tileheight", self.tile_height.to_string()),
            ],
        )))?;
        writer.write_event(Event::Empty(element(
            "image",
            &[
                ("source", self.image_source.clone()),
                ("width", self.image_width.to_string()),
                ("height", self.image_height.to_string()),
                ("trans", LEGACY_TRANSPARENT_KEY.to_owned()),
            ],
        )))?;
        writer.write_event(Event::End(BytesEnd::new("tileset")))?;

        writer.write_event(Event::Start(element(
            "layer",
            &[
                ("name", LAYER_NAME.to_owned()),
                ("width", self.width.to_string()),
                ("height", self.height.to_string()),
            ],
        )))?;
        writer.write_event(Event::Start(BytesStart::new("data")))?;
        for gid in &self.gids {
            writer.write_event(Event::Empty(element("tile", &[("gid", gid.to_string())])))?;
        }
        writer.write_event(Event::End(BytesEnd::new("data")))?;
        writer.write_event(Event::End(BytesEnd::new("layer")))?;

        writer.write_event(Event::End(BytesEnd::new("map")))?;
        writer.get_mut().write_all(b"\n")?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut output = BufWriter::new(File::create(path)?);
        self.write(&mut output)?;
        output.flush()?;
        Ok(())
    }

    /// Parses a document of the shape `write` produces.
    pub fn read(xml: &str) -> Result<MapDocument> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut map: Option<(u32, u32, u32, u32)> = None;
        let mut tileset_name: Option<String> = None;
        let mut image: Option<(String, u32, u32)> = None;
        let mut gids = Vec::new();
        let mut in_data = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                    b"map" => {
                        map = Some((
                            number(&e, "width")?,
                            number(&e, "height")?,
                            number(&e, "tilewidth")?,
                            number(&e, "tileheight")?,
                        ));
                    }
                    b"tileset" => tileset_name = Some(attribute(&e, "name")?),
                    b"image" => {
                        image = Some((
                            attribute(&e, "source")?,
                            number(&e, "width")?,
                            number(&e, "height")?,
                        ));
                    }
                    b"data" => in_data = true,
                    b"tile" if in_data => gids.push(number(&e, "gid")?),
                    _ => {}
                },
                Event::End(e) if e.name().as_ref() == b"data" => in_data = false,
                Event::Eof => break,
                _ => {}
            }
        }

        let (width, height, tile_width, tile_height) =
            map.ok_or_else(|| Error::MalformedMap("missing <map> element".to_owned()))?;
        let tileset_name = tileset_name
            .ok_or_else(|| Error::MalformedMap("missing <tileset> element".to_owned()))?;
        let (image_source, image_width, image_height) =
            image.ok_or_else(|| Error::MalformedMap("missing tileset <image>".to_owned()))?;

        Ok(MapDocument {
            width,
            height,
            tile_width,
            tile_height,
            tileset_name,
            image_source,
            image_width,
            image_height,
            gids,
        })
    }

    pub fn load(path: &Path) -> Result<MapDocument> {
        MapDocument::read(&std::fs::read_to_string(path)?)
    }
}

fn element<'a>(name: &'a str, attributes: &[(&str, String)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attributes {
        start.push_attribute((*key, value.as_str()));
    }
    start
}

fn attribute(element: &BytesStart, key: &str) -> Result<String> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key.as_bytes() {
            return Ok(attr.unescape_value()?.into_owned());
        }
    }
    Err(Error::MalformedMap(format!(
        "<{}> has no '{key}' attribute",
        String::from_utf8_lossy(element.name().as_ref())
    )))
}

fn number(element: &BytesStart, key: &str) -> Result<u32> {
    Ok(attribute(element, key)?.parse::<u32>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> MapDocument {
        MapDocument {
            width: 2,
            height: 1,
            tile_width: 8,
            tile_height: 8,
            tileset_name: "level<1>".to_owned(),
            image_source: "level<1>.png".to_owned(),
            image_width: 16,
            image_height: 16,
            gids: vec![1, 2],
        }
    }

    fn written(doc: &MapDocument) -> String {
        let mut out = Vec::new();
        doc.write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn writes_tmx_layout() {
        let xml = written(&MapDocument {
            tileset_name: "level".to_owned(),
            image_source: "level.png".to_owned(),
            ..document()
        });
        let expected = [
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
            "<map version=\"1.0\" orientation=\"orthogonal\" renderorder=\"right-down\" width=\"2\" height=\"1\" tilewidth=\"8\" tileheight=\"8\">",
            "<tileset firstgid=\"1\" name=\"level\" tilewidth=\"8\" tileheight=\"8\">",
            "<image source=\"level.png\" width=\"16\" height=\"16\" trans=\"FF0FF\"/>",
            "</tileset>",
            "<layer name=\"Platforms\" width=\"2\" height=\"1\">",
            "<data>",
            "<tile gid=\"1\"/>",
            "<tile gid=\"2\"/>",
            "</data>",
            "</layer>",
            "</map>",
        ];
        let lines: Vec<&str> = xml.lines().map(str::trim).collect();
        assert_eq!(lines, expected);
        assert!(xml.contains("\n\t<tileset"));
        assert!(xml.contains("\n\t\t\t<tile gid=\"2\"/>"));
    }

    #[test]
    fn reads_what_it_writes() {
        let doc = document();
        assert_eq!(MapDocument::read(&written(&doc)).unwrap(), doc);
    }

    #[test]
    fn missing_attribute_is_malformed() {
        let xml = "<map width=\"1\" height=\"1\" tilewidth=\"8\"></map>";
        assert!(matches!(MapDocument::read(xml), Err(Error::MalformedMap(_))));
    }

    #[test]
    fn missing_tileset_is_malformed() {
        let xml = "<map width=\"1\" height=\"1\" tilewidth=\"8\" tileheight=\"8\"/>";
        assert!(matches!(MapDocument::read(xml), Err(Error::MalformedMap(_))));
    }

    #[test]
    fn bad_gid_is_rejected() {
        let xml = written(&document()).replace("gid=\"2\"", "gid=\"two\"");
        assert!(matches!(
            MapDocument::read(&xml),
            Err(Error::ParseIntError(_))
        ));
    }
}
