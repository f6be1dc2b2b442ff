//! PASCAL VOC XML reader and writer.
//!
//! One XML file per image. In memory all coordinates are 0-based; on disk
//! `xmin`/`ymin` are 1-based while `xmax`/`ymax` stay 0-based, and polygon
//! vertices (`<polygon><x1/><y1/>...</polygon>`) are 1-based. Values are
//! rounded to whole pixels when written.

use std::io::Write;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::error::FormatError;
use crate::constants::DEFAULT_POSE;
use crate::model::{Annotation, BoundBox, ObjectModel, Point};

/// Encode an in-memory minimum coordinate (or polygon value) for disk.
pub fn to_one_based(value: f64) -> i64 {
    value.round() as i64 + 1
}

/// Decode a 1-based on-disk value.
pub fn from_one_based(value: f64) -> f64 {
    value - 1.0
}

/// Encode an in-memory maximum coordinate; maxima stay 0-based.
pub fn to_zero_based(value: f64) -> i64 {
    value.round() as i64
}

/// Annotation file that sits next to an image (`photo.jpg` -> `photo.xml`).
pub fn annotation_path_for(image: &Path) -> PathBuf {
    image.with_extension("xml")
}

// ============================================================================
// Writing
// ============================================================================

/// Serialize an annotation to VOC XML.
///
/// The output depends only on the annotation, so writing an unchanged model
/// twice yields identical bytes.
pub fn write_annotation(annotation: &Annotation) -> Result<String, FormatError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
        .map_err(|e| FormatError::Xml(e.into()))?;
    start(&mut writer, "annotation")?;

    let file = annotation.file();
    let folder = file
        .parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let filename = file.file_name().and_then(|n| n.to_str()).unwrap_or("");
    write_text_element(&mut writer, "folder", folder)?;
    write_text_element(&mut writer, "filename", filename)?;
    write_text_element(&mut writer, "path", &file.to_string_lossy())?;

    start(&mut writer, "source")?;
    write_text_element(&mut writer, "database", "Unknown")?;
    end(&mut writer, "source")?;

    start(&mut writer, "size")?;
    write_text_element(&mut writer, "width", &annotation.width().to_string())?;
    write_text_element(&mut writer, "height", &annotation.height().to_string())?;
    write_text_element(&mut writer, "depth", "3")?;
    end(&mut writer, "size")?;
    write_text_element(&mut writer, "segmented", "0")?;

    for object in annotation.objects() {
        write_object(&mut writer, object)?;
    }

    end(&mut writer, "annotation")?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|_| FormatError::invalid_format("Invalid UTF-8 in XML"))?;
    xml.push('\n');
    Ok(xml)
}

/// Serialize an annotation and write it to `path`.
pub fn write_annotation_file(annotation: &Annotation, path: &Path) -> Result<(), FormatError> {
    let xml = write_annotation(annotation)?;
    std::fs::write(path, xml)?;
    log::info!(
        "Wrote {} objects to {:?}",
        annotation.objects().len(),
        path
    );
    Ok(())
}

fn write_object<W: Write>(writer: &mut Writer<W>, object: &ObjectModel) -> Result<(), FormatError> {
    start(writer, "object")?;
    write_text_element(writer, "name", &object.name)?;
    write_text_element(writer, "pose", &object.pose)?;
    write_text_element(writer, "truncated", flag(object.truncated))?;
    write_text_element(writer, "difficult", flag(object.difficult))?;

    let b = object.bound_box();
    start(writer, "bndbox")?;
    write_text_element(writer, "xmin", &to_one_based(b.xmin).to_string())?;
    write_text_element(writer, "ymin", &to_one_based(b.ymin).to_string())?;
    write_text_element(writer, "xmax", &to_zero_based(b.xmax).to_string())?;
    write_text_element(writer, "ymax", &to_zero_based(b.ymax).to_string())?;
    end(writer, "bndbox")?;

    if let Some(vertices) = object.polygon() {
        start(writer, "polygon")?;
        for (i, p) in vertices.iter().enumerate() {
            let n = i + 1;
            write_text_element(writer, &format!("x{}", n), &to_one_based(p.x).to_string())?;
            write_text_element(writer, &format!("y{}", n), &to_one_based(p.y).to_string())?;
        }
        end(writer, "polygon")?;
    }

    end(writer, "object")
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn start<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), FormatError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| FormatError::Xml(e.into()))
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), FormatError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| FormatError::Xml(e.into()))
}

/// Write a simple text element.
fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), FormatError> {
    start(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(|e| FormatError::Xml(e.into()))?;
    end(writer, name)
}

// ============================================================================
// Reading
// ============================================================================

/// One `<xN>` / `<yN>` leaf of a polygon.
#[derive(Debug, Clone, Copy)]
struct PolygonLeaf {
    index: u32,
    axis: char,
    value: f64,
}

impl PolygonLeaf {
    fn parse(tag: &str, text: &str) -> Result<Self, FormatError> {
        let mut chars = tag.chars();
        let axis = chars
            .next()
            .filter(|c| matches!(*c, 'x' | 'y'))
            .ok_or_else(|| FormatError::invalid_format(format!("Unexpected polygon field <{}>", tag)))?;
        let index = chars.as_str().parse().map_err(|_| {
            FormatError::invalid_format(format!("Unexpected polygon field <{}>", tag))
        })?;
        Ok(Self {
            index,
            axis,
            value: parse_number(tag, text)?,
        })
    }
}

/// Per-`<object>` fields collected while parsing.
#[derive(Debug, Default)]
struct ObjectDraft {
    name: String,
    pose: Option<String>,
    truncated: bool,
    difficult: bool,
    /// xmin, ymin, xmax, ymax as stored on disk.
    bndbox: [Option<f64>; 4],
    polygon: Vec<PolygonLeaf>,
}

impl ObjectDraft {
    fn finish(self) -> Result<ObjectModel, FormatError> {
        let mut object = if self.polygon.is_empty() {
            let bound_box = self.bound_box()?;
            ObjectModel::with_box(self.name, bound_box)
        } else {
            ObjectModel::with_polygon(self.name, assemble_polygon(self.polygon)?)
        };
        object.pose = self.pose.unwrap_or_else(|| DEFAULT_POSE.to_string());
        object.truncated = self.truncated;
        object.difficult = self.difficult;
        Ok(object)
    }

    fn bound_box(&self) -> Result<BoundBox, FormatError> {
        let field = |i: usize, name: &str| {
            self.bndbox[i].ok_or_else(|| FormatError::missing_field(format!("bndbox/{}", name)))
        };
        let b = BoundBox::new(
            from_one_based(field(0, "xmin")?),
            from_one_based(field(1, "ymin")?),
            field(2, "xmax")?,
            field(3, "ymax")?,
        );
        if b.xmax < b.xmin || b.ymax < b.ymin {
            return Err(FormatError::invalid_coordinates(format!(
                "bndbox of '{}' is inverted",
                self.name
            )));
        }
        Ok(b)
    }
}

/// Order leaves by numeric suffix, then axis letter, and pair them into points.
fn assemble_polygon(mut leaves: Vec<PolygonLeaf>) -> Result<Vec<Point>, FormatError> {
    leaves.sort_by(|a, b| a.index.cmp(&b.index).then(a.axis.cmp(&b.axis)));
    leaves
        .chunks(2)
        .map(|pair| match pair {
            [x, y] if x.axis == 'x' && y.axis == 'y' && x.index == y.index => Ok(Point::new(
                from_one_based(x.value),
                from_one_based(y.value),
            )),
            _ => Err(FormatError::invalid_coordinates(format!(
                "polygon vertex {} lacks an x or y value",
                pair[0].index
            ))),
        })
        .collect()
}

fn parse_number(field: &str, text: &str) -> Result<f64, FormatError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FormatError::invalid_coordinates(format!("<{}> is not a number: '{}'", field, text)))
}

fn parse_flag(text: &str) -> bool {
    matches!(text.trim(), "1" | "true" | "True")
}

/// Parse VOC XML into an annotation.
///
/// The image file is taken from `<path>`, falling back to `<filename>`.
/// Unknown elements are ignored. A missing `<size>` leaves the size at 0x0
/// until the image itself is loaded.
pub fn read_annotation(xml: &str) -> Result<Annotation, FormatError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut seen_root = false;
    let mut filename = String::new();
    let mut path = String::new();
    let mut width = 0u32;
    let mut height = 0u32;
    let mut objects = Vec::new();
    let mut draft: Option<ObjectDraft> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if stack.is_empty() {
                    if name != "annotation" {
                        return Err(FormatError::invalid_format(format!(
                            "Expected <annotation> root, found <{}>",
                            name
                        )));
                    }
                    seen_root = true;
                }
                if name == "object" && stack.len() == 1 {
                    draft = Some(ObjectDraft::default());
                }
                stack.push(name);
            }
            Ok(Event::End(_)) => {
                let closed = stack.pop();
                if closed.as_deref() == Some("object") && stack.len() == 1 {
                    if let Some(finished) = draft.take() {
                        objects.push(finished.finish()?);
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().map_err(FormatError::Xml)?.to_string();
                let path_parts: Vec<&str> = stack.iter().map(String::as_str).collect();
                match path_parts.as_slice() {
                    ["annotation", "filename"] => filename = text,
                    ["annotation", "path"] => path = text,
                    ["annotation", "size", "width"] => {
                        width = parse_number("width", &text)?.max(0.0) as u32;
                    }
                    ["annotation", "size", "height"] => {
                        height = parse_number("height", &text)?.max(0.0) as u32;
                    }
                    ["annotation", "object", field @ ..] => {
                        if let Some(d) = draft.as_mut() {
                            read_object_field(d, field, text)?;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FormatError::Xml(e)),
            _ => {}
        }
    }

    if !seen_root {
        return Err(FormatError::invalid_format("Missing <annotation> root"));
    }
    if width == 0 || height == 0 {
        log::debug!("Annotation has no image size; it will be taken from the image");
    }

    let file = if path.is_empty() { filename } else { path };
    let mut annotation = Annotation::new(file, width, height);
    annotation.replace_objects(objects);
    Ok(annotation)
}

fn read_object_field(draft: &mut ObjectDraft, field: &[&str], text: String) -> Result<(), FormatError> {
    match field {
        ["name"] => draft.name = text,
        ["pose"] => draft.pose = Some(text),
        ["truncated"] => draft.truncated = parse_flag(&text),
        ["difficult"] => draft.difficult = parse_flag(&text),
        ["bndbox", coord] => {
            let slot = match *coord {
                "xmin" => 0,
                "ymin" => 1,
                "xmax" => 2,
                "ymax" => 3,
                _ => return Ok(()),
            };
            draft.bndbox[slot] = Some(parse_number(coord, &text)?);
        }
        ["polygon", leaf] => draft.polygon.push(PolygonLeaf::parse(leaf, &text)?),
        _ => {}
    }
    Ok(())
}

/// Read and parse a VOC file. A relative image path is resolved against the
/// directory of the XML file.
pub fn read_annotation_file(path: &Path) -> Result<Annotation, FormatError> {
    let content = std::fs::read_to_string(path)?;
    let mut annotation = read_annotation(&content)?;
    if annotation.file.is_relative() {
        if let Some(dir) = path.parent() {
            annotation.file = dir.join(&annotation.file);
        }
    }
    log::info!(
        "Read {} objects from {:?}",
        annotation.objects().len(),
        path
    );
    Ok(annotation)
}
