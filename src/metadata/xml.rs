//! ComicInfo.xml encoding and decoding
//!
//! The document is a flat `<ComicInfo>` root with one child element per
//! populated field, written in [`SCHEMA_ORDER`]. List fields are stored as a
//! single `", "`-joined element. Decoding drops elements outside the schema.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

use crate::metadata::{ComicInfo, Field, SCHEMA_ORDER};

const ROOT: &str = "ComicInfo";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// The document could not be encoded or decoded
#[derive(Debug, Error)]
#[error("{0}")]
pub struct XmlError(String);

fn xml_error(err: impl std::fmt::Display) -> XmlError {
    XmlError(err.to_string())
}

/// Serialize a record to ComicInfo.xml bytes
pub fn encode(info: &ComicInfo) -> Result<Vec<u8>, XmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;

    let root = BytesStart::new(ROOT).with_attributes([("xmlns:xsi", XSI_NS), ("xmlns:xsd", XSD_NS)]);
    writer.write_event(Event::Start(root)).map_err(xml_error)?;

    for field in SCHEMA_ORDER {
        let Some(value) = info.display_value(*field) else {
            continue;
        };
        let tag = field.tag();
        writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Text(BytesText::new(&value)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(ROOT)))
        .map_err(xml_error)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parse ComicInfo.xml bytes into a record
pub fn decode(bytes: &[u8]) -> Result<ComicInfo, XmlError> {
    let text = std::str::from_utf8(bytes).map_err(|e| XmlError(format!("not UTF-8: {}", e)))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = Reader::from_str(text);
    let mut info = ComicInfo::default();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut current: Option<Field> = None;
    let mut value = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            XmlError(format!("{} at byte {}", e, reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => {
                depth += 1;
                let name = element_name(&e)?;
                if depth == 1 {
                    check_root(&name, saw_root)?;
                    saw_root = true;
                } else if depth == 2 {
                    current = Field::from_tag(&name);
                    value.clear();
                }
            }
            Event::Empty(e) => {
                // A self-closing child is an absent field; only the root matters here
                if depth == 0 {
                    let name = element_name(&e)?;
                    check_root(&name, saw_root)?;
                    saw_root = true;
                }
            }
            Event::Text(e) if depth == 2 && current.is_some() => {
                value.push_str(&e.unescape().map_err(xml_error)?);
            }
            Event::CData(e) if depth == 2 && current.is_some() => {
                let raw = e.into_inner();
                value.push_str(std::str::from_utf8(&raw).map_err(xml_error)?);
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some(field) = current.take() {
                        apply(&mut info, field, &value);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(XmlError("unexpected end of document".to_string()));
    }
    if !saw_root {
        return Err(XmlError(format!("missing <{}> root element", ROOT)));
    }

    Ok(info)
}

fn element_name(e: &BytesStart<'_>) -> Result<String, XmlError> {
    let local = e.local_name();
    std::str::from_utf8(local.as_ref())
        .map(String::from)
        .map_err(xml_error)
}

fn check_root(name: &str, saw_root: bool) -> Result<(), XmlError> {
    if saw_root {
        return Err(XmlError("more than one root element".to_string()));
    }
    if name != ROOT {
        return Err(XmlError(format!(
            "unexpected root element <{}>, expected <{}>",
            name, ROOT
        )));
    }
    Ok(())
}

fn apply(info: &mut ComicInfo, field: Field, value: &str) {
    match field {
        Field::Scalar(f) => info.set_scalar(f, Some(value)),
        Field::List(f) => info.set_list(f, value.split(',')),
    }
}
