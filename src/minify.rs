//! Schema minimization
//!
//! A text transform for embedding schemas in prompts and help output. It is
//! independent of the conversion pipeline.

use std::io::Cursor;

use once_cell::sync::Lazy;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;

use crate::error::{Error, Result};

/// Attributes dropped from every element
pub const DROPPED_ATTRIBUTES: &[&str] = &["unused", "extra"];

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());

fn xml_error(err: impl std::fmt::Display) -> Error {
    Error::Xml(err.to_string())
}

/// Trim text and collapse runs of spaces; None when nothing is left
fn clean_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(SPACE_RUNS.replace_all(trimmed, " ").into_owned())
    }
}

fn filtered_start(start: &BytesStart) -> Result<BytesStart<'static>> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut filtered = BytesStart::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(xml_error)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        if DROPPED_ATTRIBUTES.contains(&key.as_str()) {
            continue;
        }
        let value = attribute.unescape_value().map_err(xml_error)?;
        filtered.push_attribute((key.as_str(), value.as_ref()));
    }
    Ok(filtered)
}

/// Minimize an XML document.
///
/// Whitespace-only text disappears, other text is trimmed with space runs
/// collapsed, the placeholder attributes in [`DROPPED_ATTRIBUTES`] are
/// removed and empty elements are written self-closing. Comments survive.
/// The output starts with an XML declaration.
pub fn minify_xml(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    reader.check_end_names(true);

    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    // a start tag is held back until we know whether the element is empty
    let mut pending: Option<BytesStart<'static>> = None;

    loop {
        let event = reader.read_event().map_err(xml_error)?;
        if let Event::Text(text) = &event {
            let raw = text.unescape().map_err(xml_error)?;
            let Some(cleaned) = clean_text(&raw) else {
                continue;
            };
            if let Some(start) = pending.take() {
                writer.write_event(Event::Start(start)).map_err(xml_error)?;
            }
            writer
                .write_event(Event::Text(BytesText::new(&cleaned)))
                .map_err(xml_error)?;
            continue;
        }

        match event {
            Event::End(end) => match pending.take() {
                Some(start) => writer.write_event(Event::Empty(start)),
                None => writer.write_event(Event::End(end)),
            }
            .map_err(xml_error)?,
            Event::Eof => break,
            Event::Decl(_) => {}
            other => {
                if let Some(start) = pending.take() {
                    writer.write_event(Event::Start(start)).map_err(xml_error)?;
                }
                match other {
                    Event::Start(start) => pending = Some(filtered_start(&start)?),
                    Event::Empty(start) => writer
                        .write_event(Event::Empty(filtered_start(&start)?))
                        .map_err(xml_error)?,
                    event => writer.write_event(event).map_err(xml_error)?,
                }
            }
        }
    }

    if pending.is_some() {
        return Err(Error::Xml("unexpected end of document".to_string()));
    }
    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
}
