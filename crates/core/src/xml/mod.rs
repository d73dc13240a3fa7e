//! Skeleton and index documents.
//!
//! Writers only produce text; [`crate::schema`] checks it before anything
//! reaches disk.

mod index;
mod skeleton;

pub use index::index_document;
pub use skeleton::{class_document, skeleton_document};

use crate::error::{ClasspeekError, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

pub const SKELETON_SCHEMA: &str = "xsd/skeleton.xsd";

pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn new_writer() -> Result<XmlWriter> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

fn finish(writer: XmlWriter) -> Result<String> {
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| ClasspeekError::Internal(e.to_string()))
}

fn write_text_element(writer: &mut XmlWriter, element: BytesStart<'_>, text: &str) -> Result<()> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    writer.write_event(Event::Start(element))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
