//! The `index.rdf` sidecar every tab directory carries: five
//! `MAF:`-namespaced metadata fields wrapped in an `RDF:Description`,
//! written with `quick-xml` the way `tola-ssg`'s `utils::xml` writers
//! build elements (`BytesStart`/`BytesText`/`BytesEnd`) rather than
//! templating a string by hand.
//!
//! Grounded in `lemmiwinks.archive.rdfinfo`/`archive.maff.RDF`: the
//! original builds an `ElementTree` with one `RDF:Description` child per
//! field; this keeps the same shape, minus the getter half the archiver
//! never needs (nothing reads `index.rdf` back in).

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use archive_core::{Error, Result};

/// The five fields `index.rdf` records for one tab.
#[derive(Clone, Debug, Default)]
pub struct RdfInfo {
    pub original_url: String,
    pub title: String,
    pub archive_time: String,
    pub index_file_name: String,
    pub charset: String,
}

const NS_MAF: &str = "http://maf.mozdev.org/metadata/rdf#";
const NS_NC: &str = "http://home.netscape.com/NC-rdf#";
const NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// `strftime("%a, %d %b %Y %H:%M:%S %z")`-shaped moment, already formatted
/// by the caller (the archiver stamps it once at archive-build time, not
/// per tab, so every RDF in one run shares a timestamp).
#[must_use]
pub fn format_archive_time(now: &chrono::DateTime<chrono::Local>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

/// Serialize `info` into the XML bytes an `index.rdf` entry holds.
///
/// # Errors
/// Returns `Error::Fatal` if the underlying XML writer fails, which only
/// happens on an I/O error writing into the in-memory buffer.
pub fn serialize(info: &RdfInfo) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    let write_err = |source: std::io::Error| Error::Fatal(format!("failed writing index.rdf: {source}"));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
        .map_err(write_err)?;

    let mut root = BytesStart::new("RDF:RDF");
    root.push_attribute(("xmlns:MAF", NS_MAF));
    root.push_attribute(("xmlns:NC", NS_NC));
    root.push_attribute(("xmlns:RDF", NS_RDF));
    writer.write_event(Event::Start(root)).map_err(write_err)?;

    let mut description = BytesStart::new("RDF:Description");
    description.push_attribute(("RDF:about", "urn:root"));
    writer.write_event(Event::Start(description.clone())).map_err(write_err)?;

    for (tag, value) in [
        ("MAF:originalurl", &info.original_url),
        ("MAF:title", &info.title),
        ("MAF:archivetime", &info.archive_time),
        ("MAF:indexfilename", &info.index_file_name),
        ("MAF:charset", &info.charset),
    ] {
        write_resource_node(&mut writer, tag, value).map_err(write_err)?;
    }

    writer.write_event(Event::End(BytesEnd::new("RDF:Description"))).map_err(write_err)?;
    writer.write_event(Event::End(BytesEnd::new("RDF:RDF"))).map_err(write_err)?;

    Ok(writer.into_inner().into_inner())
}

fn write_resource_node(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, value: &str) -> std::result::Result<(), std::io::Error> {
    if value.is_empty() {
        return Ok(());
    }
    let mut node = BytesStart::new(tag);
    node.push_attribute(("RDF:resource", value));
    writer.write_event(Event::Empty(node))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_every_populated_field_as_a_resource_attribute() {
        let info = RdfInfo {
            original_url: "https://example.test/".into(),
            title: "Example".into(),
            archive_time: "Tue, 01 Jan 2030 00:00:00 +0000".into(),
            index_file_name: "index.html".into(),
            charset: "utf-8".into(),
        };
        let xml = String::from_utf8(serialize(&info).unwrap()).unwrap();
        assert!(xml.contains(r#"RDF:resource="https://example.test/""#));
        assert!(xml.contains("MAF:originalurl"));
        assert!(xml.contains("MAF:archivetime"));
        assert!(xml.contains("xmlns:MAF"));
    }

    #[test]
    fn empty_fields_are_omitted_rather_than_written_blank() {
        let info = RdfInfo {
            original_url: "https://example.test/".into(),
            charset: String::new(),
            ..Default::default()
        };
        let xml = String::from_utf8(serialize(&info).unwrap()).unwrap();
        assert!(!xml.contains("MAF:charset"));
    }
}
