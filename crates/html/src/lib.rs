//! HTML parsing, querying, and serialization for the archiver's migration
//! core. An arena-backed DOM built by an html5ever `TreeSink`, simplified
//! from a live-rendering engine into a parse-mutate-serialize pipeline.

pub mod dom;
pub mod metadata;
pub mod parser;
pub mod serialize;

pub use dom::{Dom, DomNode, NodeKind};
pub use metadata::{extract as extract_metadata, DocumentMetadata};
pub use parser::parse;
pub use serialize::serialize;
