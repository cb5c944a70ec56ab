//! Offset-tracked XML parsing for xml2json.
//!
//! This crate wraps [`quick-xml`] to build a tree of [`XmlElement`]s, where
//! each element records the byte span it occupies in the source. It is the
//! gatekeeper for the converter: malformed documents and documents whose
//! DOCTYPE declares entities are rejected here, before any conversion runs.
//!
//! # Overview
//!
//! The main types are:
//! - [`XmlDocument`]: The parsed document
//! - [`XmlElement`]: An XML element with name, attributes, children, and spans
//! - [`XmlAttribute`]: An attribute with its unescaped value
//! - [`XmlChildren`]: Element content (elements, text, mixed, or empty)
//!
//! # Example
//!
//! ```rust
//! use xml2json_xml::parse;
//!
//! let xml = parse(r#"<library version="2">
//!   <book id="b1"><title>Dune</title></book>
//! </library>"#).unwrap();
//!
//! assert_eq!(xml.root.name, "library");
//! assert_eq!(xml.root.get_attribute("version"), Some("2"));
//!
//! let books = xml.root.get_children("book");
//! assert_eq!(books.len(), 1);
//! assert_eq!(books[0].get_attribute("id"), Some("b1"));
//! ```

pub mod error;
pub mod parser;
pub mod types;

// Re-export main types
pub use error::{Error, Result};
pub use parser::parse;
pub use types::{Span, XmlAttribute, XmlChild, XmlChildren, XmlDocument, XmlElement};
