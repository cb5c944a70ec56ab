//! Convert XML documents into JSON.
//!
//! The conversion is a pure tree transform over an [`xml2json_xml::XmlElement`]
//! tree:
//!
//! - [`extract`] turns element text and attribute values into scalars, and
//!   recognizes the `new Laminas\Json\Expr("...")` escape for raw expressions.
//! - [`convert`] walks the tree, groups repeated siblings into arrays, and
//!   enforces the depth ceiling.
//! - [`encode`] writes the result as JSON text.
//!
//! # Example
//!
//! ```rust
//! use xml2json_core::{ConvertOptions, from_xml};
//!
//! let json = from_xml(
//!     r#"<root id="7"><item>1</item><item>2</item></root>"#,
//!     &ConvertOptions::default().with_attributes(true),
//! )
//! .unwrap();
//!
//! assert_eq!(json, r#"{"root":{"item":["1","2"],"@attributes":{"id":"7"}}}"#);
//! ```
//!
//! # Reserved keys
//!
//! `@attributes` and `@text` share the namespace of child tag names. A child
//! element literally named one of them is overwritten by the reserved entry.
//!
//! Attribute keys are local names, like element keys. Attributes that differ
//! only by namespace prefix (`x:id` and `y:id`) share one key, and the last
//! one in document order wins.

pub mod convert;
pub mod encode;
pub mod error;
pub mod extract;
pub mod value;

pub use convert::{ConvertOptions, DEFAULT_MAX_DEPTH, convert_element};
pub use encode::{EncodeOptions, RawExpressionMode, to_json_string, value_to_json_string};
pub use error::{ConvertError, Xml2JsonError};
pub use extract::{extract_value, is_raw_expression};
pub use value::{ATTRIBUTES_KEY, Converted, ConvertedValue, TEXT_KEY};

/// Parse `xml` and convert it to its intermediate value.
///
/// # Errors
///
/// [`Xml2JsonError::InvalidInput`] if the text is not well-formed or fails the
/// security scan; in that case no conversion is attempted.
/// [`Xml2JsonError::Conversion`] if the tree is deeper than allowed.
pub fn to_value(xml: &str, options: &ConvertOptions) -> Result<Converted, Xml2JsonError> {
    let document = xml2json_xml::parse(xml)?;

    tracing::debug!(
        root = %document.root.name,
        include_attributes = options.include_attributes,
        max_depth = options.max_depth,
        "converting XML document"
    );

    Ok(convert_element(&document.root, options)?)
}

/// Convert XML text to compact JSON text.
///
/// Attributes are left out unless `options.include_attributes` is set.
pub fn from_xml(xml: &str, options: &ConvertOptions) -> Result<String, Xml2JsonError> {
    from_xml_with(xml, options, &EncodeOptions::default())
}

/// Convert XML text to JSON text with explicit encoding options.
pub fn from_xml_with(
    xml: &str,
    options: &ConvertOptions,
    encode: &EncodeOptions,
) -> Result<String, Xml2JsonError> {
    let converted = to_value(xml, options)?;
    Ok(to_json_string(&converted, encode))
}
