//! Recursive conversion of an element tree into a [`ConvertedValue`].
//!
//! Rules, applied per element:
//!
//! - A leaf (no child elements) becomes its extracted text. When attributes
//!   are requested and present, it becomes an object with `@attributes` and,
//!   if the text is non-empty, `@text`.
//! - A branch becomes an object keyed by child tag name. The first child with
//!   a given name is stored as-is; a second one promotes the entry to an
//!   array, which later siblings append to. Requested attributes go under
//!   `@attributes` and non-empty own text under `@text`, after the children.
//! - Depth is 0 at the root. Reaching an element deeper than
//!   [`ConvertOptions::max_depth`] aborts the whole conversion.

use crate::error::ConvertError;
use crate::extract::{attribute_value, element_value};
use crate::value::{ATTRIBUTES_KEY, Converted, ConvertedValue, TEXT_KEY};
use indexmap::IndexMap;
use xml2json_xml::{XmlAttribute, XmlElement};

/// Default ceiling on element nesting.
pub const DEFAULT_MAX_DEPTH: usize = 25;

/// Options controlling a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Emit attributes under `@attributes`. Off by default.
    pub include_attributes: bool,

    /// Deepest element depth allowed, counting the root as 0.
    pub max_depth: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            include_attributes: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(mut self, include_attributes: bool) -> Self {
        self.include_attributes = include_attributes;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Convert `element` and everything below it.
///
/// # Example
///
/// ```rust
/// use xml2json_core::{ConvertOptions, ConvertedValue, convert_element};
///
/// let xml = xml2json_xml::parse("<a>hello</a>").unwrap();
/// let converted = convert_element(&xml.root, &ConvertOptions::default()).unwrap();
/// assert_eq!(converted.name, "a");
/// assert_eq!(converted.value, ConvertedValue::scalar("hello"));
/// ```
///
/// # Errors
///
/// Returns [`ConvertError::RecursionLimitExceeded`] if any element sits
/// deeper than `options.max_depth`.
pub fn convert_element(
    element: &XmlElement,
    options: &ConvertOptions,
) -> Result<Converted, ConvertError> {
    let value = convert_at_depth(element, options, 0)?;
    Ok(Converted::new(element.name.clone(), value))
}

/// Values collected for one child tag name while walking a parent's children.
enum Slot {
    Single(ConvertedValue),
    Many(Vec<ConvertedValue>),
}

impl Slot {
    fn push(&mut self, value: ConvertedValue) {
        match self {
            Slot::Many(items) => items.push(value),
            Slot::Single(first) => {
                let first = std::mem::replace(first, ConvertedValue::Scalar(String::new()));
                *self = Slot::Many(vec![first, value]);
            }
        }
    }

    fn into_value(self) -> ConvertedValue {
        match self {
            Slot::Single(value) => value,
            Slot::Many(items) => ConvertedValue::Array(items),
        }
    }
}

fn convert_at_depth(
    element: &XmlElement,
    options: &ConvertOptions,
    depth: usize,
) -> Result<ConvertedValue, ConvertError> {
    if depth > options.max_depth {
        tracing::debug!(
            element = %element.name,
            depth,
            max_depth = options.max_depth,
            "recursion limit exceeded"
        );
        return Err(ConvertError::RecursionLimitExceeded {
            max_depth: options.max_depth,
            element: element.name.clone(),
            offset: element.span.start,
        });
    }

    tracing::trace!(element = %element.name, depth, "converting element");

    let value = element_value(element);

    if !element.has_child_elements() {
        return Ok(convert_leaf(element, value, options));
    }

    // Fresh per element: promotion state never leaks between parents.
    let mut slots: IndexMap<String, Slot> = IndexMap::new();
    for child in element.all_children() {
        let converted = convert_at_depth(child, options, depth + 1)?;
        match slots.get_mut(&child.name) {
            Some(slot) => slot.push(converted),
            None => {
                slots.insert(child.name.clone(), Slot::Single(converted));
            }
        }
    }

    let mut object: IndexMap<String, ConvertedValue> = slots
        .into_iter()
        .map(|(name, slot)| (name, slot.into_value()))
        .collect();

    if options.include_attributes {
        if let Some(attributes) = attributes_object(element) {
            object.insert(ATTRIBUTES_KEY.to_string(), attributes);
        }
    }

    if value.has_content() {
        object.insert(TEXT_KEY.to_string(), value);
    }

    Ok(ConvertedValue::Object(object))
}

fn convert_leaf(
    element: &XmlElement,
    value: ConvertedValue,
    options: &ConvertOptions,
) -> ConvertedValue {
    if !options.include_attributes {
        return value;
    }

    let Some(attributes) = attributes_object(element) else {
        return value;
    };

    let mut object = IndexMap::new();
    object.insert(ATTRIBUTES_KEY.to_string(), attributes);
    if value.has_content() {
        object.insert(TEXT_KEY.to_string(), value);
    }
    ConvertedValue::Object(object)
}

/// The `@attributes` object for `element`, or `None` if it has no attributes.
///
/// Keys are local names, so `x:id` and `y:id` land on the same `id` key. The
/// first one fixes the key's position and the last one supplies the value.
fn attributes_object(element: &XmlElement) -> Option<ConvertedValue> {
    let attributes: IndexMap<String, ConvertedValue> = element
        .attributes
        .iter()
        .filter(|attr| !is_namespace_declaration(attr))
        .map(|attr| (attr.name.clone(), attribute_value(attr)))
        .collect();

    if attributes.is_empty() {
        None
    } else {
        Some(ConvertedValue::Object(attributes))
    }
}

/// `xmlns` and `xmlns:*` declare namespaces; they are not attributes.
fn is_namespace_declaration(attr: &XmlAttribute) -> bool {
    match &attr.prefix {
        Some(prefix) => prefix == "xmlns",
        None => attr.name == "xmlns",
    }
}
