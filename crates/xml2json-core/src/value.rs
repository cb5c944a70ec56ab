//! The converted value model.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Key holding an element's attributes inside an [`ConvertedValue::Object`].
pub const ATTRIBUTES_KEY: &str = "@attributes";

/// Key holding an element's own text when it sits next to attributes or children.
pub const TEXT_KEY: &str = "@text";

/// The result of converting one XML element.
///
/// Objects keep insertion order: child tags in first-appearance order, then
/// [`ATTRIBUTES_KEY`], then [`TEXT_KEY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertedValue {
    /// Trimmed text content.
    Scalar(String),

    /// Payload of an expression escape, emitted unquoted by the encoder.
    RawExpression(String),

    /// An element with attributes and/or named children.
    Object(IndexMap<String, ConvertedValue>),

    /// Two or more same-named siblings, in document order.
    Array(Vec<ConvertedValue>),
}

/// The root of a conversion: the root element's tag name and its value.
///
/// Serializes as a single-entry JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub name: String,
    pub value: ConvertedValue,
}

impl ConvertedValue {
    pub fn scalar(text: impl Into<String>) -> Self {
        ConvertedValue::Scalar(text.into())
    }

    /// True unless this is an empty scalar.
    ///
    /// Decides whether an element's own text earns a [`TEXT_KEY`] entry.
    pub fn has_content(&self) -> bool {
        match self {
            ConvertedValue::Scalar(text) => !text.is_empty(),
            _ => true,
        }
    }

    pub fn is_raw_expression(&self) -> bool {
        matches!(self, ConvertedValue::RawExpression(_))
    }

    /// The text of a scalar. Raw expressions are not scalars.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConvertedValue::Scalar(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, ConvertedValue>> {
        match self {
            ConvertedValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ConvertedValue]> {
        match self {
            ConvertedValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key of an object value.
    pub fn get(&self, key: &str) -> Option<&ConvertedValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Convert to a `serde_json::Value`. Raw expressions become plain strings.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            ConvertedValue::Scalar(text) | ConvertedValue::RawExpression(text) => {
                serde_json::Value::String(text.clone())
            }
            ConvertedValue::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json_value()))
                    .collect(),
            ),
            ConvertedValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json_value).collect())
            }
        }
    }
}

impl Converted {
    pub fn new(name: impl Into<String>, value: ConvertedValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(self.name.clone(), self.value.to_json_value());
        serde_json::Value::Object(map)
    }
}

impl Serialize for ConvertedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConvertedValue::Scalar(text) | ConvertedValue::RawExpression(text) => {
                serializer.serialize_str(text)
            }
            ConvertedValue::Object(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    state.serialize_entry(key, value)?;
                }
                state.end()
            }
            ConvertedValue::Array(items) => {
                let mut state = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    state.serialize_element(item)?;
                }
                state.end()
            }
        }
    }
}

impl Serialize for Converted {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(Some(1))?;
        state.serialize_entry(&self.name, &self.value)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Converted {
        let mut attributes = IndexMap::new();
        attributes.insert("z".to_string(), ConvertedValue::scalar("1"));
        attributes.insert("a".to_string(), ConvertedValue::scalar("2"));

        let mut object = IndexMap::new();
        object.insert(
            "item".to_string(),
            ConvertedValue::Array(vec![
                ConvertedValue::scalar("x"),
                ConvertedValue::RawExpression("true".to_string()),
            ]),
        );
        object.insert(ATTRIBUTES_KEY.to_string(), ConvertedValue::Object(attributes));
        Converted::new("root", ConvertedValue::Object(object))
    }

    #[test]
    fn test_has_content() {
        assert!(!ConvertedValue::scalar("").has_content());
        assert!(ConvertedValue::scalar("0").has_content());
        assert!(ConvertedValue::RawExpression(String::new()).has_content());
    }

    #[test]
    fn test_accessors() {
        let converted = sample();
        let items = converted.value.get("item").and_then(|v| v.as_array()).unwrap();
        assert_eq!(items[0].as_str(), Some("x"));
        assert_eq!(items[1].as_str(), None);
        assert!(items[1].is_raw_expression());
        assert!(converted.value.get("missing").is_none());
    }

    #[test]
    fn test_to_json_value_keeps_order() {
        let value = sample().to_json_value();
        assert_eq!(
            value,
            json!({"root": {"item": ["x", "true"], "@attributes": {"z": "1", "a": "2"}}})
        );
        // preserve_order keeps attribute order as written
        assert_eq!(
            value.to_string(),
            r#"{"root":{"item":["x","true"],"@attributes":{"z":"1","a":"2"}}}"#
        );
    }

    #[test]
    fn test_serialize_matches_json_value() {
        let converted = sample();
        assert_eq!(
            serde_json::to_string(&converted).unwrap(),
            converted.to_json_value().to_string()
        );
    }
}
