//! JSON text output for converted values.
//!
//! Strings and keys are escaped through `serde_json`. Raw expressions are the
//! one thing `serde_json` cannot express, so the writer here is hand-driven:
//! by default their payload is copied into the output unquoted, which may
//! yield text that is not strict JSON.

use crate::value::{Converted, ConvertedValue};

/// How [`ConvertedValue::RawExpression`] payloads are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RawExpressionMode {
    /// Copy the payload as-is, without quotes.
    #[default]
    Verbatim,

    /// Encode the payload as an ordinary JSON string.
    Quoted,
}

/// Options for [`to_json_string`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Indent nested values by two spaces, like `serde_json::to_string_pretty`.
    pub pretty: bool,

    pub raw_expressions: RawExpressionMode,
}

impl EncodeOptions {
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    pub fn with_raw_expressions(mut self, mode: RawExpressionMode) -> Self {
        self.raw_expressions = mode;
        self
    }
}

/// Encode a conversion result as JSON text.
pub fn to_json_string(converted: &Converted, options: &EncodeOptions) -> String {
    let mut writer = JsonWriter::new(options);
    writer.write_entries(std::iter::once((&converted.name, &converted.value)), 1);
    writer.out
}

/// Encode a single value as JSON text.
pub fn value_to_json_string(value: &ConvertedValue, options: &EncodeOptions) -> String {
    let mut writer = JsonWriter::new(options);
    writer.write_value(value);
    writer.out
}

struct JsonWriter<'a> {
    options: &'a EncodeOptions,
    out: String,
    indent: usize,
}

impl<'a> JsonWriter<'a> {
    fn new(options: &'a EncodeOptions) -> Self {
        Self {
            options,
            out: String::new(),
            indent: 0,
        }
    }

    fn write_value(&mut self, value: &ConvertedValue) {
        match value {
            ConvertedValue::Scalar(text) => self.write_string(text),
            ConvertedValue::RawExpression(payload) => match self.options.raw_expressions {
                RawExpressionMode::Verbatim => self.out.push_str(payload),
                RawExpressionMode::Quoted => self.write_string(payload),
            },
            ConvertedValue::Object(map) => self.write_entries(map.iter(), map.len()),
            ConvertedValue::Array(items) => {
                if items.is_empty() {
                    self.out.push_str("[]");
                    return;
                }
                self.out.push('[');
                self.indent += 1;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.newline();
                    self.write_value(item);
                }
                self.indent -= 1;
                self.newline();
                self.out.push(']');
            }
        }
    }

    fn write_entries<'v>(
        &mut self,
        entries: impl Iterator<Item = (&'v String, &'v ConvertedValue)>,
        len: usize,
    ) {
        if len == 0 {
            self.out.push_str("{}");
            return;
        }
        self.out.push('{');
        self.indent += 1;
        for (i, (key, value)) in entries.enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.newline();
            self.write_string(key);
            self.out.push(':');
            if self.options.pretty {
                self.out.push(' ');
            }
            self.write_value(value);
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    fn write_string(&mut self, text: &str) {
        // Display for Value::String escapes exactly as serde_json::to_string does
        self.out
            .push_str(&serde_json::Value::String(text.to_string()).to_string());
    }

    fn newline(&mut self) {
        if self.options.pretty {
            self.out.push('\n');
            for _ in 0..self.indent {
                self.out.push_str("  ");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn sample() -> Converted {
        let mut inner = IndexMap::new();
        inner.insert(
            "item".to_string(),
            ConvertedValue::Array(vec![
                ConvertedValue::scalar("a \"quoted\"\nline"),
                ConvertedValue::RawExpression("true".to_string()),
            ]),
        );
        inner.insert("empty".to_string(), ConvertedValue::Object(IndexMap::new()));
        Converted::new("root", ConvertedValue::Object(inner))
    }

    #[test]
    fn test_compact_verbatim() {
        assert_eq!(
            to_json_string(&sample(), &EncodeOptions::default()),
            r#"{"root":{"item":["a \"quoted\"\nline",true],"empty":{}}}"#
        );
    }

    #[test]
    fn test_compact_quoted_matches_serde_json() {
        let options = EncodeOptions::default().with_raw_expressions(RawExpressionMode::Quoted);
        let converted = sample();
        assert_eq!(
            to_json_string(&converted, &options),
            serde_json::to_string(&converted).unwrap()
        );
    }

    #[test]
    fn test_pretty_quoted_matches_serde_json() {
        let options = EncodeOptions::pretty().with_raw_expressions(RawExpressionMode::Quoted);
        let converted = sample();
        assert_eq!(
            to_json_string(&converted, &options),
            serde_json::to_string_pretty(&converted).unwrap()
        );
    }

    #[test]
    fn test_pretty_verbatim() {
        let output = to_json_string(&sample(), &EncodeOptions::pretty());
        insta::assert_snapshot!(output, @r#"
        {
          "root": {
            "item": [
              "a \"quoted\"\nline",
              true
            ],
            "empty": {}
          }
        }
        "#);
    }

    #[test]
    fn test_verbatim_payload_is_not_validated() {
        let value = ConvertedValue::RawExpression("function () { return 1; }".to_string());
        assert_eq!(
            value_to_json_string(&value, &EncodeOptions::default()),
            "function () { return 1; }"
        );
    }

    #[test]
    fn test_unicode_is_not_escaped() {
        let value = ConvertedValue::scalar("héllo ✓");
        assert_eq!(
            value_to_json_string(&value, &EncodeOptions::default()),
            "\"héllo ✓\""
        );
    }
}
