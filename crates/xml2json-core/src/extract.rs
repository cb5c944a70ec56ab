//! Scalar extraction for element text and attribute values.
//!
//! Text is normally trimmed and kept as a string. Text written as
//! `new Laminas\Json\Expr("<payload>")` (or with underscores,
//! `new Laminas_Json_Expr('<payload>')`) is an escape: the payload is passed
//! through untouched as a [`ConvertedValue::RawExpression`] so the encoder can
//! emit it without quotes. It is literal text substitution only.

use crate::value::ConvertedValue;
use once_cell::sync::Lazy;
use regex::Regex;
use xml2json_xml::{XmlAttribute, XmlElement};

static EXPRESSION_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*new Laminas[_\\]Json[_\\]Expr\s*\(\s*["'](.*)["']\s*\)\s*$"#)
        .expect("expression escape pattern must compile")
});

/// Convert a piece of text into a scalar or raw expression.
pub fn extract_value(text: &str) -> ConvertedValue {
    match EXPRESSION_ESCAPE.captures(text) {
        Some(captures) => {
            let payload = captures.get(1).map_or("", |m| m.as_str());
            ConvertedValue::RawExpression(payload.to_string())
        }
        None => ConvertedValue::Scalar(text.trim().to_string()),
    }
}

/// Whether `text` is an expression escape.
pub fn is_raw_expression(text: &str) -> bool {
    EXPRESSION_ESCAPE.is_match(text)
}

/// The value of an element's own text, ignoring text inside child elements.
pub fn element_value(element: &XmlElement) -> ConvertedValue {
    extract_value(&element.direct_text())
}

pub fn attribute_value(attribute: &XmlAttribute) -> ConvertedValue {
    extract_value(&attribute.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(payload: &str) -> ConvertedValue {
        ConvertedValue::RawExpression(payload.to_string())
    }

    #[test]
    fn test_plain_text_is_trimmed() {
        assert_eq!(extract_value("  hello world \n"), ConvertedValue::scalar("hello world"));
        assert_eq!(extract_value(""), ConvertedValue::scalar(""));
        assert_eq!(extract_value(" \t "), ConvertedValue::scalar(""));
    }

    #[test]
    fn test_internal_whitespace_is_kept() {
        assert_eq!(extract_value(" a  b\tc "), ConvertedValue::scalar("a  b\tc"));
    }

    #[test]
    fn test_backslash_namespace_escape() {
        assert_eq!(extract_value(r#"new Laminas\Json\Expr("true")"#), raw("true"));
    }

    #[test]
    fn test_underscore_namespace_escape() {
        assert_eq!(extract_value("new Laminas_Json_Expr('42')"), raw("42"));
    }

    #[test]
    fn test_escape_allows_surrounding_whitespace() {
        assert_eq!(
            extract_value("\n   new Laminas\\Json\\Expr ( \"myCallback\" )  \n"),
            raw("myCallback")
        );
    }

    #[test]
    fn test_payload_is_verbatim() {
        assert_eq!(
            extract_value(r#"new Laminas\Json\Expr("function() { return \"x\"; }")"#),
            raw(r#"function() { return \"x\"; }"#)
        );
        assert_eq!(extract_value(r#"new Laminas\Json\Expr(" spaced ")"#), raw(" spaced "));
    }

    #[test]
    fn test_mixed_quotes_are_accepted() {
        assert_eq!(extract_value(r#"new Laminas\Json\Expr("null')"#), raw("null"));
    }

    #[test]
    fn test_near_misses_stay_scalar() {
        for text in [
            "new Laminas.Json.Expr('x')",
            "new Laminas\\Json\\Expr(x)",
            "new Laminas\\Json\\Expr('x') trailing",
            "prefix new Laminas\\Json\\Expr('x')",
            "new Zend\\Json\\Expr('x')",
        ] {
            assert!(!is_raw_expression(text), "{text}");
            assert_eq!(extract_value(text), ConvertedValue::scalar(text.trim()));
        }
    }

    #[test]
    fn test_payload_cannot_span_lines() {
        let text = "new Laminas\\Json\\Expr('a\nb')";
        assert!(!is_raw_expression(text));
    }

    #[test]
    fn test_element_value_uses_direct_text() {
        let element = XmlElement::with_text("flag", vec![], "  new Laminas_Json_Expr(\"false\") ");
        assert_eq!(element_value(&element), raw("false"));

        let attribute = XmlAttribute::new("n", "  7 ");
        assert_eq!(attribute_value(&attribute), ConvertedValue::scalar("7"));
    }
}
