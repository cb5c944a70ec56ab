//! Error types for XML parsing with byte offsets.

use thiserror::Error;

/// Result type alias for xml2json-xml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or scanning an XML document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// XML syntax error from quick-xml.
    #[error("XML syntax error: {message}{}", .position.map(|p| format!(" at byte {}", p)).unwrap_or_default())]
    XmlSyntax {
        message: String,
        /// Byte offset where the error occurred.
        position: Option<u64>,
    },

    /// Unexpected end of input.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What was expected when EOF was encountered.
        expected: String,
        /// Offset of the start tag that was never closed.
        offset: usize,
    },

    /// Mismatched end tag.
    #[error("mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag {
        expected: String,
        found: String,
        offset: usize,
    },

    /// Invalid XML structure.
    #[error("invalid XML structure: {message}")]
    InvalidStructure { message: String, offset: usize },

    /// Empty document (no root element).
    #[error("empty XML document: no root element found")]
    EmptyDocument,

    /// Multiple root elements.
    #[error("invalid XML: multiple root elements")]
    MultipleRoots { offset: usize },

    /// DOCTYPE carrying entity declarations, rejected to rule out entity
    /// expansion and external entity resolution.
    #[error("unsafe DOCTYPE at byte {offset}: entity declarations are not allowed")]
    UnsafeDoctype { offset: usize },
}

impl Error {
    /// Byte offset of the problem, when one is known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::XmlSyntax { position, .. } => position.map(|p| p as usize),
            Error::UnexpectedEof { offset, .. }
            | Error::MismatchedEndTag { offset, .. }
            | Error::InvalidStructure { offset, .. }
            | Error::MultipleRoots { offset }
            | Error::UnsafeDoctype { offset } => Some(*offset),
            Error::EmptyDocument => None,
        }
    }

    /// True for failures raised by the security scan rather than the syntax check.
    pub fn is_security_rejection(&self) -> bool {
        matches!(self, Error::UnsafeDoctype { .. })
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlSyntax {
            message: err.to_string(),
            position: None,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlSyntax {
            message: format!("Attribute error: {}", err),
            position: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display_with_position() {
        let err = Error::XmlSyntax {
            message: "bad".to_string(),
            position: Some(12),
        };
        assert_eq!(err.to_string(), "XML syntax error: bad at byte 12");
        assert_eq!(err.offset(), Some(12));
    }

    #[test]
    fn test_syntax_error_display_without_position() {
        let err = Error::XmlSyntax {
            message: "bad".to_string(),
            position: None,
        };
        assert_eq!(err.to_string(), "XML syntax error: bad");
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn test_mismatched_end_tag_display() {
        let err = Error::MismatchedEndTag {
            expected: "root".to_string(),
            found: "other".to_string(),
            offset: 0,
        };
        assert_eq!(
            err.to_string(),
            "mismatched end tag: expected </root>, found </other>"
        );
    }

    #[test]
    fn test_security_rejection() {
        assert!(Error::UnsafeDoctype { offset: 0 }.is_security_rejection());
        assert!(!Error::EmptyDocument.is_security_rejection());
        assert_eq!(Error::EmptyDocument.offset(), None);
    }
}
