//! Error types for XML to JSON conversion.

use thiserror::Error;

/// Failures raised while walking an element tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The element tree nests deeper than [`crate::ConvertOptions::max_depth`].
    #[error(
        "conversion exceeded the allowed recursion depth of {max_depth} at <{element}> (byte {offset})"
    )]
    RecursionLimitExceeded {
        max_depth: usize,
        /// Name of the first element found beyond the limit.
        element: String,
        /// Byte offset of that element in the source.
        offset: usize,
    },
}

/// Errors returned by the string-in, string-out entry points.
#[derive(Debug, Error)]
pub enum Xml2JsonError {
    /// The input failed XML parsing or the security scan. Nothing was converted.
    #[error("invalid XML input: {0}")]
    InvalidInput(#[from] xml2json_xml::Error),

    #[error(transparent)]
    Conversion(#[from] ConvertError),
}

impl Xml2JsonError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Xml2JsonError::InvalidInput(_))
    }

    pub fn is_recursion_limit(&self) -> bool {
        matches!(
            self,
            Xml2JsonError::Conversion(ConvertError::RecursionLimitExceeded { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recursion_limit_display() {
        let err = ConvertError::RecursionLimitExceeded {
            max_depth: 25,
            element: "deep".to_string(),
            offset: 104,
        };
        assert_eq!(
            err.to_string(),
            "conversion exceeded the allowed recursion depth of 25 at <deep> (byte 104)"
        );

        let wrapped = Xml2JsonError::from(err.clone());
        assert_eq!(wrapped.to_string(), err.to_string());
        assert!(wrapped.is_recursion_limit());
        assert!(!wrapped.is_invalid_input());
    }

    #[test]
    fn test_invalid_input_display() {
        let err = Xml2JsonError::from(xml2json_xml::Error::EmptyDocument);
        assert_eq!(
            err.to_string(),
            "invalid XML input: empty XML document: no root element found"
        );
        assert!(err.is_invalid_input());
    }
}
