//! Core types for offset-tracked XML trees.

/// A half-open byte range `[start, end)` into the parsed source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A parsed XML document.
///
/// This is the top-level result of [`crate::parse`]. Comments, processing
/// instructions, the XML declaration and entity-free DOCTYPEs are dropped.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    /// The root element of the document.
    pub root: XmlElement,

    /// Span of the entire document.
    pub span: Span,
}

/// An XML element.
#[derive(Debug, Clone)]
pub struct XmlElement {
    /// The local name of the element (without namespace prefix).
    pub name: String,

    /// Span of the qualified element name in the start tag.
    pub name_span: Span,

    /// Namespace prefix, if any (e.g., "dc" in `<dc:title>`).
    pub prefix: Option<String>,

    /// Attributes of this element, in document order.
    pub attributes: Vec<XmlAttribute>,

    /// Child content of this element.
    pub children: XmlChildren,

    /// Span of the entire element, from the start tag to the end tag.
    pub span: Span,
}

/// An XML attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// The local name of the attribute (without namespace prefix).
    pub name: String,

    /// Namespace prefix, if any.
    pub prefix: Option<String>,

    /// The attribute value (after unescaping XML entities).
    pub value: String,
}

/// Children of an XML element.
///
/// Whitespace-only text between child elements is dropped while parsing when
/// the element has no other text, so `Mixed` only appears for real
/// interleaved text. Inside real mixed content every text run is kept.
#[derive(Debug, Clone)]
pub enum XmlChildren {
    /// Element contains only child elements.
    Elements(Vec<XmlElement>),

    /// Element contains only text content.
    Text {
        /// The text content (after unescaping XML entities).
        content: String,
        span: Span,
    },

    /// Element contains mixed content (text and elements).
    Mixed(Vec<XmlChild>),

    /// Element is empty (no content).
    Empty,
}

/// A single child in mixed content.
#[derive(Debug, Clone)]
pub enum XmlChild {
    /// A child element.
    Element(XmlElement),

    /// Text or CDATA content.
    Text { content: String, span: Span },
}

impl XmlDocument {
    pub fn new(root: XmlElement, span: Span) -> Self {
        Self { root, span }
    }
}

impl XmlElement {
    /// Create a new empty element.
    pub fn new(name: impl Into<String>, attributes: Vec<XmlAttribute>) -> Self {
        Self {
            name: name.into(),
            name_span: Span::default(),
            prefix: None,
            attributes,
            children: XmlChildren::Empty,
            span: Span::default(),
        }
    }

    /// Create an element with child elements.
    pub fn with_elements(
        name: impl Into<String>,
        attributes: Vec<XmlAttribute>,
        children: Vec<XmlElement>,
    ) -> Self {
        let mut element = Self::new(name, attributes);
        element.children = XmlChildren::Elements(children);
        element
    }

    /// Create an element with text content.
    pub fn with_text(
        name: impl Into<String>,
        attributes: Vec<XmlAttribute>,
        text: impl Into<String>,
    ) -> Self {
        let mut element = Self::new(name, attributes);
        element.children = XmlChildren::Text {
            content: text.into(),
            span: Span::default(),
        };
        element
    }

    /// Create an element with mixed content.
    pub fn with_mixed(
        name: impl Into<String>,
        attributes: Vec<XmlAttribute>,
        children: Vec<XmlChild>,
    ) -> Self {
        let mut element = Self::new(name, attributes);
        element.children = XmlChildren::Mixed(children);
        element
    }

    /// Get an attribute value by name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Check if this element has at least one child element.
    pub fn has_child_elements(&self) -> bool {
        match &self.children {
            XmlChildren::Elements(elements) => !elements.is_empty(),
            XmlChildren::Mixed(children) => {
                children.iter().any(|c| matches!(c, XmlChild::Element(_)))
            }
            _ => false,
        }
    }

    /// Check if this element is empty.
    pub fn is_empty(&self) -> bool {
        matches!(&self.children, XmlChildren::Empty)
    }

    /// Get text content, if this element contains only text.
    pub fn text(&self) -> Option<&str> {
        match &self.children {
            XmlChildren::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// The concatenation of this element's own text nodes.
    ///
    /// Text inside child elements is not included. `<a>x<b>y</b>z</a>`
    /// yields `"xz"`.
    pub fn direct_text(&self) -> String {
        match &self.children {
            XmlChildren::Text { content, .. } => content.clone(),
            XmlChildren::Mixed(children) => children
                .iter()
                .filter_map(|c| match c {
                    XmlChild::Text { content, .. } => Some(content.as_str()),
                    XmlChild::Element(_) => None,
                })
                .collect(),
            XmlChildren::Elements(_) | XmlChildren::Empty => String::new(),
        }
    }

    /// Get child elements by name.
    pub fn get_children(&self, name: &str) -> Vec<&XmlElement> {
        self.all_children()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }

    /// Get all child elements (ignoring text in mixed content).
    pub fn all_children(&self) -> Vec<&XmlElement> {
        match &self.children {
            XmlChildren::Elements(elements) => elements.iter().collect(),
            XmlChildren::Mixed(children) => children
                .iter()
                .filter_map(|c| match c {
                    XmlChild::Element(e) => Some(e),
                    XmlChild::Text { .. } => None,
                })
                .collect(),
            _ => vec![],
        }
    }
}

/// Tears the tree down with a worklist instead of the derived recursive drop,
/// so arbitrarily deep documents can be freed without exhausting the stack.
impl Drop for XmlElement {
    fn drop(&mut self) {
        let mut pending = take_child_elements(&mut self.children);
        while let Some(mut element) = pending.pop() {
            pending.extend(take_child_elements(&mut element.children));
        }
    }
}

fn take_child_elements(children: &mut XmlChildren) -> Vec<XmlElement> {
    match std::mem::replace(children, XmlChildren::Empty) {
        XmlChildren::Elements(elements) => elements,
        XmlChildren::Mixed(children) => children
            .into_iter()
            .filter_map(|c| match c {
                XmlChild::Element(e) => Some(e),
                XmlChild::Text { .. } => None,
            })
            .collect(),
        XmlChildren::Text { .. } | XmlChildren::Empty => Vec::new(),
    }
}

impl XmlAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            value: value.into(),
        }
    }
}
