//! XML parser that builds [`XmlDocument`] trees.

use crate::{Error, Result, Span, XmlAttribute, XmlChild, XmlChildren, XmlDocument, XmlElement};
use quick_xml::Reader;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};

/// Parse and security-scan XML from a string.
///
/// # Example
///
/// ```rust
/// use xml2json_xml::parse;
///
/// let xml = parse("<root><child/></root>").unwrap();
/// assert_eq!(xml.root.name, "root");
/// ```
///
/// # Errors
///
/// Returns an error if the XML is malformed, has no single root element, or
/// declares entities in its DOCTYPE.
pub fn parse(content: &str) -> Result<XmlDocument> {
    let mut parser = XmlParser::new(content);
    parser.parse()
}

/// Internal parser state.
struct XmlParser<'a> {
    /// The source content being parsed.
    source: &'a str,

    /// The quick-xml reader.
    reader: Reader<&'a [u8]>,

    /// Stack of open elements. Keeps parsing iterative so nesting depth is
    /// bounded by memory, not by the call stack.
    stack: Vec<BuildNode>,
}

/// A node being constructed during parsing.
struct BuildNode {
    name: String,
    name_span: Span,
    prefix: Option<String>,
    attributes: Vec<XmlAttribute>,

    /// Byte offset where this element started (the `<` character).
    start_offset: usize,

    /// Child elements and text accumulated so far.
    children: Vec<XmlChild>,
}

impl<'a> XmlParser<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            source,
            reader,
            stack: Vec::new(),
        }
    }

    fn parse(&mut self) -> Result<XmlDocument> {
        let mut root: Option<XmlElement> = None;

        loop {
            // Capture position before reading the event
            let event_start = self.reader.buffer_position() as usize;

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    self.handle_start(e, event_start)?;
                }
                Ok(Event::End(e)) => {
                    let element = self.handle_end(e)?;
                    self.attach(element, &mut root)?;
                }
                Ok(Event::Empty(e)) => {
                    let element = self.handle_empty(e, event_start)?;
                    self.attach(element, &mut root)?;
                }
                Ok(Event::Text(e)) => {
                    self.handle_text(e, event_start)?;
                }
                Ok(Event::CData(e)) => {
                    self.handle_cdata(e, event_start)?;
                }
                Ok(Event::DocType(e)) => {
                    self.scan_doctype(&e, event_start)?;
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlSyntax {
                        message: e.to_string(),
                        position: Some(self.reader.error_position()),
                    });
                }
            }
        }

        if let Some(node) = self.stack.last() {
            return Err(Error::UnexpectedEof {
                expected: format!("closing tag </{}>", node.name),
                offset: node.start_offset,
            });
        }

        let root = root.ok_or(Error::EmptyDocument)?;
        Ok(XmlDocument::new(root, Span::new(0, self.source.len())))
    }

    /// Push a finished element onto its parent, or make it the root.
    fn attach(&mut self, element: XmlElement, root: &mut Option<XmlElement>) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(XmlChild::Element(element));
                Ok(())
            }
            None if root.is_some() => Err(Error::MultipleRoots {
                offset: element.span.start,
            }),
            None => {
                *root = Some(element);
                Ok(())
            }
        }
    }

    /// Reject DOCTYPEs that declare entities.
    ///
    /// quick-xml never expands custom entities, but a document that declares
    /// them is refused outright so that no downstream consumer ever sees it.
    fn scan_doctype(&self, e: &BytesText<'_>, event_start: usize) -> Result<()> {
        let doctype = String::from_utf8_lossy(e);
        if doctype.contains("<!ENTITY") {
            tracing::debug!(offset = event_start, "rejecting DOCTYPE with entity declarations");
            return Err(Error::UnsafeDoctype {
                offset: event_start,
            });
        }
        Ok(())
    }

    fn handle_start(&mut self, e: BytesStart<'_>, event_start: usize) -> Result<()> {
        let (name, prefix) = split_qname(e.name().as_ref());
        let name_start = event_start + 1; // Skip '<'
        let name_span = Span::new(name_start, name_start + e.name().as_ref().len());
        let attributes = self.parse_attributes(&e, event_start)?;

        self.stack.push(BuildNode {
            name,
            name_span,
            prefix,
            attributes,
            start_offset: event_start,
            children: Vec::new(),
        });

        Ok(())
    }

    fn handle_end(&mut self, e: BytesEnd<'_>) -> Result<XmlElement> {
        let end_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let end_local_name = end_name.split(':').next_back().unwrap_or(&end_name);
        let end_offset = self.reader.buffer_position() as usize;

        let node = self.stack.pop().ok_or_else(|| Error::InvalidStructure {
            message: format!("Unexpected closing tag </{}>", end_name),
            offset: end_offset,
        })?;

        if node.name != end_local_name {
            return Err(Error::MismatchedEndTag {
                expected: node.name,
                found: end_local_name.to_string(),
                offset: node.start_offset,
            });
        }

        Ok(XmlElement {
            name: node.name,
            name_span: node.name_span,
            prefix: node.prefix,
            attributes: node.attributes,
            children: finalize_children(node.children),
            span: Span::new(node.start_offset, end_offset),
        })
    }

    fn handle_empty(&mut self, e: BytesStart<'_>, event_start: usize) -> Result<XmlElement> {
        let (name, prefix) = split_qname(e.name().as_ref());
        let name_start = event_start + 1;
        let name_span = Span::new(name_start, name_start + e.name().as_ref().len());
        let attributes = self.parse_attributes(&e, event_start)?;
        let end_offset = self.reader.buffer_position() as usize;

        Ok(XmlElement {
            name,
            name_span,
            prefix,
            attributes,
            children: XmlChildren::Empty,
            span: Span::new(event_start, end_offset),
        })
    }

    fn handle_text(&mut self, e: BytesText<'_>, event_start: usize) -> Result<()> {
        let text = e.unescape().map_err(|err| Error::XmlSyntax {
            message: format!("Invalid text content: {}", err),
            position: Some(event_start as u64),
        })?;

        let span = Span::new(event_start, self.reader.buffer_position() as usize);

        match self.stack.last_mut() {
            Some(node) => {
                node.children.push(XmlChild::Text {
                    content: text.into_owned(),
                    span,
                });
                Ok(())
            }
            // Only whitespace (and a byte order mark) may surround the root
            None if text
                .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
                .is_empty() =>
            {
                Ok(())
            }
            None => Err(Error::InvalidStructure {
                message: "Text content outside the root element".to_string(),
                offset: event_start,
            }),
        }
    }

    fn handle_cdata(&mut self, e: BytesCData<'_>, event_start: usize) -> Result<()> {
        let text = String::from_utf8_lossy(e.as_ref()).to_string();
        let span = Span::new(event_start, self.reader.buffer_position() as usize);

        let node = self.stack.last_mut().ok_or_else(|| Error::InvalidStructure {
            message: "CDATA section outside the root element".to_string(),
            offset: event_start,
        })?;
        node.children.push(XmlChild::Text {
            content: text,
            span,
        });
        Ok(())
    }

    fn parse_attributes(&self, e: &BytesStart<'_>, tag_start: usize) -> Result<Vec<XmlAttribute>> {
        let mut attributes = Vec::new();

        for attr_result in e.attributes() {
            let attr = attr_result?;
            let (name, prefix) = split_qname(attr.key.as_ref());

            let value = attr.unescape_value().map_err(|err| Error::XmlSyntax {
                message: format!("Invalid attribute value: {}", err),
                position: Some(tag_start as u64),
            })?;

            attributes.push(XmlAttribute {
                name,
                prefix,
                value: value.into_owned(),
            });
        }

        Ok(attributes)
    }
}

/// Split a qualified name into its local part and optional prefix.
fn split_qname(raw: &[u8]) -> (String, Option<String>) {
    let full_name = String::from_utf8_lossy(raw);

    match full_name.split_once(':') {
        Some((prefix, local_name)) => (local_name.to_string(), Some(prefix.to_string())),
        None => (full_name.into_owned(), None),
    }
}

fn finalize_children(children: Vec<XmlChild>) -> XmlChildren {
    let has_elements = children.iter().any(|c| matches!(c, XmlChild::Element(_)));
    let has_real_text = children.iter().any(|c| match c {
        XmlChild::Text { content, .. } => !content.trim().is_empty(),
        XmlChild::Element(_) => false,
    });

    // Indentation between child elements is not content, but once an element
    // carries real text every run is kept so "a<b/> <c/>z" reads "a z"
    let mut children: Vec<XmlChild> = if has_elements && !has_real_text {
        children
            .into_iter()
            .filter(|c| match c {
                XmlChild::Text { content, .. } => !content.trim().is_empty(),
                XmlChild::Element(_) => true,
            })
            .collect()
    } else {
        children
    };

    if children.is_empty() {
        return XmlChildren::Empty;
    }

    if has_elements {
        let all_elements = children.iter().all(|c| matches!(c, XmlChild::Element(_)));
        if !all_elements {
            return XmlChildren::Mixed(children);
        }
        let elements = children
            .into_iter()
            .filter_map(|c| match c {
                XmlChild::Element(e) => Some(e),
                XmlChild::Text { .. } => None,
            })
            .collect();
        return XmlChildren::Elements(elements);
    }

    // Only text remains. Adjacent text and CDATA runs are merged.
    if children.len() == 1 {
        if let Some(XmlChild::Text { content, span }) = children.pop() {
            return XmlChildren::Text { content, span };
        }
        return XmlChildren::Empty;
    }

    let start = children.first().map_or(0, child_start);
    let end = children.last().map_or(0, child_end);
    let content = children
        .into_iter()
        .filter_map(|c| match c {
            XmlChild::Text { content, .. } => Some(content),
            XmlChild::Element(_) => None,
        })
        .collect();

    XmlChildren::Text {
        content,
        span: Span::new(start, end),
    }
}

fn child_start(child: &XmlChild) -> usize {
    match child {
        XmlChild::Element(e) => e.span.start,
        XmlChild::Text { span, .. } => span.start,
    }
}

fn child_end(child: &XmlChild) -> usize {
    match child {
        XmlChild::Element(e) => e.span.end,
        XmlChild::Text { span, .. } => span.end,
    }
}
