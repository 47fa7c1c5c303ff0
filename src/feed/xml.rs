//! Minimal XML element tree
//!
//! Feeds are small enough to hold in memory, and the field mapping needs
//! random access to children and attributes, so the `quick-xml` event stream
//! is folded into a tree of [`XmlElement`]s before anything is interpreted.
//!
//! Input is raw bytes: the character set comes from the document's own
//! `<?xml encoding="..."?>` declaration (or BOM), UTF-8 otherwise.

use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A single parsed element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Tag name, including any namespace prefix
    pub name: String,

    /// Attributes in document order (unescaped)
    pub attributes: Vec<(String, String)>,

    /// Concatenated, trimmed text content; `None` when the element has none
    pub text: Option<String>,

    /// Child elements in document order
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// First child with the given tag name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first child with the given tag name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.text.as_deref())
    }

    /// Value of the named attribute
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child element, regardless of name
    pub fn first_child(&self) -> Option<&XmlElement> {
        self.children.first()
    }

    fn from_start(start: &BytesStart<'_>, decoder: Decoder) -> Result<Self, XmlError> {
        let name = decode(decoder, start.name().as_ref())?;
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = decode(decoder, attr.key.as_ref())?;
            let value = decode_escaped(decoder, &attr.value)?;
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            text: None,
            children: Vec::new(),
        })
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }
}

/// Ways a document can fail to become a tree
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error(transparent)]
    Syntax(#[from] quick_xml::Error),

    #[error("document has no root element")]
    NoRoot,

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("content after the root element")]
    TrailingContent,

    #[error("undecodable text: {0}")]
    Encoding(String),
}

/// Parses a complete document and returns its root element
pub fn parse_document<B: AsRef<[u8]> + ?Sized>(body: &B) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_reader(body.as_ref());
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event()?;
        // Updated once the declaration has been read
        let decoder = reader.decoder();

        match event {
            Event::Start(e) => {
                if root.is_some() {
                    return Err(XmlError::TrailingContent);
                }
                stack.push(XmlElement::from_start(&e, decoder)?);
            }
            Event::Empty(e) => {
                let element = XmlElement::from_start(&e, decoder)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                // quick-xml checks end names, so the top of the stack is the match
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element)?;
                }
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    let text = decode_escaped(decoder, &t)?;
                    top.push_text(&text);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    let text = decode(decoder, &c)?;
                    top.push_text(text.trim());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }

    root.ok_or(XmlError::NoRoot)
}

fn decode(decoder: Decoder, raw: &[u8]) -> Result<String, XmlError> {
    decoder
        .decode(raw)
        .map(|text| text.into_owned())
        .map_err(|e| XmlError::Encoding(e.to_string()))
}

fn decode_escaped(decoder: Decoder, raw: &[u8]) -> Result<String, XmlError> {
    let text = decode(decoder, raw)?;
    unescape(&text)
        .map(|text| text.into_owned())
        .map_err(|e| XmlError::Encoding(e.to_string()))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(XmlError::TrailingContent),
    }
    Ok(())
}
