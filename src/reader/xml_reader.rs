use std::collections::BTreeMap;

use quick_xml::encoding::Decoder;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::DumpReaderError;
use crate::reader::xml_chars::{find_invalid_char, is_xml_char, is_xml_name};

/// Attribute name to raw string value. Values are entity-unescaped and
/// otherwise kept verbatim.
pub type Attributes = BTreeMap<String, String,>;

#[derive(Debug, Clone, PartialEq, Eq, Default,)]
pub struct Element {
    pub tag:        String,
    pub attributes: Attributes,
    pub children:   Vec<Element,>,
}

impl Element {
    pub fn new(tag: impl Into<String,>,) -> Self {
        Self {
            tag:        tag.into(),
            attributes: Attributes::new(),
            children:   Vec::new(),
        }
    }

    /// Number of elements in this subtree, including `self`.
    pub fn subtree_len(&self,) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(element,) = pending.pop() {
            count += 1;
            pending.extend(element.children.iter(),);
        }
        count
    }
}

// Deeply nested dumps would otherwise overflow the stack through recursive drop glue.
impl Drop for Element {
    fn drop(&mut self,) {
        let mut pending = std::mem::take(&mut self.children,);
        while let Some(mut element,) = pending.pop() {
            pending.append(&mut element.children,);
        }
    }
}

/// Parsed UI dump. `roots` plays the part of a synthetic root: it holds the
/// top-level elements in document order and is itself never reported.
#[derive(Debug, Clone, PartialEq, Eq, Default,)]
pub struct Document {
    pub roots: Vec<Element,>,
}

impl Document {
    pub fn element_count(&self,) -> usize {
        self.roots.iter().map(Element::subtree_len,).sum()
    }

    pub fn is_empty(&self,) -> bool {
        self.roots.is_empty()
    }
}

/// Structural problems the tokenizer lets through on its own.
#[derive(Debug, thiserror::Error,)]
pub enum WellFormednessError {
    #[error("unexpected end of input, <{0}> is never closed")]
    Unclosed(String,),
    #[error("closing tag </{0}> has no matching opening tag")]
    UnmatchedEnd(String,),
    #[error("character data outside of the root element")]
    StrayContent,
    #[error("`{0}` is not a valid XML name")]
    InvalidName(String,),
    #[error("character {0:?} is not allowed in XML")]
    InvalidChar(char,),
    #[error("reference to undefined entity `&{0};`")]
    UndefinedEntity(String,),
    #[error("`]]>` is not allowed in character data")]
    CdataEndInText,
    #[error("the XML declaration is only allowed at the very start of the document")]
    MisplacedDeclaration,
    #[error("DOCTYPE must come before the root element")]
    MisplacedDoctype,
    #[error("attributes of <{0}> must be separated by whitespace")]
    MissingAttributeSeparator(String,),
    #[error("`<` is not allowed in attribute values of <{0}>")]
    LessThanInAttribute(String,),
}

impl From<WellFormednessError,> for DumpReaderError {
    fn from(err: WellFormednessError,) -> Self {
        DumpReaderError::malformed(err,)
    }
}

/// Parses `text` into an ordered element tree.
///
/// Any well-formedness violation yields [`DumpReaderError::MalformedDocument`];
/// no partial tree is ever returned. Comments, processing instructions, the
/// XML declaration and DOCTYPE are skipped, as is character data inside
/// elements (which is still checked).
pub fn parse_document(text: &str,) -> Result<Document, DumpReaderError,> {
    let mut reader = Reader::from_str(text,);
    let config = reader.config_mut();
    config.trim_text(true,);
    config.check_comments = true;
    let decoder = reader.decoder();

    let mut document = Document::default();
    let mut open: Vec<Element,> = Vec::new();
    let mut at_start = true;

    loop {
        let event = reader.read_event().map_err(DumpReaderError::malformed,)?;
        let first_event = std::mem::replace(&mut at_start, false,);

        match event {
            Event::Eof => break,
            Event::Start(start,) => {
                open.push(read_element(&start, decoder,)?,);
            },
            Event::Empty(start,) => {
                let element = read_element(&start, decoder,)?;
                attach(&mut document, &mut open, element,);
            },
            Event::End(end,) => {
                let Some(element,) = open.pop() else {
                    let name = String::from_utf8_lossy(end.name().as_ref(),).into_owned();
                    return Err(WellFormednessError::UnmatchedEnd(name,).into(),);
                };
                attach(&mut document, &mut open, element,);
            },
            Event::Text(content,) => {
                let content = content.decode().map_err(DumpReaderError::malformed,)?;
                if open.is_empty() && content.bytes().any(|b| !is_xml_whitespace(b,),) {
                    return Err(WellFormednessError::StrayContent.into(),);
                }
                check_char_data(&content,)?;
                if content.contains("]]>",) {
                    return Err(WellFormednessError::CdataEndInText.into(),);
                }
            },
            Event::CData(data,) => {
                if open.is_empty() {
                    return Err(WellFormednessError::StrayContent.into(),);
                }
                check_char_data(&data.decode().map_err(DumpReaderError::malformed,)?,)?;
            },
            Event::GeneralRef(reference,) => {
                if open.is_empty() {
                    return Err(WellFormednessError::StrayContent.into(),);
                }
                check_reference(&reference,)?;
            },
            Event::Comment(comment,) => {
                check_char_data(&comment.decode().map_err(DumpReaderError::malformed,)?,)?;
            },
            Event::Decl(decl,) => {
                if !first_event || !text.trim_start_matches('\u{FEFF}',).starts_with("<?xml",) {
                    return Err(WellFormednessError::MisplacedDeclaration.into(),);
                }
                decl.version().map_err(DumpReaderError::malformed,)?;
            },
            Event::DocType(_,) => {
                if !open.is_empty() || !document.is_empty() {
                    return Err(WellFormednessError::MisplacedDoctype.into(),);
                }
            },
            Event::PI(_,) => {},
        }
    }

    if let Some(mut unclosed,) = open.pop() {
        return Err(WellFormednessError::Unclosed(std::mem::take(&mut unclosed.tag,),).into(),);
    }

    Ok(document,)
}

fn attach(document: &mut Document, open: &mut [Element], element: Element,) {
    match open.last_mut() {
        Some(parent,) => parent.children.push(element,),
        None => document.roots.push(element,),
    }
}

fn read_element(start: &BytesStart<'_,>, decoder: Decoder,) -> Result<Element, DumpReaderError,> {
    let tag = decoder
        .decode(start.name().as_ref(),)
        .map_err(DumpReaderError::malformed,)?
        .into_owned();
    if !is_xml_name(&tag,) {
        return Err(WellFormednessError::InvalidName(tag,).into(),);
    }
    check_attribute_syntax(&tag, start.attributes_raw(),)?;

    let mut attributes = Attributes::new();
    // Duplicate keys are rejected by the attribute iterator's checks.
    for attr_result in start.attributes() {
        let attr = attr_result.map_err(DumpReaderError::malformed,)?;
        let key = decoder
            .decode(attr.key.as_ref(),)
            .map_err(DumpReaderError::malformed,)?
            .into_owned();
        if !is_xml_name(&key,) {
            return Err(WellFormednessError::InvalidName(key,).into(),);
        }
        let value = attr
            .decode_and_unescape_value(decoder,)
            .map_err(DumpReaderError::malformed,)?;
        check_char_data(&value,)?;
        attributes.insert(key, value.into_owned(),);
    }

    Ok(Element {
        tag,
        attributes,
        children: Vec::new(),
    },)
}

/// Checks the raw text after the tag name: every quoted value is followed by
/// whitespace or the end of the tag, and no value contains a literal `<`.
fn check_attribute_syntax(tag: &str, raw: &[u8],) -> Result<(), WellFormednessError,> {
    let mut quote: Option<u8,> = None;
    for (i, &b,) in raw.iter().enumerate() {
        match quote {
            Some(q,) if b == q => {
                quote = None;
                if raw.get(i + 1,).is_some_and(|next| !is_xml_whitespace(*next,),) {
                    return Err(WellFormednessError::MissingAttributeSeparator(tag.to_string(),),);
                }
            },
            Some(_,) if b == b'<' => {
                return Err(WellFormednessError::LessThanInAttribute(tag.to_string(),),);
            },
            Some(_,) => {},
            None if b == b'"' || b == b'\'' => quote = Some(b,),
            None => {},
        }
    }
    Ok((),)
}

fn check_char_data(text: &str,) -> Result<(), WellFormednessError,> {
    match find_invalid_char(text,) {
        Some(c,) => Err(WellFormednessError::InvalidChar(c,),),
        None => Ok((),),
    }
}

/// Only the five predefined entities and character references to legal
/// characters are accepted; there is no DTD to declare others.
fn check_reference(reference: &BytesRef<'_,>,) -> Result<(), DumpReaderError,> {
    if let Some(c,) = reference.resolve_char_ref().map_err(DumpReaderError::malformed,)? {
        if !is_xml_char(c,) {
            return Err(WellFormednessError::InvalidChar(c,).into(),);
        }
        return Ok((),);
    }
    let name = reference.decode().map_err(DumpReaderError::malformed,)?;
    if resolve_xml_entity(&name,).is_none() {
        return Err(WellFormednessError::UndefinedEntity(name.into_owned(),).into(),);
    }
    Ok((),)
}

fn is_xml_whitespace(b: u8,) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}
