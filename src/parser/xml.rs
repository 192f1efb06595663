//! @dose
//! purpose: C# XML documentation comments (`<summary>`, `<remarks>`, `<param name>`,
//!     `<typeparam name>`, `<returns>`, `<exception cref>`, `<deprecated version>`). Other
//!     top-level elements become generic records with their attributes as `key=value` args.
//!
//! when-editing:
//!     - !Element content is sliced from the source, so inner markup (`<see cref="x"/>`,
//!       `<c>`, entities) is kept verbatim; never rebuild it from events
//!     - The input is wrapped in a synthetic root, so reader positions are offset by its length
//!
//! invariants:
//!     - Text with no elements at all is plain description
//!     - Any reader error or unclosed element is ParseError::Xml
//!
//! gotchas:
//!     - Attribute values are kept raw (not unescaped) so composing writes them back unchanged

use super::common::{apply_description, extract_default, line_offsets};
use super::{DocstringParser, ParseError};
use crate::text::{clean_doc, dedent};
use crate::types::{
    Docstring, DocstringDeprecated, DocstringMeta, DocstringParam, DocstringRaises,
    DocstringReturns, DocstringStyle, MetaRecord,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const ROOT_OPEN: &str = "<doc>";
const ROOT_CLOSE: &str = "</doc>";

/// A top-level element: its name, raw attributes and raw inner content.
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    content: String,
}

impl Element {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub struct XmlParser;

impl XmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for XmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocstringParser for XmlParser {
    fn style(&self) -> DocstringStyle {
        DocstringStyle::Xml
    }

    fn parse(&self, text: &str) -> Result<Docstring, ParseError> {
        let mut doc = Docstring::new(DocstringStyle::Xml);
        let text = clean_doc(text);
        if text.is_empty() {
            return Ok(doc);
        }

        let (elements, stray) = read_elements(&text)?;

        let mut summary: Option<String> = None;
        let mut remarks: Vec<String> = Vec::new();
        for element in elements {
            match element.name.as_str() {
                "summary" => {
                    let content = dedent(&element.content);
                    summary = Some(match summary {
                        Some(existing) => format!("{}\n\n{}", existing, content),
                        None => content,
                    });
                }
                "remarks" => remarks.push(dedent(&element.content)),
                _ => doc.meta.push(build_meta(element, &text)?),
            }
        }

        let stray = dedent(&stray);
        let description = match summary {
            Some(summary) if stray.is_empty() => summary,
            Some(summary) => format!("{}\n\n{}", summary, stray),
            None => stray,
        };
        apply_description(&mut doc, &description);
        let remarks: Vec<String> = remarks.into_iter().filter(|r| !r.is_empty()).collect();
        if !remarks.is_empty() {
            let remarks = remarks.join("\n\n");
            doc.long_description = Some(match doc.long_description.take() {
                Some(long) => format!("{}\n\n{}", long, remarks),
                None => remarks,
            });
            doc.blank_after_short_description = doc.short_description.is_some();
        }

        Ok(doc)
    }
}

/// Read the top-level elements of `text` and the text found between them.
fn read_elements(text: &str) -> Result<(Vec<Element>, String), ParseError> {
    let wrapped = format!("{}{}{}", ROOT_OPEN, text, ROOT_CLOSE);
    let mut reader = Reader::from_str(&wrapped);

    let mut elements = Vec::new();
    let mut stray = String::new();
    let mut depth = 0usize;
    let mut open: Option<(String, Vec<(String, String)>, usize)> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| xml_error(e.to_string(), text, before))?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(start) => {
                depth += 1;
                if depth == 2 {
                    let (name, attributes) = element_head(&start, text, before)?;
                    open = Some((name, attributes, after));
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some((name, attributes, content_start)) = open.take() {
                        elements.push(Element {
                            name,
                            attributes,
                            content: wrapped[content_start..before].to_string(),
                        });
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Empty(start) => {
                if depth == 1 {
                    let (name, attributes) = element_head(&start, text, before)?;
                    elements.push(Element {
                        name,
                        attributes,
                        content: String::new(),
                    });
                }
            }
            Event::Eof => break,
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
            _ => {
                if depth == 1 {
                    stray.push_str(&wrapped[before..after]);
                }
            }
        }
    }

    if depth != 0 {
        let position = wrapped.len();
        return Err(xml_error("unclosed element".to_string(), text, position));
    }
    Ok((elements, stray))
}

fn element_head(
    start: &BytesStart<'_>,
    text: &str,
    position: usize,
) -> Result<(String, Vec<(String, String)>), ParseError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(e.to_string(), text, position))?;
        attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).to_string(),
            String::from_utf8_lossy(&attr.value).to_string(),
        ));
    }
    Ok((name, attributes))
}

/// An Xml error pointing at the source line that holds wrapped-input `position`.
fn xml_error(message: String, text: &str, position: usize) -> ParseError {
    let position = position.saturating_sub(ROOT_OPEN.len()).min(text.len());
    let fragment = line_offsets(text)
        .into_iter()
        .take_while(|(offset, _)| *offset <= position)
        .last()
        .map(|(_, line)| line.trim().to_string())
        .unwrap_or_default();
    ParseError::Xml { message, fragment }
}

fn build_meta(element: Element, text: &str) -> Result<MetaRecord, ParseError> {
    let desc = dedent(&element.content);
    let record = match element.name.as_str() {
        tag @ ("param" | "typeparam") => {
            let name = element
                .attribute("name")
                .ok_or_else(|| ParseError::arity(tag, "a name attribute", &fragment(&element, text)))?
                .to_string();
            let default = extract_default(&desc);
            DocstringParam::new(
                vec![tag.to_string(), name.clone()],
                Some(desc),
                name,
                None,
                None,
                default,
            )
            .into()
        }
        "returns" => DocstringReturns::new(vec!["returns".into()], Some(desc), None, false, None).into(),
        "exception" => {
            let cref = element.attribute("cref").map(str::to_string);
            let mut args = vec!["exception".to_string()];
            args.extend(cref.clone());
            DocstringRaises::new(args, Some(desc), cref).into()
        }
        "deprecated" => {
            let version = element.attribute("version").map(str::to_string);
            DocstringDeprecated::new(vec!["deprecated".into()], Some(desc), version).into()
        }
        _ => {
            let mut args = vec![element.name.clone()];
            args.extend(
                element
                    .attributes
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v)),
            );
            DocstringMeta::new(args, Some(desc)).into()
        }
    };
    Ok(record)
}

/// The source line where `element` starts, for error messages.
fn fragment(element: &Element, text: &str) -> String {
    let needle = format!("<{}", element.name);
    text.lines()
        .find(|line| line.contains(&needle))
        .unwrap_or(text)
        .trim()
        .to_string()
}
