//! @dose
//! purpose: Rust doc comments in Markdown. `# Heading` lines open sections; argument-like
//!     sections hold bullet items of the form `` * `name` - desc ``.
//!
//! when-editing:
//!     - !Lines inside ``` or ~~~ fences are never headings (`# hidden` lines in doctests)
//!     - Heading matching is case-insensitive; unknown headings become generic records keyed by
//!       the lowercased title with spaces replaced by `_`
//!
//! invariants:
//!     - Every bullet in an Arguments/Type Parameters section needs a backticked name
//!     - Returns and Errors sections are itemized only when their bullets carry backticked names
//!
//! flows:
//!     - parse: clean_doc -> find headings outside fences -> description -> per section:
//!       items or free text -> records

use super::common::{apply_description, extract_default, extract_version, line_offsets};
use super::{DocstringParser, ParseError};
use crate::text::{clean_doc, dedent, reflow};
use crate::types::{
    Docstring, DocstringDeprecated, DocstringMeta, DocstringParam, DocstringRaises,
    DocstringReturns, DocstringStyle, MetaRecord,
};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}[ \t]+(.+?)[ \t#]*$").unwrap());

static FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*(```|~~~)").unwrap());

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[-*+][ \t]").unwrap());

static NAMED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*+][ \t]*`([^`\n]+)`[ \t]*(?:[-:][ \t]*)?").unwrap());

const TYPE_PARAM_KEY: &str = "typeparam";

/// What a heading's body turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Params,
    Returns { generator: bool },
    Errors,
    Deprecated,
    Text,
}

fn section_for(title: &str) -> (String, SectionKind) {
    let lower = title.to_lowercase();
    match lower.as_str() {
        "arguments" | "parameters" | "args" | "params" => ("param".into(), SectionKind::Params),
        "type parameters" => (TYPE_PARAM_KEY.into(), SectionKind::Params),
        "returns" | "return" => ("returns".into(), SectionKind::Returns { generator: false }),
        "yields" | "yield" => ("yields".into(), SectionKind::Returns { generator: true }),
        "errors" => ("errors".into(), SectionKind::Errors),
        "deprecated" | "deprecation" => ("deprecated".into(), SectionKind::Deprecated),
        _ => (lower.replace(' ', "_"), SectionKind::Text),
    }
}

pub struct RustdocParser;

impl RustdocParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustdocParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocstringParser for RustdocParser {
    fn style(&self) -> DocstringStyle {
        DocstringStyle::Rustdoc
    }

    fn parse(&self, text: &str) -> Result<Docstring, ParseError> {
        let mut doc = Docstring::new(DocstringStyle::Rustdoc);
        let text = clean_doc(text);
        if text.is_empty() {
            return Ok(doc);
        }

        let headings = find_headings(&text);
        let desc_end = headings.first().map(|h| h.0).unwrap_or(text.len());
        apply_description(&mut doc, &text[..desc_end]);

        for (i, (_, body_start, title)) in headings.iter().enumerate() {
            let end = headings.get(i + 1).map(|h| h.0).unwrap_or(text.len());
            let body = &text[(*body_start).min(end)..end];
            let (key, kind) = section_for(title);
            parse_section(key, kind, body, &mut doc.meta)?;
        }

        Ok(doc)
    }
}

/// (heading start, body start, title) for every heading outside code fences.
fn find_headings(text: &str) -> Vec<(usize, usize, String)> {
    let mut headings = Vec::new();
    let mut fenced = false;
    for (offset, line) in line_offsets(text) {
        if FENCE.is_match(line) {
            fenced = !fenced;
            continue;
        }
        if fenced {
            continue;
        }
        if let Some(caps) = HEADING.captures(line) {
            let body_start = (offset + line.len() + 1).min(text.len());
            headings.push((offset, body_start, caps[1].to_string()));
        }
    }
    headings
}

fn parse_section(
    key: String,
    kind: SectionKind,
    body: &str,
    meta: &mut Vec<MetaRecord>,
) -> Result<(), ParseError> {
    match kind {
        SectionKind::Params => {
            if body.trim().is_empty() {
                return Ok(());
            }
            for (name, desc) in named_items(body)? {
                let default = extract_default(&desc);
                meta.push(
                    DocstringParam::new(
                        vec![key.clone(), name.clone()],
                        Some(desc),
                        name,
                        None,
                        None,
                        default,
                    )
                    .into(),
                );
            }
        }
        SectionKind::Returns { generator } if is_itemized(body) => {
            for (type_name, desc) in named_items(body)? {
                meta.push(
                    DocstringReturns::new(
                        vec![key.clone(), type_name.clone()],
                        Some(desc),
                        Some(type_name),
                        generator,
                        None,
                    )
                    .into(),
                );
            }
        }
        SectionKind::Returns { generator } => meta.push(
            DocstringReturns::new(vec![key], Some(dedent(body)), None, generator, None).into(),
        ),
        SectionKind::Errors if is_itemized(body) => {
            for (type_name, desc) in named_items(body)? {
                meta.push(
                    DocstringRaises::new(
                        vec![key.clone(), type_name.clone()],
                        Some(desc),
                        Some(type_name),
                    )
                    .into(),
                );
            }
        }
        SectionKind::Errors => {
            meta.push(DocstringRaises::new(vec![key], Some(dedent(body)), None).into())
        }
        SectionKind::Deprecated => {
            let (version, text) = extract_version(&dedent(body));
            meta.push(DocstringDeprecated::new(vec![key], text, version).into());
        }
        SectionKind::Text => meta.push(DocstringMeta::new(vec![key], Some(dedent(body))).into()),
    }
    Ok(())
}

/// True when the body opens with a bullet carrying a backticked name.
fn is_itemized(body: &str) -> bool {
    body.trim_start()
        .lines()
        .next()
        .is_some_and(|line| NAMED_ITEM.is_match(line))
}

/// Split a section body into (name, description) bullets. Every bullet needs a backticked
/// name and nothing but blank lines may precede the first one.
fn named_items(body: &str) -> Result<Vec<(String, String)>, ParseError> {
    let starts: Vec<usize> = BULLET.find_iter(body).map(|m| m.start()).collect();
    let lead = &body[..starts.first().copied().unwrap_or(body.len())];
    if !lead.trim().is_empty() {
        return Err(ParseError::section("Expected a list of `name` items in", body.trim()));
    }

    let mut items = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(body.len());
        let item = &body[start..end];
        let caps = NAMED_ITEM
            .captures(item)
            .ok_or_else(|| ParseError::section("Expected a `name` in", item.trim_end()))?;
        items.push((caps[1].trim().to_string(), reflow(&item[caps[0].len()..])));
    }
    Ok(items)
}
