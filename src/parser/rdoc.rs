//! @dose
//! purpose: YARD tags for Ruby: `@param name [Types] desc`, `@option`, `@yieldparam`, `@attr`,
//!     `@return [Type] desc`, `@yield`/`@yieldreturn`, `@raise [Type] desc`, `@deprecated`.
//!
//! when-editing:
//!     - !A `[Types]` list is read bracket-balanced and may come before or after a param name
//!     - !Only `@option` marks a parameter optional
//!
//! gotchas:
//!     - `@yield` and `@yieldreturn` both describe generator output
//!     - Generic tags keep a leading `[Types]` as a second arg

use super::common::{
    apply_description, classify, extract_default, extract_version, marker_offsets, read_balanced,
    split_at, TagKind,
};
use super::{DocstringParser, ParseError};
use crate::text::{clean_doc, reflow};
use crate::types::{
    Docstring, DocstringDeprecated, DocstringMeta, DocstringParam, DocstringRaises,
    DocstringReturns, DocstringStyle, MetaRecord,
};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^@").unwrap());

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@(\w+)").unwrap());

static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*([^\s\[]\S*)").unwrap());

const OPTION_TAG: &str = "option";
const PARAM_ALIASES: &[&str] = &["option", "yieldparam", "attr"];
const RAISES_ALIASES: &[&str] = &["throws"];
const GENERATOR_TAGS: &[&str] = &["yieldreturn"];

pub struct RdocParser;

impl RdocParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RdocParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocstringParser for RdocParser {
    fn style(&self) -> DocstringStyle {
        DocstringStyle::Rdoc
    }

    fn parse(&self, text: &str) -> Result<Docstring, ParseError> {
        let mut doc = Docstring::new(DocstringStyle::Rdoc);
        let text = clean_doc(text);
        if text.is_empty() {
            return Ok(doc);
        }

        let starts = marker_offsets(&TAG_START, &text);
        let desc_end = starts.first().copied().unwrap_or(text.len());
        apply_description(&mut doc, &text[..desc_end]);

        for chunk in split_at(&text, &starts) {
            doc.meta.push(build_meta(chunk)?);
        }
        Ok(doc)
    }
}

fn build_meta(chunk: &str) -> Result<MetaRecord, ParseError> {
    let caps = TAG
        .captures(chunk)
        .ok_or_else(|| ParseError::malformed(chunk.trim_end()))?;
    let tag = caps[1].to_string();
    let rest = &chunk[caps[0].len()..];

    let kind = match classify(&tag, PARAM_ALIASES, RAISES_ALIASES) {
        TagKind::Generic if GENERATOR_TAGS.contains(&tag.as_str()) => {
            TagKind::Returns { generator: true }
        }
        kind => kind,
    };

    let record = match kind {
        TagKind::Param => {
            let (mut type_name, rest) = read_types(rest, chunk)?;
            let (name, mut rest) = match NAME.captures(rest) {
                Some(caps) => (caps[1].to_string(), &rest[caps[0].len()..]),
                None => return Err(ParseError::arity(&tag, "a parameter name", chunk.trim_end())),
            };
            if type_name.is_none() {
                let (after_name, remainder) = read_types(rest, chunk)?;
                type_name = after_name;
                rest = remainder;
            }
            let desc = reflow(rest);
            let is_optional = (tag == OPTION_TAG).then_some(true);
            let default = extract_default(&desc);

            let mut args = vec![tag, name.clone()];
            args.extend(type_name.clone());
            DocstringParam::new(args, Some(desc), name, type_name, is_optional, default).into()
        }
        TagKind::Returns { generator } => {
            let (type_name, rest) = read_types(rest, chunk)?;
            let mut args = vec![tag];
            args.extend(type_name.clone());
            DocstringReturns::new(args, Some(reflow(rest)), type_name, generator, None).into()
        }
        TagKind::Raises => {
            let (type_name, rest) = read_types(rest, chunk)?;
            let mut args = vec![tag];
            args.extend(type_name.clone());
            DocstringRaises::new(args, Some(reflow(rest)), type_name).into()
        }
        TagKind::Deprecated => {
            let (version, text) = extract_version(&reflow(rest));
            DocstringDeprecated::new(vec![tag], text, version).into()
        }
        TagKind::Generic => {
            let (type_name, rest) = read_types(rest, chunk)?;
            let mut args = vec![tag];
            args.extend(type_name.map(|t| format!("[{}]", t)));
            DocstringMeta::new(args, Some(reflow(rest))).into()
        }
    };
    Ok(record)
}

/// Read an optional `[Types]` list at the start of `text`.
fn read_types<'a>(text: &'a str, chunk: &str) -> Result<(Option<String>, &'a str), ParseError> {
    Ok(match read_balanced(text, '[', ']', chunk)? {
        Some((types, rest)) => (Some(types.trim().to_string()), rest),
        None => (None, text),
    })
}
