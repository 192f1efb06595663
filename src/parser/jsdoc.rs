//! @dose
//! purpose: JSDoc tags: `@param {Type=} [name=default] - desc`, `@returns {Type} desc`,
//!     `@yields`, `@throws {Type}`, `@deprecated`. Anything else is a generic record.
//!
//! when-editing:
//!     - !Types are read brace-balanced so `{Object.<string, {a: number}>}` stays one type
//!     - An unclosed `{` is a malformed chunk, not a description
//!
//! invariants:
//!     - `=` after a type or a bracketed name marks the parameter optional; nothing else does
//!     - A default inside `[name=default]` wins over a "defaults to" phrase
//!
//! gotchas:
//!     - The ` - ` between name and description is optional and not part of the description

use super::common::{
    apply_description, classify, extract_default, extract_version, marker_offsets, read_balanced,
    split_at, strip_optional_marker, TagKind,
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

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@([\w-]+)").unwrap());

static NAME_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*-(?:[ \t]|\n|$)").unwrap());

const PARAM_ALIASES: &[&str] = &["property", "prop"];
const RAISES_ALIASES: &[&str] = &["throws", "throw"];

pub struct JsdocParser;

impl JsdocParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsdocParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocstringParser for JsdocParser {
    fn style(&self) -> DocstringStyle {
        DocstringStyle::Jsdoc
    }

    fn parse(&self, text: &str) -> Result<Docstring, ParseError> {
        let mut doc = Docstring::new(DocstringStyle::Jsdoc);
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
    let kind = classify(&tag, PARAM_ALIASES, RAISES_ALIASES);

    let record = match kind {
        TagKind::Param => {
            let (type_name, rest) = read_type(rest, chunk)?;
            let (raw_name, rest) = read_name(rest).ok_or_else(|| {
                ParseError::arity(&tag, "a parameter name", chunk.trim_end())
            })?;
            let desc = reflow(strip_separator(rest));

            let (type_name, typed_optional) = match type_name {
                Some(t) => {
                    let (t, optional) = strip_optional_marker(t, '=');
                    (Some(t.trim().to_string()), optional)
                }
                None => (None, false),
            };
            let (arg_name, bracketed, default) = match raw_name
                .strip_prefix('[')
                .and_then(|n| n.strip_suffix(']'))
            {
                Some(inner) => match inner.split_once('=') {
                    Some((name, default)) => {
                        (name.trim().to_string(), true, Some(default.trim().to_string()))
                    }
                    None => (inner.trim().to_string(), true, None),
                },
                None => (raw_name.to_string(), false, None),
            };
            let is_optional = if typed_optional || bracketed {
                Some(true)
            } else {
                type_name.as_ref().map(|_| false)
            };
            let default = default.or_else(|| extract_default(&desc));

            let mut args = vec![tag];
            args.extend(type_name.clone());
            args.push(arg_name.clone());
            DocstringParam::new(args, Some(desc), arg_name, type_name, is_optional, default).into()
        }
        TagKind::Returns { generator } => {
            let (type_name, rest) = read_type(rest, chunk)?;
            let type_name = type_name.map(|t| t.trim().to_string());
            DocstringReturns::new(vec![tag], Some(reflow(rest)), type_name, generator, None).into()
        }
        TagKind::Raises => {
            let (type_name, rest) = read_type(rest, chunk)?;
            let type_name = type_name.map(|t| t.trim().to_string());
            let mut args = vec![tag];
            args.extend(type_name.clone());
            DocstringRaises::new(args, Some(reflow(rest)), type_name).into()
        }
        TagKind::Deprecated => {
            let (version, text) = extract_version(&reflow(rest));
            DocstringDeprecated::new(vec![tag], text, version).into()
        }
        TagKind::Generic => DocstringMeta::new(vec![tag], Some(reflow(rest))).into(),
    };
    Ok(record)
}

/// Read an optional `{...}` type. Without one the text comes back untouched.
fn read_type<'a>(text: &'a str, chunk: &str) -> Result<(Option<&'a str>, &'a str), ParseError> {
    Ok(match read_balanced(text, '{', '}', chunk)? {
        Some((type_name, rest)) => (Some(type_name), rest),
        None => (None, text),
    })
}

/// Read a parameter name: a bracketed `[name=default]` group or a plain token.
fn read_name(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim_start_matches([' ', '\t']);
    if trimmed.starts_with('[') {
        let end = trimmed.find(']')?;
        return Some((&trimmed[..=end], &trimmed[end + 1..]));
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    (end > 0).then(|| (&trimmed[..end], &trimmed[end..]))
}

fn strip_separator(text: &str) -> &str {
    match NAME_SEPARATOR.find(text) {
        Some(m) if m.as_str().ends_with('\n') => &text[m.end() - 1..],
        Some(m) => &text[m.end()..],
        None => text,
    }
}
