//! @dose
//! purpose: Epydoc fields (`@param x: desc`, `@type x: int`, `@return:`, `@rtype:`, `@raise E:`).
//!     Type fields do not become records of their own; they are merged into the param or
//!     return record they describe.
//!
//! when-editing:
//!     - !Reserved keywords (param, type, return, rtype, ...) that only match the generic field
//!       pattern are malformed, not generic records
//!
//! invariants:
//!     - One Param record per name, placed where the name first appears
//!     - At most one Returns record; return/rtype and yield/ytype must agree on generator-ness
//!
//! gotchas:
//!     - A `?` suffix on a type marks the parameter optional

use super::common::{
    apply_description, extract_default, extract_version, marker_offsets, split_at,
    strip_optional_marker,
};
use super::{DocstringParser, ParseError};
use crate::text::{clean_doc, reflow};
use crate::types::{
    Docstring, DocstringDeprecated, DocstringMeta, DocstringParam, DocstringRaises,
    DocstringReturns, DocstringStyle, MetaRecord, DEPRECATION_KEYWORDS,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static FIELD_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^@").unwrap());

static PARAM_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@(param|keyword|type)\s+([A-Za-z_]\w*)\s*:").unwrap());

static RAISE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@(raise|raises)(?:\s+([A-Za-z_][\w.]*))?\s*:").unwrap());

static RETURN_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@(return|returns|rtype|yield|yields|ytype)\s*:").unwrap());

static META_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@([A-Za-z_]\w*)((?:\s+[A-Za-z_][\w.]*\??)*)\s*:").unwrap());

const RESERVED: &[&str] = &[
    "param", "keyword", "type", "return", "returns", "rtype", "yield", "yields", "ytype",
];

/// A field after tokenizing, before type fields are merged.
enum Field {
    Param { key: String, name: String, desc: String },
    Type { name: String, type_name: String },
    Return { key: String, desc: String, generator: bool },
    ReturnType { type_name: String, generator: bool },
    Raise { key: String, type_name: Option<String>, desc: String },
    Meta { args: Vec<String>, desc: String },
}

pub struct EpydocParser;

impl EpydocParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EpydocParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocstringParser for EpydocParser {
    fn style(&self) -> DocstringStyle {
        DocstringStyle::Epydoc
    }

    fn parse(&self, text: &str) -> Result<Docstring, ParseError> {
        let mut doc = Docstring::new(DocstringStyle::Epydoc);
        let text = clean_doc(text);
        if text.is_empty() {
            return Ok(doc);
        }

        let starts = marker_offsets(&FIELD_START, &text);
        let desc_end = starts.first().copied().unwrap_or(text.len());
        apply_description(&mut doc, &text[..desc_end]);

        let mut fields = Vec::with_capacity(starts.len());
        for chunk in split_at(&text, &starts) {
            fields.push((tokenize(chunk)?, chunk));
        }
        doc.meta = merge(fields)?;
        Ok(doc)
    }
}

fn tokenize(chunk: &str) -> Result<Field, ParseError> {
    if let Some(caps) = PARAM_FIELD.captures(chunk) {
        let desc = reflow(&chunk[caps[0].len()..]);
        let name = caps[2].to_string();
        return Ok(match &caps[1] {
            "type" => Field::Type {
                name,
                type_name: desc,
            },
            key => Field::Param {
                key: key.to_string(),
                name,
                desc,
            },
        });
    }
    if let Some(caps) = RAISE_FIELD.captures(chunk) {
        return Ok(Field::Raise {
            key: caps[1].to_string(),
            type_name: caps.get(2).map(|m| m.as_str().to_string()),
            desc: reflow(&chunk[caps[0].len()..]),
        });
    }
    if let Some(caps) = RETURN_FIELD.captures(chunk) {
        let desc = reflow(&chunk[caps[0].len()..]);
        let key = &caps[1];
        let generator = key.starts_with('y');
        return Ok(match key {
            "rtype" | "ytype" => Field::ReturnType {
                type_name: desc,
                generator,
            },
            _ => Field::Return {
                key: key.to_string(),
                desc,
                generator,
            },
        });
    }
    if let Some(caps) = META_FIELD.captures(chunk) {
        let key = &caps[1];
        if RESERVED.contains(&key) {
            return Err(ParseError::malformed(chunk.trim_end()));
        }
        let mut args = vec![key.to_string()];
        args.extend(caps[2].split_whitespace().map(str::to_string));
        return Ok(Field::Meta {
            args,
            desc: reflow(&chunk[caps[0].len()..]),
        });
    }
    Err(ParseError::malformed(chunk.trim_end()))
}

/// Turn the field stream into records, folding `@type` into params and `@rtype`/`@ytype`
/// into the single return record.
fn merge(fields: Vec<(Field, &str)>) -> Result<Vec<MetaRecord>, ParseError> {
    let mut types: HashMap<&str, &str> = HashMap::new();
    let mut generator: Option<bool> = None;
    let mut return_type: Option<&str> = None;
    for (field, chunk) in &fields {
        let flag = match field {
            Field::Type { name, type_name } => {
                types.insert(name.as_str(), type_name.as_str());
                continue;
            }
            Field::ReturnType {
                type_name,
                generator,
            } => {
                return_type = Some(type_name.as_str());
                *generator
            }
            Field::Return { generator, .. } => *generator,
            _ => continue,
        };
        if generator.is_some_and(|g| g != flag) {
            return Err(ParseError::Inconsistent {
                message: "return and yield fields".to_string(),
                fragment: chunk.trim_end().to_string(),
            });
        }
        generator = Some(flag);
    }

    let described: Vec<&str> = fields
        .iter()
        .filter_map(|(f, _)| match f {
            Field::Param { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();

    let mut meta = Vec::new();
    let mut done: Vec<&str> = Vec::new();
    let mut returns_done = false;
    for (field, _) in &fields {
        match field {
            Field::Param { key, name, desc } if !done.contains(&name.as_str()) => {
                done.push(name.as_str());
                meta.push(param(key, name, Some(desc), types.get(name.as_str()).copied()));
            }
            Field::Type { name, type_name }
                if !described.contains(&name.as_str()) && !done.contains(&name.as_str()) =>
            {
                done.push(name.as_str());
                meta.push(param("param", name, None, Some(type_name)));
            }
            Field::Return { .. } | Field::ReturnType { .. } if !returns_done => {
                returns_done = true;
                let is_generator = generator.unwrap_or(false);
                let (key, desc) = fields
                    .iter()
                    .find_map(|(f, _)| match f {
                        Field::Return { key, desc, .. } => Some((key.clone(), Some(desc.clone()))),
                        _ => None,
                    })
                    .unwrap_or_else(|| {
                        let key = if is_generator { "yield" } else { "return" };
                        (key.to_string(), None)
                    });
                let type_name = return_type.filter(|t| !t.is_empty()).map(str::to_string);
                meta.push(DocstringReturns::new(vec![key], desc, type_name, is_generator, None).into());
            }
            Field::Raise {
                key,
                type_name,
                desc,
            } => {
                let mut args = vec![key.clone()];
                args.extend(type_name.clone());
                meta.push(DocstringRaises::new(args, Some(desc.clone()), type_name.clone()).into());
            }
            Field::Meta { args, desc } if DEPRECATION_KEYWORDS.contains(&args[0].as_str()) => {
                let (version, text) = match args.get(1) {
                    Some(version) => (Some(version.clone()), Some(desc.clone())),
                    None => extract_version(desc),
                };
                meta.push(DocstringDeprecated::new(vec![args[0].clone()], text, version).into());
            }
            Field::Meta { args, desc } => {
                meta.push(DocstringMeta::new(args.clone(), Some(desc.clone())).into());
            }
            _ => {}
        }
    }
    Ok(meta)
}

fn param(key: &str, name: &str, desc: Option<&String>, raw_type: Option<&str>) -> MetaRecord {
    let (type_name, is_optional) = match raw_type.filter(|t| !t.is_empty()) {
        Some(t) => {
            let (t, optional) = strip_optional_marker(t, '?');
            (Some(t.to_string()), Some(optional))
        }
        None => (None, None),
    };
    let default = desc.and_then(|d| extract_default(d.as_str()));
    DocstringParam::new(
        vec![key.to_string(), name.to_string()],
        desc.cloned(),
        name,
        type_name,
        is_optional,
        default,
    )
    .into()
}
