//! @dose
//! purpose: NumPy-style docstrings. Sections are titles underlined with dashes of the same
//!     length; parameter-like sections hold `name : type` keys with indented values, the rest
//!     are free text. `.. deprecated:: version` is read as a deprecation section.
//!
//! when-editing:
//!     - !An underline must be exactly as long as its title or the title is ignored
//!     - Known titles end the description; unknown underlined titles only count after that
//!
//! invariants:
//!     - Keys of key/value sections are the unindented lines of the section body
//!     - Indented text before the first key is kept as an untyped record
//!
//! gotchas:
//!     - A type of just "optional" means "no type, optional"
//!     - Defaults come from "default: X", "default is X", "default = X" or "defaults to X"

use super::common::{apply_description, line_offsets};
use super::{DocstringParser, ParseError};
use crate::text::{clean_doc, dedent};
use crate::types::{
    Docstring, DocstringDeprecated, DocstringMeta, DocstringParam, DocstringRaises,
    DocstringReturns, DocstringStyle, MetaRecord,
};
use once_cell::sync::Lazy;
use regex::Regex;

static PARAM_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)(?:\s*:\s*(.*?))?$").unwrap());

static PARAM_OPTIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*(?:, optional|\(optional\))$").unwrap());

static PARAM_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|\s)default(?: is | = |: |s to )\s*('[^']*'|"[^"]*"|[\w\-.]*\w)"#)
        .unwrap()
});

static RETURN_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:(.*?)\s*:\s*)?(.*?)$").unwrap());

static DEPRECATION_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\.\.\s*deprecated\s*::").unwrap());

/// How a section's body becomes records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumpySection {
    Param,
    Raises,
    Returns { generator: bool },
    Simple,
    Deprecation,
}

/// Titles in compose preference order: the first title for a key is the one written out.
pub(crate) const SECTIONS: &[(&str, &str, NumpySection)] = &[
    ("Parameters", "param", NumpySection::Param),
    ("Params", "param", NumpySection::Param),
    ("Arguments", "param", NumpySection::Param),
    ("Args", "param", NumpySection::Param),
    ("Other Parameters", "other_param", NumpySection::Param),
    ("Other Params", "other_param", NumpySection::Param),
    ("Receives", "receives", NumpySection::Param),
    ("Receive", "receives", NumpySection::Param),
    ("Attributes", "attribute", NumpySection::Param),
    ("Attribute", "attribute", NumpySection::Param),
    ("Returns", "returns", NumpySection::Returns { generator: false }),
    ("Return", "returns", NumpySection::Returns { generator: false }),
    ("Yields", "yields", NumpySection::Returns { generator: true }),
    ("Yield", "yields", NumpySection::Returns { generator: true }),
    ("Raises", "raises", NumpySection::Raises),
    ("Raise", "raises", NumpySection::Raises),
    ("Warns", "warns", NumpySection::Raises),
    ("Warn", "warns", NumpySection::Raises),
    ("Examples", "examples", NumpySection::Simple),
    ("Example", "examples", NumpySection::Simple),
    ("Warnings", "warnings", NumpySection::Simple),
    ("Warning", "warnings", NumpySection::Simple),
    ("See Also", "see_also", NumpySection::Simple),
    ("Related", "see_also", NumpySection::Simple),
    ("Notes", "notes", NumpySection::Simple),
    ("Note", "notes", NumpySection::Simple),
    ("References", "references", NumpySection::Simple),
    ("Reference", "references", NumpySection::Simple),
];

pub(crate) const DEPRECATION_KEY: &str = "deprecation";

struct Heading {
    start: usize,
    body_start: usize,
    key: String,
    kind: NumpySection,
    known: bool,
}

pub struct NumpydocParser;

impl NumpydocParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NumpydocParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocstringParser for NumpydocParser {
    fn style(&self) -> DocstringStyle {
        DocstringStyle::Numpydoc
    }

    fn parse(&self, text: &str) -> Result<Docstring, ParseError> {
        let mut doc = Docstring::new(DocstringStyle::Numpydoc);
        let text = clean_doc(text);
        if text.is_empty() {
            return Ok(doc);
        }

        let headings = find_headings(&text);
        let desc_end = headings
            .iter()
            .find(|h| h.known)
            .map(|h| h.start)
            .unwrap_or(text.len());
        apply_description(&mut doc, &text[..desc_end]);

        let headings: Vec<&Heading> = headings.iter().filter(|h| h.start >= desc_end).collect();
        for (i, heading) in headings.iter().enumerate() {
            let end = headings.get(i + 1).map(|h| h.start).unwrap_or(text.len());
            let body = &text[heading.body_start.min(end)..end];
            parse_section(&heading.key, heading.kind, body, &mut doc.meta);
        }

        Ok(doc)
    }
}

fn find_headings(text: &str) -> Vec<Heading> {
    let lines = line_offsets(text);
    let mut headings = Vec::new();
    for (i, (offset, line)) in lines.iter().enumerate() {
        if let Some(m) = DEPRECATION_DIRECTIVE.find(line) {
            headings.push(Heading {
                start: *offset,
                body_start: offset + m.end(),
                key: DEPRECATION_KEY.to_string(),
                kind: NumpySection::Deprecation,
                known: true,
            });
            continue;
        }

        let title = line.trim_end();
        let underlined = lines.get(i + 1).is_some_and(|(_, next)| {
            let next = next.trim_end();
            !next.is_empty() && next.chars().all(|c| c == '-') && next.len() == title.chars().count()
        });
        if title.is_empty() || title.starts_with(char::is_whitespace) || !underlined {
            continue;
        }
        let (underline_offset, underline) = lines[i + 1];
        let body_start = (underline_offset + underline.len() + 1).min(text.len());
        let heading = match SECTIONS.iter().find(|(t, _, _)| *t == title) {
            Some((_, key, kind)) => Heading {
                start: *offset,
                body_start,
                key: key.to_string(),
                kind: *kind,
                known: true,
            },
            None => Heading {
                start: *offset,
                body_start,
                key: title.to_lowercase().replace(' ', "_"),
                kind: NumpySection::Simple,
                known: false,
            },
        };
        headings.push(heading);
    }
    headings
}

fn parse_section(key: &str, kind: NumpySection, body: &str, meta: &mut Vec<MetaRecord>) {
    match kind {
        NumpySection::Simple => {
            meta.push(DocstringMeta::new(vec![key.to_string()], Some(dedent(body))).into());
        }
        NumpySection::Deprecation => {
            let (version, desc) = body.split_once('\n').unwrap_or((body, ""));
            let version = version.trim();
            meta.push(
                DocstringDeprecated::new(
                    vec![key.to_string()],
                    Some(dedent(desc)),
                    (!version.is_empty()).then(|| version.to_string()),
                )
                .into(),
            );
        }
        _ => {
            for (item_key, value) in key_values(body) {
                meta.push(build_item(key, kind, item_key, dedent(value)));
            }
        }
    }
}

/// Split a key/value section into (key line, indented value) pairs. Indented text before
/// the first key comes out with an empty key.
fn key_values(body: &str) -> Vec<(&str, &str)> {
    let keys: Vec<(usize, &str)> = line_offsets(body)
        .into_iter()
        .filter(|(_, line)| line.chars().next().is_some_and(|c| !c.is_whitespace()))
        .collect();

    let mut items = Vec::new();
    let first_key = keys.first().map(|(offset, _)| *offset).unwrap_or(body.len());
    let lead = &body[..first_key];
    if !lead.trim().is_empty() {
        items.push(("", lead));
    }
    for (i, (offset, line)) in keys.iter().enumerate() {
        let value_start = (offset + line.len() + 1).min(body.len());
        let end = keys.get(i + 1).map(|(next, _)| *next).unwrap_or(body.len());
        items.push((line.trim(), &body[value_start.min(end)..end]));
    }
    items
}

fn build_item(key: &str, kind: NumpySection, item_key: &str, desc: String) -> MetaRecord {
    match kind {
        NumpySection::Param if item_key.is_empty() => {
            DocstringMeta::new(vec![key.to_string()], Some(desc)).into()
        }
        NumpySection::Param => {
            let (arg_name, raw_type) = match PARAM_KEY.captures(item_key) {
                Some(caps) => (
                    caps.get(1).map_or("", |m| m.as_str()).to_string(),
                    caps.get(2).map(|m| m.as_str().trim()).filter(|t| !t.is_empty()),
                ),
                None => (item_key.to_string(), None),
            };
            let (type_name, is_optional) = match raw_type {
                None => (None, None),
                Some("optional") => (None, Some(true)),
                Some(t) => match PARAM_OPTIONAL.captures(t) {
                    Some(caps) => (Some(caps[1].trim().to_string()), Some(true)),
                    None => (Some(t.to_string()), Some(false)),
                },
            };
            let default = extract_numpy_default(&desc);
            DocstringParam::new(
                vec![key.to_string(), arg_name.clone()],
                Some(desc),
                arg_name,
                type_name,
                is_optional,
                default,
            )
            .into()
        }
        NumpySection::Raises => {
            let type_name = (!item_key.is_empty()).then(|| item_key.to_string());
            let mut args = vec![key.to_string()];
            args.extend(type_name.clone());
            DocstringRaises::new(args, Some(desc), type_name).into()
        }
        NumpySection::Returns { generator } => {
            let (return_name, type_name) = match RETURN_KEY.captures(item_key) {
                Some(caps) => (
                    caps.get(1).map(|m| m.as_str().trim().to_string()),
                    caps.get(2).map(|m| m.as_str().trim().to_string()),
                ),
                None => (None, None),
            };
            let return_name = return_name.filter(|n| !n.is_empty());
            let type_name = type_name.filter(|t| !t.is_empty());
            DocstringReturns::new(vec![key.to_string()], Some(desc), type_name, generator, return_name)
                .into()
        }
        NumpySection::Simple | NumpySection::Deprecation => {
            DocstringMeta::new(vec![key.to_string()], Some(desc)).into()
        }
    }
}

/// Default value named in a numpydoc parameter description.
pub(crate) fn extract_numpy_default(desc: &str) -> Option<String> {
    PARAM_DEFAULT
        .captures(desc)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Docstring {
        NumpydocParser::new().parse(text).unwrap()
    }

    #[test]
    fn test_empty() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_params() {
        let doc = parse(
            "Short.\n\nParameters\n----------\nx : int\n    The x.\ny : str, optional\n    The y, default is 'a'.\nz\n    Untyped.\nw : optional\n    Just optional.",
        );
        let params = doc.params();
        assert_eq!(params.len(), 4);
        assert_eq!(params[0].arg_name, "x");
        assert_eq!(params[0].type_name.as_deref(), Some("int"));
        assert_eq!(params[0].is_optional, Some(false));
        assert_eq!(params[1].type_name.as_deref(), Some("str"));
        assert_eq!(params[1].is_optional, Some(true));
        assert_eq!(params[1].default.as_deref(), Some("'a'"));
        assert_eq!(params[2].type_name, None);
        assert_eq!(params[2].is_optional, None);
        assert_eq!(params[3].type_name, None);
        assert_eq!(params[3].is_optional, Some(true));
    }

    #[test]
    fn test_default_forms() {
        assert_eq!(extract_numpy_default("Count, default: 3").as_deref(), Some("3"));
        assert_eq!(extract_numpy_default("Defaults to 1.5.").as_deref(), Some("1.5"));
        assert_eq!(extract_numpy_default("default = x-y").as_deref(), Some("x-y"));
        assert_eq!(extract_numpy_default("by default nothing"), None);
    }

    #[test]
    fn test_returns_and_yields() {
        let doc = parse("Returns\n-------\nresult : int\n    The result.\nstr\n    Label.");
        let many = doc.many_returns();
        assert_eq!(many.len(), 2);
        assert_eq!(many[0].return_name.as_deref(), Some("result"));
        assert_eq!(many[0].type_name.as_deref(), Some("int"));
        assert_eq!(many[1].return_name, None);
        assert_eq!(many[1].type_name.as_deref(), Some("str"));

        let doc = parse("Yields\n------\nint\n    Numbers.");
        assert!(doc.returns().unwrap().is_generator);
    }

    #[test]
    fn test_raises_and_warns() {
        let doc = parse("Raises\n------\nValueError\n    If bad.\n\nWarns\n-----\nUserWarning\n    Sometimes.");
        let raises = doc.raises();
        assert_eq!(raises.len(), 2);
        assert_eq!(raises[0].args, vec!["raises", "ValueError"]);
        assert_eq!(raises[1].args, vec!["warns", "UserWarning"]);
    }

    #[test]
    fn test_other_sections() {
        let doc = parse(
            "Short.\n\nParameters\n----------\nx\n    X.\n\nOther Parameters\n----------------\nk : int\n    K.\n\nExamples\n--------\n>>> f(1)\n2\n\nSee Also\n--------\nother_func",
        );
        assert_eq!(doc.params().len(), 2);
        assert_eq!(doc.params()[1].args[0], "other_param");
        assert_eq!(doc.examples()[0].description.as_deref(), Some(">>> f(1)\n2"));
        assert_eq!(doc.meta.last().unwrap().key(), "see_also");
    }

    #[test]
    fn test_unknown_underlined_title_preserved() {
        let doc = parse("Short.\n\nParameters\n----------\nx\n    X.\n\nCaveats\n-------\nMind the gap.");
        assert_eq!(doc.meta.len(), 2);
        assert_eq!(doc.meta[1].key(), "caveats");
        assert_eq!(doc.meta[1].description(), Some("Mind the gap."));
    }

    #[test]
    fn test_underline_length_must_match() {
        let doc = parse("Short.\n\nParameters\n---\nx\n    X.");
        assert!(doc.meta.is_empty());
        assert!(doc.long_description.is_some());
    }

    #[test]
    fn test_deprecation_directive() {
        let doc = parse("Short.\n\n.. deprecated:: 1.6.0\n    Use other instead.");
        let d = doc.deprecation().unwrap();
        assert_eq!(d.version.as_deref(), Some("1.6.0"));
        assert_eq!(d.description.as_deref(), Some("Use other instead."));
    }

    #[test]
    fn test_untyped_returns_body() {
        let doc = parse("Returns\n-------\n    Just a description.");
        let r = doc.returns().unwrap();
        assert_eq!(r.type_name, None);
        assert_eq!(r.description.as_deref(), Some("Just a description."));
    }
}
