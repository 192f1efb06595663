//! @dose
//! purpose: Google-style docstrings. The body is split into titled sections ("Args:",
//!     "Returns:", ...) whose indented items become meta records. The section table is
//!     configurable so projects can add their own titles.
//!
//! when-editing:
//!     - !The description ends at the first known section title, not at unknown ones
//!     - !Section bodies end at the first unindented line; that trailing text is kept as a
//!       Generic record keyed "text"
//!     - Compose titles come from the same section table (see formatter/google.rs)
//!
//! invariants:
//!     - Every section found is kept in source order; repeated titles give repeated records
//!     - Items of a multiple section start at lines indented exactly like the first item
//!
//! gotchas:
//!     - Unknown "Title:" lines only count as sections after the first known title
//!     - "Returns:" is read as one record unless the body looks like "type: desc" items

use super::common::{
    apply_description, classify, extract_default, extract_version, line_offsets, TagKind,
};
use super::{DocstringParser, ParseError};
use crate::text::{clean_doc, dedent, reflow};
use crate::types::{
    ComposeOptions, Docstring, DocstringDeprecated, DocstringMeta, DocstringParam,
    DocstringRaises, DocstringReturns, DocstringStyle, MetaRecord,
};
use once_cell::sync::Lazy;
use regex::Regex;

static GENERIC_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][\w\- ]*:\s*$").unwrap());

static MULTIPLE_ITEMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\s*[^:\s]+:|[^:]*\]:)").unwrap());

static TYPED_ARG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(.+?)\s*\(\s*(.*\S)\s*\)\s*$").unwrap());

/// Key given to unindented text that trails a section.
pub(crate) const TRAILING_TEXT_KEY: &str = "text";

/// How the body of a section is split into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// The whole body is one record.
    Singular,
    /// One record per `name: desc` item.
    Multiple,
    /// Items when the body looks like `type: desc`, otherwise one record.
    SingularOrMultiple,
}

/// A section title and the record key it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub key: String,
    pub kind: SectionKind,
}

impl Section {
    pub fn new(title: impl Into<String>, key: impl Into<String>, kind: SectionKind) -> Self {
        Self {
            title: title.into(),
            key: key.into(),
            kind,
        }
    }
}

fn default_sections() -> Vec<Section> {
    use SectionKind::*;
    [
        ("Args", "param", Multiple),
        ("Arguments", "param", Multiple),
        ("Parameters", "param", Multiple),
        ("Params", "param", Multiple),
        ("Attributes", "attribute", Multiple),
        ("Raises", "raises", SingularOrMultiple),
        ("Exceptions", "raises", SingularOrMultiple),
        ("Except", "raises", SingularOrMultiple),
        ("Returns", "returns", SingularOrMultiple),
        ("Yields", "yields", SingularOrMultiple),
        ("Examples", "examples", Singular),
        ("Example", "examples", Singular),
        ("Deprecated", "deprecation", Singular),
        ("Notes", "notes", Singular),
        ("Note", "note", Singular),
        ("Warnings", "warnings", Singular),
        ("Warning", "warning", Singular),
        ("Todo", "todo", Singular),
        ("See Also", "see_also", Singular),
        ("References", "references", Singular),
    ]
    .into_iter()
    .map(|(title, key, kind)| Section::new(title, key, kind))
    .collect()
}

pub(crate) static DEFAULT_SECTIONS: Lazy<Vec<Section>> = Lazy::new(default_sections);

/// Section a title line resolves to.
enum Heading<'a> {
    Known(&'a Section),
    Unknown(String),
}

impl Heading<'_> {
    fn key(&self) -> &str {
        match self {
            Heading::Known(section) => &section.key,
            Heading::Unknown(key) => key,
        }
    }

    fn kind(&self) -> SectionKind {
        match self {
            Heading::Known(section) => section.kind,
            Heading::Unknown(_) => SectionKind::Singular,
        }
    }
}

pub struct GoogleParser {
    sections: Vec<Section>,
    title_colon: bool,
}

impl GoogleParser {
    pub fn new() -> Self {
        Self {
            sections: default_sections(),
            title_colon: true,
        }
    }

    /// Parser with a custom section table. With `title_colon` off, titles are bare lines
    /// ("Args" instead of "Args:") and unknown titles are not recognized.
    pub fn with_sections(sections: Vec<Section>, title_colon: bool) -> Self {
        Self {
            sections,
            title_colon,
        }
    }

    /// Add a section, replacing any section with the same title.
    pub fn add_section(&mut self, section: Section) {
        self.sections.retain(|s| s.title != section.title);
        self.sections.push(section);
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Compose with this parser's section titles.
    pub fn compose(&self, doc: &Docstring, options: &ComposeOptions) -> String {
        crate::formatter::google::compose_with_sections(doc, options, &self.sections)
    }

    /// clean_doc, except that a docstring opening with a section title is dedented as a
    /// block so the section body keeps its indent relative to the title.
    fn normalize(&self, text: &str) -> String {
        let cleaned = clean_doc(text);
        if !self.opens_with_title(&cleaned) {
            return cleaned;
        }
        let dedented = dedent(text);
        if self.opens_with_title(&dedented) {
            dedented
        } else {
            cleaned
        }
    }

    fn opens_with_title(&self, text: &str) -> bool {
        text.lines()
            .next()
            .is_some_and(|line| self.known_title(line).is_some())
    }

    fn known_title(&self, line: &str) -> Option<&Section> {
        let line = line.trim_end();
        let title = if self.title_colon {
            line.strip_suffix(':')?
        } else {
            line
        };
        self.sections.iter().find(|s| s.title == title)
    }

    fn heading(&self, line: &str) -> Option<Heading<'_>> {
        if let Some(section) = self.known_title(line) {
            return Some(Heading::Known(section));
        }
        if self.title_colon && GENERIC_TITLE.is_match(line) {
            let title = line.trim_end().trim_end_matches(':').trim();
            return Some(Heading::Unknown(title.to_lowercase().replace(' ', "_")));
        }
        None
    }
}

impl Default for GoogleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocstringParser for GoogleParser {
    fn style(&self) -> DocstringStyle {
        DocstringStyle::Google
    }

    fn parse(&self, text: &str) -> Result<Docstring, ParseError> {
        let mut doc = Docstring::new(DocstringStyle::Google);
        let text = self.normalize(text);
        if text.is_empty() {
            return Ok(doc);
        }

        let lines = line_offsets(&text);
        let desc_end = lines
            .iter()
            .find(|(_, line)| self.known_title(line).is_some())
            .map(|(offset, _)| *offset)
            .unwrap_or(text.len());
        apply_description(&mut doc, &text[..desc_end]);

        let headings: Vec<(usize, usize, Heading<'_>)> = lines
            .iter()
            .filter(|(offset, _)| *offset >= desc_end)
            .filter_map(|(offset, line)| {
                self.heading(line).map(|h| {
                    let body_start = (offset + line.len() + 1).min(text.len());
                    (*offset, body_start, h)
                })
            })
            .collect();

        for (i, (_, body_start, heading)) in headings.iter().enumerate() {
            let end = headings.get(i + 1).map(|h| h.0).unwrap_or(text.len());
            let (body, trailing) = split_unindented(&text[*body_start..end]);
            parse_section(heading.key(), heading.kind(), body, &mut doc.meta)?;

            let trailing = trailing.trim();
            if !trailing.is_empty() {
                doc.meta.push(
                    DocstringMeta::new(
                        vec![TRAILING_TEXT_KEY.to_string()],
                        Some(trailing.to_string()),
                    )
                    .into(),
                );
            }
        }

        Ok(doc)
    }
}

/// Split a section body at its first unindented line.
fn split_unindented(body: &str) -> (&str, &str) {
    for (offset, line) in line_offsets(body) {
        if line.chars().next().is_some_and(|c| !c.is_whitespace()) {
            return (&body[..offset], &body[offset..]);
        }
    }
    (body, "")
}

fn parse_section(
    key: &str,
    kind: SectionKind,
    body: &str,
    meta: &mut Vec<MetaRecord>,
) -> Result<(), ParseError> {
    let first_content = line_offsets(body)
        .into_iter()
        .find(|(_, line)| !line.trim().is_empty())
        .map(|(offset, _)| offset);
    let chunk = match first_content {
        Some(offset) => body[offset..].trim_end(),
        None => "",
    };
    let indent_len = chunk.len() - chunk.trim_start().len();
    if indent_len == 0 {
        return Err(ParseError::section("Can't infer indent from", chunk));
    }
    let indent = &chunk[..indent_len];

    let multiple = match kind {
        SectionKind::Singular => false,
        SectionKind::Multiple => true,
        SectionKind::SingularOrMultiple => MULTIPLE_ITEMS.is_match(chunk),
    };
    if !multiple {
        meta.push(build_single(key, chunk)?);
        return Ok(());
    }

    let starts: Vec<usize> = line_offsets(chunk)
        .into_iter()
        .filter(|(_, line)| {
            line.strip_prefix(indent)
                .and_then(|rest| rest.chars().next())
                .is_some_and(|c| !c.is_whitespace())
        })
        .map(|(offset, _)| offset + indent.len())
        .collect();
    if starts.is_empty() {
        return Err(ParseError::section(format!("Expected indented items under \"{}\"", key), chunk));
    }
    for (i, start) in starts.iter().enumerate() {
        let end = starts
            .get(i + 1)
            .map(|next| next - indent.len())
            .unwrap_or(chunk.len());
        let item = chunk[*start..end].trim_matches('\n');
        meta.push(build_multiple(key, item)?);
    }
    Ok(())
}

fn build_single(key: &str, chunk: &str) -> Result<MetaRecord, ParseError> {
    let desc = dedent(chunk);
    let args = vec![key.to_string()];
    let record = match classify(key, &[], &[]) {
        TagKind::Param => return Err(ParseError::section("Expected parameter name", chunk)),
        TagKind::Returns { generator } => {
            DocstringReturns::new(args, Some(desc), None, generator, None).into()
        }
        TagKind::Raises => DocstringRaises::new(args, Some(desc), None).into(),
        TagKind::Deprecated => {
            let (version, desc) = extract_version(&desc);
            DocstringDeprecated::new(args, desc, version).into()
        }
        TagKind::Generic => DocstringMeta::new(args, Some(desc)).into(),
    };
    Ok(record)
}

fn build_multiple(key: &str, item: &str) -> Result<MetaRecord, ParseError> {
    let (before, desc) = item
        .split_once(':')
        .ok_or_else(|| ParseError::section("Expected a colon in", item))?;
    let before = before.trim().to_string();
    let desc = reflow(desc);
    let args = vec![key.to_string(), before.clone()];

    let record = match classify(key, &[], &[]) {
        TagKind::Param => {
            let (arg_name, type_name, is_optional) = match TYPED_ARG.captures(&before) {
                Some(caps) => {
                    let raw_type = &caps[2];
                    let (type_name, optional) = if let Some(t) = raw_type.strip_suffix(", optional")
                    {
                        (t.trim_end(), true)
                    } else if let Some(t) = raw_type.strip_suffix('?') {
                        (t, true)
                    } else {
                        (raw_type, false)
                    };
                    (caps[1].to_string(), Some(type_name.to_string()), Some(optional))
                }
                None => (before.clone(), None, None),
            };
            let default = extract_default(&desc);
            DocstringParam::new(args, Some(desc), arg_name, type_name, is_optional, default).into()
        }
        TagKind::Returns { generator } => {
            DocstringReturns::new(args, Some(desc), Some(before), generator, None).into()
        }
        TagKind::Raises => DocstringRaises::new(args, Some(desc), Some(before)).into(),
        TagKind::Deprecated => DocstringDeprecated::new(args, Some(desc), Some(before)).into(),
        TagKind::Generic => DocstringMeta::new(args, Some(desc)).into(),
    };
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Docstring, ParseError> {
        GoogleParser::new().parse(text)
    }

    #[test]
    fn test_empty() {
        let doc = parse("").unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.style, Some(DocstringStyle::Google));
    }

    #[test]
    fn test_description_only() {
        let doc = parse("Short description.\n\nLong description\nspanning lines.").unwrap();
        assert_eq!(doc.short_description.as_deref(), Some("Short description."));
        assert_eq!(doc.long_description.as_deref(), Some("Long description\nspanning lines."));
        assert!(doc.meta.is_empty());
    }

    #[test]
    fn test_args_with_types() {
        let doc = parse(
            "Short.\n\nArgs:\n    name (str): the name\n    count (int, optional): how many.\n        Defaults to 1.\n    flag: untyped\n",
        )
        .unwrap();
        assert!(doc.blank_after_short_description);
        let params = doc.params();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].arg_name, "name");
        assert_eq!(params[0].type_name.as_deref(), Some("str"));
        assert_eq!(params[0].is_optional, Some(false));
        assert_eq!(params[1].type_name.as_deref(), Some("int"));
        assert_eq!(params[1].is_optional, Some(true));
        assert_eq!(params[1].default.as_deref(), Some("1"));
        assert_eq!(params[1].description.as_deref(), Some("how many.\nDefaults to 1."));
        assert_eq!(params[2].type_name, None);
        assert_eq!(params[2].is_optional, None);
        assert_eq!(params[2].args, vec!["param", "flag"]);
    }

    #[test]
    fn test_question_mark_optional() {
        let doc = parse("Args:\n    x (int?): maybe").unwrap();
        assert_eq!(doc.params()[0].is_optional, Some(true));
        assert_eq!(doc.params()[0].type_name.as_deref(), Some("int"));
    }

    #[test]
    fn test_returns_singular_and_multiple() {
        let doc = parse("Returns:\n    The answer, always.").unwrap();
        let r = doc.returns().unwrap();
        assert_eq!(r.type_name, None);
        assert_eq!(r.description.as_deref(), Some("The answer, always."));

        let doc = parse("Returns:\n    int: the count\n    str: the label").unwrap();
        let many = doc.many_returns();
        assert_eq!(many.len(), 2);
        assert_eq!(many[0].type_name.as_deref(), Some("int"));
        assert_eq!(many[1].description.as_deref(), Some("the label"));
    }

    #[test]
    fn test_yields_sets_generator() {
        let doc = parse("Yields:\n    int: numbers").unwrap();
        assert!(doc.returns().unwrap().is_generator);
        let doc = parse("Returns:\n    int: numbers").unwrap();
        assert!(!doc.returns().unwrap().is_generator);
    }

    #[test]
    fn test_raises() {
        let doc = parse("Raises:\n    ValueError: if bad\n    KeyError: if missing").unwrap();
        let raises = doc.raises();
        assert_eq!(raises.len(), 2);
        assert_eq!(raises[1].type_name.as_deref(), Some("KeyError"));
    }

    #[test]
    fn test_untyped_raises() {
        let doc = parse("Raises:\n    When the input is bad").unwrap();
        let raises = doc.raises();
        assert_eq!(raises[0].type_name, None);
        assert_eq!(raises[0].description.as_deref(), Some("When the input is bad"));
    }

    #[test]
    fn test_unknown_section_preserved() {
        let doc = parse(
            "Short.\n\nArgs:\n    x: the x\n\nCustom Things:\n    keep me\n\nReturns:\n    int: y",
        )
        .unwrap();
        assert_eq!(doc.meta.len(), 3);
        assert_eq!(doc.meta[1].key(), "custom_things");
        assert_eq!(doc.meta[1].description(), Some("keep me"));
        assert!(matches!(doc.meta[1], MetaRecord::Generic(_)));
        assert_eq!(doc.returns().unwrap().type_name.as_deref(), Some("int"));
    }

    #[test]
    fn test_repeated_sections_kept() {
        let doc = parse("Examples:\n    first\n\nExamples:\n    second").unwrap();
        assert_eq!(doc.examples().len(), 2);
    }

    #[test]
    fn test_trailing_text_kept() {
        let doc = parse("Args:\n    x: the x\nTrailing words.").unwrap();
        assert_eq!(doc.meta.len(), 2);
        assert_eq!(doc.meta[1].key(), TRAILING_TEXT_KEY);
        assert_eq!(doc.meta[1].description(), Some("Trailing words."));
    }

    #[test]
    fn test_deprecated_section() {
        let doc = parse("Deprecated:\n    2.1 use other").unwrap();
        let d = doc.deprecation().unwrap();
        assert_eq!(d.version.as_deref(), Some("2.1"));
        assert_eq!(d.description.as_deref(), Some("use other"));
    }

    #[test]
    fn test_examples_keep_nested_indent() {
        let doc = parse("Examples:\n    >>> f(\n    ...     1)\n").unwrap();
        assert_eq!(doc.examples()[0].description.as_deref(), Some(">>> f(\n...     1)"));
    }

    #[test]
    fn test_opening_section_keeps_body_indent() {
        let doc = parse("Args:\n    x (int?): maybe").unwrap();
        assert_eq!(doc.short_description, None);
        assert_eq!(doc.params()[0].arg_name, "x");
        assert_eq!(doc.params()[0].is_optional, Some(true));

        let doc = parse("Returns:\n        int: count\n    ").unwrap();
        assert_eq!(doc.returns().unwrap().type_name.as_deref(), Some("int"));
    }

    #[test]
    fn test_reparses_composed_without_description() {
        let rest = crate::parser::RestParser::new()
            .parse(":param int x: the x")
            .unwrap();
        let text = crate::formatter::compose_google(&rest, &ComposeOptions::default());
        assert_eq!(text, "Args:\n    x (int): the x");
        let doc = parse(&text).unwrap();
        assert_eq!(doc.params()[0].type_name.as_deref(), Some("int"));
        assert_eq!(doc.params()[0].description.as_deref(), Some("the x"));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse("Args:"), Err(ParseError::Section { .. })));
        assert!(matches!(parse("Args:\n    no colon here"), Err(ParseError::Section { .. })));
        assert!(parse("Args:\nunindented: x").is_err());
    }

    #[test]
    fn test_custom_sections() {
        let mut parser = GoogleParser::new();
        parser.add_section(Section::new("Options", "param", SectionKind::Multiple));
        let doc = parser.parse("Options:\n    verbose (bool): talk more").unwrap();
        assert_eq!(doc.params()[0].arg_name, "verbose");

        let bare = GoogleParser::with_sections(
            vec![Section::new("Args", "param", SectionKind::Multiple)],
            false,
        );
        let doc = bare.parse("Short.\n\nArgs\n    x: the x").unwrap();
        assert_eq!(doc.params().len(), 1);
        assert_eq!(doc.short_description.as_deref(), Some("Short."));
    }
}
