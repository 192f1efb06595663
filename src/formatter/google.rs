//! @dose
//! purpose: Composer for Google-style sections. Titles come from the same Section table the
//!     parser uses, so custom sections compose under their own titles.
//!
//! invariants:
//!     - Only adjacent records with the same title share a section; record order is kept
//!     - Singular sections (Returns with no type, free-text sections) are never merged

use super::{description_parts, finish, separate, title_from_key, with_default};
use crate::parser::common::extract_default;
use crate::parser::{Section, SectionKind, DEFAULT_SECTIONS};
use crate::text::{indent_continuation, indent_lines};
use crate::types::{
    ComposeOptions, Docstring, MetaRecord, RenderingStyle, DEPRECATION_KEYWORDS, PARAM_KEYWORDS,
};

/// Compose a Google-style docstring with the default section titles.
pub fn compose_google(doc: &Docstring, options: &ComposeOptions) -> String {
    compose_with_sections(doc, options, &DEFAULT_SECTIONS)
}

/// Records that render under one title.
struct Group<'a> {
    title: String,
    singular: bool,
    records: Vec<&'a MetaRecord>,
}

pub(crate) fn compose_with_sections(
    doc: &Docstring,
    options: &ComposeOptions,
    sections: &[Section],
) -> String {
    let mut parts = description_parts(doc);

    let mut groups: Vec<Group<'_>> = Vec::new();
    for meta in &doc.meta {
        let (title, singular) = placement(meta, sections);
        let open = groups
            .last_mut()
            .filter(|g| !singular && !g.singular && g.title == title);
        match open {
            Some(group) => group.records.push(meta),
            None => groups.push(Group {
                title,
                singular,
                records: vec![meta],
            }),
        }
    }

    for group in groups {
        let items: Vec<String> = group
            .records
            .iter()
            .filter_map(|meta| render(meta, group.singular, options))
            .collect();
        if items.is_empty() {
            continue;
        }
        separate(&mut parts);
        parts.push(format!("{}:", group.title));
        parts.extend(items);
        parts.push(String::new());
    }

    finish(parts)
}

/// Section title for a record and whether it renders as a single block.
fn placement(meta: &MetaRecord, sections: &[Section]) -> (String, bool) {
    let key = match meta {
        MetaRecord::Param(p) => p
            .args
            .first()
            .map(String::as_str)
            .filter(|k| PARAM_KEYWORDS.contains(k))
            .unwrap_or("param"),
        MetaRecord::Returns(r) if r.is_generator => "yields",
        MetaRecord::Returns(_) => "returns",
        MetaRecord::Raises(_) => "raises",
        MetaRecord::Deprecated(_) => "deprecation",
        MetaRecord::Generic(m) => m.args.first().map(String::as_str).unwrap_or("notes"),
    };
    let section = sections.iter().find(|s| s.key == key).or_else(|| {
        match key {
            k if PARAM_KEYWORDS.contains(&k) => sections.iter().find(|s| s.key == "param"),
            k if DEPRECATION_KEYWORDS.contains(&k) => {
                sections.iter().find(|s| DEPRECATION_KEYWORDS.contains(&s.key.as_str()))
            }
            _ => None,
        }
    });
    match section {
        Some(section) => {
            let singular = match meta {
                MetaRecord::Generic(m) => {
                    section.kind == SectionKind::Singular || m.args.len() < 2
                }
                MetaRecord::Returns(r) if r.type_name.is_none() => true,
                MetaRecord::Raises(r) if r.type_name.is_none() => true,
                _ => section.kind == SectionKind::Singular,
            };
            (section.title.clone(), singular)
        }
        None => (title_from_key(key), true),
    }
}

/// One rendered item, or None when the record has nothing to show.
fn render(meta: &MetaRecord, singular: bool, options: &ComposeOptions) -> Option<String> {
    let indent = &options.indent;
    match meta {
        MetaRecord::Param(p) => {
            let mut head = p.arg_name.clone();
            if let Some(type_name) = &p.type_name {
                let optional = p.is_optional == Some(true);
                let type_text = match (optional, options.rendering) {
                    (false, _) => type_name.clone(),
                    (true, RenderingStyle::Compact) => format!("{}?", type_name),
                    (true, _) => format!("{}, optional", type_name),
                };
                head = format!("{} ({})", head, type_text);
            }
            let desc = with_default(p.description.as_deref(), p.default.as_deref(), extract_default);
            Some(item(&head, desc.as_deref(), options))
        }
        MetaRecord::Returns(r) => {
            typed_item(r.type_name.as_deref(), r.description.as_deref(), options)
        }
        MetaRecord::Raises(r) => {
            typed_item(r.type_name.as_deref(), r.description.as_deref(), options)
        }
        MetaRecord::Deprecated(d) => {
            let text: Vec<&str> = d
                .version
                .as_deref()
                .into_iter()
                .chain(d.description.as_deref())
                .collect();
            (!text.is_empty()).then(|| indent_lines(&text.join(" "), indent))
        }
        MetaRecord::Generic(m) if !singular => {
            let head = m.args.get(1).map(String::as_str).unwrap_or_default();
            Some(item(head, m.description.as_deref(), options))
        }
        MetaRecord::Generic(m) => m.description.as_deref().map(|d| indent_lines(d, indent)),
    }
}

/// `Type: desc` when typed; a bare description block (its own section) otherwise.
fn typed_item(type_name: Option<&str>, desc: Option<&str>, options: &ComposeOptions) -> Option<String> {
    match (type_name, desc) {
        (Some(type_name), desc) => Some(item(type_name, desc, options)),
        (None, Some(desc)) => Some(indent_lines(desc, &options.indent)),
        (None, None) => None,
    }
}

fn item(head: &str, desc: Option<&str>, options: &ComposeOptions) -> String {
    let nested = options.indent.repeat(2);
    let body = match desc {
        None => String::new(),
        Some(desc) if options.rendering == RenderingStyle::Expanded => {
            format!("\n{}", indent_lines(desc, &nested))
        }
        Some(desc) => format!(" {}", indent_continuation(desc, &nested)),
    };
    format!("{}{}:{}", options.indent, head, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DocstringParser, GoogleParser};

    fn roundtrip(text: &str, rendering: RenderingStyle) -> String {
        let doc = GoogleParser::new().parse(text).unwrap();
        compose_google(&doc, &ComposeOptions::with_rendering(rendering))
    }

    #[test]
    fn test_compose_compact() {
        let text = "Short.\n\nLong.\n\nArgs:\n    x (int?): the x\n        continued\n    y: the y\n\nReturns:\n    str: out\n\nRaises:\n    ValueError: when bad";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }

    #[test]
    fn test_compose_clean_spells_optional() {
        let text = "Args:\n    x (int?): the x";
        assert_eq!(
            roundtrip(text, RenderingStyle::Clean),
            "Args:\n    x (int, optional): the x"
        );
    }

    #[test]
    fn test_compose_expanded() {
        let text = "Args:\n    x (int): the x\n\nReturns:\n    str: out";
        let expected = "Args:\n    x (int):\n        the x\n\nReturns:\n    str:\n        out";
        assert_eq!(roundtrip(text, RenderingStyle::Expanded), expected);
        assert_eq!(roundtrip(expected, RenderingStyle::Expanded), expected);
    }

    #[test]
    fn test_compose_untyped_returns() {
        let text = "Returns:\n    The answer.";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }

    #[test]
    fn test_compose_generic_sections() {
        let text = "Args:\n    x: the x\n\nSee Also:\n    other\n\nExamples:\n    >>> f()\n    1";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }

    #[test]
    fn test_compose_keeps_record_order() {
        let text = "Args:\n    x: a\n\nReturns:\n    int: b\n\nArgs:\n    y: c";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }

    #[test]
    fn test_compose_merges_adjacent_sections() {
        let text = "Args:\n    x: a\n\nArgs:\n    y: c";
        assert_eq!(
            roundtrip(text, RenderingStyle::Compact),
            "Args:\n    x: a\n    y: c"
        );
    }

    #[test]
    fn test_compose_untyped_returns_get_own_section() {
        let text = "Returns:\n    int: counted\n\nReturns:\n    Something else.";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }
}
