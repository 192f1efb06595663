//! @dose
//! purpose: Composer for NumPy-style underlined sections and the `.. deprecated::` directive.
//!
//! gotchas:
//!     - The rendering mode is ignored; numpydoc has one layout
//!     - Untyped returns and raises become indented lead text of their own section

use super::{description_parts, finish, separate, title_from_key, with_default};
use crate::parser::numpydoc::{extract_numpy_default, NumpySection, DEPRECATION_KEY, SECTIONS};
use crate::text::indent_lines;
use crate::types::{ComposeOptions, Docstring, MetaRecord};

/// How one record lands in the output.
enum Piece {
    /// `head` line plus indented description, grouped under the section title.
    Item(String),
    /// Indented text that has to open its own section.
    Lead(String),
    /// Free text section body.
    Body(Option<String>),
    /// `.. deprecated::` directive.
    Directive(String),
}

struct Group {
    title: Option<String>,
    open: bool,
    lines: Vec<String>,
}

/// Compose a NumPy-style docstring.
///
/// The convention fixes the layout (underlined titles, descriptions on indented lines below
/// their key), so all rendering modes produce the same text; optional parameters are always
/// spelled `, optional`.
pub fn compose_numpydoc(doc: &Docstring, options: &ComposeOptions) -> String {
    let mut parts = description_parts(doc);

    let mut groups: Vec<Group> = Vec::new();
    for meta in &doc.meta {
        let Some(piece) = render(meta, options) else {
            continue;
        };
        let title = section_title(meta);
        match piece {
            Piece::Item(text) => {
                let open = groups
                    .last_mut()
                    .filter(|g| g.open && g.title.as_deref() == Some(title.as_str()));
                match open {
                    Some(group) => group.lines.push(text),
                    None => groups.push(Group {
                        title: Some(title),
                        open: true,
                        lines: vec![text],
                    }),
                }
            }
            Piece::Lead(text) => groups.push(Group {
                title: Some(title),
                open: true,
                lines: vec![text],
            }),
            Piece::Body(text) => groups.push(Group {
                title: Some(title),
                open: false,
                lines: text.into_iter().collect(),
            }),
            Piece::Directive(text) => groups.push(Group {
                title: None,
                open: false,
                lines: vec![text],
            }),
        }
    }

    for group in groups {
        separate(&mut parts);
        if let Some(title) = group.title {
            parts.push(format!("{}\n{}", title, "-".repeat(title.chars().count())));
        }
        parts.extend(group.lines);
        parts.push(String::new());
    }

    finish(parts)
}

/// Key a record is filed under, with the fallbacks for records from other conventions.
fn section_key(meta: &MetaRecord) -> &str {
    let key = meta.key();
    let known = |kind: fn(NumpySection) -> bool| {
        SECTIONS.iter().any(|(_, k, s)| *k == key && kind(*s))
    };
    match meta {
        MetaRecord::Param(_) if known(|s| s == NumpySection::Param) => key,
        MetaRecord::Param(_) => "param",
        MetaRecord::Returns(r) if r.is_generator => "yields",
        MetaRecord::Returns(_) => "returns",
        MetaRecord::Raises(_) if known(|s| s == NumpySection::Raises) => key,
        MetaRecord::Raises(_) => "raises",
        MetaRecord::Deprecated(_) => DEPRECATION_KEY,
        MetaRecord::Generic(_) if key.is_empty() => "notes",
        MetaRecord::Generic(_) => key,
    }
}

fn section_title(meta: &MetaRecord) -> String {
    let key = section_key(meta);
    SECTIONS
        .iter()
        .find(|(_, k, _)| *k == key)
        .map(|(title, _, _)| title.to_string())
        .unwrap_or_else(|| title_from_key(key))
}

fn render(meta: &MetaRecord, options: &ComposeOptions) -> Option<Piece> {
    let indent = &options.indent;
    let piece = match meta {
        MetaRecord::Param(p) => {
            let head = match (&p.type_name, p.is_optional == Some(true)) {
                (Some(t), true) => format!("{} : {}, optional", p.arg_name, t),
                (Some(t), false) => format!("{} : {}", p.arg_name, t),
                (None, true) => format!("{} : optional", p.arg_name),
                (None, false) => p.arg_name.clone(),
            };
            let desc = with_default(
                p.description.as_deref(),
                p.default.as_deref(),
                extract_numpy_default,
            );
            Piece::Item(keyed(head, desc.as_deref(), indent))
        }
        MetaRecord::Returns(r) => {
            let head = match (&r.return_name, &r.type_name) {
                (Some(name), Some(t)) => format!("{} : {}", name, t),
                (Some(name), None) => format!("{} :", name),
                (None, Some(t)) => t.clone(),
                (None, None) => return r.description.as_deref().map(|d| Piece::Lead(indent_lines(d, indent))),
            };
            Piece::Item(keyed(head, r.description.as_deref(), indent))
        }
        MetaRecord::Raises(r) => match &r.type_name {
            Some(t) => Piece::Item(keyed(t.clone(), r.description.as_deref(), indent)),
            None => return r.description.as_deref().map(|d| Piece::Lead(indent_lines(d, indent))),
        },
        MetaRecord::Deprecated(d) => {
            let mut text = match &d.version {
                Some(version) => format!(".. deprecated:: {}", version),
                None => ".. deprecated::".to_string(),
            };
            if let Some(desc) = &d.description {
                text = format!("{}\n{}", text, indent_lines(desc, indent));
            }
            Piece::Directive(text)
        }
        MetaRecord::Generic(m) => {
            let key = section_key(meta);
            let key_value = SECTIONS
                .iter()
                .any(|(_, k, s)| *k == key && *s != NumpySection::Simple);
            match (key_value, m.args.get(1)) {
                (true, Some(head)) => Piece::Item(keyed(head.clone(), m.description.as_deref(), indent)),
                (true, None) => {
                    return m.description.as_deref().map(|d| Piece::Lead(indent_lines(d, indent)))
                }
                (false, _) => Piece::Body(m.description.clone()),
            }
        }
    };
    Some(piece)
}

fn keyed(head: String, desc: Option<&str>, indent: &str) -> String {
    match desc {
        Some(desc) => format!("{}\n{}", head, indent_lines(desc, indent)),
        None => head,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DocstringParser, NumpydocParser};
    use crate::types::{DocstringParam, RenderingStyle};

    fn roundtrip(text: &str) -> String {
        let doc = NumpydocParser::new().parse(text).unwrap();
        compose_numpydoc(&doc, &ComposeOptions::default())
    }

    #[test]
    fn test_compose_sections() {
        let text = "Short.\n\nLong.\n\nParameters\n----------\nx : int\n    The x.\ny : str, optional\n    The y.\nz\n\nReturns\n-------\nresult : int\n    The result.\n\nRaises\n------\nValueError\n    If bad.";
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn test_compose_simple_and_directive() {
        let text = "Short.\n\n.. deprecated:: 1.6.0\n    Use other.\n\nParameters\n----------\nx\n    X.\n\nExamples\n--------\n>>> f(1)\n2\n\nCaveats\n-------\nMind the gap.";
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn test_compose_keeps_record_order() {
        let text = "Parameters\n----------\na\n    A.\n\nRaises\n------\nValueError\n    If bad.\n\nParameters\n----------\nb\n    B.";
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn test_compose_untyped_returns() {
        let text = "Returns\n-------\n    Just a description.";
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn test_compose_ignores_rendering() {
        let doc = NumpydocParser::new()
            .parse("Parameters\n----------\nx : int, optional\n    X.")
            .unwrap();
        let compact = compose_numpydoc(&doc, &ComposeOptions::default());
        let expanded = compose_numpydoc(&doc, &ComposeOptions::with_rendering(RenderingStyle::Expanded));
        assert_eq!(compact, expanded);
    }

    #[test]
    fn test_compose_foreign_records() {
        let mut doc = Docstring::default();
        doc.meta.push(
            DocstringParam::new(
                vec!["keyword".into(), "flag".into()],
                Some("A flag.".into()),
                "flag",
                Some("bool".into()),
                Some(true),
                Some("False".into()),
            )
            .into(),
        );
        assert_eq!(
            compose_numpydoc(&doc, &ComposeOptions::default()),
            "Parameters\n----------\nflag : bool, optional\n    A flag. Defaults to False."
        );
    }
}
