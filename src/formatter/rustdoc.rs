//! @dose
//! purpose: Composer for Markdown `# Heading` doc sections with backticked bullet items.
//!
//! invariants:
//!     - Only adjacent itemized records with the same title share a heading
//!
//! gotchas:
//!     - Parameter types have no rustdoc spelling and are dropped

use super::{description_parts, finish, separate, tag_description, title_from_key, with_default};
use crate::parser::common::extract_default;
use crate::types::{ComposeOptions, Docstring, MetaRecord};

const TYPE_PARAM_KEY: &str = "typeparam";

struct Group {
    title: String,
    itemized: bool,
    lines: Vec<String>,
}

/// Compose a Markdown doc comment with `# Heading` sections.
pub fn compose_rustdoc(doc: &Docstring, options: &ComposeOptions) -> String {
    let mut parts = description_parts(doc);

    let mut groups: Vec<Group> = Vec::new();
    for meta in &doc.meta {
        let (title, item) = placement(meta, options);
        match item {
            Some(line) => match groups.last_mut().filter(|g| g.itemized && g.title == title) {
                Some(group) => group.lines.push(line),
                None => groups.push(Group {
                    title,
                    itemized: true,
                    lines: vec![line],
                }),
            },
            None => groups.push(Group {
                title,
                itemized: false,
                lines: body(meta).into_iter().collect(),
            }),
        }
    }

    for group in groups {
        separate(&mut parts);
        parts.push(format!("# {}", group.title));
        parts.push(String::new());
        parts.extend(group.lines);
        parts.push(String::new());
    }

    finish(parts)
}

/// Section title for a record, plus its bullet line when it renders as an item.
fn placement(meta: &MetaRecord, options: &ComposeOptions) -> (String, Option<String>) {
    match meta {
        MetaRecord::Param(p) => {
            let title = if p.args.first().map(String::as_str) == Some(TYPE_PARAM_KEY) {
                "Type Parameters"
            } else {
                "Arguments"
            };
            let desc = with_default(p.description.as_deref(), p.default.as_deref(), extract_default);
            (title.to_string(), Some(bullet(&p.arg_name, desc.as_deref(), options)))
        }
        MetaRecord::Returns(r) => {
            let title = if r.is_generator { "Yields" } else { "Returns" };
            let item = r
                .type_name
                .as_deref()
                .map(|t| bullet(t, r.description.as_deref(), options));
            (title.to_string(), item)
        }
        MetaRecord::Raises(r) => {
            let item = r
                .type_name
                .as_deref()
                .map(|t| bullet(t, r.description.as_deref(), options));
            ("Errors".to_string(), item)
        }
        MetaRecord::Deprecated(_) => ("Deprecated".to_string(), None),
        MetaRecord::Generic(m) => {
            let key = m.args.first().map(String::as_str).unwrap_or("notes");
            (title_from_key(key), None)
        }
    }
}

/// Free-text body of a section that is not itemized.
fn body(meta: &MetaRecord) -> Option<String> {
    match meta {
        MetaRecord::Deprecated(d) => {
            let text: Vec<&str> = d
                .version
                .as_deref()
                .into_iter()
                .chain(d.description.as_deref())
                .collect();
            (!text.is_empty()).then(|| text.join(" "))
        }
        other => other.description().map(str::to_string),
    }
}

fn bullet(name: &str, desc: Option<&str>, options: &ComposeOptions) -> String {
    match desc {
        Some(_) => format!("* `{}` -{}", name, tag_description(desc, options)),
        None => format!("* `{}`", name),
    }
}
