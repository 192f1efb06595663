//! @dose
//! purpose: Composer for epydoc fields. Param types are written as a following `@type` field
//!     and return types as `@rtype`/`@ytype`.

use super::{description_parts, finish, keyword, tag_description, with_default};
use crate::parser::common::extract_default;
use crate::types::{
    ComposeOptions, Docstring, MetaRecord, DEPRECATION_KEYWORDS, RETURNS_KEYWORDS, YIELDS_KEYWORDS,
};

/// Compose an epydoc docstring. Types always go to their own `@type`/`@rtype` field.
pub fn compose_epydoc(doc: &Docstring, options: &ComposeOptions) -> String {
    let mut parts = description_parts(doc);

    for meta in &doc.meta {
        match meta {
            MetaRecord::Param(p) => {
                let key = keyword(&p.args, &["param", "keyword"], "param");
                let desc = with_default(p.description.as_deref(), p.default.as_deref(), extract_default);
                parts.push(format!(
                    "@{} {}:{}",
                    key,
                    p.arg_name,
                    tag_description(desc.as_deref(), options)
                ));
                if let Some(t) = &p.type_name {
                    let marker = if p.is_optional == Some(true) { "?" } else { "" };
                    parts.push(format!("@type {}: {}{}", p.arg_name, t, marker));
                }
            }
            MetaRecord::Returns(r) => {
                let (family, fallback, type_field) = if r.is_generator {
                    (YIELDS_KEYWORDS, "yield", "ytype")
                } else {
                    (RETURNS_KEYWORDS, "return", "rtype")
                };
                if r.description.is_some() || r.type_name.is_none() {
                    let key = keyword(&r.args, family, fallback);
                    parts.push(format!(
                        "@{}:{}",
                        key,
                        tag_description(r.description.as_deref(), options)
                    ));
                }
                if let Some(t) = &r.type_name {
                    parts.push(format!("@{}: {}", type_field, t));
                }
            }
            MetaRecord::Raises(r) => {
                let key = keyword(&r.args, &["raise", "raises"], "raise");
                let head = match &r.type_name {
                    Some(t) => format!("@{} {}:", key, t),
                    None => format!("@{}:", key),
                };
                parts.push(format!("{}{}", head, tag_description(r.description.as_deref(), options)));
            }
            MetaRecord::Deprecated(d) => {
                let key = keyword(&d.args, DEPRECATION_KEYWORDS, "deprecated");
                let text: Vec<&str> = d
                    .version
                    .as_deref()
                    .into_iter()
                    .chain(d.description.as_deref())
                    .collect();
                let text = (!text.is_empty()).then(|| text.join(" "));
                parts.push(format!("@{}:{}", key, tag_description(text.as_deref(), options)));
            }
            MetaRecord::Generic(m) => {
                parts.push(format!(
                    "@{}:{}",
                    m.args.join(" "),
                    tag_description(m.description.as_deref(), options)
                ));
            }
        }
    }

    finish(parts)
}
