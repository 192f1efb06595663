//! @dose
//! purpose: Composer for YARD tags; the type list always follows the name.

use super::{description_parts, finish, keyword, tag_description, with_default};
use crate::parser::common::extract_default;
use crate::types::{ComposeOptions, Docstring, MetaRecord, DEPRECATION_KEYWORDS, RETURNS_KEYWORDS};

/// Compose YARD tags. Optional parameters are written as `@option`.
pub fn compose_rdoc(doc: &Docstring, options: &ComposeOptions) -> String {
    let mut parts = description_parts(doc);

    for meta in &doc.meta {
        let line = match meta {
            MetaRecord::Param(p) => {
                let key = if p.is_optional == Some(true) {
                    "option"
                } else {
                    keyword(&p.args, &["param", "yieldparam", "attr"], "param")
                };
                let desc = with_default(p.description.as_deref(), p.default.as_deref(), extract_default);
                let head = match &p.type_name {
                    Some(t) => format!("@{} {} [{}]", key, p.arg_name, t),
                    None => format!("@{} {}", key, p.arg_name),
                };
                format!("{}{}", head, tag_description(desc.as_deref(), options))
            }
            MetaRecord::Returns(r) => {
                let key = if r.is_generator {
                    keyword(&r.args, &["yield", "yields", "yieldreturn"], "yieldreturn")
                } else {
                    keyword(&r.args, RETURNS_KEYWORDS, "return")
                };
                typed_tag(key, r.type_name.as_deref(), r.description.as_deref(), options)
            }
            MetaRecord::Raises(r) => {
                let key = keyword(&r.args, &["raise", "raises", "throws"], "raise");
                typed_tag(key, r.type_name.as_deref(), r.description.as_deref(), options)
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
                format!("@{}{}", key, tag_description(text.as_deref(), options))
            }
            MetaRecord::Generic(m) => {
                format!("@{}{}", m.args.join(" "), tag_description(m.description.as_deref(), options))
            }
        };
        parts.push(line);
    }

    finish(parts)
}

fn typed_tag(key: &str, type_name: Option<&str>, desc: Option<&str>, options: &ComposeOptions) -> String {
    let desc = tag_description(desc, options);
    match type_name {
        Some(t) => format!("@{} [{}]{}", key, t, desc),
        None => format!("@{}{}", key, desc),
    }
}
