//! @dose
//! purpose: Composer for JSDoc tags.
//!
//! when-editing:
//!     - !Compact writes optional params as `{T=} name`, clean and expanded as `[name]`;
//!       a default always forces `[name=default]`

use super::{description_parts, finish, keyword, tag_description};
use crate::types::{
    ComposeOptions, Docstring, MetaRecord, RenderingStyle, DEPRECATION_KEYWORDS, PARAM_KEYWORDS,
    RETURNS_KEYWORDS, YIELDS_KEYWORDS,
};

/// Compose a JSDoc docstring.
///
/// Optional typed parameters use the `{T=}` marker in compact rendering and a bracketed name
/// otherwise; a known default always goes into `[name=default]`.
pub fn compose_jsdoc(doc: &Docstring, options: &ComposeOptions) -> String {
    let mut parts = description_parts(doc);

    for meta in &doc.meta {
        let line = match meta {
            MetaRecord::Param(p) => {
                let key = match p.args.first() {
                    Some(k) if PARAM_KEYWORDS.contains(&k.as_str()) || k == "property" || k == "prop" => {
                        k.as_str()
                    }
                    _ => "param",
                };
                let optional = p.is_optional == Some(true);
                let bracketed = p.default.is_some()
                    || (optional
                        && (p.type_name.is_none() || options.rendering != RenderingStyle::Compact));
                let mut head = format!("@{}", key);
                if let Some(t) = &p.type_name {
                    let marker = if optional && !bracketed { "=" } else { "" };
                    head = format!("{} {{{}{}}}", head, t, marker);
                }
                let name = match (&p.default, bracketed) {
                    (Some(default), _) => format!("[{}={}]", p.arg_name, default),
                    (None, true) => format!("[{}]", p.arg_name),
                    (None, false) => p.arg_name.clone(),
                };
                match p.description.as_deref() {
                    Some(desc) => format!(
                        "{} {} -{}",
                        head,
                        name,
                        tag_description(Some(desc), options)
                    ),
                    None => format!("{} {}", head, name),
                }
            }
            MetaRecord::Returns(r) => {
                let key = if r.is_generator {
                    keyword(&r.args, YIELDS_KEYWORDS, "yields")
                } else {
                    keyword(&r.args, RETURNS_KEYWORDS, "returns")
                };
                typed_tag(key, r.type_name.as_deref(), r.description.as_deref(), options)
            }
            MetaRecord::Raises(r) => {
                let key = keyword(&r.args, &["throws", "throw", "exception"], "throws");
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
        Some(t) => format!("@{} {{{}}}{}", key, t, desc),
        None => format!("@{}{}", key, desc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DocstringParser, JsdocParser};

    fn roundtrip(text: &str, rendering: RenderingStyle) -> String {
        let doc = JsdocParser::new().parse(text).unwrap();
        compose_jsdoc(&doc, &ComposeOptions::with_rendering(rendering))
    }

    #[test]
    fn test_compose_compact() {
        let text = "Greets.\n\n@param {string} name - Who.\n@param {number=} times - How often.\n@param {boolean} [loud=false] - Shout.\n@returns {string} The greeting.\n@throws {Error} When bad.";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }

    #[test]
    fn test_compose_clean_brackets_optional() {
        assert_eq!(
            roundtrip("@param {number=} times - How often.", RenderingStyle::Clean),
            "@param {number} [times] - How often."
        );
    }

    #[test]
    fn test_compose_expanded() {
        let text = "@param {string} name - Who.";
        let expected = "@param {string} name -\n    Who.";
        assert_eq!(roundtrip(text, RenderingStyle::Expanded), expected);
        assert_eq!(roundtrip(expected, RenderingStyle::Expanded), expected);
    }

    #[test]
    fn test_compose_adds_separator() {
        assert_eq!(
            roundtrip("@param x The x.", RenderingStyle::Compact),
            "@param x - The x."
        );
    }
}
