//! @dose
//! purpose: Composer for ReST field lists (`:param T name: desc`, `:returns T: desc`).
//!
//! when-editing:
//!     - !Types containing whitespace go to a separate `:type:`/`:rtype:` field, since the
//!       parser splits the field head on whitespace
//!     - Expanded rendering always uses the separate type fields

use super::{description_parts, finish, keyword, tag_description, with_default};
use crate::parser::common::extract_default;
use crate::types::{
    ComposeOptions, Docstring, MetaRecord, RenderingStyle, DEPRECATION_KEYWORDS, PARAM_KEYWORDS,
    RAISES_KEYWORDS, RETURNS_KEYWORDS, YIELDS_KEYWORDS,
};

/// Compose a ReST field-list docstring.
///
/// Types that contain whitespace cannot sit inside the field head, so they go to a separate
/// `:type:`/`:rtype:` field; expanded rendering always does this.
pub fn compose_rest(doc: &Docstring, options: &ComposeOptions) -> String {
    let mut parts = description_parts(doc);
    let expanded = options.rendering == RenderingStyle::Expanded;

    for meta in &doc.meta {
        match meta {
            MetaRecord::Param(p) => {
                let key = keyword(&p.args, PARAM_KEYWORDS, "param");
                let desc = with_default(p.description.as_deref(), p.default.as_deref(), extract_default);
                let type_text = p.type_name.as_ref().map(|t| {
                    if p.is_optional == Some(true) {
                        format!("{}?", t)
                    } else {
                        t.clone()
                    }
                });
                let body = tag_description(desc.as_deref(), options);
                match type_text {
                    Some(t) if !expanded && !t.contains(char::is_whitespace) => {
                        parts.push(format!(":{} {} {}:{}", key, t, p.arg_name, body));
                    }
                    Some(t) => {
                        parts.push(format!(":{} {}:{}", key, p.arg_name, body));
                        parts.push(format!(":type {}: {}", p.arg_name, t));
                    }
                    None => parts.push(format!(":{} {}:{}", key, p.arg_name, body)),
                }
            }
            MetaRecord::Returns(r) => {
                let (family, fallback, type_field) = if r.is_generator {
                    (YIELDS_KEYWORDS, "yields", "ytype")
                } else {
                    (RETURNS_KEYWORDS, "returns", "rtype")
                };
                let key = keyword(&r.args, family, fallback);
                let body = tag_description(r.description.as_deref(), options);
                match &r.type_name {
                    Some(t) if !expanded && !t.contains(char::is_whitespace) => {
                        parts.push(format!(":{} {}:{}", key, t, body));
                    }
                    Some(t) => {
                        parts.push(format!(":{}:{}", key, body));
                        parts.push(format!(":{}: {}", type_field, t));
                    }
                    None => parts.push(format!(":{}:{}", key, body)),
                }
            }
            MetaRecord::Raises(r) => {
                let key = keyword(&r.args, RAISES_KEYWORDS, "raises");
                let body = tag_description(r.description.as_deref(), options);
                match &r.type_name {
                    Some(t) => parts.push(format!(":{} {}:{}", key, t, body)),
                    None => parts.push(format!(":{}:{}", key, body)),
                }
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
                parts.push(format!(":{}:{}", key, tag_description(text.as_deref(), options)));
            }
            MetaRecord::Generic(m) => {
                let body = tag_description(m.description.as_deref(), options);
                parts.push(format!(":{}:{}", m.args.join(" "), body));
            }
        }
    }

    finish(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DocstringParser, RestParser};

    fn roundtrip(text: &str, rendering: RenderingStyle) -> String {
        let doc = RestParser::new().parse(text).unwrap();
        compose_rest(&doc, &ComposeOptions::with_rendering(rendering))
    }

    #[test]
    fn test_compose_empty() {
        assert_eq!(compose_rest(&Docstring::default(), &ComposeOptions::default()), "");
    }

    #[test]
    fn test_compose_compact() {
        let text = "Short.\n\nLong\ntext.\n\n:param int? x: the x,\n    multi\n:param y: the y\n:returns str: out\n:raises ValueError: when bad";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }

    #[test]
    fn test_compose_expanded() {
        let text = "Short.\n\n:param str? name: who\n:returns int: count";
        let expected = "Short.\n\n:param name:\n    who\n:type name: str?\n:returns:\n    count\n:rtype: int";
        assert_eq!(roundtrip(text, RenderingStyle::Expanded), expected);
        assert_eq!(roundtrip(expected, RenderingStyle::Expanded), expected);
    }

    #[test]
    fn test_compose_spaced_type_uses_type_field() {
        let text = ":param x: the x\n:type x: Dict[str, int]";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }

    #[test]
    fn test_compose_deprecated_and_generic() {
        let text = ":deprecated: 1.0 use y\n:meta private: yes";
        assert_eq!(roundtrip(text, RenderingStyle::Clean), text);
    }

    #[test]
    fn test_compose_adds_default_phrase() {
        let mut doc = RestParser::new().parse(":param int x: the x").unwrap();
        if let MetaRecord::Param(p) = &mut doc.meta[0] {
            p.default = Some("3".into());
        }
        assert_eq!(
            compose_rest(&doc, &ComposeOptions::default()),
            ":param int x: the x, defaults to 3."
        );
    }
}
