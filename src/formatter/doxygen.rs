//! @dose
//! purpose: Composer for doxygen commands, always spelled with `@`.
//!
//! gotchas:
//!     - Doxygen has no syntax for types; they are dropped

use super::{description_parts, finish, keyword, tag_description, with_default};
use crate::parser::common::extract_default;
use crate::types::{
    ComposeOptions, Docstring, MetaRecord, DEPRECATION_KEYWORDS, RETURNS_KEYWORDS, YIELDS_KEYWORDS,
};

/// Compose a Doxygen docstring using `@` commands.
///
/// Doxygen has nowhere to put parameter or return types, so those are left out.
pub fn compose_doxygen(doc: &Docstring, options: &ComposeOptions) -> String {
    let mut parts = description_parts(doc);

    for meta in &doc.meta {
        let line = match meta {
            MetaRecord::Param(p) => {
                let key = keyword(&p.args, &["param", "tparam"], "param");
                let direction = p
                    .args
                    .get(1)
                    .filter(|a| a.starts_with('[') && p.args.len() > 2)
                    .map(String::as_str)
                    .unwrap_or_default();
                let desc = with_default(p.description.as_deref(), p.default.as_deref(), extract_default);
                format!(
                    "@{}{} {}{}",
                    key,
                    direction,
                    p.arg_name,
                    tag_description(desc.as_deref(), options)
                )
            }
            MetaRecord::Returns(r) => {
                let desc = tag_description(r.description.as_deref(), options);
                match &r.return_name {
                    Some(name) => format!("@retval {}{}", name, desc),
                    None if r.is_generator => {
                        format!("@{}{}", keyword(&r.args, YIELDS_KEYWORDS, "yield"), desc)
                    }
                    None => format!("@{}{}", keyword(&r.args, RETURNS_KEYWORDS, "return"), desc),
                }
            }
            MetaRecord::Raises(r) => {
                let key = keyword(&r.args, &["throws", "throw", "exception"], "throws");
                let desc = tag_description(r.description.as_deref(), options);
                match &r.type_name {
                    Some(t) => format!("@{} {}{}", key, t, desc),
                    None => format!("@{}{}", key, desc),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DocstringParser, DoxygenParser};
    use crate::types::RenderingStyle;

    fn roundtrip(text: &str, rendering: RenderingStyle) -> String {
        let doc = DoxygenParser::new().parse(text).unwrap();
        compose_doxygen(&doc, &ComposeOptions::with_rendering(rendering))
    }

    #[test]
    fn test_compose_compact() {
        let text = "Compute.\n\n@param n The count.\n@param[in] m Input.\n@tparam T Element type.\n@return The total.\n@retval 0 Success.\n@throws IOException On error.\n@deprecated 3.1 Use bar.";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }

    #[test]
    fn test_compose_backslash_becomes_at() {
        assert_eq!(roundtrip("\\param x The x.", RenderingStyle::Compact), "@param x The x.");
    }

    #[test]
    fn test_compose_expanded() {
        let text = "@param n The count.";
        let expected = "@param n\n    The count.";
        assert_eq!(roundtrip(text, RenderingStyle::Expanded), expected);
        assert_eq!(roundtrip(expected, RenderingStyle::Expanded), expected);
    }
}
