//! @dose
//! purpose: Composer for PHPDoc tags (`@param Type $name desc`).
//!
//! gotchas:
//!     - An untyped return or throws moves its description to the next line so the first word
//!       is not read back as a type

use super::{description_parts, finish, keyword, tag_description, with_default};
use crate::parser::common::extract_default;
use crate::text::indent_lines;
use crate::types::{
    ComposeOptions, Docstring, MetaRecord, DEPRECATION_KEYWORDS, RETURNS_KEYWORDS, YIELDS_KEYWORDS,
};

const VARIABLE_TAGS: &[&str] = &["param", "global", "property", "property-read", "property-write"];

/// Compose a PHPDoc docstring.
///
/// `@return` and `@throws` read their first word as a type, so an untyped description is moved
/// to the next line where it cannot be mistaken for one.
pub fn compose_phpdoc(doc: &Docstring, options: &ComposeOptions) -> String {
    let mut parts = description_parts(doc);

    for meta in &doc.meta {
        let line = match meta {
            MetaRecord::Param(p) => {
                let key = keyword(&p.args, VARIABLE_TAGS, "param");
                let desc = with_default(p.description.as_deref(), p.default.as_deref(), extract_default);
                let variable = format!("${}", p.arg_name);
                let head = match &p.type_name {
                    Some(t) => format!("@{} {} {}", key, t, variable),
                    None => format!("@{} {}", key, variable),
                };
                format!("{}{}", head, tag_description(desc.as_deref(), options))
            }
            MetaRecord::Returns(r) => {
                let key = if r.is_generator {
                    keyword(&r.args, YIELDS_KEYWORDS, "yield")
                } else {
                    keyword(&r.args, RETURNS_KEYWORDS, "return")
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
    match (type_name, desc) {
        (Some(t), desc) => format!("@{} {}{}", key, t, tag_description(desc, options)),
        (None, Some(desc)) => format!("@{}\n{}", key, indent_lines(desc, &options.indent)),
        (None, None) => format!("@{}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DocstringParser, PhpdocParser};
    use crate::types::{DocstringReturns, RenderingStyle};

    fn roundtrip(text: &str, rendering: RenderingStyle) -> String {
        let doc = PhpdocParser::new().parse(text).unwrap();
        compose_phpdoc(&doc, &ComposeOptions::with_rendering(rendering))
    }

    #[test]
    fn test_compose_compact() {
        let text = "Sends mail.\n\n@param string $to Recipient.\n@param $raw Untyped.\n@property-read int $id Identifier.\n@return bool True on success.\n@throws InvalidArgumentException If bad.\n@var int\n@deprecated 1.2.0 Use send().";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }

    #[test]
    fn test_compose_expanded() {
        let text = "@param string $to Recipient.";
        let expected = "@param string $to\n    Recipient.";
        assert_eq!(roundtrip(text, RenderingStyle::Expanded), expected);
        assert_eq!(roundtrip(expected, RenderingStyle::Expanded), expected);
    }

    #[test]
    fn test_compose_untyped_return_moves_description() {
        let mut doc = Docstring::default();
        doc.meta.push(
            DocstringReturns::new(vec!["returns".into()], Some("The total.".into()), None, false, None)
                .into(),
        );
        let text = compose_phpdoc(&doc, &ComposeOptions::default());
        assert_eq!(text, "@returns\n    The total.");
        let reparsed = PhpdocParser::new().parse(&text).unwrap();
        assert_eq!(reparsed.returns().unwrap().type_name, None);
        assert_eq!(reparsed.returns().unwrap().description.as_deref(), Some("The total."));
    }
}
