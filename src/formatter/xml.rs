//! @dose
//! purpose: Composer for C# XML documentation elements.
//!
//! gotchas:
//!     - Content is written raw, so text from other conventions containing `<` may not read
//!       back as XML

use super::{finish, with_default};
use crate::parser::common::extract_default;
use crate::text::indent_lines;
use crate::types::{ComposeOptions, Docstring, MetaRecord, RenderingStyle};

const FALLBACK_ELEMENT: &str = "note";

/// Compose C# XML documentation elements.
///
/// The short description goes in `<summary>` together with a long description that directly
/// follows it; a long description set off by a blank line goes in `<remarks>`. Types are not
/// representable and are dropped.
pub fn compose_xml(doc: &Docstring, options: &ComposeOptions) -> String {
    let mut parts = Vec::new();

    let (summary, remarks) = match (&doc.short_description, &doc.long_description) {
        (Some(short), Some(long)) if !doc.blank_after_short_description => {
            (Some(format!("{}\n{}", short, long)), None)
        }
        (short, long) => (short.clone(), long.clone()),
    };
    if let Some(summary) = summary {
        parts.push(element("summary", &[], Some(&summary), options));
    }
    if let Some(remarks) = remarks {
        parts.push(element("remarks", &[], Some(&remarks), options));
    }

    for meta in &doc.meta {
        let line = match meta {
            MetaRecord::Param(p) => {
                let tag = if p.args.first().map(String::as_str) == Some("typeparam") {
                    "typeparam"
                } else {
                    "param"
                };
                let desc = with_default(p.description.as_deref(), p.default.as_deref(), extract_default);
                element(tag, &[("name", p.arg_name.as_str())], desc.as_deref(), options)
            }
            MetaRecord::Returns(r) => element("returns", &[], r.description.as_deref(), options),
            MetaRecord::Raises(r) => {
                let attributes: Vec<(&str, &str)> =
                    r.type_name.as_deref().map(|t| ("cref", t)).into_iter().collect();
                element("exception", &attributes, r.description.as_deref(), options)
            }
            MetaRecord::Deprecated(d) => {
                let attributes: Vec<(&str, &str)> =
                    d.version.as_deref().map(|v| ("version", v)).into_iter().collect();
                element("deprecated", &attributes, d.description.as_deref(), options)
            }
            MetaRecord::Generic(m) => {
                let name = match m.args.first() {
                    Some(key) if is_element_name(key) => key.as_str(),
                    _ => FALLBACK_ELEMENT,
                };
                let attributes: Vec<(&str, &str)> = m
                    .args
                    .iter()
                    .skip(1)
                    .filter_map(|arg| arg.split_once('='))
                    .collect();
                element(name, &attributes, m.description.as_deref(), options)
            }
        };
        parts.push(line);
    }

    finish(parts)
}

fn element(name: &str, attributes: &[(&str, &str)], content: Option<&str>, options: &ComposeOptions) -> String {
    let mut open = format!("<{}", name);
    for (key, value) in attributes {
        open.push_str(&format!(" {}=\"{}\"", key, value.replace('"', "&quot;")));
    }

    match content {
        None => format!("{}/>", open),
        Some(content) if content.contains('\n') || options.rendering == RenderingStyle::Expanded => {
            format!("{}>\n{}\n</{}>", open, indent_lines(content, &options.indent), name)
        }
        Some(content) => format!("{}>{}</{}>", open, content, name),
    }
}

fn is_element_name(key: &str) -> bool {
    let mut chars = key.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DocstringParser, XmlParser};

    fn roundtrip(text: &str, rendering: RenderingStyle) -> String {
        let doc = XmlParser::new().parse(text).unwrap();
        compose_xml(&doc, &ComposeOptions::with_rendering(rendering))
    }

    #[test]
    fn test_compose_compact() {
        let text = "<summary>Adds two numbers.</summary>\n<remarks>Overflow wraps.</remarks>\n<param name=\"a\">The first.</param>\n<typeparam name=\"T\">Number type.</typeparam>\n<returns>The sum.</returns>\n<exception cref=\"OverflowException\">Never.</exception>\n<seealso cref=\"Sub\"/>";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }

    #[test]
    fn test_compose_multiline_block() {
        let text = "<summary>\n    First line\n    second line.\n</summary>";
        assert_eq!(roundtrip(text, RenderingStyle::Compact), text);
    }

    #[test]
    fn test_compose_expanded() {
        let text = "<param name=\"a\">The first.</param>";
        let expected = "<param name=\"a\">\n    The first.\n</param>";
        assert_eq!(roundtrip(text, RenderingStyle::Expanded), expected);
        assert_eq!(roundtrip(expected, RenderingStyle::Expanded), expected);
    }

    #[test]
    fn test_compose_plain_text() {
        assert_eq!(
            roundtrip("Just text.", RenderingStyle::Clean),
            "<summary>Just text.</summary>"
        );
    }

    #[test]
    fn test_is_element_name() {
        assert!(is_element_name("see_also"));
        assert!(!is_element_name(""));
        assert!(!is_element_name("two words"));
    }
}
