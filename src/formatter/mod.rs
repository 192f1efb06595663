//! @dose
//! purpose: Composers turn a Docstring back into text in a given convention. Each style has
//!     one compose function; the helpers here handle the parts every style shares (the
//!     description block, description placement, default-value phrases).
//!
//! when-editing:
//!     - !Output of a composer must re-parse to the same Docstring fields with the same
//!       style's parser, so compose(parse(compose(parse(t)))) == compose(parse(t))
//!     - !Keep each composer in sync with its parser module in src/parser/
//!
//! invariants:
//!     - An empty Docstring composes to ""
//!     - Trailing blank lines are never emitted
//!     - Empty lines inside descriptions are never indented
//!
//! gotchas:
//!     - Sections separated by a blank line make the parser see blank_after_long_description,
//!       so section separators reuse an existing trailing blank instead of adding a second one

mod doxygen;
mod epydoc;
pub(crate) mod google;
mod jsdoc;
mod numpydoc;
mod phpdoc;
mod rdoc;
mod rest;
mod rustdoc;
mod xml;

use crate::text::{indent_continuation, indent_lines};
use crate::types::{ComposeOptions, Docstring, RenderingStyle};

pub use doxygen::compose_doxygen;
pub use epydoc::compose_epydoc;
pub use google::compose_google;
pub use jsdoc::compose_jsdoc;
pub use numpydoc::compose_numpydoc;
pub use phpdoc::compose_phpdoc;
pub use rdoc::compose_rdoc;
pub use rest::compose_rest;
pub use rustdoc::compose_rustdoc;
pub use xml::compose_xml;

/// Signature shared by every composer.
pub type ComposeFn = fn(&Docstring, &ComposeOptions) -> String;

/// Short description, long description and the blank lines recorded around them.
pub(crate) fn description_parts(doc: &Docstring) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(short) = &doc.short_description {
        parts.push(short.clone());
        if doc.blank_after_short_description {
            parts.push(String::new());
        }
    }
    if let Some(long) = &doc.long_description {
        parts.push(long.clone());
    }
    let has_description = doc.short_description.is_some() || doc.long_description.is_some();
    if doc.blank_after_long_description && has_description && !ends_blank(&parts) {
        parts.push(String::new());
    }
    parts
}

/// Push a blank separator unless the output is empty or already ends with one.
pub(crate) fn separate(parts: &mut Vec<String>) {
    if !parts.is_empty() && !ends_blank(parts) {
        parts.push(String::new());
    }
}

fn ends_blank(parts: &[String]) -> bool {
    parts.last().is_some_and(|p| p.is_empty())
}

/// Drop trailing blank parts and join with newlines.
pub(crate) fn finish(mut parts: Vec<String>) -> String {
    while ends_blank(&parts) {
        parts.pop();
    }
    parts.join("\n")
}

/// Description text to place after a tag head that ends with a separator.
///
/// Compact and clean keep the first line on the tag line and indent the rest; expanded moves
/// the whole description to indented lines below.
pub(crate) fn tag_description(desc: Option<&str>, options: &ComposeOptions) -> String {
    match desc {
        None => String::new(),
        Some(desc) if options.rendering == RenderingStyle::Expanded => {
            format!("\n{}", indent_lines(desc, &options.indent))
        }
        Some(desc) => format!(" {}", indent_continuation(desc, &options.indent)),
    }
}

/// The description of a parameter with its default spelled out, unless `existing` already
/// finds that default in it.
pub(crate) fn with_default(
    desc: Option<&str>,
    default: Option<&str>,
    existing: fn(&str) -> Option<String>,
) -> Option<String> {
    let Some(default) = default else {
        return desc.map(str::to_string);
    };
    match desc {
        Some(desc) if existing(desc).as_deref() == Some(default) => Some(desc.to_string()),
        Some(desc) if desc.trim_end().ends_with('.') => {
            Some(format!("{} Defaults to {}.", desc.trim_end(), default))
        }
        Some(desc) => Some(format!("{}, defaults to {}.", desc, default)),
        None => Some(format!("Defaults to {}.", default)),
    }
}

/// Keyword to emit for a record: its own when it belongs to `family`, otherwise `fallback`.
pub(crate) fn keyword<'a>(args: &'a [String], family: &[&str], fallback: &'a str) -> &'a str {
    match args.first() {
        Some(key) if family.contains(&key.as_str()) => key,
        _ => fallback,
    }
}

/// Section title for a record key: `see_also` becomes `See Also`.
pub(crate) fn title_from_key(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::common::extract_default;

    #[test]
    fn test_description_parts() {
        let doc = Docstring {
            short_description: Some("Short".into()),
            long_description: Some("Long".into()),
            blank_after_short_description: true,
            blank_after_long_description: true,
            ..Docstring::default()
        };
        assert_eq!(description_parts(&doc), vec!["Short", "", "Long", ""]);
        assert_eq!(finish(description_parts(&doc)), "Short\n\nLong");
        assert_eq!(finish(description_parts(&Docstring::default())), "");
    }

    #[test]
    fn test_separate_does_not_double() {
        let mut parts = vec!["a".to_string(), String::new()];
        separate(&mut parts);
        assert_eq!(parts.len(), 2);
        let mut empty: Vec<String> = Vec::new();
        separate(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_tag_description() {
        let compact = ComposeOptions::default();
        assert_eq!(tag_description(Some("a\nb"), &compact), " a\n    b");
        let expanded = ComposeOptions::with_rendering(RenderingStyle::Expanded);
        assert_eq!(tag_description(Some("a\nb"), &expanded), "\n    a\n    b");
        assert_eq!(tag_description(None, &compact), "");
    }

    #[test]
    fn test_title_from_key() {
        assert_eq!(title_from_key("see_also"), "See Also");
        assert_eq!(title_from_key("notes"), "Notes");
    }

    #[test]
    fn test_with_default() {
        assert_eq!(
            with_default(Some("x, defaults to 3"), Some("3"), extract_default).as_deref(),
            Some("x, defaults to 3")
        );
        assert_eq!(
            with_default(Some("The x."), Some("3"), extract_default).as_deref(),
            Some("The x. Defaults to 3.")
        );
        assert_eq!(
            with_default(None, Some("3"), extract_default).as_deref(),
            Some("Defaults to 3.")
        );
        assert_eq!(with_default(Some("x"), None, extract_default).as_deref(), Some("x"));
    }
}
