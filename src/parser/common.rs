//! @dose
//! purpose: Building blocks shared by the style parsers: description splitting, chunking at
//!     marker offsets, keyword classification and the default/version extractors.
//!
//! when-editing:
//!     - !Keyword sets live in types::docstring; per-style aliases are passed to classify
//!
//! invariants:
//!     - split_at chunks cover the text from the first offset to the end with no gaps

use super::ParseError;
use crate::types::{
    Docstring, DEPRECATION_KEYWORDS, PARAM_KEYWORDS, RAISES_KEYWORDS, RETURNS_KEYWORDS,
    YIELDS_KEYWORDS,
};
use once_cell::sync::Lazy;
use regex::Regex;

static DEFAULT_PHRASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is).*defaults to (.+)").unwrap());

static VERSION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(v?\d+\.[0-9A-Za-z.]+)(?:\s+(.+))?$").unwrap());

/// What a tag keyword means once style aliases are taken into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagKind {
    Param,
    Returns { generator: bool },
    Raises,
    Deprecated,
    Generic,
}

/// Classify `key` against the shared keyword sets plus per-style aliases.
pub(crate) fn classify(key: &str, param_aliases: &[&str], raises_aliases: &[&str]) -> TagKind {
    if PARAM_KEYWORDS.contains(&key) || param_aliases.contains(&key) {
        TagKind::Param
    } else if RETURNS_KEYWORDS.contains(&key) {
        TagKind::Returns { generator: false }
    } else if YIELDS_KEYWORDS.contains(&key) {
        TagKind::Returns { generator: true }
    } else if RAISES_KEYWORDS.contains(&key) || raises_aliases.contains(&key) {
        TagKind::Raises
    } else if DEPRECATION_KEYWORDS.contains(&key) {
        TagKind::Deprecated
    } else {
        TagKind::Generic
    }
}

/// Fill the description fields of `doc` from the text that precedes the first meta marker.
pub(crate) fn apply_description(doc: &mut Docstring, desc_chunk: &str) {
    let (short, rest) = match desc_chunk.split_once('\n') {
        Some((short, rest)) => (short, Some(rest)),
        None => (desc_chunk, None),
    };
    let short = short.trim();
    doc.short_description = (!short.is_empty()).then(|| short.to_string());

    if let Some(rest) = rest {
        doc.blank_after_short_description = rest.starts_with('\n');
        doc.blank_after_long_description = rest.ends_with("\n\n");
        let long = rest.trim();
        doc.long_description = (!long.is_empty()).then(|| long.to_string());
    }
}

/// Slice `text` into chunks that begin at each offset in `starts` (ascending).
pub(crate) fn split_at<'a>(text: &'a str, starts: &[usize]) -> Vec<&'a str> {
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .collect()
}

/// Every line of `text` with the byte offset it starts at.
pub(crate) fn line_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut offset = 0;
    text.split('\n')
        .map(|line| {
            let start = offset;
            offset += line.len() + 1;
            (start, line)
        })
        .collect()
}

/// Byte offsets of every match of `marker` in `text`.
pub(crate) fn marker_offsets(marker: &Regex, text: &str) -> Vec<usize> {
    marker.find_iter(text).map(|m| m.start()).collect()
}

/// Value of a "defaults to X" phrase, trailing periods stripped.
pub(crate) fn extract_default(desc: &str) -> Option<String> {
    let caps = DEFAULT_PHRASE.captures(desc)?;
    let value = caps[1].trim().trim_end_matches('.').trim_end();
    (!value.is_empty()).then(|| value.to_string())
}

/// Split a deprecation body into a leading version token and the remaining text.
pub(crate) fn extract_version(desc: &str) -> (Option<String>, Option<String>) {
    let desc = desc.trim();
    match VERSION_PREFIX.captures(desc) {
        Some(caps) => (
            Some(caps[1].to_string()),
            caps.get(2).map(|m| m.as_str().trim().to_string()),
        ),
        None => (None, (!desc.is_empty()).then(|| desc.to_string())),
    }
}

/// Strip a trailing optional marker (`?` or `=`), reporting whether it was present.
pub(crate) fn strip_optional_marker(token: &str, marker: char) -> (&str, bool) {
    match token.strip_suffix(marker) {
        Some(stripped) => (stripped, true),
        None => (token, false),
    }
}

/// Read an `open ... close` group at the start of `text` (spaces and tabs skipped), balancing
/// nested pairs. Returns the inner text and the remainder after the closing delimiter, `None`
/// when `text` does not start with `open`, and a malformed-chunk error when it is never closed.
pub(crate) fn read_balanced<'a>(
    text: &'a str,
    open: char,
    close: char,
    chunk: &str,
) -> Result<Option<(&'a str, &'a str)>, ParseError> {
    let trimmed = text.trim_start_matches([' ', '\t']);
    if !trimmed.starts_with(open) {
        return Ok(None);
    }
    let mut depth = 0usize;
    for (i, ch) in trimmed.char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                let inner = &trimmed[open.len_utf8()..i];
                return Ok(Some((inner, &trimmed[i + close.len_utf8()..])));
            }
        }
    }
    Err(ParseError::malformed(chunk.trim_end()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_description_blank_flags() {
        let mut doc = Docstring::default();
        apply_description(&mut doc, "Short\n\nLong");
        assert_eq!(doc.short_description.as_deref(), Some("Short"));
        assert_eq!(doc.long_description.as_deref(), Some("Long"));
        assert!(doc.blank_after_short_description);
        assert!(!doc.blank_after_long_description);

        let mut doc = Docstring::default();
        apply_description(&mut doc, "Short\nLong\n\n");
        assert!(!doc.blank_after_short_description);
        assert!(doc.blank_after_long_description);
    }

    #[test]
    fn test_apply_description_empty() {
        let mut doc = Docstring::default();
        apply_description(&mut doc, "");
        assert_eq!(doc.short_description, None);
        assert_eq!(doc.long_description, None);
    }

    #[test]
    fn test_split_at() {
        let text = "aa:bb:cc";
        assert_eq!(split_at(text, &[0, 3, 6]), vec!["aa:", "bb:", "cc"]);
        assert!(split_at(text, &[]).is_empty());
    }

    #[test]
    fn test_extract_default() {
        assert_eq!(
            extract_default("description, defaults to 'hi'").as_deref(),
            Some("'hi'")
        );
        assert_eq!(extract_default("Defaults to 5.").as_deref(), Some("5"));
        assert_eq!(extract_default("no default here"), None);
    }

    #[test]
    fn test_extract_version() {
        assert_eq!(
            extract_version("1.6.0 Use bar instead"),
            (Some("1.6.0".into()), Some("Use bar instead".into()))
        );
        assert_eq!(extract_version("v2.0"), (Some("v2.0".into()), None));
        assert_eq!(extract_version("Use bar"), (None, Some("Use bar".into())));
    }

    #[test]
    fn test_read_balanced() {
        assert_eq!(
            read_balanced(" {a{b}c} rest", '{', '}', "").unwrap(),
            Some(("a{b}c", " rest"))
        );
        assert_eq!(read_balanced("name", '{', '}', "").unwrap(), None);
        assert!(read_balanced("[Array<String>", '[', ']', "@x").is_err());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("param", &[], &[]), TagKind::Param);
        assert_eq!(classify("prop", &["prop"], &[]), TagKind::Param);
        assert_eq!(classify("yields", &[], &[]), TagKind::Returns { generator: true });
        assert_eq!(classify("throws", &[], &["throws"]), TagKind::Raises);
        assert_eq!(classify("deprecated", &[], &[]), TagKind::Deprecated);
        assert_eq!(classify("note", &[], &[]), TagKind::Generic);
    }
}
