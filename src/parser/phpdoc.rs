//! @dose
//! purpose: PHPDoc tags: `@param Type $name desc`, `@return Type desc`, `@throws Type desc`,
//!     `@var Type`, `@deprecated [version] desc`, plus the `@global` and `@property*` variants
//!     that name a variable.
//!
//! when-editing:
//!     - !Variable names keep their meaning without the `$`; args keep the raw `$name` token
//!
//! gotchas:
//!     - PHPDoc has no optional marker, so is_optional stays None
//!     - `@return` always reads its first word as the type

use super::common::{
    apply_description, classify, extract_default, extract_version, marker_offsets, split_at,
    TagKind,
};
use super::{DocstringParser, ParseError};
use crate::text::{clean_doc, reflow};
use crate::types::{
    Docstring, DocstringDeprecated, DocstringMeta, DocstringParam, DocstringRaises,
    DocstringReturns, DocstringStyle, MetaRecord,
};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^@").unwrap());

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@([\w-]+)").unwrap());

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*(\S+)").unwrap());

static VARIABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^&?(?:\.\.\.)?\$(\w+)$").unwrap());

const PARAM_ALIASES: &[&str] = &["global", "property", "property-read", "property-write"];
const RAISES_ALIASES: &[&str] = &["throws", "throw"];
const VAR_TAG: &str = "var";

pub struct PhpdocParser;

impl PhpdocParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PhpdocParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocstringParser for PhpdocParser {
    fn style(&self) -> DocstringStyle {
        DocstringStyle::Phpdoc
    }

    fn parse(&self, text: &str) -> Result<Docstring, ParseError> {
        let mut doc = Docstring::new(DocstringStyle::Phpdoc);
        let text = clean_doc(text);
        if text.is_empty() {
            return Ok(doc);
        }

        let starts = marker_offsets(&TAG_START, &text);
        let desc_end = starts.first().copied().unwrap_or(text.len());
        apply_description(&mut doc, &text[..desc_end]);

        for chunk in split_at(&text, &starts) {
            doc.meta.push(build_meta(chunk)?);
        }
        Ok(doc)
    }
}

/// Next whitespace-delimited word on the current line and the text after it.
fn next_token(text: &str) -> Option<(&str, &str)> {
    let caps = TOKEN.captures(text)?;
    let token = caps.get(1)?;
    Some((token.as_str(), &text[token.end()..]))
}

fn build_meta(chunk: &str) -> Result<MetaRecord, ParseError> {
    let caps = TAG
        .captures(chunk)
        .ok_or_else(|| ParseError::malformed(chunk.trim_end()))?;
    let tag = caps[1].to_string();
    let rest = &chunk[caps[0].len()..];

    let record = match classify(&tag, PARAM_ALIASES, RAISES_ALIASES) {
        TagKind::Param => {
            let missing = || ParseError::arity(&tag, "a type and a $variable", chunk.trim_end());
            let (first, after) = next_token(rest).ok_or_else(missing)?;
            let (type_name, variable, after) = if VARIABLE.is_match(first) {
                (None, first, after)
            } else {
                let (variable, after) = next_token(after)
                    .filter(|(v, _)| VARIABLE.is_match(v))
                    .ok_or_else(missing)?;
                (Some(first.to_string()), variable, after)
            };
            let arg_name = VARIABLE
                .captures(variable)
                .map(|c| c[1].to_string())
                .unwrap_or_default();
            let desc = reflow(after);
            let default = extract_default(&desc);

            let mut args = vec![tag.clone()];
            args.extend(type_name.clone());
            args.push(variable.to_string());
            DocstringParam::new(args, Some(desc), arg_name, type_name, None, default).into()
        }
        TagKind::Returns { generator } => {
            let (type_name, desc) = split_type(rest);
            let mut args = vec![tag.clone()];
            args.extend(type_name.clone());
            DocstringReturns::new(args, Some(desc), type_name, generator, None).into()
        }
        TagKind::Raises => {
            let (type_name, desc) = split_type(rest);
            let mut args = vec![tag.clone()];
            args.extend(type_name.clone());
            DocstringRaises::new(args, Some(desc), type_name).into()
        }
        TagKind::Deprecated => {
            let (version, text) = extract_version(&reflow(rest));
            DocstringDeprecated::new(vec![tag.clone()], text, version).into()
        }
        TagKind::Generic if tag == VAR_TAG => {
            let (type_name, desc) = split_type(rest);
            let mut args = vec![tag.clone()];
            args.extend(type_name);
            DocstringMeta::new(args, Some(desc)).into()
        }
        TagKind::Generic => DocstringMeta::new(vec![tag.clone()], Some(reflow(rest))).into(),
    };
    Ok(record)
}

fn split_type(rest: &str) -> (Option<String>, String) {
    match next_token(rest) {
        Some((type_name, after)) => (Some(type_name.to_string()), reflow(after)),
        None => (None, reflow(rest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Docstring, ParseError> {
        PhpdocParser::new().parse(text)
    }

    #[test]
    fn test_params() {
        let doc = parse(
            "Sends mail.\n\n@param string $to Recipient.\n@param array|null $headers Extra headers,\n    defaults to null.\n@param $raw Untyped.",
        )
        .unwrap();
        let params = doc.params();
        assert_eq!(params[0].arg_name, "to");
        assert_eq!(params[0].type_name.as_deref(), Some("string"));
        assert_eq!(params[0].args, vec!["param", "string", "$to"]);
        assert_eq!(params[0].is_optional, None);
        assert_eq!(params[1].default.as_deref(), Some("null"));
        assert_eq!(params[2].type_name, None);
        assert_eq!(params[2].arg_name, "raw");
    }

    #[test]
    fn test_missing_variable() {
        let err = parse("@param string Recipient.").unwrap_err();
        assert!(matches!(err, ParseError::Arity { .. }));
        assert!(parse("@param").is_err());
    }

    #[test]
    fn test_returns_throws_var() {
        let doc = parse("@return bool True on success.\n@throws InvalidArgumentException If bad.\n@var int").unwrap();
        let r = doc.returns().unwrap();
        assert_eq!(r.type_name.as_deref(), Some("bool"));
        assert_eq!(r.description.as_deref(), Some("True on success."));
        assert_eq!(doc.raises()[0].type_name.as_deref(), Some("InvalidArgumentException"));
        assert_eq!(doc.meta[2].args(), ["var", "int"]);
        assert_eq!(doc.meta[2].description(), None);
    }

    #[test]
    fn test_property_and_deprecated() {
        let doc = parse("@property-read int $id Identifier.\n@deprecated 1.2.0 Use getId().").unwrap();
        assert_eq!(doc.params()[0].args[0], "property-read");
        let d = doc.deprecation().unwrap();
        assert_eq!(d.version.as_deref(), Some("1.2.0"));
        assert_eq!(d.description.as_deref(), Some("Use getId()."));
    }
}
