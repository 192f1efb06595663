//! @dose
//! purpose: Doxygen/Javadoc commands (`@param`, `\param`, `@tparam`, `@return`, `@retval`,
//!     `@throws`, `@brief`, `@deprecated`). Either `@` or `\` starts a command at the beginning
//!     of a line.
//!
//! when-editing:
//!     - !`@brief` is folded into the short description, it never becomes a record
//!     - Direction markers (`@param[in]` or `@param [out] x`) stay in args between key and name
//!
//! gotchas:
//!     - Doxygen has no parameter types, so Param records always have type_name None
//!     - `@retval value desc` is a Returns record named after the value

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

static COMMAND_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[@\\]\w").unwrap());

static COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[@\\](\w+)(\[[^\]\n]*\])?").unwrap());

static NAMED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(?:(\[[^\]\n]*\])[ \t]*)?([^\s\[]\S*)").unwrap());

const PARAM_ALIASES: &[&str] = &["tparam"];
const RAISES_ALIASES: &[&str] = &["throws", "throw"];
const RETURN_VALUE: &str = "retval";

pub struct DoxygenParser;

impl DoxygenParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DoxygenParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocstringParser for DoxygenParser {
    fn style(&self) -> DocstringStyle {
        DocstringStyle::Doxygen
    }

    fn parse(&self, text: &str) -> Result<Docstring, ParseError> {
        let mut doc = Docstring::new(DocstringStyle::Doxygen);
        let text = clean_doc(text);
        if text.is_empty() {
            return Ok(doc);
        }

        let starts = marker_offsets(&COMMAND_START, &text);
        let desc_end = starts.first().copied().unwrap_or(text.len());
        apply_description(&mut doc, &text[..desc_end]);

        for chunk in split_at(&text, &starts) {
            let caps = COMMAND
                .captures(chunk)
                .ok_or_else(|| ParseError::malformed(chunk.trim_end()))?;
            let tag = caps[1].to_string();
            let direction = caps.get(2).map(|m| m.as_str().to_string());
            let rest = &chunk[caps[0].len()..];

            if tag == "brief" {
                let brief = reflow(rest);
                doc.short_description = match doc.short_description.take() {
                    Some(short) if !brief.is_empty() => Some(format!("{}\n\n{}", short, brief)),
                    Some(short) => Some(short),
                    None => (!brief.is_empty()).then_some(brief),
                };
                continue;
            }

            doc.meta.push(build_meta(tag, direction, rest, chunk)?);
        }

        Ok(doc)
    }
}

fn build_meta(
    tag: String,
    direction: Option<String>,
    rest: &str,
    chunk: &str,
) -> Result<MetaRecord, ParseError> {
    let kind = classify(&tag, PARAM_ALIASES, RAISES_ALIASES);
    let takes_name = matches!(kind, TagKind::Param | TagKind::Raises) || tag == RETURN_VALUE;

    let mut args = vec![tag];
    let (name, desc) = if takes_name {
        match NAMED.captures(rest) {
            Some(caps) => {
                args.extend(direction.or_else(|| caps.get(1).map(|m| m.as_str().to_string())));
                (Some(caps[2].to_string()), reflow(&rest[caps[0].len()..]))
            }
            None if kind == TagKind::Raises => (None, reflow(rest)),
            None => return Err(ParseError::arity(&args[0], "a name", chunk.trim_end())),
        }
    } else {
        args.extend(direction);
        (None, reflow(rest))
    };
    args.extend(name.clone());

    let record = match kind {
        TagKind::Param => {
            let arg_name = name.unwrap_or_default();
            let default = extract_default(&desc);
            DocstringParam::new(args, Some(desc), arg_name, None, None, default).into()
        }
        TagKind::Raises => DocstringRaises::new(args, Some(desc), name).into(),
        TagKind::Returns { generator } => {
            DocstringReturns::new(args, Some(desc), None, generator, None).into()
        }
        TagKind::Deprecated => {
            let (version, text) = extract_version(&desc);
            DocstringDeprecated::new(args, text, version).into()
        }
        TagKind::Generic if name.is_some() => {
            DocstringReturns::new(args, Some(desc), None, false, name).into()
        }
        TagKind::Generic => DocstringMeta::new(args, Some(desc)).into(),
    };
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Docstring, ParseError> {
        DoxygenParser::new().parse(text)
    }

    #[test]
    fn test_basic_commands() {
        let doc = parse(
            "Compute things.\n\n@param n The count.\n\\param[in] m Input.\n@tparam T Element type.\n@return The total.\n@throws IOException On error.",
        )
        .unwrap();
        assert_eq!(doc.short_description.as_deref(), Some("Compute things."));
        let params = doc.params();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].args, vec!["param", "n"]);
        assert_eq!(params[0].description.as_deref(), Some("The count."));
        assert_eq!(params[1].args, vec!["param", "[in]", "m"]);
        assert_eq!(params[1].arg_name, "m");
        assert_eq!(params[2].args, vec!["tparam", "T"]);
        assert_eq!(doc.returns().unwrap().description.as_deref(), Some("The total."));
        assert_eq!(doc.raises()[0].type_name.as_deref(), Some("IOException"));
    }

    #[test]
    fn test_separate_direction_token() {
        let doc = parse("@param [out] buf Destination.").unwrap();
        let p = &doc.params()[0];
        assert_eq!(p.args, vec!["param", "[out]", "buf"]);
        assert_eq!(p.description.as_deref(), Some("Destination."));
    }

    #[test]
    fn test_brief() {
        let doc = parse("@brief Short one.\n@param x The x.").unwrap();
        assert_eq!(doc.short_description.as_deref(), Some("Short one."));
        assert_eq!(doc.meta.len(), 1);
    }

    #[test]
    fn test_retval_and_deprecated() {
        let doc = parse("@retval 0 Success.\n@deprecated 3.1 Use bar.").unwrap();
        let r = doc.returns().unwrap();
        assert_eq!(r.return_name.as_deref(), Some("0"));
        assert_eq!(r.args, vec!["retval", "0"]);
        let d = doc.deprecation().unwrap();
        assert_eq!(d.version.as_deref(), Some("3.1"));
    }

    #[test]
    fn test_param_without_name() {
        let err = parse("@param\n").unwrap_err();
        assert!(matches!(err, ParseError::Arity { .. }));
    }

    #[test]
    fn test_generic_command() {
        let doc = parse("@note Careful here.").unwrap();
        assert_eq!(doc.meta[0].args(), ["note"]);
        assert_eq!(doc.meta[0].description(), Some("Careful here."));
    }
}
