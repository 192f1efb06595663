//! @dose
//! purpose: ReST (Sphinx field list) docstrings: `:param T name: desc`, `:returns: desc`,
//!     `:raises E: desc`. Separate `:type name:`, `:rtype:` and `:ytype:` fields are folded into
//!     the records they describe.
//!
//! invariants:
//!     - A chunk starts at a line beginning with ':' and runs to the next one
//!     - A param chunk carries a name and at most one type token
//!     - A trailing '?' on a type marks the parameter optional
//!
//! gotchas:
//!     - Type fields with no matching record are kept as Generic records
//!     - A lone :rtype: becomes a Returns record keyed "rtype"

use super::common::{
    apply_description, classify, extract_default, extract_version, marker_offsets, split_at,
    strip_optional_marker, TagKind,
};
use super::{DocstringParser, ParseError};
use crate::text::{clean_doc, reflow};
use crate::types::{
    Docstring, DocstringDeprecated, DocstringMeta, DocstringParam, DocstringRaises,
    DocstringReturns, DocstringStyle, MetaRecord,
};
use once_cell::sync::Lazy;
use regex::Regex;

static FIELD_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^:").unwrap());

const TYPE_FIELDS: &[&str] = &["type", "rtype", "ytype"];

pub struct RestParser;

impl RestParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RestParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A `:type name: T` style field waiting to be matched with its record.
struct TypeField {
    position: usize,
    args: Vec<String>,
    type_name: String,
}

impl DocstringParser for RestParser {
    fn style(&self) -> DocstringStyle {
        DocstringStyle::Rest
    }

    fn parse(&self, text: &str) -> Result<Docstring, ParseError> {
        let mut doc = Docstring::new(DocstringStyle::Rest);
        let text = clean_doc(text);
        if text.is_empty() {
            return Ok(doc);
        }

        let starts = marker_offsets(&FIELD_START, &text);
        let desc_end = starts.first().copied().unwrap_or(text.len());
        apply_description(&mut doc, &text[..desc_end]);

        let mut type_fields = Vec::new();
        for chunk in split_at(&text, &starts) {
            let (head, body) = chunk[1..]
                .split_once(':')
                .ok_or_else(|| ParseError::malformed(chunk.trim_end()))?;
            let args: Vec<String> = head.split_whitespace().map(str::to_string).collect();
            if args.is_empty() {
                return Err(ParseError::malformed(chunk.trim_end()));
            }
            let desc = reflow(body);

            if TYPE_FIELDS.contains(&args[0].as_str()) && !desc.is_empty() {
                type_fields.push(TypeField {
                    position: doc.meta.len(),
                    args: args.clone(),
                    type_name: desc.clone(),
                });
                doc.meta.push(DocstringMeta::new(args, Some(desc)).into());
                continue;
            }
            doc.meta.push(build_meta(args, desc, chunk)?);
        }

        fold_type_fields(&mut doc.meta, type_fields);
        Ok(doc)
    }
}

fn build_meta(args: Vec<String>, desc: String, chunk: &str) -> Result<MetaRecord, ParseError> {
    let key = args[0].clone();
    let record = match classify(&key, &[], &[]) {
        TagKind::Param => {
            let (type_name, is_optional, arg_name) = match args.len() {
                2 => (None, None, args[1].clone()),
                3 => {
                    let (ty, optional) = strip_optional_marker(&args[1], '?');
                    (Some(ty.to_string()), Some(optional), args[2].clone())
                }
                _ => return Err(ParseError::arity(&key, "one or two arguments", chunk.trim_end())),
            };
            let default = extract_default(&desc);
            DocstringParam::new(args, Some(desc), arg_name, type_name, is_optional, default).into()
        }
        TagKind::Returns { generator } => {
            if args.len() > 2 {
                return Err(ParseError::arity(&key, "at most one argument", chunk.trim_end()));
            }
            let type_name = args.get(1).cloned();
            DocstringReturns::new(args, Some(desc), type_name, generator, None).into()
        }
        TagKind::Raises => {
            if args.len() > 2 {
                return Err(ParseError::arity(&key, "at most one argument", chunk.trim_end()));
            }
            let type_name = args.get(1).cloned();
            DocstringRaises::new(args, Some(desc), type_name).into()
        }
        TagKind::Deprecated => match args.get(1).cloned() {
            Some(version) => DocstringDeprecated::new(args, Some(desc), Some(version)).into(),
            None => {
                let (version, desc) = extract_version(&desc);
                DocstringDeprecated::new(args, desc, version).into()
            }
        },
        TagKind::Generic => DocstringMeta::new(args, Some(desc)).into(),
    };
    Ok(record)
}

/// Move `:type`/`:rtype`/`:ytype` values into the records they describe. Fields that were
/// folded are removed; the rest stay as Generic records.
fn fold_type_fields(meta: &mut Vec<MetaRecord>, fields: Vec<TypeField>) {
    let mut folded = Vec::new();
    for field in fields {
        let (raw_type, optional) = strip_optional_marker(&field.type_name, '?');
        let raw_type = raw_type.trim().to_string();
        let consumed = match (field.args[0].as_str(), field.args.get(1)) {
            ("type", Some(name)) => {
                meta.iter_mut().any(|record| match record {
                    MetaRecord::Param(p) if &p.arg_name == name && p.type_name.is_none() => {
                        p.type_name = Some(raw_type.clone());
                        p.is_optional = Some(optional);
                        p.args = vec![p.args[0].clone(), field.type_name.clone(), name.clone()];
                        true
                    }
                    _ => false,
                })
            }
            (key @ ("rtype" | "ytype"), None) => {
                let generator = key == "ytype";
                let preceding = meta[..field.position].iter_mut().rev().find_map(|record| match record {
                    MetaRecord::Returns(r) if r.is_generator == generator && r.type_name.is_none() => {
                        Some(r)
                    }
                    _ => None,
                });
                match preceding {
                    Some(r) => {
                        r.type_name = Some(raw_type.clone());
                        r.args.truncate(1);
                        r.args.push(raw_type.clone());
                        true
                    }
                    None => {
                        if !meta.iter().any(|r| matches!(r, MetaRecord::Returns(_))) {
                            meta[field.position] = DocstringReturns::new(
                                vec![key.to_string()],
                                None,
                                Some(raw_type.clone()),
                                generator,
                                None,
                            )
                            .into();
                        }
                        false
                    }
                }
            }
            _ => false,
        };
        if consumed {
            folded.push(field.position);
        }
    }

    let mut index = 0;
    meta.retain(|_| {
        let keep = !folded.contains(&index);
        index += 1;
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Docstring, ParseError> {
        RestParser::new().parse(text)
    }

    #[test]
    fn test_empty() {
        let doc = parse("").unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.style, Some(DocstringStyle::Rest));
        assert!(parse("   \n  ").unwrap().is_empty());
    }

    #[test]
    fn test_descriptions() {
        let doc = parse("Short\n\nLong").unwrap();
        assert_eq!(doc.short_description.as_deref(), Some("Short"));
        assert_eq!(doc.long_description.as_deref(), Some("Long"));
        assert!(doc.blank_after_short_description);

        let doc = parse("Short\nLong").unwrap();
        assert!(!doc.blank_after_short_description);
        assert!(!doc.blank_after_long_description);

        let doc = parse("Short\n\nLong\n\n:param x: y").unwrap();
        assert!(doc.blank_after_long_description);
    }

    #[test]
    fn test_param_optional_and_default() {
        let doc = parse(":param str? sender: description, defaults to 'hi'").unwrap();
        let params = doc.params();
        assert_eq!(params.len(), 1);
        let p = params[0];
        assert_eq!(p.arg_name, "sender");
        assert_eq!(p.type_name.as_deref(), Some("str"));
        assert_eq!(p.is_optional, Some(true));
        assert_eq!(p.default.as_deref(), Some("'hi'"));
        assert_eq!(p.args, vec!["param", "str?", "sender"]);
    }

    #[test]
    fn test_param_without_type() {
        let doc = parse(":param name: the name").unwrap();
        let p = doc.params()[0];
        assert_eq!(p.type_name, None);
        assert_eq!(p.is_optional, None);
        assert_eq!(p.description.as_deref(), Some("the name"));
    }

    #[test]
    fn test_defaults_to_does_not_set_optional() {
        let doc = parse(":param int x: thing, defaults to 3.").unwrap();
        let p = doc.params()[0];
        assert_eq!(p.is_optional, Some(false));
        assert_eq!(p.default.as_deref(), Some("3"));
    }

    #[test]
    fn test_returns_and_yields() {
        let doc = parse(":returns int: the count\n:yields: items").unwrap();
        let returns = doc.many_returns();
        assert_eq!(returns.len(), 2);
        assert!(!returns[0].is_generator);
        assert_eq!(returns[0].type_name.as_deref(), Some("int"));
        assert!(returns[1].is_generator);
        assert_eq!(returns[1].type_name, None);
    }

    #[test]
    fn test_raises() {
        let doc = parse(":raises ValueError: if bad\n:raises: anything").unwrap();
        let raises = doc.raises();
        assert_eq!(raises[0].type_name.as_deref(), Some("ValueError"));
        assert_eq!(raises[1].type_name, None);
    }

    #[test]
    fn test_multiline_description() {
        let doc = parse(":param x: first\n    second\n      nested\n:returns: y").unwrap();
        assert_eq!(
            doc.params()[0].description.as_deref(),
            Some("first\nsecond\n  nested")
        );
    }

    #[test]
    fn test_type_fields_fold() {
        let doc = parse(":param x: the x\n:type x: int?\n:returns: total\n:rtype: float").unwrap();
        assert_eq!(doc.meta.len(), 2);
        let p = doc.params()[0];
        assert_eq!(p.type_name.as_deref(), Some("int"));
        assert_eq!(p.is_optional, Some(true));
        assert_eq!(doc.returns().unwrap().type_name.as_deref(), Some("float"));
    }

    #[test]
    fn test_lone_rtype() {
        let doc = parse("Short.\n\n:rtype: bool").unwrap();
        assert_eq!(doc.meta.len(), 1);
        let r = doc.returns().unwrap();
        assert_eq!(r.args, vec!["rtype"]);
        assert_eq!(r.type_name.as_deref(), Some("bool"));
    }

    #[test]
    fn test_orphan_type_kept() {
        let doc = parse(":type y: int").unwrap();
        assert_eq!(doc.meta.len(), 1);
        assert!(matches!(doc.meta[0], MetaRecord::Generic(_)));
    }

    #[test]
    fn test_deprecated_version() {
        let doc = parse(":deprecated: 1.2 use other").unwrap();
        let d = doc.deprecation().unwrap();
        assert_eq!(d.version.as_deref(), Some("1.2"));
        assert_eq!(d.description.as_deref(), Some("use other"));
    }

    #[test]
    fn test_unknown_field_generic() {
        let doc = parse(":meta custom: value\n:param x: y").unwrap();
        assert_eq!(doc.meta[0].args(), ["meta", "custom"]);
        assert_eq!(doc.params().len(), 1);
    }

    #[test]
    fn test_missing_colon_is_error() {
        let err = parse("Short\n:param herp derp").unwrap_err();
        assert!(matches!(err, ParseError::MalformedChunk { .. }));
        assert_eq!(err.fragment(), ":param herp derp");
    }

    #[test]
    fn test_param_arity_error() {
        let err = parse(":param a b c: too many").unwrap_err();
        assert!(matches!(err, ParseError::Arity { .. }));
        assert!(matches!(parse(":param: nameless"), Err(ParseError::Arity { .. })));
    }
}
