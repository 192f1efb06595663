//! @dose
//! purpose: Core data types for polydoc. Docstring is the style-neutral result of a parse and
//!     the input of every composer; MetaRecord is the tagged union of the structured items
//!     (params, returns, raises, deprecation, generic notes) found in a docstring body.
//!
//! when-editing:
//!     - !args[0] of every meta record is the normalized keyword that selected its variant
//!     - !Typed fields are derived from args at construction and must never contradict them
//!     - Empty descriptions are stored as None, use the constructors to get that for free
//!
//! invariants:
//!     - meta order is source order and is also render order
//!     - Variant-specific fields only exist on their variant
//!
//! do-not:
//!     - Never add style-specific fields to Docstring; put them in args instead
//!
//! gotchas:
//!     - returns() yields the first Returns record, many_returns() yields all of them
//!     - examples() looks at Generic records keyed example/examples only

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Keywords that mark a parameter-like record.
pub const PARAM_KEYWORDS: &[&str] = &[
    "param",
    "parameter",
    "arg",
    "argument",
    "attribute",
    "key",
    "keyword",
];

/// Keywords that mark a raised exception.
pub const RAISES_KEYWORDS: &[&str] = &["raises", "raise", "except", "exception"];

/// Keywords that mark a return value.
pub const RETURNS_KEYWORDS: &[&str] = &["return", "returns"];

/// Keywords that mark a yielded value.
pub const YIELDS_KEYWORDS: &[&str] = &["yield", "yields"];

/// Keywords that mark a deprecation notice.
pub const DEPRECATION_KEYWORDS: &[&str] = &["deprecation", "deprecated"];

/// Keywords of generic records that hold examples.
pub const EXAMPLES_KEYWORDS: &[&str] = &["example", "examples"];

/// A name that did not match any known style or rendering mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {name}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

/// Docstring conventions, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocstringStyle {
    #[serde(alias = "rst", alias = "restructuredtext")]
    Rest,
    Google,
    #[serde(alias = "numpy")]
    Numpydoc,
    Epydoc,
    #[serde(alias = "javadoc")]
    Doxygen,
    Jsdoc,
    Phpdoc,
    #[serde(alias = "yard")]
    Rdoc,
    Rustdoc,
    Xml,
}

impl DocstringStyle {
    /// Every style, in registry order.
    pub const ALL: [DocstringStyle; 10] = [
        DocstringStyle::Rest,
        DocstringStyle::Google,
        DocstringStyle::Numpydoc,
        DocstringStyle::Epydoc,
        DocstringStyle::Doxygen,
        DocstringStyle::Jsdoc,
        DocstringStyle::Phpdoc,
        DocstringStyle::Rdoc,
        DocstringStyle::Rustdoc,
        DocstringStyle::Xml,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DocstringStyle::Rest => "rest",
            DocstringStyle::Google => "google",
            DocstringStyle::Numpydoc => "numpydoc",
            DocstringStyle::Epydoc => "epydoc",
            DocstringStyle::Doxygen => "doxygen",
            DocstringStyle::Jsdoc => "jsdoc",
            DocstringStyle::Phpdoc => "phpdoc",
            DocstringStyle::Rdoc => "rdoc",
            DocstringStyle::Rustdoc => "rustdoc",
            DocstringStyle::Xml => "xml",
        }
    }
}

impl fmt::Display for DocstringStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DocstringStyle {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let style = match s.trim().to_ascii_lowercase().as_str() {
            "rest" | "rst" | "restructuredtext" => DocstringStyle::Rest,
            "google" => DocstringStyle::Google,
            "numpydoc" | "numpy" => DocstringStyle::Numpydoc,
            "epydoc" => DocstringStyle::Epydoc,
            "doxygen" | "javadoc" => DocstringStyle::Doxygen,
            "jsdoc" => DocstringStyle::Jsdoc,
            "phpdoc" => DocstringStyle::Phpdoc,
            "rdoc" | "yard" => DocstringStyle::Rdoc,
            "rustdoc" => DocstringStyle::Rustdoc,
            "xml" => DocstringStyle::Xml,
            _ => {
                return Err(UnknownName {
                    kind: "docstring style",
                    name: s.to_string(),
                })
            }
        };
        Ok(style)
    }
}

/// Which style to parse or compose with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleSelector {
    /// Parse: try every style and keep the best. Compose: use the docstring's own style.
    #[default]
    Auto,
    Style(DocstringStyle),
}

impl From<DocstringStyle> for StyleSelector {
    fn from(style: DocstringStyle) -> Self {
        StyleSelector::Style(style)
    }
}

/// Verbosity of composed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderingStyle {
    /// Tag and description kept together, shortest optional notation.
    #[default]
    Compact,
    /// Canonical optional notation.
    Clean,
    /// Descriptions always on an indented line below their tag.
    Expanded,
}

impl fmt::Display for RenderingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderingStyle::Compact => "compact",
            RenderingStyle::Clean => "clean",
            RenderingStyle::Expanded => "expanded",
        })
    }
}

impl FromStr for RenderingStyle {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(RenderingStyle::Compact),
            "clean" => Ok(RenderingStyle::Clean),
            "expanded" => Ok(RenderingStyle::Expanded),
            _ => Err(UnknownName {
                kind: "rendering style",
                name: s.to_string(),
            }),
        }
    }
}

/// Options passed to every composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeOptions {
    pub rendering: RenderingStyle,
    /// Prefix used for every nested line.
    pub indent: String,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            rendering: RenderingStyle::Compact,
            indent: "    ".to_string(),
        }
    }
}

impl ComposeOptions {
    pub fn with_rendering(rendering: RenderingStyle) -> Self {
        Self {
            rendering,
            ..Self::default()
        }
    }
}

fn non_empty(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.is_empty())
}

/// A record with no dedicated semantics, e.g. an example or an unknown section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocstringMeta {
    pub args: Vec<String>,
    pub description: Option<String>,
}

impl DocstringMeta {
    pub fn new(args: Vec<String>, description: Option<String>) -> Self {
        Self {
            args,
            description: non_empty(description),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocstringParam {
    pub args: Vec<String>,
    pub description: Option<String>,
    pub arg_name: String,
    pub type_name: Option<String>,
    /// `None` when the source has no way to say.
    pub is_optional: Option<bool>,
    pub default: Option<String>,
}

impl DocstringParam {
    pub fn new(
        args: Vec<String>,
        description: Option<String>,
        arg_name: impl Into<String>,
        type_name: Option<String>,
        is_optional: Option<bool>,
        default: Option<String>,
    ) -> Self {
        Self {
            args,
            description: non_empty(description),
            arg_name: arg_name.into(),
            type_name,
            is_optional,
            default,
        }
    }
}

/// A return value, or a yielded value when `is_generator` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocstringReturns {
    pub args: Vec<String>,
    pub description: Option<String>,
    pub type_name: Option<String>,
    pub is_generator: bool,
    pub return_name: Option<String>,
}

impl DocstringReturns {
    pub fn new(
        args: Vec<String>,
        description: Option<String>,
        type_name: Option<String>,
        is_generator: bool,
        return_name: Option<String>,
    ) -> Self {
        Self {
            args,
            description: non_empty(description),
            type_name,
            is_generator,
            return_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocstringRaises {
    pub args: Vec<String>,
    pub description: Option<String>,
    pub type_name: Option<String>,
}

impl DocstringRaises {
    pub fn new(args: Vec<String>, description: Option<String>, type_name: Option<String>) -> Self {
        Self {
            args,
            description: non_empty(description),
            type_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocstringDeprecated {
    pub args: Vec<String>,
    pub description: Option<String>,
    pub version: Option<String>,
}

impl DocstringDeprecated {
    pub fn new(args: Vec<String>, description: Option<String>, version: Option<String>) -> Self {
        Self {
            args,
            description: non_empty(description),
            version,
        }
    }
}

/// One classified item of a docstring body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetaRecord {
    Param(DocstringParam),
    Returns(DocstringReturns),
    Raises(DocstringRaises),
    Deprecated(DocstringDeprecated),
    Generic(DocstringMeta),
}

impl MetaRecord {
    pub fn args(&self) -> &[String] {
        match self {
            MetaRecord::Param(m) => &m.args,
            MetaRecord::Returns(m) => &m.args,
            MetaRecord::Raises(m) => &m.args,
            MetaRecord::Deprecated(m) => &m.args,
            MetaRecord::Generic(m) => &m.args,
        }
    }

    /// The keyword that selected this record (`args[0]`).
    pub fn key(&self) -> &str {
        self.args().first().map(String::as_str).unwrap_or("")
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            MetaRecord::Param(m) => m.description.as_deref(),
            MetaRecord::Returns(m) => m.description.as_deref(),
            MetaRecord::Raises(m) => m.description.as_deref(),
            MetaRecord::Deprecated(m) => m.description.as_deref(),
            MetaRecord::Generic(m) => m.description.as_deref(),
        }
    }
}

impl From<DocstringParam> for MetaRecord {
    fn from(m: DocstringParam) -> Self {
        MetaRecord::Param(m)
    }
}

impl From<DocstringReturns> for MetaRecord {
    fn from(m: DocstringReturns) -> Self {
        MetaRecord::Returns(m)
    }
}

impl From<DocstringRaises> for MetaRecord {
    fn from(m: DocstringRaises) -> Self {
        MetaRecord::Raises(m)
    }
}

impl From<DocstringDeprecated> for MetaRecord {
    fn from(m: DocstringDeprecated) -> Self {
        MetaRecord::Deprecated(m)
    }
}

impl From<DocstringMeta> for MetaRecord {
    fn from(m: DocstringMeta) -> Self {
        MetaRecord::Generic(m)
    }
}

/// A parsed docstring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Docstring {
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub blank_after_short_description: bool,
    pub blank_after_long_description: bool,
    pub style: Option<DocstringStyle>,
    pub meta: Vec<MetaRecord>,
}

impl Docstring {
    /// An empty docstring tagged with `style`.
    pub fn new(style: DocstringStyle) -> Self {
        Self {
            style: Some(style),
            ..Self::default()
        }
    }

    /// True when there is neither description nor meta.
    pub fn is_empty(&self) -> bool {
        self.short_description.is_none() && self.long_description.is_none() && self.meta.is_empty()
    }

    pub fn params(&self) -> Vec<&DocstringParam> {
        self.meta
            .iter()
            .filter_map(|m| match m {
                MetaRecord::Param(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn raises(&self) -> Vec<&DocstringRaises> {
        self.meta
            .iter()
            .filter_map(|m| match m {
                MetaRecord::Raises(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// First return or yield record.
    pub fn returns(&self) -> Option<&DocstringReturns> {
        self.many_returns().into_iter().next()
    }

    pub fn many_returns(&self) -> Vec<&DocstringReturns> {
        self.meta
            .iter()
            .filter_map(|m| match m {
                MetaRecord::Returns(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn deprecation(&self) -> Option<&DocstringDeprecated> {
        self.meta.iter().find_map(|m| match m {
            MetaRecord::Deprecated(d) => Some(d),
            _ => None,
        })
    }

    pub fn examples(&self) -> Vec<&DocstringMeta> {
        self.meta
            .iter()
            .filter_map(|m| match m {
                MetaRecord::Generic(g)
                    if g.args
                        .first()
                        .is_some_and(|k| EXAMPLES_KEYWORDS.contains(&k.as_str())) =>
                {
                    Some(g)
                }
                _ => None,
            })
            .collect()
    }

    /// Short and long description joined the way they were written.
    pub fn description(&self) -> Option<String> {
        match (&self.short_description, &self.long_description) {
            (Some(short), Some(long)) => {
                let sep = if self.blank_after_short_description {
                    "\n\n"
                } else {
                    "\n"
                };
                Some(format!("{}{}{}", short, sep, long))
            }
            (Some(short), None) => Some(short.clone()),
            (None, Some(long)) => Some(long.clone()),
            (None, None) => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
