//! @dose
//! purpose: Hub for the per-style docstring parsers. Defines the DocstringParser trait every
//!     convention implements and the single ParseError type all of them report.
//!
//! when-editing:
//!     - !When adding a style, implement DocstringParser here and register it in
//!       StyleRegistry::new() so auto-detection sees it
//!     - !Parsers must return an empty Docstring (not an error) for whitespace-only input
//!     - Parsers are stored as Arc<dyn DocstringParser> so they must stay Send + Sync
//!
//! invariants:
//!     - Every parser normalizes its input with text::clean_doc before scanning
//!     - A parser either returns a complete Docstring or an error, never a partial result
//!     - Each parser tags its result with its own DocstringStyle
//!
//! do-not:
//!     - Never keep mutable state inside a parser; one instance serves concurrent calls
//!
//! flows:
//!     - parse: clean_doc -> locate first meta marker -> split description -> chunk meta
//!       region -> classify each chunk -> Docstring

pub(crate) mod common;
mod doxygen;
mod epydoc;
mod google;
mod jsdoc;
pub(crate) mod numpydoc;
mod phpdoc;
mod rdoc;
mod rest;
mod rustdoc;
mod xml;

use crate::types::{Docstring, DocstringStyle};
use thiserror::Error;

pub use doxygen::DoxygenParser;
pub use epydoc::EpydocParser;
pub use google::{GoogleParser, Section, SectionKind};
pub(crate) use google::DEFAULT_SECTIONS;
pub use jsdoc::JsdocParser;
pub use numpydoc::NumpydocParser;
pub use phpdoc::PhpdocParser;
pub use rdoc::RdocParser;
pub use rest::RestParser;
pub use rustdoc::RustdocParser;
pub use xml::XmlParser;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Error parsing meta information near \"{fragment}\"")]
    MalformedChunk { fragment: String },
    #[error("Expected {expected} for a {keyword} keyword near \"{fragment}\"")]
    Arity {
        keyword: String,
        expected: &'static str,
        fragment: String,
    },
    #[error("{message}: \"{fragment}\"")]
    Section { message: String, fragment: String },
    #[error("Inconsistent {message}: \"{fragment}\"")]
    Inconsistent { message: String, fragment: String },
    #[error("Malformed XML ({message}) near \"{fragment}\"")]
    Xml { message: String, fragment: String },
}

impl ParseError {
    pub(crate) fn malformed(fragment: &str) -> Self {
        ParseError::MalformedChunk {
            fragment: fragment.to_string(),
        }
    }

    pub(crate) fn arity(keyword: &str, expected: &'static str, fragment: &str) -> Self {
        ParseError::Arity {
            keyword: keyword.to_string(),
            expected,
            fragment: fragment.to_string(),
        }
    }

    pub(crate) fn section(message: impl Into<String>, fragment: &str) -> Self {
        ParseError::Section {
            message: message.into(),
            fragment: fragment.to_string(),
        }
    }

    /// The offending piece of input.
    pub fn fragment(&self) -> &str {
        match self {
            ParseError::MalformedChunk { fragment }
            | ParseError::Arity { fragment, .. }
            | ParseError::Section { fragment, .. }
            | ParseError::Inconsistent { fragment, .. }
            | ParseError::Xml { fragment, .. } => fragment,
        }
    }
}

/// Trait for style-specific docstring parsers
pub trait DocstringParser: Send + Sync {
    /// The convention this parser reads
    fn style(&self) -> DocstringStyle;

    /// Parse a comment body (without comment delimiters) into a Docstring
    fn parse(&self, text: &str) -> Result<Docstring, ParseError>;
}
