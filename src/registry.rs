//! @dose
//! purpose: The ordered set of docstring styles. Each entry pairs a parser with its composer;
//!     parse and compose dispatch on a StyleSelector, and Auto parsing runs every parser and
//!     keeps the best result.
//!
//! when-editing:
//!     - !Registration order is the auto-detection tie-break; keep it in DocstringStyle::ALL
//!       order unless a caller registers its own entries
//!     - !Auto attempts run in parallel but must be judged by registry index, never by
//!       completion order
//!
//! invariants:
//!     - The registry is immutable once built and safe to share between threads
//!     - Auto winner = most meta records, ties to the lowest index
//!     - When every attempt fails the error of the last registered style is returned
//!
//! do-not:
//!     - Never expose mutable access to entries of the global registry
//!
//! flows:
//!     - auto parse: par_iter entries -> AttemptOutcome per index -> pick winner -> Docstring

use crate::formatter::{
    compose_doxygen, compose_epydoc, compose_google, compose_jsdoc, compose_numpydoc,
    compose_phpdoc, compose_rdoc, compose_rest, compose_rustdoc, compose_xml, ComposeFn,
};
use crate::parser::{
    DocstringParser, DoxygenParser, EpydocParser, GoogleParser, JsdocParser, NumpydocParser,
    ParseError, PhpdocParser, RdocParser, RestParser, RustdocParser, XmlParser,
};
use crate::types::{ComposeOptions, Docstring, DocstringStyle, StyleSelector};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use std::sync::Arc;

static GLOBAL: Lazy<StyleRegistry> = Lazy::new(StyleRegistry::new);

/// A registered style: its parser and its composer.
#[derive(Clone)]
pub struct StyleEntry {
    pub style: DocstringStyle,
    pub parser: Arc<dyn DocstringParser>,
    pub compose: ComposeFn,
}

impl StyleEntry {
    pub fn new(parser: Arc<dyn DocstringParser>, compose: ComposeFn) -> Self {
        Self {
            style: parser.style(),
            parser,
            compose,
        }
    }
}

/// Result of one parser's attempt during auto-detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Parsed(Docstring),
    Failed(ParseError),
}

impl AttemptOutcome {
    fn score(&self) -> Option<usize> {
        match self {
            AttemptOutcome::Parsed(doc) => Some(doc.meta.len()),
            AttemptOutcome::Failed(_) => None,
        }
    }
}

/// Ordered registry of docstring styles.
pub struct StyleRegistry {
    entries: Vec<StyleEntry>,
}

impl StyleRegistry {
    /// All built-in styles, in DocstringStyle::ALL order.
    pub fn new() -> Self {
        let entries = vec![
            StyleEntry::new(Arc::new(RestParser::new()), compose_rest),
            StyleEntry::new(Arc::new(GoogleParser::new()), compose_google),
            StyleEntry::new(Arc::new(NumpydocParser::new()), compose_numpydoc),
            StyleEntry::new(Arc::new(EpydocParser::new()), compose_epydoc),
            StyleEntry::new(Arc::new(DoxygenParser::new()), compose_doxygen),
            StyleEntry::new(Arc::new(JsdocParser::new()), compose_jsdoc),
            StyleEntry::new(Arc::new(PhpdocParser::new()), compose_phpdoc),
            StyleEntry::new(Arc::new(RdocParser::new()), compose_rdoc),
            StyleEntry::new(Arc::new(RustdocParser::new()), compose_rustdoc),
            StyleEntry::new(Arc::new(XmlParser::new()), compose_xml),
        ];
        Self { entries }
    }

    /// A registry with no styles, to be filled with `register`.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Shared read-only registry with the built-in styles.
    pub fn global() -> &'static StyleRegistry {
        &GLOBAL
    }

    /// Add an entry, replacing any existing entry for the same style in place.
    pub fn register(&mut self, entry: StyleEntry) {
        match self.entries.iter_mut().find(|e| e.style == entry.style) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn entries(&self) -> &[StyleEntry] {
        &self.entries
    }

    pub fn get(&self, style: DocstringStyle) -> Option<&StyleEntry> {
        self.entries.iter().find(|e| e.style == style)
    }

    pub fn styles(&self) -> Vec<DocstringStyle> {
        self.entries.iter().map(|e| e.style).collect()
    }

    /// Parse `text` with the selected style, or with every style for `Auto`.
    ///
    /// A style that is not registered yields an empty docstring of that style.
    pub fn parse(&self, text: &str, selector: StyleSelector) -> Result<Docstring, ParseError> {
        match selector {
            StyleSelector::Style(style) => match self.get(style) {
                Some(entry) => entry.parser.parse(text),
                None => {
                    log::warn!("style {} is not registered", style);
                    Ok(Docstring::new(style))
                }
            },
            StyleSelector::Auto => self.parse_auto(text),
        }
    }

    /// Run every registered parser on `text`, in registry order.
    pub fn attempts(&self, text: &str) -> Vec<(DocstringStyle, AttemptOutcome)> {
        self.entries
            .par_iter()
            .map(|entry| {
                let outcome = match entry.parser.parse(text) {
                    Ok(doc) => AttemptOutcome::Parsed(doc),
                    Err(e) => AttemptOutcome::Failed(e),
                };
                (entry.style, outcome)
            })
            .collect()
    }

    fn parse_auto(&self, text: &str) -> Result<Docstring, ParseError> {
        let attempts = self.attempts(text);

        let mut best: Option<(usize, usize)> = None;
        for (index, (style, outcome)) in attempts.iter().enumerate() {
            match outcome {
                AttemptOutcome::Parsed(doc) => {
                    log::debug!("auto: {} parsed {} meta records", style, doc.meta.len())
                }
                AttemptOutcome::Failed(e) => log::debug!("auto: {} failed: {}", style, e),
            }
            if let Some(score) = outcome.score() {
                if best.is_none_or(|(_, top)| score > top) {
                    best = Some((index, score));
                }
            }
        }

        let mut attempts = attempts;
        match best {
            Some((index, _)) => {
                let (style, outcome) = attempts.swap_remove(index);
                log::debug!("auto: picked {}", style);
                match outcome {
                    AttemptOutcome::Parsed(doc) => Ok(doc),
                    AttemptOutcome::Failed(e) => Err(e),
                }
            }
            None => match attempts.pop() {
                Some((_, AttemptOutcome::Failed(e))) => Err(e),
                Some((_, AttemptOutcome::Parsed(doc))) => Ok(doc),
                None => Ok(Docstring::default()),
            },
        }
    }

    /// Compose `doc` with the selected style. `Auto` uses the docstring's own style, falling
    /// back to the first registered one.
    pub fn compose(&self, doc: &Docstring, selector: StyleSelector, options: &ComposeOptions) -> String {
        let entry = match selector {
            StyleSelector::Style(style) => self.get(style),
            StyleSelector::Auto => doc
                .style
                .and_then(|style| self.get(style))
                .or_else(|| self.entries.first()),
        };
        match entry {
            Some(entry) => (entry.compose)(doc, options),
            None => {
                log::warn!("no composer registered for {:?}", selector);
                String::new()
            }
        }
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RenderingStyle;

    struct Failing(DocstringStyle);

    impl DocstringParser for Failing {
        fn style(&self) -> DocstringStyle {
            self.0
        }

        fn parse(&self, text: &str) -> Result<Docstring, ParseError> {
            Err(ParseError::malformed(&format!("{}:{}", self.0, text)))
        }
    }

    #[test]
    fn test_registry_order() {
        let registry = StyleRegistry::new();
        assert_eq!(registry.styles(), DocstringStyle::ALL.to_vec());
    }

    #[test]
    fn test_explicit_style_propagates_error() {
        let registry = StyleRegistry::new();
        let err = registry
            .parse(":param herp derp", DocstringStyle::Rest.into())
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedChunk { .. }));
    }

    #[test]
    fn test_auto_picks_most_meta() {
        let registry = StyleRegistry::new();
        let doc = registry
            .parse("Short.\n\n:param a: first\n:param b: second\n:returns: sum", StyleSelector::Auto)
            .unwrap();
        assert_eq!(doc.style, Some(DocstringStyle::Rest));
        assert_eq!(doc.meta.len(), 3);
    }

    #[test]
    fn test_auto_tie_goes_to_first_registered() {
        let registry = StyleRegistry::new();
        let doc = registry.parse("Just a sentence.", StyleSelector::Auto).unwrap();
        assert_eq!(doc.style, Some(DocstringStyle::Rest));
        assert_eq!(doc.short_description.as_deref(), Some("Just a sentence."));
    }

    #[test]
    fn test_auto_all_fail_returns_last_error() {
        let mut registry = StyleRegistry::empty();
        registry.register(StyleEntry::new(Arc::new(Failing(DocstringStyle::Rest)), compose_rest));
        registry.register(StyleEntry::new(Arc::new(Failing(DocstringStyle::Xml)), compose_xml));
        let err = registry.parse("x", StyleSelector::Auto).unwrap_err();
        assert_eq!(err.fragment(), "xml:x");
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = StyleRegistry::new();
        registry.register(StyleEntry::new(Arc::new(Failing(DocstringStyle::Google)), compose_google));
        assert_eq!(registry.styles(), DocstringStyle::ALL.to_vec());
        assert!(registry.parse("Args:\n    a: b", DocstringStyle::Google.into()).is_err());
    }

    #[test]
    fn test_compose_auto_uses_doc_style() {
        let registry = StyleRegistry::global();
        let doc = registry
            .parse("@param {string} name - Who.", DocstringStyle::Jsdoc.into())
            .unwrap();
        let options = ComposeOptions::with_rendering(RenderingStyle::Compact);
        assert_eq!(
            registry.compose(&doc, StyleSelector::Auto, &options),
            "@param {string} name - Who."
        );
        assert_eq!(
            registry.compose(&doc, DocstringStyle::Rest.into(), &options),
            ":param string name: Who."
        );
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let doc = StyleRegistry::global().parse("   \n  ", StyleSelector::Auto).unwrap();
        assert!(doc.is_empty());
    }
}
