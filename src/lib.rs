//! @dose
//! purpose: This is the library crate root for polydoc. It parses docstrings written in ten
//!     conventions into one style-neutral Docstring and composes a Docstring back into any of
//!     them, with auto-detection of the input style.
//!
//! when-editing:
//!     - !All public modules must be declared here with pub mod
//!     - !Re-exports should include commonly used types and functions
//!     - Keep the re-export list organized by module
//!
//! invariants:
//!     - The top-level parse/compose helpers go through StyleRegistry::global()
//!     - All style parsers are reachable through the registry
//!
//! do-not:
//!     - Never install a logger here; the log facade is left to the application
//!
//! gotchas:
//!     - Composing into a different style than the one parsed can lose information the target
//!       convention has no syntax for (types in doxygen and xml, for example)

pub mod config;
pub mod formatter;
pub mod parser;
pub mod registry;
pub mod text;
pub mod types;

// Re-export main types for convenience
pub use config::Config;
pub use formatter::ComposeFn;
pub use parser::{DocstringParser, GoogleParser, ParseError, Section, SectionKind};
pub use registry::{AttemptOutcome, StyleEntry, StyleRegistry};
pub use types::{
    ComposeOptions, Docstring, DocstringDeprecated, DocstringMeta, DocstringParam,
    DocstringRaises, DocstringReturns, DocstringStyle, MetaRecord, RenderingStyle, StyleSelector,
};

/// Parse `text` with the built-in registry.
pub fn parse(text: &str, selector: StyleSelector) -> Result<Docstring, ParseError> {
    StyleRegistry::global().parse(text, selector)
}

/// Compose `doc` with the built-in registry.
pub fn compose(doc: &Docstring, selector: StyleSelector, options: &ComposeOptions) -> String {
    StyleRegistry::global().compose(doc, selector, options)
}
