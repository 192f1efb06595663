//! @dose
//! purpose: Structured docstring model shared by parsers, composers and the registry.

mod docstring;

pub use docstring::{
    ComposeOptions, Docstring, DocstringDeprecated, DocstringMeta, DocstringParam,
    DocstringRaises, DocstringReturns, DocstringStyle, MetaRecord, RenderingStyle, StyleSelector,
    UnknownName, DEPRECATION_KEYWORDS, EXAMPLES_KEYWORDS, PARAM_KEYWORDS, RAISES_KEYWORDS,
    RETURNS_KEYWORDS, YIELDS_KEYWORDS,
};
