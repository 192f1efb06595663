//! @dose
//! purpose: Configuration file parsing for polydoc.toml. Holds the default style selection and
//!     the compose options (rendering mode, indent) used by callers that do not pass their own.
//!
//! when-editing:
//!     - !Config::load never fails; problems are logged with log::warn! and defaults are used
//!     - Use Config::from_toml_str when a caller wants the error instead
//!
//! invariants:
//!     - A missing `style` key means auto-detection
//!     - Missing keys fall back to ComposeOptions::default()
//!
//! gotchas:
//!     - Style names accept the same aliases as DocstringStyle::from_str (`numpy`, `yard`, ...)

use crate::types::{ComposeOptions, DocstringStyle, StyleSelector};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// File name looked up by Config::load.
pub const CONFIG_FILE: &str = "polydoc.toml";

/// Main configuration structure matching polydoc.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Style to parse and compose with (None = auto)
    pub style: Option<DocstringStyle>,

    /// Composer settings
    pub compose: ComposeOptions,
}

impl Config {
    /// Load configuration from polydoc.toml in the given root directory
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&config_path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", config_path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", config_path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The configured style as a selector.
    pub fn selector(&self) -> StyleSelector {
        match self.style {
            Some(style) => StyleSelector::Style(style),
            None => StyleSelector::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RenderingStyle;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.style, None);
        assert_eq!(config.selector(), StyleSelector::Auto);
        assert_eq!(config.compose.rendering, RenderingStyle::Compact);
        assert_eq!(config.compose.indent, "    ");
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "style = \"numpy\"\n\n[compose]\nrendering = \"expanded\"\nindent = \"  \"\n",
        )
        .unwrap();

        let config = Config::load(temp_dir.path());
        assert_eq!(config.style, Some(DocstringStyle::Numpydoc));
        assert_eq!(config.selector(), StyleSelector::Style(DocstringStyle::Numpydoc));
        assert_eq!(config.compose.rendering, RenderingStyle::Expanded);
        assert_eq!(config.compose.indent, "  ");
    }

    #[test]
    fn test_partial_compose_section() {
        let config = Config::from_toml_str("[compose]\nrendering = \"clean\"\n").unwrap();
        assert_eq!(config.compose.rendering, RenderingStyle::Clean);
        assert_eq!(config.compose.indent, "    ");
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE), "style = \"klingon\"\n").unwrap();
        assert_eq!(Config::load(temp_dir.path()), Config::default());
        assert!(Config::from_toml_str("style = \"klingon\"").is_err());
    }
}
