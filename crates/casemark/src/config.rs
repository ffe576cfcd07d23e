//! Configuration schema for casemark.
//!
//! Config lives at `.config/casemark/config.json` relative to the scan
//! root; a missing file means defaults (scan everything, one analysis
//! variant).

use casemark_core::SuiteOptions;
use eyre::{Result, WrapErr};
use facet::Facet;
use std::path::{Path, PathBuf};

/// Root configuration for casemark.
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Glob patterns for annotated source files to scan
    /// (e.g., `["testdata/**/*.kt"]`). Empty means every file.
    #[facet(default)]
    pub include: Vec<String>,

    /// Glob patterns to exclude.
    #[facet(default)]
    pub exclude: Vec<String>,

    /// Analysis variant labels; one analysis case is emitted per label.
    /// Empty means a single `analysis` variant.
    #[facet(default)]
    pub analysis_variants: Vec<String>,

    /// Directory to write generated suite files into.
    #[facet(default)]
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        facet_json::from_str(json).wrap_err("Failed to parse casemark config JSON")
    }

    /// Load a config from a local file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config from {}", path.display()))?;
        Self::from_json(&content)
            .wrap_err_with(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load a config, falling back to defaults when the file is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Suite options with the configured analysis variants applied.
    pub fn suite_options(&self) -> SuiteOptions {
        if self.analysis_variants.is_empty() {
            SuiteOptions::default()
        } else {
            SuiteOptions {
                analysis_variants: self.analysis_variants.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn parses_a_full_config() {
        let config = Config::from_json(indoc! {r#"
            {
                "include": ["testdata/**/*.kt"],
                "exclude": ["testdata/legacy/**"],
                "analysis_variants": ["types", "callables"],
                "output_dir": "generated"
            }
        "#})
        .unwrap();

        assert_eq!(config.include, vec!["testdata/**/*.kt"]);
        assert_eq!(config.exclude, vec!["testdata/legacy/**"]);
        assert_eq!(config.output_dir.as_deref(), Some(Path::new("generated")));
        assert_eq!(
            config.suite_options().analysis_variants,
            vec!["types", "callables"]
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = Config::from_json("{}").unwrap();

        assert!(config.include.is_empty());
        assert!(config.output_dir.is_none());
        assert_eq!(config.suite_options().analysis_variants, vec!["analysis"]);
    }

    #[test]
    fn absent_file_means_default_config() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = Config::load_or_default(temp.path().join("nope.json")).unwrap();

        assert!(config.include.is_empty());
    }
}
