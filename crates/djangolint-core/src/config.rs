//! Configuration types for djangolint.
//!
//! Every key is optional. Missing keys resolve to the documented defaults, so
//! an empty file and [`Config::default`] are equivalent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for djangolint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// File discovery configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Check toggles.
    #[serde(default)]
    pub checks: CheckToggles,

    /// Naming and complexity conventions.
    #[serde(default)]
    pub conventions: Conventions,

    /// General settings.
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// File discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            respect_gitignore: true,
        }
    }
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/migrations/**".to_string(),
        "**/.venv/**".to_string(),
        "**/venv/**".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

/// Switches for optional check behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckToggles {
    /// Flag `connection.cursor()` calls as raw SQL.
    #[serde(default = "default_true")]
    pub flag_cursor_usage: bool,
}

impl Default for CheckToggles {
    fn default() -> Self {
        Self {
            flag_cursor_usage: true,
        }
    }
}

/// Naming and complexity conventions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conventions {
    /// Name length and shape per symbol category.
    #[serde(default)]
    pub expressive_names: ExpressiveNames,

    /// Boolean naming rules.
    #[serde(default)]
    pub boolean: BooleanConventions,

    /// View complexity thresholds.
    #[serde(default)]
    pub complexity: ComplexityConventions,
}

/// Name conventions per symbol category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressiveNames {
    /// Assignment and loop targets.
    #[serde(default)]
    pub variables: NameLengthConvention,

    /// Function and method names.
    #[serde(default)]
    pub functions: FunctionNaming,

    /// Keys of dict literals.
    #[serde(default)]
    pub object_properties: NameLengthConvention,
}

/// Minimum-length convention.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameLengthConvention {
    /// Report names below the minimum length.
    #[serde(default)]
    pub avoid_short_names: bool,
}

/// Function naming convention.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionNaming {
    /// Report function names of three characters or fewer.
    #[serde(default)]
    pub avoid_short_names: bool,

    /// Maximum number of top-level statements in a function body.
    #[serde(default = "default_function_length_limit")]
    pub function_length_limit: usize,
}

impl Default for FunctionNaming {
    fn default() -> Self {
        Self {
            avoid_short_names: false,
            function_length_limit: default_function_length_limit(),
        }
    }
}

fn default_function_length_limit() -> usize {
    50
}

/// Boolean naming rules.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanConventions {
    /// Require one of [`GeneralSettings::prefixes`].
    #[serde(default)]
    pub use_prefix: bool,

    /// Reject `not_`, `never_` and `no_` prefixes.
    #[serde(default)]
    pub positive_naming: bool,
}

/// Thresholds for the view complexity score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityConventions {
    /// Line count above which lines contribute to the score.
    #[serde(default = "default_line_threshold")]
    pub line_threshold: usize,

    /// Operation count above which operations contribute to the score.
    #[serde(default = "default_operation_threshold")]
    pub operation_threshold: usize,
}

impl Default for ComplexityConventions {
    fn default() -> Self {
        Self {
            line_threshold: default_line_threshold(),
            operation_threshold: default_operation_threshold(),
        }
    }
}

fn default_line_threshold() -> usize {
    100
}

fn default_operation_threshold() -> usize {
    25
}

/// General settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Settings shared by several checks.
    #[serde(default)]
    pub general: GeneralSettings,
}

/// Settings shared by several checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Accepted boolean name prefixes.
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            prefixes: default_prefixes(),
        }
    }
}

fn default_prefixes() -> Vec<String> {
    ["is_", "has_", "can_", "should_", "does_"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(config.checks.flag_cursor_usage);
        assert_eq!(
            config.conventions.expressive_names.functions.function_length_limit,
            50
        );
        assert!(!config.conventions.boolean.use_prefix);
        assert_eq!(config.conventions.complexity.line_threshold, 100);
        assert_eq!(config.settings.general.prefixes.len(), 5);
    }

    #[test]
    fn empty_file_matches_defaults() {
        let config = Config::parse("").expect("Failed to parse");
        assert_eq!(config.analyzer.exclude, default_exclude());
        assert_eq!(config.conventions.complexity.operation_threshold, 25);
        assert_eq!(config.settings.general.prefixes, default_prefixes());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analyzer]
exclude = ["**/generated/**"]

[checks]
flagCursorUsage = false

[conventions.expressiveNames.variables]
avoidShortNames = true

[conventions.expressiveNames.functions]
functionLengthLimit = 20

[conventions.boolean]
usePrefix = true
positiveNaming = true

[settings.general]
prefixes = ["is_"]
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.exclude, vec!["**/generated/**"]);
        assert!(!config.checks.flag_cursor_usage);
        let names = &config.conventions.expressive_names;
        assert!(names.variables.avoid_short_names);
        assert!(!names.functions.avoid_short_names);
        assert_eq!(names.functions.function_length_limit, 20);
        assert!(!names.object_properties.avoid_short_names);
        assert!(config.conventions.boolean.use_prefix);
        assert!(config.conventions.boolean.positive_naming);
        assert_eq!(config.settings.general.prefixes, vec!["is_"]);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = Config::parse("[checks\nflagCursorUsage = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
