//! Configuration file resolution with global fallback.
//!
//! Resolution order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/djangolint.toml` or `{project}/.djangolint.toml`
//! 3. `~/.djangolint/config.toml` (global fallback)
//! 4. No config found, defaults are used

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use djangolint_core::Config;

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config`.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML. A missing
    /// explicit file is an error; [`ConfigSource::Default`] never fails.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("no configuration file, using defaults");
            return Ok(Config::default());
        };
        if let Self::Global(_) = self {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["djangolint.toml", ".djangolint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Environment variable overriding the global config directory.
pub const CONFIG_DIR_ENV: &str = "DJANGOLINT_CONFIG_DIR";

/// Resolves the configuration file for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_in(project_dir, explicit, global_config_dir())
}

fn resolve_in(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file())
    {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, |found| {
            tracing::debug!("Found global config: {}", found.display());
            ConfigSource::Global(found)
        })
}

/// Global config directory: `$DJANGOLINT_CONFIG_DIR`, else `~/.djangolint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".djangolint"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_and_is_not_checked() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("djangolint.toml"), "").unwrap();
        let explicit = Path::new("/nonexistent/custom.toml");

        let result = resolve_in(tmp.path(), Some(explicit), None);
        assert_eq!(result, ConfigSource::Explicit(explicit.to_path_buf()));
        assert!(result.load().is_err());
    }

    #[test]
    fn plain_name_preferred_over_dotfile() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".djangolint.toml"), "").unwrap();
        assert_eq!(
            resolve_in(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join(".djangolint.toml"))
        );

        fs::write(tmp.path().join("djangolint.toml"), "").unwrap();
        assert_eq!(
            resolve_in(tmp.path(), None, None),
            ConfigSource::Project(tmp.path().join("djangolint.toml"))
        );
    }

    #[test]
    fn global_is_a_fallback_only() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let global_dir = Some(global.path().to_path_buf());

        assert_eq!(
            resolve_in(project.path(), None, global_dir.clone()),
            ConfigSource::Default
        );

        fs::write(global.path().join("config.toml"), "").unwrap();
        assert_eq!(
            resolve_in(project.path(), None, global_dir.clone()),
            ConfigSource::Global(global.path().join("config.toml"))
        );

        fs::write(project.path().join("djangolint.toml"), "").unwrap();
        assert!(matches!(
            resolve_in(project.path(), None, global_dir),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn loads_project_conventions() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("djangolint.toml"),
            "[conventions.boolean]\nusePrefix = true\n\n[checks]\nflagCursorUsage = false\n",
        )
        .unwrap();

        let config = resolve_in(tmp.path(), None, None).load().unwrap();
        assert!(config.conventions.boolean.use_prefix);
        assert!(!config.checks.flag_cursor_usage);
    }

    #[test]
    fn invalid_file_fails_to_load() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("djangolint.toml"), "[checks\n").unwrap();
        let err = resolve_in(tmp.path(), None, None).load().unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn default_source_has_no_path_and_loads_defaults() {
        assert!(ConfigSource::Default.path().is_none());
        let config = ConfigSource::Default.load().unwrap();
        assert_eq!(config.conventions.expressive_names.functions.function_length_limit, 50);
    }
}
