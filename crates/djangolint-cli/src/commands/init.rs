//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# djangolint configuration

[analyzer]
# Glob patterns to exclude from analysis
exclude = [
    "**/migrations/**",
    "**/.venv/**",
    "**/venv/**",
]

# Respect .gitignore files
respect_gitignore = true

[checks]
# Report connection.cursor() calls alongside .raw() (SEC14)
flagCursorUsage = true

[conventions.expressiveNames.variables]
avoidShortNames = false

[conventions.expressiveNames.functions]
avoidShortNames = false
functionLengthLimit = 50

[conventions.expressiveNames.objectProperties]
avoidShortNames = false

[conventions.boolean]
# Require one of settings.general.prefixes on boolean names
usePrefix = false
# Reject not_/never_/no_ prefixes
positiveNaming = false

[conventions.complexity]
lineThreshold = 100
operationThreshold = 25

[settings.general]
prefixes = ["is_", "has_", "can_", "should_", "does_"]
"#;

const CONFIG_FILE: &str = "djangolint.toml";

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_FILE), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to enable naming conventions");
    println!("  2. Run: djangolint check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }
    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use djangolint_core::Config;

    #[test]
    fn default_config_matches_builtin_defaults() {
        let parsed = Config::parse(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.analyzer.exclude, defaults.analyzer.exclude);
        assert!(parsed.checks.flag_cursor_usage);
        assert!(!parsed.conventions.boolean.use_prefix);
        assert_eq!(parsed.conventions.complexity.line_threshold, 100);
        assert_eq!(parsed.conventions.complexity.operation_threshold, 25);
        assert_eq!(parsed.settings.general.prefixes, defaults.settings.general.prefixes);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        write_config(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
