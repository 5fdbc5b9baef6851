//! Check command implementation.

use anyhow::{Context, Result};
use djangolint_core::{FileReport, LintResult};
use djangolint_ts::Analyzer;
use glob::Pattern;
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command. Returns true if any ERROR diagnostic was found.
pub fn run(
    path: &Path,
    format: OutputFormat,
    extra_excludes: Vec<String>,
    source: &ConfigSource,
) -> Result<bool> {
    let mut config = source.load()?;
    config.analyzer.exclude.extend(extra_excludes);

    let excludes = compile_excludes(&config.analyzer.exclude)?;
    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        discover_files(path, &excludes, config.analyzer.respect_gitignore)?
    };

    tracing::info!("Analyzing {} files", files.len());

    let analyzer = Analyzer::new(config);
    let mut result = LintResult::new();
    for file_path in &files {
        result.push(check_file(&analyzer, file_path));
    }

    for failed in result.failures() {
        tracing::warn!(
            "Skipped {}: {}",
            failed.file_path.display(),
            failed.error.as_deref().unwrap_or_default()
        );
    }

    super::output::print(&result, format)?;
    Ok(result.has_errors())
}

fn check_file(analyzer: &Analyzer, file_path: &Path) -> FileReport {
    let source = match std::fs::read_to_string(file_path) {
        Ok(source) => source,
        Err(e) => return FileReport::failed(file_path, format!("failed to read file: {e}")),
    };
    match analyzer.analyze(file_path, &source) {
        Ok(diagnostics) => FileReport::analyzed(file_path, diagnostics),
        Err(e) => FileReport::failed(file_path, e.to_string()),
    }
}

fn compile_excludes(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {p}")))
        .collect()
}

fn is_excluded(rel: &Path, excludes: &[Pattern]) -> bool {
    excludes.iter().any(|pattern| pattern.matches_path(rel))
}

fn discover_files(root: &Path, excludes: &[Pattern], respect_gitignore: bool) -> Result<Vec<PathBuf>> {
    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(respect_gitignore)
        .git_exclude(respect_gitignore)
        .require_git(false);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("py") {
            continue;
        }

        // Patterns like `**/migrations/**` need a leading component to match.
        let rel = Path::new(".").join(path.strip_prefix(root).unwrap_or(path));
        if is_excluded(&rel, excludes) {
            tracing::debug!("Excluded {}", path.display());
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use djangolint_core::{Config, RuleCode};
    use std::fs;
    use tempfile::TempDir;

    fn default_excludes() -> Vec<Pattern> {
        compile_excludes(&Config::default().analyzer.exclude).unwrap()
    }

    #[test]
    fn discovers_python_files_and_skips_migrations() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("shop/migrations")).unwrap();
        fs::write(root.join("settings.py"), "DEBUG = True\n").unwrap();
        fs::write(root.join("shop/views.py"), "").unwrap();
        fs::write(root.join("shop/README.md"), "").unwrap();
        fs::write(root.join("shop/migrations/0001_initial.py"), "").unwrap();

        let files = discover_files(root, &default_excludes(), true).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("settings.py"), PathBuf::from("shop/views.py")]
        );
    }

    #[test]
    fn extra_exclude_patterns_apply() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("legacy")).unwrap();
        fs::write(tmp.path().join("legacy/old.py"), "").unwrap();
        fs::write(tmp.path().join("app.py"), "").unwrap();

        let excludes = compile_excludes(&["**/legacy/**".to_string()]).unwrap();
        let files = discover_files(tmp.path(), &excludes, true).unwrap();
        assert_eq!(files, vec![tmp.path().join("app.py")]);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = compile_excludes(&["[".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Invalid exclude pattern"));
    }

    #[test]
    fn unparsable_file_becomes_failed_report() {
        let tmp = TempDir::new().unwrap();
        let broken = tmp.path().join("broken.py");
        fs::write(&broken, "def broken(:\n").unwrap();
        let good = tmp.path().join("settings.py");
        fs::write(&good, "DEBUG = True\n").unwrap();

        let analyzer = Analyzer::new(Config::default());
        let failed = check_file(&analyzer, &broken);
        assert!(failed.error.is_some());
        assert_eq!(failed.diagnostics_count, 0);

        let report = check_file(&analyzer, &good);
        assert!(report.error.is_none());
        assert_eq!(report.diagnostics[0].issue_code, RuleCode::Sec01);
    }

    #[test]
    fn missing_file_becomes_failed_report() {
        let analyzer = Analyzer::new(Config::default());
        let report = check_file(&analyzer, Path::new("/nonexistent/views.py"));
        assert!(report.error.unwrap().starts_with("failed to read file"));
    }
}
