//! Shared output formatting for lint results.

use anyhow::Result;
use djangolint_core::{FileReport, LintResult, Severity};
use serde::Serialize;

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
    }
    Ok(())
}

fn severity_indicator(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Information => "\x1b[34minfo\x1b[0m",
        Severity::Hint => "\x1b[36mhint\x1b[0m",
    }
}

fn print_text(result: &LintResult) {
    let (errors, warnings, infos, hints) = result.count_by_severity();

    for d in result.diagnostics() {
        println!(
            "{} {} at {}:{}:{}",
            d.issue_code,
            d.issue_code.name(),
            d.file_path.display(),
            d.line,
            d.col_offset,
        );
        for line in d.message.lines().filter(|l| !l.trim().is_empty()) {
            println!("  {}: {}", severity_indicator(d.severity), line);
        }
        if let Some(suggestion) = &d.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        if let Some(doc_link) = &d.doc_link {
            println!("  = see: {doc_link}");
        }
        println!();
    }

    for failed in result.failures() {
        println!(
            "\x1b[31mfailed\x1b[0m {}: {}",
            failed.file_path.display(),
            failed.error.as_deref().unwrap_or_default()
        );
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s), {} hint(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, hints, result.files_checked
    );
}

/// JSON shape of a batch run.
#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    files_checked: usize,
    total: usize,
    errors: usize,
    warnings: usize,
    infos: usize,
    hints: usize,
}

impl<'a> JsonReport<'a> {
    fn new(result: &'a LintResult) -> Self {
        let (errors, warnings, infos, hints) = result.count_by_severity();
        Self {
            files: &result.files,
            files_checked: result.files_checked,
            total: result.total(),
            errors,
            warnings,
            infos,
            hints,
        }
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport::new(result))?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for d in result.diagnostics() {
        println!("{d}");
    }
}
