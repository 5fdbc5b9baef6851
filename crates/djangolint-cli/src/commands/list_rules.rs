//! List rules command implementation.

use djangolint_core::RuleCode;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<28} {:<12} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(96));

    for rule in RuleCode::ALL {
        println!(
            "{:<8} {:<28} {:<12} {}",
            rule.as_str(),
            rule.name(),
            rule.default_severity().to_string(),
            rule.description()
        );
    }

    println!("\nShort-name and boolean rules (CDQ02, STY01-STY04) are off until enabled");
    println!("under [conventions] in djangolint.toml. Run `djangolint init` to create one.");
}
