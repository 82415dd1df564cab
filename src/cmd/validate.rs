//! Configuration validation command: `review-gate validate`.

use anyhow::{Context, Result};
use std::path::Path;

pub fn cmd_validate(config_path: &Path) -> Result<()> {
    use review_gate::rules::ConfigurationFile;

    let config = ConfigurationFile::load(config_path)
        .with_context(|| format!("Invalid configuration at {}", config_path.display()))?;

    println!();
    println!("{}", console::style("Config is valid!").green().bold());
    println!();
    println!("{:<30} {:<14} Include", "Rule", "Type");
    for rule in &config.rules {
        println!(
            "{:<30} {:<14} {}",
            rule.name,
            rule.rule_type().to_string(),
            rule.condition.include.join(", ")
        );
    }
    println!();
    Ok(())
}
