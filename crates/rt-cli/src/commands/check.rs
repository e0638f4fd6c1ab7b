use std::path::PathBuf;

use colored::Colorize;
use rt_tables::{Rollable, validate_table};

pub fn run(files: &[PathBuf]) -> Result<(), String> {
    let registry = super::load_registry(files)?;

    let mut tables = 0;
    let mut bundles = 0;
    let mut issues = Vec::new();
    for rollable in registry.iter() {
        match rollable.as_ref() {
            Rollable::Table(table) => {
                tables += 1;
                issues.extend(validate_table(table));
            }
            Rollable::Bundle(_) => bundles += 1,
        }
    }

    if !issues.is_empty() {
        for issue in &issues {
            println!("  {} {}: {}", "warning".yellow(), issue.table.bold(), issue.kind);
        }
        return Err(format!("{} issue(s) found", issues.len()));
    }

    println!("  All checks passed: {tables} tables, {bundles} bundles");
    Ok(())
}
