use std::path::PathBuf;

use colored::Colorize;
use rt_tables::{RollEngine, TableError, TableStore};

pub fn run(files: &[PathBuf], path: &str, seed: Option<u64>) -> Result<(), String> {
    let registry = super::load_registry(files)?;
    let rollable = registry
        .get_rollable(path, None)
        .map_err(|e| e.to_string())?;
    let table = rollable
        .as_table()
        .ok_or_else(|| TableError::NotATable(path.to_string()).to_string())?;

    let mut engine = RollEngine::new(&registry, &super::engine_config(seed));
    let results = engine.self_test(table).map_err(|e| e.to_string())?;

    println!("  {}", table.identifier.dimmed());
    println!("  {}", table.title.bold());
    if let Some(extra) = results.first().and_then(|r| r.extra_results.as_ref()) {
        println!("  {}", extra.text.yellow());
    }
    println!();

    for result in &results {
        println!("  {}: {}", result.total, result.row.text);
        for nested in result.evaluated_tables().unwrap_or_default().iter().flatten() {
            println!("    {}", nested.title.bold());
            println!("      - {}", nested.row.text);
        }
    }
    Ok(())
}
