pub mod check;
pub mod dice;
pub mod list;
pub mod random;
pub mod roll;
pub mod test;

use std::path::{Path, PathBuf};

use colored::Colorize;
use rt_tables::{EngineConfig, Registry, RollResult};

/// Load every definitions file into one registry.
fn load_registry(files: &[PathBuf]) -> Result<Registry, String> {
    if files.is_empty() {
        return Err("no table files given (use --tables <FILE>)".into());
    }
    let mut registry = Registry::new();
    for file in files {
        load_file(&mut registry, file)?;
    }
    Ok(registry)
}

fn load_file(registry: &mut Registry, file: &Path) -> Result<(), String> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let loaded = registry
        .load_json(&text)
        .map_err(|e| format!("{}: {e}", file.display()))?;
    tracing::debug!(file = %file.display(), count = loaded.len(), "loaded definitions");
    Ok(())
}

fn engine_config(seed: Option<u64>) -> EngineConfig {
    match seed {
        Some(seed) => EngineConfig::default().with_seed(seed),
        None => EngineConfig::default(),
    }
}

/// Parse a `key=value` context entry.
pub fn parse_context_value(s: &str) -> Result<(String, i64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number"))?;
    Ok((key.trim().to_string(), value))
}

/// Print roll results grouped per reference, as text or JSON.
fn print_results(groups: &[Vec<RollResult>], json: bool) -> Result<(), String> {
    if json {
        let out = serde_json::to_string_pretty(groups)
            .map_err(|e| format!("cannot encode results: {e}"))?;
        println!("{out}");
        return Ok(());
    }
    for result in groups.iter().flatten() {
        print_result(result, 1);
    }
    Ok(())
}

/// Print one result and its expanded meta, indented by nesting level.
fn print_result(result: &RollResult, level: usize) {
    let pad = "  ".repeat(level);
    println!(
        "{pad}{} {}",
        format!("{}:", result.title).bold(),
        format!("[{}]", result.total).dimmed()
    );
    println!("{pad}  {}", result.row.text);
    if let Some(extra) = &result.extra_results {
        println!("{pad}  {}", extra.text.yellow());
    }
    for nested in result.evaluated_tables().unwrap_or_default().iter().flatten() {
        print_result(nested, level + 1);
    }
}
