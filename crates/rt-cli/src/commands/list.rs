use std::path::PathBuf;

use comfy_table::{ContentArrangement, Table};
use rt_tables::Rollable;

pub fn run(files: &[PathBuf], prefix: Option<&str>) -> Result<(), String> {
    let registry = super::load_registry(files)?;
    let rollables = registry.tables_in_directory(prefix.unwrap_or("/"));

    if rollables.is_empty() {
        println!("  No tables found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Identifier", "Kind", "Title", "Dice"]);

    for rollable in &rollables {
        let (kind, dice) = match rollable.as_ref() {
            Rollable::Table(t) => ("table", t.dice.to_string()),
            Rollable::Bundle(b) => ("bundle", format!("{} refs", b.tables.len())),
        };
        table.add_row(vec![rollable.identifier(), kind, rollable.title(), dice.as_str()]);
    }

    println!("{table}");
    println!();
    println!("  {} tables", rollables.len());

    Ok(())
}
