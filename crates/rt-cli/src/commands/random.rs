use std::path::PathBuf;

use rt_tables::{Context, RollEngine};

pub fn run(files: &[PathBuf], seed: Option<u64>, json: bool) -> Result<(), String> {
    let registry = super::load_registry(files)?;
    let mut engine = RollEngine::new(&registry, &super::engine_config(seed));
    let table = registry
        .random_table(engine.rng())
        .ok_or("no tables loaded")?;
    let groups = engine
        .roll_rollable(&table, Context::new())
        .map_err(|e| e.to_string())?;
    super::print_results(&groups, json)
}
