use std::path::PathBuf;

use rt_tables::{Context, RollEngine};

pub fn run(
    files: &[PathBuf],
    path: &str,
    count: u32,
    seed: Option<u64>,
    set: Vec<(String, i64)>,
    json: bool,
) -> Result<(), String> {
    let registry = super::load_registry(files)?;
    let mut engine = RollEngine::new(&registry, &super::engine_config(seed));
    let context: Context = set.into_iter().collect();

    let mut groups = Vec::new();
    for _ in 0..count {
        let rolled = engine
            .roll_path(path, context.clone())
            .map_err(|e| e.to_string())?;
        groups.extend(rolled);
    }
    super::print_results(&groups, json)
}
