use std::fs;
use std::path::{Path, PathBuf};

use fieldspec_schema::{ConsistencyRegistry, DatasetDefinition, compile};
use tracing::info;

use crate::error::Result;

/// Dataset definitions shipped inside a job, relative to its root.
pub const SCHEMA_SOURCE_DIR: &str = "schemas";
/// Compiled index bodies, relative to the job root.
pub const SCHEMA_OUTPUT_DIR: &str = "es_config";

/// Compile every `schemas/*.json` definition in the staged job under one
/// registry session and write `<dataset>_es_config.json` index bodies.
/// Shared alias lookups live in `schemas/aliases/`.
///
/// Returns the output directory, or `None` when the job ships no schemas.
/// Any schema error fails the job before it runs.
pub fn compile_schemas(work_dir: &Path) -> Result<Option<PathBuf>> {
    let source = work_dir.join(SCHEMA_SOURCE_DIR);
    if !source.is_dir() {
        return Ok(None);
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(&source)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    paths.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"));
    paths.sort();

    let output = work_dir.join(SCHEMA_OUTPUT_DIR);
    fs::create_dir_all(&output)?;

    let registry = ConsistencyRegistry::in_memory();
    for path in &paths {
        let definition = DatasetDefinition::from_path(path)?;
        let schema = compile(&registry, &definition)?;
        let body = serde_json::to_vec_pretty(&schema.to_index_body())
            .map_err(std::io::Error::other)?;
        fs::write(output.join(format!("{}_es_config.json", schema.name())), body)?;
    }

    info!(
        datasets = paths.len(),
        bindings = registry.bindings()?.len(),
        dir = %output.display(),
        "compiled job schemas"
    );
    Ok(Some(output))
}
