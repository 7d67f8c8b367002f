use anyhow::{Context, Error, Result};
use cw_bindgen::{compile, GeneratedModule, SchemaSources};
use rayon::prelude::*;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::{ContractTarget, DriverConfig};

#[derive(Debug)]
pub struct Generated {
    pub name:    String,
    pub output:  PathBuf,
    pub types:   usize,
    pub methods: usize,
}

#[derive(Debug)]
pub struct Failure {
    pub name:  String,
    pub error: Error,
}

/// Outcome of one driver run, in config order.
#[derive(Debug, Default)]
pub struct DriverReport {
    pub generated: Vec<Generated>,
    pub failed:    Vec<Failure>,
}

impl DriverReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Reads a schema directory and compiles it under the given contract identity.
pub fn compile_contract(name: &str, schema_dir: &Path) -> Result<GeneratedModule> {
    let sources = SchemaSources::from_dir(schema_dir)
        .with_context(|| format!("Failed to read schemas from {}", schema_dir.display()))?;
    let module = compile(name, &sources).with_context(|| format!("Failed to compile contract {}", name))?;
    Ok(module)
}

fn generate(target: &ContractTarget) -> Result<Generated> {
    let module = compile_contract(&target.name, &target.schema_dir)?;
    let output = target.output_path();
    write_atomic(&output, module.render().as_bytes())?;

    info!(
        contract = %target.name,
        output = %output.display(),
        types = module.type_names.len(),
        methods = module.client_methods.len(),
        "generated bindings"
    );
    Ok(Generated {
        name:    target.name.clone(),
        output,
        types:   module.type_names.len(),
        methods: module.client_methods.len(),
    })
}

/// Compiles every contract in parallel. A failing contract does not stop the
/// others; failures are logged and collected in the report.
pub fn run(config: &DriverConfig) -> DriverReport {
    let results: Vec<(String, Result<Generated>)> = config
        .contracts
        .par_iter()
        .map(|target| (target.name.clone(), generate(target)))
        .collect();

    let mut report = DriverReport::default();
    for (name, result) in results {
        match result {
            Ok(generated) => report.generated.push(generated),
            Err(err) => {
                error!(contract = %name, error = %format!("{:#}", err), "failed to generate bindings");
                report.failed.push(Failure { name, error: err });
            }
        }
    }
    report
}

/// Writes `contents` to a sibling temporary file and renames it over `path`,
/// so `path` is either the old file or the complete new one.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let mut temp_name = path.file_name().map(OsString::from).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err).with_context(|| format!("Failed to move bindings into {}", path.display()));
    }
    Ok(())
}
