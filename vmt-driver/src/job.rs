use crate::config::JobConfig;
use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use vmt_codegen::CodeWriter;
use vmt_frontend::{Frontend, ParsedInstruction};

/// One parsed source file
#[derive(Debug, Clone, Serialize)]
pub struct Unit {
    pub name: String,
    pub path: PathBuf,
    pub instructions: Vec<ParsedInstruction>,
}

/// What a finished job produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub units: Vec<String>,
    pub instructions: usize,
    pub output: PathBuf,
    pub lines: usize,
}

/// Read and parse every input of the job, in order
pub fn load_units(inputs: &[PathBuf]) -> Result<Vec<Unit>> {
    inputs.iter().map(|path| load_unit(path)).collect()
}

fn load_unit(path: &Path) -> Result<Unit> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid unit file name '{}'", path.display()))?;
    // only the trailing `.vm` goes; `Lib.a.vm` is unit `Lib.a`
    let name = filename.strip_suffix(".vm").unwrap_or(filename).to_string();

    let instructions = Frontend::parse_source(&source, filename)
        .with_context(|| format!("Failed to parse '{}'", path.display()))?;
    debug!("{}: {} instructions", name, instructions.len());

    Ok(Unit { name, path: path.to_path_buf(), instructions })
}

/// Pretty JSON of the parsed units, for `--print-instructions`
pub fn instructions_json(units: &[Unit]) -> Result<String> {
    Ok(serde_json::to_string_pretty(units)?)
}

/// Translate `units` into the job's output file.
///
/// If translation fails after the output was created, the partial file is
/// removed. A path that could not be created is left untouched.
pub fn write_units(units: &[Unit], config: &JobConfig) -> Result<JobSummary> {
    let file = File::create(&config.output)
        .with_context(|| format!("Failed to create '{}'", config.output.display()))?;

    let result = write_output(file, units, config);
    if result.is_err() {
        warn!("Removing partial output {}", config.output.display());
        // the translation error is the one worth reporting
        let _ = fs::remove_file(&config.output);
    }
    result
}

fn write_output(file: File, units: &[Unit], config: &JobConfig) -> Result<JobSummary> {
    let mut writer = CodeWriter::new(BufWriter::new(file), config.options)?;

    for unit in units {
        writer.set_unit_name(&unit.name);
        for parsed in &unit.instructions {
            writer.translate_at(&parsed.instruction, Some(parsed.location.line))?;
        }
    }

    let lines = writer.lines_written();
    writer.close()?;

    let summary = JobSummary {
        units: units.iter().map(|u| u.name.clone()).collect(),
        instructions: units.iter().map(|u| u.instructions.len()).sum(),
        output: config.output.clone(),
        lines,
    };
    info!("Wrote {} lines to {}", summary.lines, summary.output.display());
    Ok(summary)
}

/// Load and translate in one go
pub fn run_job(config: &JobConfig) -> Result<JobSummary> {
    let units = load_units(&config.inputs)?;
    write_units(&units, config)
}
