use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use vmt_codegen::CodegenOptions;

pub const SOURCE_EXTENSION: &str = "vm";
pub const OUTPUT_EXTENSION: &str = "asm";

/// Everything a translation job needs, resolved from the command line
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// `.vm` files in translation order
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub options: CodegenOptions,
}

impl JobConfig {
    /// Resolve inputs, output path and options for `input`.
    ///
    /// Bootstrap defaults to on for directories and off for single files;
    /// `bootstrap` overrides that when given.
    pub fn resolve(
        input: &Path,
        output: Option<&Path>,
        echo_source: bool,
        bootstrap: Option<bool>,
    ) -> Result<Self> {
        let is_dir = input.is_dir();
        let inputs = discover_inputs(input)?;

        let output = match output {
            Some(path) => path.to_path_buf(),
            None => default_output_path(input, is_dir)?,
        };
        if output.extension().and_then(|e| e.to_str()) != Some(OUTPUT_EXTENSION) {
            bail!("Output file '{}' must have a .{} extension", output.display(), OUTPUT_EXTENSION);
        }

        let options = CodegenOptions::default()
            .with_echo_source(echo_source)
            .with_bootstrap(bootstrap.unwrap_or(is_dir));

        Ok(Self { inputs, output, options })
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
}

/// The `.vm` files named by `input`: the file itself, or every `.vm` file
/// directly inside a directory, sorted by file name
pub fn discover_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        bail!("Input '{}' does not exist", input.display());
    }

    if input.is_file() {
        if !has_source_extension(input) {
            bail!("Input file '{}' must have a .{} extension", input.display(), SOURCE_EXTENSION);
        }
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input)
        .with_context(|| format!("Failed to read directory '{}'", input.display()))?
    {
        let path = entry?.path();
        if path.is_file() && has_source_extension(&path) {
            files.push(path);
        }
    }

    if files.is_empty() {
        bail!("No .{} files found in '{}'", SOURCE_EXTENSION, input.display());
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// `Foo.vm` -> `Foo.asm` alongside; `Dir/` -> `Dir/Dir.asm`
pub fn default_output_path(input: &Path, is_dir: bool) -> Result<PathBuf> {
    if is_dir {
        // canonicalize so that `.` still yields a usable name
        let dir = input
            .canonicalize()
            .with_context(|| format!("Failed to resolve '{}'", input.display()))?;
        let name = dir
            .file_name()
            .with_context(|| format!("Cannot derive an output name from '{}'", input.display()))?;
        Ok(input.join(format!("{}.{}", name.to_string_lossy(), OUTPUT_EXTENSION)))
    } else {
        Ok(input.with_extension(OUTPUT_EXTENSION))
    }
}
