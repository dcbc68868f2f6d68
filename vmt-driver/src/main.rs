//! Hack VM Translator
//!
//! Translates a `.vm` file, or a directory of them, into one `.asm` file.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use vmt_driver::{instructions_json, load_units, write_units, JobConfig};

#[derive(Parser, Debug)]
#[command(name = "vmt")]
#[command(about = "Hack VM Translator - VM code to Hack assembly")]
#[command(version = "0.1.0")]
struct Cli {
    /// A .vm file or a directory of .vm files
    input: PathBuf,

    /// Output assembly file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not echo VM instructions as comments
    #[arg(long)]
    no_comments: bool,

    /// Emit bootstrap code (default for directories)
    #[arg(long, conflicts_with = "no_bootstrap")]
    bootstrap: bool,

    /// Omit bootstrap code (default for single files)
    #[arg(long)]
    no_bootstrap: bool,

    /// Print the parsed instructions as JSON before translating
    #[arg(long)]
    print_instructions: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn bootstrap_override(&self) -> Option<bool> {
        match (self.bootstrap, self.no_bootstrap) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose && std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = translate(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn translate(cli: &Cli) -> Result<()> {
    let config = JobConfig::resolve(
        &cli.input,
        cli.output.as_deref(),
        !cli.no_comments,
        cli.bootstrap_override(),
    )?;

    let units = load_units(&config.inputs)?;
    if cli.print_instructions {
        println!("{}", instructions_json(&units)?);
    }

    let summary = write_units(&units, &config)?;
    println!(
        "Translated {} unit(s), {} instructions: {}",
        summary.units.len(),
        summary.instructions,
        summary.units.join(", ")
    );
    println!("Assembly written to: {}", summary.output.display());
    Ok(())
}
