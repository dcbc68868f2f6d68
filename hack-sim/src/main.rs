mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use colored::*;
use hack_sim::{Cpu, SimError};
use log::info;
use std::fs;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose && std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let source = fs::read_to_string(&cli.asm_file)
        .with_context(|| format!("Error reading file '{}'", cli.asm_file.display()))?;
    let program = hack_sim::parse_program(&source)
        .with_context(|| format!("Error loading '{}'", cli.asm_file.display()))?;
    info!("Loaded {} instructions from {}", program.len(), cli.asm_file.display());

    let mut cpu = Cpu::new(program);
    if let Some(sp) = cli.sp {
        cpu.poke(0, sp as i16);
    }

    match cpu.run(cli.steps) {
        Ok(steps) => println!("{} after {} steps", "Halted".green().bold(), steps),
        // Hack programs usually end in an infinite loop
        Err(SimError::StepLimitExceeded { steps, pc }) => {
            println!("{} after {} steps at PC={}", "Stopped".yellow().bold(), steps, pc)
        }
        Err(e) => return Err(e).context("Execution failed"),
    }

    println!("A={} D={} PC={} SP={}", cpu.a, cpu.d, cpu.pc, cpu.sp());
    println!("{} {:?}", "Stack:".bold(), cpu.stack());

    if let Some(range) = cli.dump {
        for (offset, value) in cpu.dump(range.start, range.end).iter().enumerate() {
            println!("RAM[{:5}] = {}", range.start as usize + offset, value);
        }
    }

    Ok(())
}
