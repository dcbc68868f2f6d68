use clap::Parser;
use std::ops::Range;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hacksim",
    about = "Hack CPU simulator - Run Hack assembly programs",
    long_about = "Runs a Hack assembly program on a 32K-word Hack machine and reports\n\
                  the resulting stack and registers.",
    version
)]
pub struct Cli {
    /// Assembly file to execute
    pub asm_file: PathBuf,

    /// Maximum number of instructions to execute
    #[arg(short = 's', long, default_value_t = hack_sim::constants::DEFAULT_MAX_STEPS)]
    pub steps: u64,

    /// Initialise SP before running (for programs without bootstrap code)
    #[arg(long)]
    pub sp: Option<u16>,

    /// Print RAM[START..END] after running
    #[arg(short = 'd', long, value_parser = parse_range)]
    pub dump: Option<Range<u16>>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Parse a RAM range such as `256..300`
pub fn parse_range(s: &str) -> Result<Range<u16>, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("Invalid range '{s}', expected START..END"))?;
    let start: u16 = start.trim().parse().map_err(|_| format!("Invalid range start: {start}"))?;
    let end: u16 = end.trim().parse().map_err(|_| format!("Invalid range end: {end}"))?;
    if start > end {
        return Err(format!("Range start {start} is after end {end}"));
    }
    Ok(start..end)
}
