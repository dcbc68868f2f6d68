pub mod constants;
pub mod cpu;
pub mod error;
pub mod parser;

// Re-export commonly used types
pub use cpu::{Cpu, CpuState, StopReason};
pub use error::SimError;
pub use parser::{parse_program, Program};

/// Parse `source` and wrap it in a fresh CPU
pub fn load(source: &str) -> error::Result<Cpu> {
    Ok(Cpu::new(parse_program(source)?))
}
