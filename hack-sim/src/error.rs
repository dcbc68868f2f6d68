use thiserror::Error;

/// Errors raised while loading or running a Hack program
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("line {line}: unknown {kind} '{text}'")]
    UnknownMnemonic {
        line: usize,
        kind: &'static str,
        text: String,
    },

    #[error("line {line}: invalid address '{text}'")]
    BadAddress { line: usize, text: String },

    #[error("line {line}: invalid label '{text}'")]
    BadLabel { line: usize, text: String },

    #[error("line {line}: label '{name}' is already defined")]
    DuplicateLabel { line: usize, name: String },

    #[error("no label named '{name}'")]
    UnknownLabel { name: String },

    #[error("step limit of {steps} exceeded at PC={pc}")]
    StepLimitExceeded { steps: u64, pc: u16 },

    #[error("PC {pc} is outside the program ({len} instructions)")]
    PcOutOfRange { pc: u16, len: usize },

    #[error("RAM access at {address} is out of range (PC={pc})")]
    RamOutOfRange { address: i16, pc: u16 },
}

pub type Result<T> = std::result::Result<T, SimError>;
