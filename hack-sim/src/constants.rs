//! Central configuration and constants for the Hack simulator

// Memory layout
pub const RAM_SIZE: usize = 32768;
pub const SCREEN: u16 = 16384;
pub const KBD: u16 = 24576;

// Stack
pub const STACK_BASE: u16 = 256;

// First RAM cell handed out to assembler variables
pub const VARIABLE_BASE: u16 = 16;

// Largest value an A-instruction can load
pub const MAX_ADDRESS_LITERAL: u16 = 32767;

// Default step budget for the CLI
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

// Virtual registers and segment pointers
pub const PREDEFINED_SYMBOLS: [(&str, u16); 7] = [
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("SCREEN", SCREEN),
    ("KBD", KBD),
];

// Number of R0..R15 registers
pub const NUM_VIRTUAL_REGISTERS: u16 = 16;
