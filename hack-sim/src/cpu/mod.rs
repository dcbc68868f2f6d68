/// CPU module - the Hack machine: A, D, PC and 32K words of RAM

mod execution;
mod instruction;
mod state;

pub use instruction::{AluOp, Comp, Dest, Instr, Jump};
pub use state::{CpuState, StopReason};

use crate::constants::*;
use crate::error::{Result, SimError};
use crate::parser::Program;
use log::{debug, trace};

/// The Hack CPU
pub struct Cpu {
    program: Program,

    // Registers
    pub a: i16,
    pub d: i16,
    pub pc: u16,

    // Data memory
    ram: Vec<i16>,

    pub state: CpuState,

    // Instructions executed since construction
    steps: u64,
}

impl Cpu {
    pub fn new(program: Program) -> Self {
        let state = if program.is_empty() { CpuState::Halted } else { CpuState::Running };
        Cpu {
            program,
            a: 0,
            d: 0,
            pc: 0,
            ram: vec![0; RAM_SIZE],
            state,
            steps: 0,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Read a RAM cell. Addresses outside RAM read as 0.
    pub fn peek(&self, address: u16) -> i16 {
        self.ram.get(address as usize).copied().unwrap_or(0)
    }

    /// Write a RAM cell. Writes outside RAM are ignored.
    pub fn poke(&mut self, address: u16, value: i16) {
        if let Some(cell) = self.ram.get_mut(address as usize) {
            *cell = value;
        }
    }

    /// Current stack pointer
    pub fn sp(&self) -> u16 {
        self.peek(0) as u16
    }

    /// Stack contents, `RAM[256..SP]`, bottom first
    pub fn stack(&self) -> Vec<i16> {
        let top = (self.sp() as usize).clamp(STACK_BASE as usize, RAM_SIZE);
        self.ram[STACK_BASE as usize..top].to_vec()
    }

    /// Copy of `RAM[start..end]`, clamped to RAM
    pub fn dump(&self, start: u16, end: u16) -> Vec<i16> {
        let end = (end as usize).min(RAM_SIZE);
        let start = (start as usize).min(end);
        self.ram[start..end].to_vec()
    }

    /// Execute one instruction. Returns `false` once the program has halted.
    pub fn step(&mut self) -> Result<bool> {
        if self.is_halted() {
            return Ok(false);
        }

        let len = self.program.len();
        let instr = *self
            .program
            .instructions
            .get(self.pc as usize)
            .ok_or(SimError::PcOutOfRange { pc: self.pc, len })?;

        trace!("PC={} A={} D={} {:?}", self.pc, self.a, self.d, instr);
        self.execute_instruction(instr)?;
        self.steps += 1;
        Ok(!self.is_halted())
    }

    /// Run until the program halts
    pub fn run(&mut self, max_steps: u64) -> Result<u64> {
        self.run_bounded(None, max_steps).map(|(steps, _)| steps)
    }

    /// Run until PC reaches `address` or the program halts
    pub fn run_until(&mut self, address: u16, max_steps: u64) -> Result<StopReason> {
        self.run_bounded(Some(address), max_steps).map(|(_, reason)| reason)
    }

    /// Run until PC reaches the ROM address of `label`
    pub fn run_until_label(&mut self, label: &str, max_steps: u64) -> Result<StopReason> {
        let address = self
            .program
            .label_address(label)
            .ok_or_else(|| SimError::UnknownLabel { name: label.to_string() })?;
        debug!("Running until {label} (ROM {address})");
        self.run_until(address, max_steps)
    }

    fn run_bounded(&mut self, target: Option<u16>, max_steps: u64) -> Result<(u64, StopReason)> {
        let mut executed = 0;
        loop {
            if self.is_halted() {
                return Ok((executed, StopReason::Halted));
            }
            if let Some(address) = target {
                if self.pc == address {
                    return Ok((executed, StopReason::ReachedAddress(address)));
                }
            }
            if executed >= max_steps {
                return Err(SimError::StepLimitExceeded { steps: max_steps, pc: self.pc });
            }
            self.step()?;
            executed += 1;
        }
    }
}
