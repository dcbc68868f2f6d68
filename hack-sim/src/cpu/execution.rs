use super::instruction::Instr;
use super::{Cpu, CpuState};
use crate::constants::RAM_SIZE;
use crate::error::{Result, SimError};

impl Cpu {
    pub(super) fn execute_instruction(&mut self, instr: Instr) -> Result<()> {
        match instr {
            Instr::Load(value) => {
                self.a = value as i16;
                self.pc += 1;
            }
            Instr::Compute { dest, comp, jump } => {
                let y = if comp.reads_memory() { self.read_m()? } else { self.a };
                let out = comp.op.apply(self.d, y);

                // M and the jump target both use A as it was before this instruction
                let address = self.a;
                if dest.m {
                    self.write_ram(address, out)?;
                }
                if dest.a {
                    self.a = out;
                }
                if dest.d {
                    self.d = out;
                }

                match jump {
                    Some(jump) if jump.taken(out) => self.pc = address as u16,
                    _ => self.pc += 1,
                }
            }
        }

        let len = self.program.len();
        if self.pc as usize == len {
            self.state = CpuState::Halted;
        } else if self.pc as usize > len {
            return Err(SimError::PcOutOfRange { pc: self.pc, len });
        }
        Ok(())
    }

    fn read_m(&self) -> Result<i16> {
        let address = self.checked_address(self.a)?;
        Ok(self.ram[address])
    }

    fn write_ram(&mut self, address: i16, value: i16) -> Result<()> {
        let address = self.checked_address(address)?;
        self.ram[address] = value;
        Ok(())
    }

    fn checked_address(&self, address: i16) -> Result<usize> {
        if address < 0 || address as usize >= RAM_SIZE {
            return Err(SimError::RamOutOfRange { address, pc: self.pc });
        }
        Ok(address as usize)
    }
}
