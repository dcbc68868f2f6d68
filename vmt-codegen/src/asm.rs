//! Hack Assembly Instruction Definitions
//!
//! This module defines the instruction set and register model for the Hack
//! machine. The machine has two general registers, `A` and `D`, plus `M`,
//! the memory cell addressed by `A`. The VM's stack and segment pointers are
//! plain RAM cells with predefined symbols.

use std::fmt;

/// Predefined RAM cells used by the VM calling convention
///
/// - SP: stack pointer (RAM[0])
/// - LCL, ARG, THIS, THAT: segment base pointers (RAM[1..=4])
/// - R13, R14: scratch cells used by `return`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    Sp,
    Lcl,
    Arg,
    This,
    That,
    R13,
    R14,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::Sp => write!(f, "SP"),
            Reg::Lcl => write!(f, "LCL"),
            Reg::Arg => write!(f, "ARG"),
            Reg::This => write!(f, "THIS"),
            Reg::That => write!(f, "THAT"),
            Reg::R13 => write!(f, "R13"),
            Reg::R14 => write!(f, "R14"),
        }
    }
}

/// Destination part of a compute instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dest {
    M,
    D,
    MD,
    A,
    AM,
    AD,
    AMD,
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Dest::M => "M",
            Dest::D => "D",
            Dest::MD => "MD",
            Dest::A => "A",
            Dest::AM => "AM",
            Dest::AD => "AD",
            Dest::AMD => "AMD",
        };
        f.write_str(s)
    }
}

/// ALU computations supported by the Hack CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comp {
    Zero,
    One,
    NegOne,
    D,
    A,
    M,
    NotD,
    NotA,
    NotM,
    NegD,
    NegA,
    NegM,
    DPlusOne,
    APlusOne,
    MPlusOne,
    DMinusOne,
    AMinusOne,
    MMinusOne,
    DPlusA,
    DPlusM,
    DMinusA,
    DMinusM,
    AMinusD,
    MMinusD,
    DAndA,
    DAndM,
    DOrA,
    DOrM,
}

impl fmt::Display for Comp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comp::Zero => "0",
            Comp::One => "1",
            Comp::NegOne => "-1",
            Comp::D => "D",
            Comp::A => "A",
            Comp::M => "M",
            Comp::NotD => "!D",
            Comp::NotA => "!A",
            Comp::NotM => "!M",
            Comp::NegD => "-D",
            Comp::NegA => "-A",
            Comp::NegM => "-M",
            Comp::DPlusOne => "D+1",
            Comp::APlusOne => "A+1",
            Comp::MPlusOne => "M+1",
            Comp::DMinusOne => "D-1",
            Comp::AMinusOne => "A-1",
            Comp::MMinusOne => "M-1",
            Comp::DPlusA => "D+A",
            Comp::DPlusM => "D+M",
            Comp::DMinusA => "D-A",
            Comp::DMinusM => "D-M",
            Comp::AMinusD => "A-D",
            Comp::MMinusD => "M-D",
            Comp::DAndA => "D&A",
            Comp::DAndM => "D&M",
            Comp::DOrA => "D|A",
            Comp::DOrM => "D|M",
        };
        f.write_str(s)
    }
}

/// Jump conditions, tested against the computed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Jgt,
    Jeq,
    Jge,
    Jlt,
    Jne,
    Jle,
    Jmp,
}

impl fmt::Display for Jump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Jump::Jgt => "JGT",
            Jump::Jeq => "JEQ",
            Jump::Jge => "JGE",
            Jump::Jlt => "JLT",
            Jump::Jne => "JNE",
            Jump::Jle => "JLE",
            Jump::Jmp => "JMP",
        };
        f.write_str(s)
    }
}

/// Operand of an A-instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addr {
    Const(u16),
    Symbol(String),
    Reg(Reg),
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Addr::Const(value) => write!(f, "{}", value),
            Addr::Symbol(name) => write!(f, "{}", name),
            Addr::Reg(reg) => write!(f, "{}", reg),
        }
    }
}

/// Hack Assembly Instructions
#[derive(Debug, Clone, PartialEq)]
pub enum AsmInst {
    /// `@value` - load A
    At(Addr),

    /// `dest=comp;jump`
    Compute {
        dest: Option<Dest>,
        comp: Comp,
        jump: Option<Jump>,
    },

    // Assembly Pseudo-Instructions
    Label(String),   // Jump target declaration
    Comment(String), // Assembly comment
}

impl AsmInst {
    pub fn at_const(value: u16) -> Self {
        AsmInst::At(Addr::Const(value))
    }

    pub fn at_symbol(name: impl Into<String>) -> Self {
        AsmInst::At(Addr::Symbol(name.into()))
    }

    pub fn at_reg(reg: Reg) -> Self {
        AsmInst::At(Addr::Reg(reg))
    }

    /// `dest=comp`
    pub fn assign(dest: Dest, comp: Comp) -> Self {
        AsmInst::Compute {
            dest: Some(dest),
            comp,
            jump: None,
        }
    }

    /// `comp;jump`
    pub fn jump(comp: Comp, jump: Jump) -> Self {
        AsmInst::Compute {
            dest: None,
            comp,
            jump: Some(jump),
        }
    }

    pub fn label(name: impl Into<String>) -> Self {
        AsmInst::Label(name.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        AsmInst::Comment(text.into())
    }
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmInst::At(addr) => write!(f, "@{}", addr),
            AsmInst::Compute { dest, comp, jump } => {
                if let Some(dest) = dest {
                    write!(f, "{}=", dest)?;
                }
                write!(f, "{}", comp)?;
                if let Some(jump) = jump {
                    write!(f, ";{}", jump)?;
                }
                Ok(())
            }
            AsmInst::Label(label) => write!(f, "({})", label),
            AsmInst::Comment(text) => write!(f, "//  {}", text),
        }
    }
}
