//! Hack VM ABI Implementation
//!
//! This module implements the VM calling convention on the Hack machine:
//! stack layout, function entry, the call sequence, the return sequence and
//! the bootstrap code.
//!
//! Frame layout after `call f n` (stack grows upward):
//!
//! ```text
//! ARG ->  argument 0 .. argument n-1
//!         return address
//!         saved LCL
//!         saved ARG
//!         saved THIS
//!         saved THAT
//! LCL ->  local 0 .. local k-1
//! SP  ->
//! ```

use crate::asm::{AsmInst, Comp, Dest, Jump, Reg};
use log::trace;
use vmt_common::{Result, TranslateError};

/// Initial stack pointer set by the bootstrap code
pub const STACK_BASE: u16 = 256;

/// First RAM cell of the `temp` segment
pub const TEMP_BASE: u16 = 5;

/// Largest value an A-instruction can load
pub const MAX_CONSTANT: u16 = 32767;

/// Function called by the bootstrap code
pub const ENTRY_FUNCTION: &str = "Sys.init";

/// VM calling convention on the Hack machine
pub struct CallingConvention;

impl CallingConvention {
    /// Caller registers saved by `call`, in push order
    pub const SAVED_REGS: [Reg; 4] = [Reg::Lcl, Reg::Arg, Reg::This, Reg::That];

    /// Registers restored by `return`, in restore order. `ARG` and `LCL` come
    /// last because the return sequence reads them before restoring.
    pub const RESTORE_ORDER: [Reg; 4] = [Reg::That, Reg::This, Reg::Arg, Reg::Lcl];

    /// Return address plus saved registers
    pub const FRAME_HEADER: u16 = 5;

    /// Scratch cell holding the frame base during `return`
    pub const FRAME_PTR: Reg = Reg::R13;

    /// Scratch cell holding the return address during `return`
    pub const RETURN_ADDR: Reg = Reg::R14;

    /// Distance below the frame base (the callee's `LCL`) at which `reg` was saved
    pub fn saved_offset(reg: Reg) -> Option<u16> {
        Self::SAVED_REGS
            .iter()
            .position(|&r| r == reg)
            .map(|pos| (Self::SAVED_REGS.len() - pos) as u16)
    }
}

/// `*SP = D; SP++`
pub fn push_d() -> Vec<AsmInst> {
    vec![
        AsmInst::at_reg(Reg::Sp),
        AsmInst::assign(Dest::AM, Comp::MPlusOne),
        AsmInst::assign(Dest::A, Comp::AMinusOne),
        AsmInst::assign(Dest::M, Comp::D),
    ]
}

/// `SP--; A = SP` so that `M` is the popped value
pub fn pop_to_m() -> Vec<AsmInst> {
    vec![
        AsmInst::at_reg(Reg::Sp),
        AsmInst::assign(Dest::AM, Comp::MMinusOne),
    ]
}

/// Generate a function entry: the entry label and `locals` zeroed slots
///
/// Each slot is addressed through `LCL` and advances `SP`.
pub fn gen_function(name: &str, locals: u16) -> Result<Vec<AsmInst>> {
    if locals > MAX_CONSTANT {
        return Err(TranslateError::InvalidOperand {
            context: format!("function {name}"),
            index: locals,
            message: format!("at most {MAX_CONSTANT} locals are addressable"),
        });
    }

    let mut code = vec![AsmInst::label(name)];

    for i in 0..locals {
        code.extend([
            AsmInst::at_reg(Reg::Lcl),
            AsmInst::assign(Dest::D, Comp::M),
            AsmInst::at_const(i),
            AsmInst::assign(Dest::A, Comp::DPlusA),
            AsmInst::assign(Dest::M, Comp::Zero),
            AsmInst::at_reg(Reg::Sp),
            AsmInst::assign(Dest::M, Comp::MPlusOne),
        ]);
    }

    trace!("  function {name}: {locals} locals");
    Ok(code)
}

/// Generate a call sequence to `target` with `args` arguments already pushed
///
/// `return_label` must be unique across the whole job.
pub fn gen_call(target: &str, args: u16, return_label: &str) -> Result<Vec<AsmInst>> {
    let arg_offset = args
        .checked_add(CallingConvention::FRAME_HEADER)
        .filter(|&offset| offset <= MAX_CONSTANT)
        .ok_or_else(|| TranslateError::InvalidOperand {
            context: format!("call {target}"),
            index: args,
            message: "too many arguments".to_string(),
        })?;

    let mut code = Vec::new();

    // Push return address
    code.push(AsmInst::at_symbol(return_label));
    code.push(AsmInst::assign(Dest::D, Comp::A));
    code.extend(push_d());

    // Push caller's LCL, ARG, THIS, THAT
    for reg in CallingConvention::SAVED_REGS {
        code.push(AsmInst::at_reg(reg));
        code.push(AsmInst::assign(Dest::D, Comp::M));
        code.extend(push_d());
    }

    code.extend([
        // ARG = SP - n - 5
        AsmInst::at_reg(Reg::Sp),
        AsmInst::assign(Dest::D, Comp::M),
        AsmInst::at_const(arg_offset),
        AsmInst::assign(Dest::D, Comp::DMinusA),
        AsmInst::at_reg(Reg::Arg),
        AsmInst::assign(Dest::M, Comp::D),
        // LCL = SP
        AsmInst::at_reg(Reg::Sp),
        AsmInst::assign(Dest::D, Comp::M),
        AsmInst::at_reg(Reg::Lcl),
        AsmInst::assign(Dest::M, Comp::D),
        // goto target
        AsmInst::at_symbol(target),
        AsmInst::jump(Comp::Zero, Jump::Jmp),
        AsmInst::label(return_label),
    ]);

    trace!("  call {target} {args} -> {return_label}");
    Ok(code)
}

/// Generate the return sequence
///
/// The return address is read before the return value is stored, since with
/// zero arguments `*ARG` and the saved return address are the same cell.
pub fn gen_return() -> Vec<AsmInst> {
    let frame = CallingConvention::FRAME_PTR;
    let ret = CallingConvention::RETURN_ADDR;

    let mut code = vec![
        // FRAME = LCL
        AsmInst::at_reg(Reg::Lcl),
        AsmInst::assign(Dest::D, Comp::M),
        AsmInst::at_reg(frame),
        AsmInst::assign(Dest::M, Comp::D),
        // RET = *(FRAME - 5)
        AsmInst::at_const(CallingConvention::FRAME_HEADER),
        AsmInst::assign(Dest::A, Comp::DMinusA),
        AsmInst::assign(Dest::D, Comp::M),
        AsmInst::at_reg(ret),
        AsmInst::assign(Dest::M, Comp::D),
    ];

    // *ARG = pop()
    code.extend(pop_to_m());
    code.extend([
        AsmInst::assign(Dest::D, Comp::M),
        AsmInst::at_reg(Reg::Arg),
        AsmInst::assign(Dest::A, Comp::M),
        AsmInst::assign(Dest::M, Comp::D),
        // SP = ARG + 1
        AsmInst::assign(Dest::D, Comp::APlusOne),
        AsmInst::at_reg(Reg::Sp),
        AsmInst::assign(Dest::M, Comp::D),
    ]);

    // THAT, THIS, ARG, LCL = *(FRAME - 1), *(FRAME - 2), ...
    for reg in CallingConvention::RESTORE_ORDER {
        let offset = CallingConvention::saved_offset(reg).unwrap_or_default();
        code.extend([
            AsmInst::at_reg(frame),
            AsmInst::assign(Dest::D, Comp::M),
            AsmInst::at_const(offset),
            AsmInst::assign(Dest::A, Comp::DMinusA),
            AsmInst::assign(Dest::D, Comp::M),
            AsmInst::at_reg(reg),
            AsmInst::assign(Dest::M, Comp::D),
        ]);
    }

    // goto RET
    code.extend([
        AsmInst::at_reg(ret),
        AsmInst::assign(Dest::A, Comp::M),
        AsmInst::jump(Comp::Zero, Jump::Jmp),
    ]);

    code
}

/// `SP = 256`. The caller follows this with `call Sys.init 0`.
pub fn gen_stack_init() -> Vec<AsmInst> {
    vec![
        AsmInst::at_const(STACK_BASE),
        AsmInst::assign(Dest::D, Comp::A),
        AsmInst::at_reg(Reg::Sp),
        AsmInst::assign(Dest::M, Comp::D),
    ]
}
