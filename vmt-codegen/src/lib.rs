//! Hack VM Translator - Code Generation
//!
//! This crate turns typed VM instructions into Hack assembly text. It includes:
//!
//! - Assembly instruction model
//! - Segment address resolution
//! - ABI implementation (calling convention, bootstrap)
//! - Job-wide label naming
//! - The code writer that drives a translation job

pub mod asm;
pub mod abi;
pub mod address;
pub mod naming;
pub mod writer;

pub use asm::{AsmInst, Reg};
pub use naming::LabelGenerator;
pub use writer::{CodeWriter, CodegenOptions};

use vmt_common::{Instruction, Result, TranslateError};

/// Translate a single unit into an assembly string
pub fn translate_to_string(unit: &str, instructions: &[Instruction], options: CodegenOptions) -> Result<String> {
    let mut writer = CodeWriter::new(Vec::new(), options)?;
    writer.translate_unit(unit, instructions)?;
    let bytes = writer.finish()?;
    String::from_utf8(bytes).map_err(|e| TranslateError::Io { message: e.to_string() })
}
