//! Hack VM Translator - Common Types and Errors
//!
//! This crate contains the instruction model, source locations and the error
//! taxonomy shared by the frontend, the code generator and the driver.

pub mod error;
pub mod types;
pub mod source_loc;

pub use error::{Result, TranslateError};
pub use types::{ArithmeticOp, CommandKind, Instruction, Segment};
pub use source_loc::SourceLocation;
