//! Hack VM Translator - Frontend
//!
//! This crate provides the source-facing side of the translator:
//! - Lexer: comment stripping and tokenizing of VM source lines
//! - Parser: arity and operand validation, producing typed instructions

pub mod lexer;
pub mod parser;

pub use parser::{ParsedInstruction, Parser};

use vmt_common::Result;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Parse the source text of one unit
    pub fn parse_source(source: &str, filename: &str) -> Result<Vec<ParsedInstruction>> {
        Parser::new(filename).parse_source(source)
    }
}
