//! VM instruction parser
//!
//! Turns the lines of one source unit into validated [`Instruction`]s.
//! Operand count and operand shape are checked here so the code generator
//! only ever sees well-formed instructions.

use crate::lexer::{clean_line, is_valid_symbol, tokenize};
use log::{debug, trace};
use serde::Serialize;
use vmt_common::{ArithmeticOp, CommandKind, Instruction, Result, Segment, SourceLocation, TranslateError};

/// An instruction together with the line it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedInstruction {
    pub instruction: Instruction,
    pub location: SourceLocation,
}

/// Parser for a single VM source unit
pub struct Parser {
    filename: String,
}

impl Parser {
    /// `filename` is only used for error locations
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
        }
    }

    /// Parse a whole unit, preserving source order
    pub fn parse_source(&self, source: &str) -> Result<Vec<ParsedInstruction>> {
        let mut parsed = Vec::new();

        for (i, line) in source.lines().enumerate() {
            if let Some(instruction) = self.parse_line(line, i as u32 + 1)? {
                parsed.push(instruction);
            }
        }

        debug!("Parsed {} instructions from {}", parsed.len(), self.filename);
        Ok(parsed)
    }

    /// Parse one raw line. Blank and comment-only lines yield `None`.
    pub fn parse_line(&self, line: &str, line_number: u32) -> Result<Option<ParsedInstruction>> {
        let cleaned = clean_line(line);
        if cleaned.is_empty() {
            return Ok(None);
        }

        let location = SourceLocation::new(&self.filename, line_number);
        let tokens = tokenize(cleaned);
        let instruction = Self::build(&tokens, &location)?;
        trace!("  {location}: {instruction}");

        Ok(Some(ParsedInstruction { instruction, location }))
    }

    fn build(tokens: &[&str], location: &SourceLocation) -> Result<Instruction> {
        let keyword = tokens[0];
        let kind = CommandKind::from_keyword(keyword).ok_or_else(|| {
            TranslateError::malformed(format!("unknown command '{keyword}'"), location.clone())
        })?;

        let operands = &tokens[1..];
        let expected = kind.operand_count();
        if operands.len() != expected {
            return Err(TranslateError::malformed(
                format!(
                    "'{}' expects {} operand{}, found {}",
                    keyword,
                    expected,
                    if expected == 1 { "" } else { "s" },
                    operands.len()
                ),
                location.clone(),
            ));
        }

        let instruction = match kind {
            CommandKind::Arithmetic => {
                let op: ArithmeticOp = keyword
                    .parse()
                    .map_err(|e: TranslateError| TranslateError::malformed(e.to_string(), location.clone()))?;
                Instruction::Arithmetic { op }
            }
            CommandKind::Push | CommandKind::Pop => {
                let segment = Self::parse_segment(operands[0], location)?;
                let index = Self::parse_number(operands[1], location)?;
                if kind == CommandKind::Push {
                    Instruction::Push { segment, index }
                } else {
                    Instruction::Pop { segment, index }
                }
            }
            CommandKind::Label => Instruction::Label {
                name: Self::parse_symbol(operands[0], location)?,
            },
            CommandKind::Goto => Instruction::Goto {
                name: Self::parse_symbol(operands[0], location)?,
            },
            CommandKind::If => Instruction::IfGoto {
                name: Self::parse_symbol(operands[0], location)?,
            },
            CommandKind::Function => Instruction::Function {
                name: Self::parse_symbol(operands[0], location)?,
                locals: Self::parse_number(operands[1], location)?,
            },
            CommandKind::Call => Instruction::Call {
                name: Self::parse_symbol(operands[0], location)?,
                args: Self::parse_number(operands[1], location)?,
            },
            CommandKind::Return => Instruction::Return,
        };

        Ok(instruction)
    }

    fn parse_segment(token: &str, location: &SourceLocation) -> Result<Segment> {
        token
            .parse()
            .map_err(|_| TranslateError::malformed(format!("unknown segment '{token}'"), location.clone()))
    }

    fn parse_number(token: &str, location: &SourceLocation) -> Result<u16> {
        let value: i64 = token.parse().map_err(|_| {
            TranslateError::malformed(format!("operand '{token}' is not an integer"), location.clone())
        })?;

        if value < 0 {
            return Err(TranslateError::malformed(
                format!("operand '{token}' cannot be negative"),
                location.clone(),
            ));
        }

        u16::try_from(value).map_err(|_| {
            TranslateError::malformed(format!("operand '{token}' is out of range"), location.clone())
        })
    }

    fn parse_symbol(token: &str, location: &SourceLocation) -> Result<String> {
        if !is_valid_symbol(token) {
            return Err(TranslateError::malformed(
                format!("'{token}' is not a valid symbol name"),
                location.clone(),
            ));
        }
        Ok(token.to_string())
    }
}
