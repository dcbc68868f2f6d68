//! Instruction model shared by the frontend and the code generator
//!
//! A VM instruction is a `(kind, arg1, arg2)` triple in the source language.
//! Here each kind carries exactly the operands it needs, so an instruction
//! with the wrong operand shape cannot be constructed.

use crate::error::TranslateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stack arithmetic and logic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 9] = [
        ArithmeticOp::Add,
        ArithmeticOp::Sub,
        ArithmeticOp::Neg,
        ArithmeticOp::Eq,
        ArithmeticOp::Gt,
        ArithmeticOp::Lt,
        ArithmeticOp::And,
        ArithmeticOp::Or,
        ArithmeticOp::Not,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }

    /// Number of stack values consumed
    pub fn arity(&self) -> usize {
        match self {
            ArithmeticOp::Neg | ArithmeticOp::Not => 1,
            _ => 2,
        }
    }

    /// Comparisons need branching on the target machine
    pub fn is_comparison(&self) -> bool {
        matches!(self, ArithmeticOp::Eq | ArithmeticOp::Gt | ArithmeticOp::Lt)
    }
}

impl FromStr for ArithmeticOp {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArithmeticOp::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| TranslateError::InvalidOperator { name: s.to_string() })
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named memory segments of the VM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Argument,
    Local,
    This,
    That,
    Static,
    Constant,
    Pointer,
    Temp,
}

impl Segment {
    pub const ALL: [Segment; 8] = [
        Segment::Argument,
        Segment::Local,
        Segment::This,
        Segment::That,
        Segment::Static,
        Segment::Constant,
        Segment::Pointer,
        Segment::Temp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Static => "static",
            Segment::Constant => "constant",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

impl FromStr for Segment {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Segment::ALL
            .iter()
            .copied()
            .find(|seg| seg.as_str() == s)
            .ok_or_else(|| TranslateError::InvalidSegment {
                segment: s.to_string(),
                message: "unknown segment".to_string(),
            })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instruction kinds, independent of operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Call,
    Return,
}

impl CommandKind {
    /// Look up a command keyword. Arithmetic operators are their own keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "push" => CommandKind::Push,
            "pop" => CommandKind::Pop,
            "label" => CommandKind::Label,
            "goto" => CommandKind::Goto,
            "if-goto" => CommandKind::If,
            "function" => CommandKind::Function,
            "call" => CommandKind::Call,
            "return" => CommandKind::Return,
            _ if word.parse::<ArithmeticOp>().is_ok() => CommandKind::Arithmetic,
            _ => return None,
        };
        Some(kind)
    }

    /// Number of operands following the keyword
    pub fn operand_count(&self) -> usize {
        match self {
            CommandKind::Arithmetic | CommandKind::Return => 0,
            CommandKind::Label | CommandKind::Goto | CommandKind::If => 1,
            CommandKind::Push | CommandKind::Pop | CommandKind::Function | CommandKind::Call => 2,
        }
    }
}

/// A single validated VM instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Instruction {
    Arithmetic { op: ArithmeticOp },
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Label { name: String },
    Goto { name: String },
    IfGoto { name: String },
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl Instruction {
    pub fn kind(&self) -> CommandKind {
        match self {
            Instruction::Arithmetic { .. } => CommandKind::Arithmetic,
            Instruction::Push { .. } => CommandKind::Push,
            Instruction::Pop { .. } => CommandKind::Pop,
            Instruction::Label { .. } => CommandKind::Label,
            Instruction::Goto { .. } => CommandKind::Goto,
            Instruction::IfGoto { .. } => CommandKind::If,
            Instruction::Function { .. } => CommandKind::Function,
            Instruction::Call { .. } => CommandKind::Call,
            Instruction::Return => CommandKind::Return,
        }
    }

    /// First operand. For arithmetic this is the operator itself.
    pub fn arg1(&self) -> Option<&str> {
        match self {
            Instruction::Arithmetic { op } => Some(op.as_str()),
            Instruction::Push { segment, .. } | Instruction::Pop { segment, .. } => {
                Some(segment.as_str())
            }
            Instruction::Label { name }
            | Instruction::Goto { name }
            | Instruction::IfGoto { name }
            | Instruction::Function { name, .. }
            | Instruction::Call { name, .. } => Some(name),
            Instruction::Return => None,
        }
    }

    pub fn arg2(&self) -> Option<u16> {
        match self {
            Instruction::Push { index, .. } | Instruction::Pop { index, .. } => Some(*index),
            Instruction::Function { locals, .. } => Some(*locals),
            Instruction::Call { args, .. } => Some(*args),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Arithmetic { op } => write!(f, "{}", op),
            Instruction::Push { segment, index } => write!(f, "push {} {}", segment, index),
            Instruction::Pop { segment, index } => write!(f, "pop {} {}", segment, index),
            Instruction::Label { name } => write!(f, "label {}", name),
            Instruction::Goto { name } => write!(f, "goto {}", name),
            Instruction::IfGoto { name } => write!(f, "if-goto {}", name),
            Instruction::Function { name, locals } => write!(f, "function {} {}", name, locals),
            Instruction::Call { name, args } => write!(f, "call {} {}", name, args),
            Instruction::Return => write!(f, "return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_operator_parsing() {
        assert_eq!("add".parse::<ArithmeticOp>().unwrap(), ArithmeticOp::Add);
        assert_eq!("not".parse::<ArithmeticOp>().unwrap(), ArithmeticOp::Not);
        assert!(matches!(
            "mul".parse::<ArithmeticOp>(),
            Err(TranslateError::InvalidOperator { name }) if name == "mul"
        ));
    }

    #[test]
    fn test_operator_arity() {
        assert_eq!(ArithmeticOp::Neg.arity(), 1);
        assert_eq!(ArithmeticOp::Not.arity(), 1);
        assert_eq!(ArithmeticOp::Lt.arity(), 2);
        assert!(ArithmeticOp::Gt.is_comparison());
        assert!(!ArithmeticOp::Or.is_comparison());
    }

    #[test]
    fn test_segment_parsing() {
        for seg in Segment::ALL {
            assert_eq!(seg.as_str().parse::<Segment>().unwrap(), seg);
        }
        assert!(matches!(
            "heap".parse::<Segment>(),
            Err(TranslateError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn test_command_keywords() {
        assert_eq!(CommandKind::from_keyword("if-goto"), Some(CommandKind::If));
        assert_eq!(CommandKind::from_keyword("eq"), Some(CommandKind::Arithmetic));
        assert_eq!(CommandKind::from_keyword("jump"), None);
        assert_eq!(CommandKind::Return.operand_count(), 0);
        assert_eq!(CommandKind::Goto.operand_count(), 1);
        assert_eq!(CommandKind::Call.operand_count(), 2);
    }

    #[test]
    fn test_instruction_triple_view() {
        let push = Instruction::Push { segment: Segment::Local, index: 3 };
        assert_eq!(push.kind(), CommandKind::Push);
        assert_eq!(push.arg1(), Some("local"));
        assert_eq!(push.arg2(), Some(3));

        let add = Instruction::Arithmetic { op: ArithmeticOp::Add };
        assert_eq!(add.arg1(), Some("add"));
        assert_eq!(add.arg2(), None);

        assert_eq!(Instruction::Return.arg1(), None);
        assert_eq!(Instruction::Return.arg2(), None);
    }

    #[test]
    fn test_instruction_display() {
        assert_eq!(
            Instruction::Push { segment: Segment::Constant, index: 7 }.to_string(),
            "push constant 7"
        );
        assert_eq!(
            Instruction::IfGoto { name: "LOOP".to_string() }.to_string(),
            "if-goto LOOP"
        );
        assert_eq!(
            Instruction::Function { name: "Main.main".to_string(), locals: 2 }.to_string(),
            "function Main.main 2"
        );
        assert_eq!(Instruction::Return.to_string(), "return");
    }
}
