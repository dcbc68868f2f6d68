//! Error handling for the VM translator
//!
//! Every error is fatal to the translation job. Errors raised by the code
//! generator are wrapped in [`TranslateError::InInstruction`] so the caller
//! can report which unit and instruction failed.

use crate::source_loc::SourceLocation;
use thiserror::Error;

/// Main error type covering parsing, address resolution and emission
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("Malformed instruction at {location}: {message}")]
    MalformedInstruction {
        location: SourceLocation,
        message: String,
    },

    #[error("Invalid segment '{segment}': {message}")]
    InvalidSegment { segment: String, message: String },

    #[error("Invalid operand {index} for {context}: {message}")]
    InvalidOperand {
        context: String,
        index: u16,
        message: String,
    },

    #[error("Unbound context: {message}")]
    UnboundContext { message: String },

    #[error("Invalid arithmetic operator '{name}'")]
    InvalidOperator { name: String },

    #[error("{}`{instruction}` in {unit}: {source}", .line.map(|l| format!("line {l}: ")).unwrap_or_default())]
    InInstruction {
        unit: String,
        line: Option<u32>,
        instruction: String,
        #[source]
        source: Box<TranslateError>,
    },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl TranslateError {
    pub fn malformed(message: impl Into<String>, location: SourceLocation) -> Self {
        TranslateError::MalformedInstruction {
            location,
            message: message.into(),
        }
    }

    pub fn unbound(message: impl Into<String>) -> Self {
        TranslateError::UnboundContext {
            message: message.into(),
        }
    }

    /// Attach the failing instruction's context. Already-wrapped errors are
    /// returned unchanged.
    pub fn in_instruction(self, unit: &str, line: Option<u32>, instruction: String) -> Self {
        match self {
            TranslateError::InInstruction { .. } => self,
            other => TranslateError::InInstruction {
                unit: unit.to_string(),
                line,
                instruction,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with any instruction context stripped
    pub fn root(&self) -> &TranslateError {
        match self {
            TranslateError::InInstruction { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for TranslateError {
    fn from(err: std::io::Error) -> Self {
        TranslateError::Io {
            message: err.to_string(),
        }
    }
}

/// Result alias used throughout the translator crates
pub type Result<T> = std::result::Result<T, TranslateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_malformed_message() {
        let err = TranslateError::malformed("expected 2 operands", SourceLocation::new("Main.vm", 4));
        assert_eq!(
            err.to_string(),
            "Malformed instruction at Main.vm:4: expected 2 operands"
        );
    }

    #[test]
    fn test_instruction_context() {
        let err = TranslateError::InvalidSegment {
            segment: "constant".to_string(),
            message: "cannot pop into a constant".to_string(),
        }
        .in_instruction("Main", Some(7), "pop constant 0".to_string());

        assert_eq!(
            err.to_string(),
            "line 7: `pop constant 0` in Main: Invalid segment 'constant': cannot pop into a constant"
        );
        assert!(matches!(err.root(), TranslateError::InvalidSegment { .. }));
    }

    #[test]
    fn test_context_not_nested() {
        let err = TranslateError::unbound("no unit")
            .in_instruction("A", None, "push static 0".to_string())
            .in_instruction("B", None, "push static 1".to_string());

        match err {
            TranslateError::InInstruction { unit, instruction, .. } => {
                assert_eq!(unit, "A");
                assert_eq!(instruction, "push static 0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: TranslateError = io.into();
        assert_eq!(err.to_string(), "IO error: disk full");
    }
}
