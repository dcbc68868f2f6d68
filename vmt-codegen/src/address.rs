//! Segment address resolution
//!
//! Maps `(segment, index)` to the instructions that leave `A` pointing at the
//! addressed cell. `constant` has no cell: its sequence leaves the value in
//! `D` instead. No sequence touches `SP`.

use crate::abi::{MAX_CONSTANT, TEMP_BASE};
use crate::asm::{AsmInst, Comp, Dest, Reg};
use vmt_common::{Result, Segment, TranslateError};

/// Symbol holding `static <index>` of the given unit
pub fn static_symbol(unit: &str, index: u16) -> String {
    format!("{unit}.{index}")
}

/// Resolve a segment operand for reading.
///
/// Leaves `A` at the cell, or `D` equal to the value for `constant`.
pub fn resolve(segment: Segment, index: u16, unit: Option<&str>) -> Result<Vec<AsmInst>> {
    let code = match segment {
        Segment::Argument => frame_relative(Reg::Arg, segment, index)?,
        Segment::Local => frame_relative(Reg::Lcl, segment, index)?,
        Segment::This => frame_relative(Reg::This, segment, index)?,
        Segment::That => frame_relative(Reg::That, segment, index)?,

        Segment::Static => {
            let unit = unit.ok_or_else(|| {
                TranslateError::unbound(format!(
                    "static {index} referenced before an input unit name was set"
                ))
            })?;
            vec![AsmInst::at_symbol(static_symbol(unit, index))]
        }

        Segment::Pointer => match index {
            0 => vec![AsmInst::at_reg(Reg::This)],
            1 => vec![AsmInst::at_reg(Reg::That)],
            _ => {
                return Err(TranslateError::InvalidOperand {
                    context: "segment 'pointer'".to_string(),
                    index,
                    message: "pointer only accepts 0 or 1".to_string(),
                })
            }
        },

        Segment::Temp => {
            check_immediate(segment, index)?;
            vec![
                AsmInst::at_const(TEMP_BASE),
                AsmInst::assign(Dest::D, Comp::A),
                AsmInst::at_const(index),
                AsmInst::assign(Dest::A, Comp::DPlusA),
            ]
        }

        Segment::Constant => {
            check_immediate(segment, index)?;
            vec![AsmInst::at_const(index), AsmInst::assign(Dest::D, Comp::A)]
        }
    };

    Ok(code)
}

/// Resolve a segment operand as a store destination. Leaves `A` at the cell.
pub fn resolve_target(segment: Segment, index: u16, unit: Option<&str>) -> Result<Vec<AsmInst>> {
    if segment == Segment::Constant {
        return Err(TranslateError::InvalidSegment {
            segment: segment.to_string(),
            message: "constant is not addressable and cannot be a pop target".to_string(),
        });
    }
    resolve(segment, index, unit)
}

/// `base + index`, dereferencing the base pointer directly when `index == 0`
fn frame_relative(base: Reg, segment: Segment, index: u16) -> Result<Vec<AsmInst>> {
    check_immediate(segment, index)?;
    if index == 0 {
        return Ok(vec![AsmInst::at_reg(base), AsmInst::assign(Dest::A, Comp::M)]);
    }
    Ok(vec![
        AsmInst::at_reg(base),
        AsmInst::assign(Dest::D, Comp::M),
        AsmInst::at_const(index),
        AsmInst::assign(Dest::A, Comp::DPlusA),
    ])
}

fn check_immediate(segment: Segment, index: u16) -> Result<()> {
    if index > MAX_CONSTANT {
        return Err(TranslateError::InvalidOperand {
            context: format!("segment '{segment}'"),
            index,
            message: format!("exceeds the largest loadable value {MAX_CONSTANT}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(segment: Segment, index: u16, unit: Option<&str>) -> Vec<String> {
        resolve(segment, index, unit)
            .unwrap()
            .iter()
            .map(|inst| inst.to_string())
            .collect()
    }

    #[test]
    fn test_frame_relative_index_zero() {
        assert_eq!(render(Segment::Local, 0, None), vec!["@LCL", "A=M"]);
        assert_eq!(render(Segment::That, 0, None), vec!["@THAT", "A=M"]);
    }

    #[test]
    fn test_frame_relative_offset() {
        assert_eq!(render(Segment::Local, 5, None), vec!["@LCL", "D=M", "@5", "A=D+A"]);
        assert_eq!(render(Segment::Argument, 2, None), vec!["@ARG", "D=M", "@2", "A=D+A"]);
    }

    #[test]
    fn test_static_uses_unit_name() {
        assert_eq!(render(Segment::Static, 3, Some("Main")), vec!["@Main.3"]);
    }

    #[test]
    fn test_static_without_unit() {
        let err = resolve(Segment::Static, 0, None).unwrap_err();
        assert!(matches!(err, TranslateError::UnboundContext { .. }));
    }

    #[test]
    fn test_pointer() {
        assert_eq!(render(Segment::Pointer, 0, None), vec!["@THIS"]);
        assert_eq!(render(Segment::Pointer, 1, None), vec!["@THAT"]);
        assert!(matches!(
            resolve(Segment::Pointer, 2, None),
            Err(TranslateError::InvalidOperand { index: 2, .. })
        ));
    }

    #[test]
    fn test_temp_and_constant() {
        assert_eq!(render(Segment::Temp, 6, None), vec!["@5", "D=A", "@6", "A=D+A"]);
        assert_eq!(render(Segment::Constant, 17, None), vec!["@17", "D=A"]);
    }

    #[test]
    fn test_constant_range() {
        assert!(resolve(Segment::Constant, MAX_CONSTANT, None).is_ok());
        assert!(matches!(
            resolve(Segment::Constant, MAX_CONSTANT + 1, None),
            Err(TranslateError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_constant_is_not_a_target() {
        assert!(matches!(
            resolve_target(Segment::Constant, 0, None),
            Err(TranslateError::InvalidSegment { .. })
        ));
        assert!(resolve_target(Segment::Temp, 0, None).is_ok());
    }

    #[test]
    fn test_no_sequence_touches_sp() {
        for segment in Segment::ALL {
            let index = if segment == Segment::Pointer { 1 } else { 4 };
            for inst in resolve(segment, index, Some("Unit")).unwrap() {
                assert_ne!(inst, AsmInst::at_reg(Reg::Sp), "{segment} must not address SP");
            }
        }
    }
}
