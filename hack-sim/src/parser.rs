//! Hack assembly loader
//!
//! Two passes over the source: the first records label addresses, the
//! second decodes instructions and allocates variables from RAM 16 upward
//! in first-use order.

use crate::constants::*;
use crate::cpu::{Comp, Dest, Instr, Jump};
use crate::error::{Result, SimError};
use log::debug;
use std::collections::HashMap;

/// A loaded Hack program
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub instructions: Vec<Instr>,
    /// Label name to ROM address
    pub labels: HashMap<String, u16>,
    /// Variable name to RAM address
    pub variables: HashMap<String, u16>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn label_address(&self, name: &str) -> Option<u16> {
        self.labels.get(name).copied()
    }

    pub fn variable_address(&self, name: &str) -> Option<u16> {
        self.variables.get(name).copied()
    }
}

/// Parse Hack assembly text into a program
pub fn parse_program(source: &str) -> Result<Program> {
    let lines: Vec<(usize, &str)> = source
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, strip_comment(line)))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let mut program = Program::default();

    // Pass 1: labels
    let mut rom_address: u16 = 0;
    for &(line_no, line) in &lines {
        if let Some(rest) = line.strip_prefix('(') {
            let name = rest
                .strip_suffix(')')
                .filter(|name| is_symbol(name))
                .ok_or_else(|| SimError::BadLabel { line: line_no, text: line.to_string() })?;
            if predefined(name).is_some() || program.labels.contains_key(name) {
                return Err(SimError::DuplicateLabel { line: line_no, name: name.to_string() });
            }
            program.labels.insert(name.to_string(), rom_address);
        } else {
            rom_address = rom_address.wrapping_add(1);
        }
    }

    // Pass 2: instructions
    let mut next_variable = VARIABLE_BASE;
    for &(line_no, line) in &lines {
        if line.starts_with('(') {
            continue;
        }

        let instr = if let Some(operand) = line.strip_prefix('@') {
            let value = resolve_operand(&mut program, operand, &mut next_variable, line_no)?;
            Instr::Load(value)
        } else {
            parse_compute(line, line_no)?
        };
        program.instructions.push(instr);
    }

    debug!(
        "Loaded {} instructions, {} labels, {} variables",
        program.instructions.len(),
        program.labels.len(),
        program.variables.len()
    );
    Ok(program)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}

fn is_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if !c.is_ascii_digit() => {}
        _ => return false,
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':'))
}

fn predefined(name: &str) -> Option<u16> {
    if let Some(&(_, address)) = PREDEFINED_SYMBOLS.iter().find(|(symbol, _)| *symbol == name) {
        return Some(address);
    }
    name.strip_prefix('R')
        .and_then(|n| n.parse::<u16>().ok())
        .filter(|&n| n < NUM_VIRTUAL_REGISTERS && name.len() <= 3)
}

fn resolve_operand(
    program: &mut Program,
    operand: &str,
    next_variable: &mut u16,
    line: usize,
) -> Result<u16> {
    if operand.starts_with(|c: char| c.is_ascii_digit()) {
        return operand
            .parse::<u16>()
            .ok()
            .filter(|&v| v <= MAX_ADDRESS_LITERAL)
            .ok_or_else(|| SimError::BadAddress { line, text: operand.to_string() });
    }

    if !is_symbol(operand) {
        return Err(SimError::BadAddress { line, text: operand.to_string() });
    }

    if let Some(address) = predefined(operand) {
        return Ok(address);
    }
    if let Some(address) = program.label_address(operand) {
        return Ok(address);
    }
    if let Some(address) = program.variable_address(operand) {
        return Ok(address);
    }

    let address = *next_variable;
    *next_variable += 1;
    program.variables.insert(operand.to_string(), address);
    Ok(address)
}

fn parse_compute(line: &str, line_no: usize) -> Result<Instr> {
    let (dest_text, rest) = match line.split_once('=') {
        Some((dest, rest)) => (Some(dest.trim()), rest.trim()),
        None => (None, line),
    };
    let (comp_text, jump_text) = match rest.split_once(';') {
        Some((comp, jump)) => (comp.trim(), Some(jump.trim())),
        None => (rest, None),
    };

    let unknown = |kind: &'static str, text: &str| SimError::UnknownMnemonic {
        line: line_no,
        kind,
        text: text.to_string(),
    };

    let dest = match dest_text {
        Some(text) => Dest::parse(text).ok_or_else(|| unknown("dest", text))?,
        None => Dest::default(),
    };
    let comp = Comp::parse(comp_text).ok_or_else(|| unknown("comp", comp_text))?;
    let jump = match jump_text {
        Some(text) => Some(Jump::parse(text).ok_or_else(|| unknown("jump", text))?),
        None => None,
    };

    Ok(Instr::Compute { dest, comp, jump })
}
