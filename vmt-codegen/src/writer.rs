//! The code writer
//!
//! `CodeWriter` owns everything that lives for one translation job: the
//! output sink, the label counters, and the current unit and function.
//! Units are fed to it one after another; all of them land in the same
//! output so function and return labels stay globally addressable.

use crate::abi::{self, ENTRY_FUNCTION};
use crate::address;
use crate::asm::{AsmInst, Comp, Dest, Jump, Reg};
use crate::naming::{scoped_label, LabelGenerator};
use log::{debug, info, trace};
use std::io::Write;
use std::path::Path;
use vmt_common::{ArithmeticOp, Instruction, Result, Segment};

/// File suffix stripped from unit names
const SOURCE_SUFFIX: &str = ".vm";

/// Options for code generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Precede each block with a `//  <vm instruction>` comment
    pub echo_source: bool,
    /// Emit `SP = 256; call Sys.init 0` before anything else
    pub bootstrap: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            echo_source: true,
            bootstrap: false,
        }
    }
}

impl CodegenOptions {
    pub fn with_echo_source(mut self, echo_source: bool) -> Self {
        self.echo_source = echo_source;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }
}

/// Translates VM instructions into Hack assembly written to `W`
pub struct CodeWriter<W: Write> {
    out: W,
    options: CodegenOptions,
    labels: LabelGenerator,
    current_unit: Option<String>,
    current_function: Option<String>,
    lines_written: usize,
}

impl<W: Write> CodeWriter<W> {
    /// Start a job. Bootstrap code, if requested, is written immediately.
    pub fn new(out: W, options: CodegenOptions) -> Result<Self> {
        info!("Starting translation job (bootstrap: {}, echo: {})", options.bootstrap, options.echo_source);
        let mut writer = Self {
            out,
            options,
            labels: LabelGenerator::new(),
            current_unit: None,
            current_function: None,
            lines_written: 0,
        };

        if options.bootstrap {
            writer.write_bootstrap()?;
        }

        Ok(writer)
    }

    /// Declare the unit whose instructions follow.
    ///
    /// Accepts a bare name or a path; `dir/Foo.vm` becomes `Foo`. Only a
    /// trailing `.vm` is removed, so `Lib.a.vm` and `Lib.a` both name the
    /// unit `Lib.a`. The function context is reset to top level.
    pub fn set_unit_name(&mut self, name: &str) {
        let file_name = Path::new(name)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(name);
        let stem = file_name.strip_suffix(SOURCE_SUFFIX).unwrap_or(file_name);
        debug!("Translating unit {stem}");
        self.current_unit = Some(stem.to_string());
        self.current_function = None;
    }

    pub fn current_unit(&self) -> Option<&str> {
        self.current_unit.as_deref()
    }

    pub fn current_function(&self) -> Option<&str> {
        self.current_function.as_deref()
    }

    pub fn comparison_count(&self) -> u32 {
        self.labels.comparison_count()
    }

    pub fn call_count(&self) -> u32 {
        self.labels.call_count()
    }

    /// Lines written to the sink so far, comments included
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Translate one instruction, attaching unit and instruction context to
    /// any error
    pub fn translate(&mut self, instruction: &Instruction) -> Result<()> {
        self.translate_at(instruction, None)
    }

    /// Like [`translate`](Self::translate), with the source line for errors
    pub fn translate_at(&mut self, instruction: &Instruction, line: Option<u32>) -> Result<()> {
        trace!("translate: {instruction}");
        self.dispatch(instruction).map_err(|e| {
            let unit = self.current_unit.as_deref().unwrap_or("<no unit>");
            e.in_instruction(unit, line, instruction.to_string())
        })
    }

    /// Set the unit name, then translate its instructions in order
    pub fn translate_unit<'a, I>(&mut self, name: &str, instructions: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Instruction>,
    {
        self.set_unit_name(name);
        for instruction in instructions {
            self.translate(instruction)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction {
            Instruction::Arithmetic { op } => self.write_arithmetic(*op),
            Instruction::Push { segment, index } => self.write_push(*segment, *index),
            Instruction::Pop { segment, index } => self.write_pop(*segment, *index),
            Instruction::Label { name } => self.write_label(name),
            Instruction::Goto { name } => self.write_goto(name),
            Instruction::IfGoto { name } => self.write_if(name),
            Instruction::Function { name, locals } => self.write_function(name, *locals),
            Instruction::Call { name, args } => self.write_call(name, *args),
            Instruction::Return => self.write_return(),
        }
    }

    pub fn write_arithmetic(&mut self, op: ArithmeticOp) -> Result<()> {
        self.echo(&Instruction::Arithmetic { op })?;

        // pop y; for binary ops also pop x, leaving A at x's slot
        let mut code = abi::pop_to_m();
        if op.arity() == 2 {
            code.push(AsmInst::assign(Dest::D, Comp::M));
            code.extend(abi::pop_to_m());
        }

        if op.is_comparison() {
            let condition = match op {
                ArithmeticOp::Eq => Jump::Jeq,
                ArithmeticOp::Gt => Jump::Jgt,
                _ => Jump::Jlt,
            };
            code.extend(self.comparison(condition));
        } else {
            code.push(AsmInst::assign(Dest::M, Self::alu_comp(op)));
        }

        code.extend([
            AsmInst::at_reg(Reg::Sp),
            AsmInst::assign(Dest::M, Comp::MPlusOne),
        ]);

        self.emit(&code)
    }

    /// In-place computation for the non-comparison operators
    fn alu_comp(op: ArithmeticOp) -> Comp {
        match op {
            ArithmeticOp::Add => Comp::DPlusM,
            ArithmeticOp::Sub => Comp::MMinusD,
            ArithmeticOp::And => Comp::DAndM,
            ArithmeticOp::Or => Comp::DOrM,
            ArithmeticOp::Neg => Comp::NegM,
            _ => Comp::NotM,
        }
    }

    /// `x - y` tested against `condition`; writes -1 (true) or 0 (false) to
    /// the slot `SP` currently points at.
    ///
    /// The difference is computed in 16 bits, so `gt`/`lt` answer wrongly
    /// when `x - y` overflows (e.g. `20000 > -20000` yields false). `eq` is
    /// unaffected.
    fn comparison(&mut self, condition: Jump) -> Vec<AsmInst> {
        let labels = self.labels.comparison_labels();
        vec![
            AsmInst::assign(Dest::D, Comp::MMinusD),
            AsmInst::at_symbol(labels.true_label.as_str()),
            AsmInst::jump(Comp::D, condition),
            AsmInst::assign(Dest::D, Comp::Zero),
            AsmInst::at_symbol(labels.end_label.as_str()),
            AsmInst::jump(Comp::Zero, Jump::Jmp),
            AsmInst::label(labels.true_label),
            AsmInst::assign(Dest::D, Comp::NegOne),
            AsmInst::label(labels.end_label),
            AsmInst::at_reg(Reg::Sp),
            AsmInst::assign(Dest::A, Comp::M),
            AsmInst::assign(Dest::M, Comp::D),
        ]
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> Result<()> {
        self.echo(&Instruction::Push { segment, index })?;

        let mut code = address::resolve(segment, index, self.current_unit.as_deref())?;
        if segment != Segment::Constant {
            code.push(AsmInst::assign(Dest::D, Comp::M));
        }
        code.extend(abi::push_d());

        self.emit(&code)
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> Result<()> {
        self.echo(&Instruction::Pop { segment, index })?;

        let mut code = address::resolve_target(segment, index, self.current_unit.as_deref())?;
        // D = addr; SP--; then swap addr and value through D without a scratch cell
        code.push(AsmInst::assign(Dest::D, Comp::A));
        code.extend(abi::pop_to_m());
        code.extend([
            AsmInst::assign(Dest::D, Comp::DPlusM),
            AsmInst::assign(Dest::A, Comp::DMinusM),
            AsmInst::assign(Dest::D, Comp::DMinusA),
            AsmInst::assign(Dest::M, Comp::D),
        ]);

        self.emit(&code)
    }

    pub fn write_label(&mut self, label: &str) -> Result<()> {
        self.echo(&Instruction::Label { name: label.to_string() })?;
        let label = scoped_label(self.current_function.as_deref(), label);
        self.emit(&[AsmInst::label(label)])
    }

    pub fn write_goto(&mut self, label: &str) -> Result<()> {
        self.echo(&Instruction::Goto { name: label.to_string() })?;
        let label = scoped_label(self.current_function.as_deref(), label);
        self.emit(&[
            AsmInst::at_symbol(label),
            AsmInst::jump(Comp::Zero, Jump::Jmp),
        ])
    }

    pub fn write_if(&mut self, label: &str) -> Result<()> {
        self.echo(&Instruction::IfGoto { name: label.to_string() })?;
        let label = scoped_label(self.current_function.as_deref(), label);

        let mut code = abi::pop_to_m();
        code.extend([
            AsmInst::assign(Dest::D, Comp::M),
            AsmInst::at_symbol(label),
            AsmInst::jump(Comp::D, Jump::Jne),
        ]);

        self.emit(&code)
    }

    pub fn write_function(&mut self, name: &str, locals: u16) -> Result<()> {
        self.current_function = Some(name.to_string());
        self.echo(&Instruction::Function { name: name.to_string(), locals })?;
        let code = abi::gen_function(name, locals)?;
        self.emit(&code)
    }

    pub fn write_call(&mut self, name: &str, args: u16) -> Result<()> {
        self.echo(&Instruction::Call { name: name.to_string(), args })?;
        let return_label = self.labels.return_label();
        let code = abi::gen_call(name, args, &return_label)?;
        self.emit(&code)
    }

    pub fn write_return(&mut self) -> Result<()> {
        self.echo(&Instruction::Return)?;
        self.emit(&abi::gen_return())
    }

    fn write_bootstrap(&mut self) -> Result<()> {
        debug!("Emitting bootstrap code");
        if self.options.echo_source {
            self.emit(&[AsmInst::comment("Bootstrap code")])?;
        }
        self.emit(&abi::gen_stack_init())?;
        self.write_call(ENTRY_FUNCTION, 0)
    }

    fn echo(&mut self, instruction: &Instruction) -> Result<()> {
        if self.options.echo_source {
            self.emit(&[AsmInst::comment(instruction.to_string())])?;
        }
        Ok(())
    }

    fn emit(&mut self, code: &[AsmInst]) -> Result<()> {
        for inst in code {
            writeln!(self.out, "{}", inst)?;
        }
        self.lines_written += code.len();
        Ok(())
    }

    /// Flush and hand back the sink, ending the job
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        info!(
            "Translation finished: {} lines, {} comparisons, {} calls",
            self.lines_written,
            self.labels.comparison_count(),
            self.labels.call_count()
        );
        Ok(self.out)
    }

    /// Flush and release the sink
    pub fn close(self) -> Result<()> {
        self.finish().map(drop)
    }
}
