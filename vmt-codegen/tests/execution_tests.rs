//! Translated programs executed on the Hack simulator

use hack_sim::{Cpu, StopReason};
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use vmt_codegen::{CodeWriter, CodegenOptions};
use vmt_common::{ArithmeticOp, Instruction, Segment, TranslateError};
use vmt_frontend::Frontend;

const SP: u16 = 0;
const LCL: u16 = 1;
const ARG: u16 = 2;
const THIS: u16 = 3;
const THAT: u16 = 4;

const LCL_BASE: i16 = 1000;
const ARG_BASE: i16 = 1100;
const THIS_BASE: i16 = 3000;
const THAT_BASE: i16 = 3010;

const MAX_STEPS: u64 = 1_000_000;

fn translate_units(units: &[(&str, &str)], options: CodegenOptions) -> String {
    let mut writer = CodeWriter::new(Vec::new(), options).unwrap();
    for (name, source) in units {
        let parsed = Frontend::parse_source(source, &format!("{name}.vm")).unwrap();
        writer.set_unit_name(name);
        for p in &parsed {
            writer.translate_at(&p.instruction, Some(p.location.line)).unwrap();
        }
    }
    String::from_utf8(writer.finish().unwrap()).unwrap()
}

fn translate(unit: &str, source: &str) -> String {
    translate_units(&[(unit, source)], CodegenOptions::default())
}

/// Load assembly with the usual test-harness pointer setup
fn machine(asm: &str) -> Cpu {
    let mut cpu = hack_sim::load(asm).unwrap();
    cpu.poke(SP, 256);
    cpu.poke(LCL, LCL_BASE);
    cpu.poke(ARG, ARG_BASE);
    cpu.poke(THIS, THIS_BASE);
    cpu.poke(THAT, THAT_BASE);
    cpu
}

fn run(unit: &str, source: &str) -> Cpu {
    let mut cpu = machine(&translate(unit, source));
    cpu.run(MAX_STEPS).unwrap();
    cpu
}

fn run_until_halt_label(unit: &str, source: &str) -> Cpu {
    let mut cpu = machine(&translate(unit, source));
    let reason = cpu.run_until_label("HALT", MAX_STEPS).unwrap();
    assert!(matches!(reason, StopReason::ReachedAddress(_)));
    cpu
}

#[test]
fn test_add_two_constants() {
    let cpu = run("SimpleAdd", "push constant 7\npush constant 8\nadd\n");
    assert_eq!(cpu.stack(), vec![15]);
    assert_eq!(cpu.sp(), 257);
}

#[test]
fn test_eq_true_is_minus_one() {
    let cpu = run("Eq", "push constant 5\npush constant 5\neq\n");
    assert_eq!(cpu.stack(), vec![-1]);
}

#[test]
fn test_comparisons_and_logic() {
    let source = indoc! {"
        push constant 3
        push constant 5
        gt
        push constant 3
        push constant 5
        lt
        push constant 5
        push constant 3
        eq
        push constant 12
        push constant 10
        and
        push constant 12
        push constant 3
        or
        push constant 0
        not
        push constant 3
        push constant 5
        sub
        neg
    "};
    let cpu = run("Logic", source);
    assert_eq!(cpu.stack(), vec![0, -1, 0, 8, 15, -1, 2]);
}

#[test]
fn test_signed_comparison() {
    // -2 < 1 as signed values
    let cpu = run("Signed", "push constant 2\nneg\npush constant 1\nlt\n");
    assert_eq!(cpu.stack(), vec![-1]);
}

#[test]
fn test_comparison_follows_wrapped_difference() {
    // 20000 - (-20000) wraps to -25536
    let source = indoc! {"
        push constant 20000
        push constant 20000
        neg
        gt
        push constant 20000
        push constant 20000
        neg
        lt
        push constant 20000
        push constant 20000
        neg
        eq
    "};
    let cpu = run("Wrap", source);
    assert_eq!(cpu.stack(), vec![0, -1, 0]);
}

#[test]
fn test_local_index_zero_and_offset() {
    let mut cpu = machine(&translate("Locals", "push local 0\npush local 5\n"));
    cpu.poke(LCL_BASE as u16, 11);
    cpu.poke(LCL_BASE as u16 + 5, 55);
    cpu.run(MAX_STEPS).unwrap();
    assert_eq!(cpu.stack(), vec![11, 55]);
}

#[test]
fn test_pop_into_every_segment() {
    let source = indoc! {"
        push constant 10
        pop local 0
        push constant 21
        pop argument 2
        push constant 36
        pop this 6
        push constant 42
        pop that 5
        push constant 45
        pop temp 6
        push constant 3030
        pop pointer 1
        push constant 46
        pop that 2
        push constant 510
        pop static 8
    "};
    let cpu = run("Pops", source);

    assert_eq!(cpu.peek(LCL_BASE as u16), 10);
    assert_eq!(cpu.peek(ARG_BASE as u16 + 2), 21);
    assert_eq!(cpu.peek(THIS_BASE as u16 + 6), 36);
    assert_eq!(cpu.peek(THAT_BASE as u16 + 5), 42);
    assert_eq!(cpu.peek(11), 45);
    assert_eq!(cpu.peek(THAT), 3030);
    assert_eq!(cpu.peek(3032), 46);

    let static_8 = cpu.program().variable_address("Pops.8").unwrap();
    assert_eq!(cpu.peek(static_8), 510);
    assert!(cpu.stack().is_empty());
}

#[test]
fn test_pointer_selects_this_and_that() {
    let source = indoc! {"
        push constant 3100
        pop pointer 0
        push constant 9
        pop this 2
        push pointer 0
        push this 2
    "};
    let cpu = run("Ptr", source);
    assert_eq!(cpu.peek(THIS), 3100);
    assert_eq!(cpu.peek(3102), 9);
    assert_eq!(cpu.stack(), vec![3100, 9]);
}

#[test]
fn test_static_is_scoped_per_unit() {
    let asm = translate_units(
        &[
            ("Class1", "push constant 6\npop static 0\n"),
            ("Class2", "push constant 8\npop static 0\npush static 0\n"),
        ],
        CodegenOptions::default(),
    );
    let mut cpu = machine(&asm);
    cpu.run(MAX_STEPS).unwrap();

    let a = cpu.program().variable_address("Class1.0").unwrap();
    let b = cpu.program().variable_address("Class2.0").unwrap();
    assert_ne!(a, b);
    assert_eq!(cpu.peek(a), 6);
    assert_eq!(cpu.peek(b), 8);
    assert_eq!(cpu.stack(), vec![8]);
}

#[test]
fn test_dotted_unit_statics_stay_apart() {
    let asm = translate_units(
        &[
            ("Lib.a", "push constant 11\npop static 0\n"),
            ("Lib.b", "push constant 22\npop static 0\n"),
        ],
        CodegenOptions::default(),
    );
    let mut cpu = machine(&asm);
    cpu.run(MAX_STEPS).unwrap();

    let a = cpu.program().variable_address("Lib.a.0").unwrap();
    let b = cpu.program().variable_address("Lib.b.0").unwrap();
    assert_ne!(a, b);
    assert_eq!(cpu.peek(a), 11);
    assert_eq!(cpu.peek(b), 22);
}

#[test]
fn test_call_and_return() {
    let source = indoc! {"
        push constant 3
        push constant 4
        call Sum.sum 2
        label HALT
        goto HALT
        function Sum.sum 0
        push argument 0
        push argument 1
        add
        return
    "};
    let cpu = run_until_halt_label("Sum", source);

    assert_eq!(cpu.stack(), vec![7]);
    // SP was 258 before the call with 2 arguments
    assert_eq!(cpu.sp(), 258 - 2 + 1);
    assert_eq!(cpu.peek(LCL), LCL_BASE);
    assert_eq!(cpu.peek(ARG), ARG_BASE);
    assert_eq!(cpu.peek(THIS), THIS_BASE);
    assert_eq!(cpu.peek(THAT), THAT_BASE);
}

#[test]
fn test_return_with_zero_arguments() {
    // *ARG and the saved return address share a cell
    let source = indoc! {"
        call Zero.seven 0
        label HALT
        goto HALT
        function Zero.seven 2
        push local 0
        push local 1
        add
        push constant 7
        add
        pop local 1
        push constant 5000
        pop pointer 0
        push local 1
        return
    "};
    let cpu = run_until_halt_label("Zero", source);
    assert_eq!(cpu.stack(), vec![7]);
    assert_eq!(cpu.peek(THIS), THIS_BASE);
    assert_eq!(cpu.peek(LCL), LCL_BASE);
}

#[test]
fn test_recursive_calls() {
    let source = indoc! {"
        push constant 10
        call Fib.fib 1
        label HALT
        goto HALT
        function Fib.fib 0
        push argument 0
        push constant 2
        lt
        if-goto BASE
        push argument 0
        push constant 1
        sub
        call Fib.fib 1
        push argument 0
        push constant 2
        sub
        call Fib.fib 1
        add
        return
        label BASE
        push argument 0
        return
    "};
    let cpu = run_until_halt_label("Fib", source);
    assert_eq!(cpu.stack(), vec![55]);
}

#[test]
fn test_function_locals_are_zeroed() {
    let source = indoc! {"
        call Dirty.locals 0
        label HALT
        goto HALT
        function Dirty.locals 3
        push local 0
        push local 1
        or
        push local 2
        or
        return
    "};
    let mut cpu = machine(&translate("Dirty", source));
    // garbage where the callee's locals will live
    for addr in 256..280 {
        cpu.poke(addr, -1);
    }
    cpu.run_until_label("HALT", MAX_STEPS).unwrap();
    assert_eq!(cpu.stack(), vec![0]);
}

#[test]
fn test_loop_with_scoped_labels() {
    // sum 1..=5 using a top-level loop
    let source = indoc! {"
        push constant 0
        pop local 0
        push constant 5
        pop local 1
        label LOOP
        push local 0
        push local 1
        add
        pop local 0
        push local 1
        push constant 1
        sub
        pop local 1
        push local 1
        if-goto LOOP
        push local 0
    "};
    let cpu = run("Loop", source);
    assert_eq!(cpu.stack(), vec![15]);
}

#[test]
fn test_labels_unique_across_units() {
    let unit = indoc! {"
        push constant 1
        push constant 2
        eq
        push constant 1
        push constant 2
        gt
        push constant 1
        push constant 2
        lt
        call Other.f 0
        call Other.f 0
    "};
    let asm = translate_units(
        &[("First", unit), ("Second", unit), ("Third", unit)],
        CodegenOptions::default().with_echo_source(false),
    );

    // duplicate label definitions are rejected by the loader
    let program = hack_sim::parse_program(&asm).unwrap();
    for n in 0..9 {
        assert!(program.label_address(&format!("TRUE_{n}")).is_some());
        assert!(program.label_address(&format!("END_{n}")).is_some());
    }
    for n in 0..6 {
        assert!(program.label_address(&format!("RETURN_{n}")).is_some());
    }
    assert!(program.label_address("TRUE_9").is_none());
}

#[test]
fn test_bootstrap_calls_sys_init() {
    let sys = indoc! {"
        function Sys.init 0
        push constant 4000
        pop pointer 0
        call Main.double 0
        pop static 0
        label HALT
        goto HALT
    "};
    let main = indoc! {"
        function Main.double 0
        push constant 21
        push constant 21
        add
        return
    "};
    let asm = translate_units(
        &[("Main", main), ("Sys", sys)],
        CodegenOptions::default().with_bootstrap(true),
    );
    let first: Vec<&str> = asm.lines().take(6).collect();
    assert_eq!(first, vec!["//  Bootstrap code", "@256", "D=A", "@SP", "M=D", "//  call Sys.init 0"]);

    // bootstrap sets SP itself
    let mut cpu = hack_sim::load(&asm).unwrap();
    cpu.run_until_label("Sys.init.HALT", MAX_STEPS).unwrap();
    let result = cpu.program().variable_address("Sys.0").unwrap();
    assert_eq!(cpu.peek(result), 42);
    assert_eq!(cpu.peek(THIS), 4000);
    // return address plus four saved pointers
    assert_eq!(cpu.sp(), 261);
}

#[test]
fn test_segment_errors() {
    let pop_constant = [Instruction::Pop { segment: Segment::Constant, index: 0 }];
    let err = vmt_codegen::translate_to_string("E", &pop_constant, CodegenOptions::default()).unwrap_err();
    assert!(matches!(err.root(), TranslateError::InvalidSegment { .. }));

    let push_pointer = [Instruction::Push { segment: Segment::Pointer, index: 2 }];
    let err = vmt_codegen::translate_to_string("E", &push_pointer, CodegenOptions::default()).unwrap_err();
    assert!(matches!(err.root(), TranslateError::InvalidOperand { index: 2, .. }));

    let big_constant = [Instruction::Push { segment: Segment::Constant, index: 32768 }];
    let err = vmt_codegen::translate_to_string("E", &big_constant, CodegenOptions::default()).unwrap_err();
    assert!(matches!(err.root(), TranslateError::InvalidOperand { .. }));
}

/// Reference evaluator for straight-line code over the same memory layout
struct ReferenceVm {
    ram: HashMap<u16, i16>,
    statics: HashMap<u16, i16>,
    stack: Vec<i16>,
}

impl ReferenceVm {
    fn new() -> Self {
        let ram = HashMap::from([
            (LCL, LCL_BASE),
            (ARG, ARG_BASE),
            (THIS, THIS_BASE),
            (THAT, THAT_BASE),
        ]);
        Self { ram, statics: HashMap::new(), stack: Vec::new() }
    }

    fn read(&self, addr: u16) -> i16 {
        self.ram.get(&addr).copied().unwrap_or(0)
    }

    fn address(&self, segment: Segment, index: u16) -> u16 {
        match segment {
            Segment::Local => self.read(LCL) as u16 + index,
            Segment::Argument => self.read(ARG) as u16 + index,
            Segment::This => self.read(THIS) as u16 + index,
            Segment::That => self.read(THAT) as u16 + index,
            Segment::Temp => 5 + index,
            Segment::Pointer => THIS + index,
            Segment::Static | Segment::Constant => unreachable!(),
        }
    }

    fn exec(&mut self, inst: &Instruction) {
        match inst {
            Instruction::Push { segment: Segment::Constant, index } => self.stack.push(*index as i16),
            Instruction::Push { segment: Segment::Static, index } => {
                self.stack.push(self.statics.get(index).copied().unwrap_or(0))
            }
            Instruction::Push { segment, index } => {
                let value = self.read(self.address(*segment, *index));
                self.stack.push(value)
            }
            Instruction::Pop { segment: Segment::Static, index } => {
                let value = self.stack.pop().unwrap();
                self.statics.insert(*index, value);
            }
            Instruction::Pop { segment, index } => {
                let addr = self.address(*segment, *index);
                let value = self.stack.pop().unwrap();
                self.ram.insert(addr, value);
            }
            Instruction::Arithmetic { op } => {
                let y = self.stack.pop().unwrap();
                let result = match op {
                    ArithmeticOp::Neg => y.wrapping_neg(),
                    ArithmeticOp::Not => !y,
                    _ => {
                        let x = self.stack.pop().unwrap();
                        let truth = |b: bool| if b { -1 } else { 0 };
                        match op {
                            ArithmeticOp::Add => x.wrapping_add(y),
                            ArithmeticOp::Sub => x.wrapping_sub(y),
                            ArithmeticOp::And => x & y,
                            ArithmeticOp::Or => x | y,
                            ArithmeticOp::Eq => truth(x == y),
                            // the sign of the 16-bit difference, as the machine sees it
                            ArithmeticOp::Gt => truth(x.wrapping_sub(y) > 0),
                            ArithmeticOp::Lt => truth(x.wrapping_sub(y) < 0),
                            ArithmeticOp::Neg | ArithmeticOp::Not => unreachable!(),
                        }
                    }
                };
                self.stack.push(result);
            }
            other => panic!("reference evaluator does not handle {other}"),
        }
    }
}

/// Small deterministic generator of valid straight-line programs
struct ProgramGen {
    state: u32,
}

impl ProgramGen {
    fn next(&mut self, bound: u32) -> u32 {
        self.state = self.state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (self.state >> 16) % bound
    }

    fn program(&mut self, len: usize) -> Vec<Instruction> {
        const CELLS: [Segment; 6] = [
            Segment::Local,
            Segment::Argument,
            Segment::This,
            Segment::That,
            Segment::Temp,
            Segment::Static,
        ];
        let mut depth = 0usize;
        let mut program = Vec::new();

        while program.len() < len {
            let inst = match self.next(4) {
                0 => Instruction::Push { segment: Segment::Constant, index: self.next(32768) as u16 },
                1 => {
                    let segment = CELLS[self.next(CELLS.len() as u32) as usize];
                    let index = self.next(8) as u16;
                    if depth > 0 && self.next(2) == 0 {
                        Instruction::Pop { segment, index }
                    } else if self.next(5) == 0 {
                        Instruction::Push { segment: Segment::Pointer, index: self.next(2) as u16 }
                    } else {
                        Instruction::Push { segment, index }
                    }
                }
                _ => {
                    let op = ArithmeticOp::ALL[self.next(ArithmeticOp::ALL.len() as u32) as usize];
                    if depth < op.arity() {
                        continue;
                    }
                    Instruction::Arithmetic { op }
                }
            };

            depth = match &inst {
                Instruction::Push { .. } => depth + 1,
                Instruction::Pop { .. } => depth - 1,
                Instruction::Arithmetic { op } => depth + 1 - op.arity(),
                _ => depth,
            };
            program.push(inst);
        }
        program
    }
}

#[test]
fn test_stack_effect_matches_reference() {
    let mut gen = ProgramGen { state: 0x5eed };

    for round in 0..40 {
        let program = gen.program(60);

        let mut reference = ReferenceVm::new();
        for inst in &program {
            reference.exec(inst);
        }

        let asm = vmt_codegen::translate_to_string("Gen", &program, CodegenOptions::default()).unwrap();
        let mut cpu = machine(&asm);
        cpu.run(MAX_STEPS).unwrap();

        assert_eq!(cpu.stack(), reference.stack, "stack mismatch in round {round}");
        for (&addr, &value) in &reference.ram {
            assert_eq!(cpu.peek(addr), value, "RAM[{addr}] mismatch in round {round}");
        }
        for (&index, &value) in &reference.statics {
            let addr = cpu.program().variable_address(&format!("Gen.{index}")).unwrap();
            assert_eq!(cpu.peek(addr), value, "static {index} mismatch in round {round}");
        }
    }
}
