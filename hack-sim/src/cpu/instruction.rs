/// Instruction representation for the Hack CPU

/// ALU function, with `x = D` and `y = A` or `M`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Zero,
    One,
    NegOne,
    X,
    Y,
    NotX,
    NotY,
    NegX,
    NegY,
    XPlusOne,
    YPlusOne,
    XMinusOne,
    YMinusOne,
    XPlusY,
    XMinusY,
    YMinusX,
    XAndY,
    XOrY,
}

impl AluOp {
    pub fn apply(self, x: i16, y: i16) -> i16 {
        match self {
            AluOp::Zero => 0,
            AluOp::One => 1,
            AluOp::NegOne => -1,
            AluOp::X => x,
            AluOp::Y => y,
            AluOp::NotX => !x,
            AluOp::NotY => !y,
            AluOp::NegX => x.wrapping_neg(),
            AluOp::NegY => y.wrapping_neg(),
            AluOp::XPlusOne => x.wrapping_add(1),
            AluOp::YPlusOne => y.wrapping_add(1),
            AluOp::XMinusOne => x.wrapping_sub(1),
            AluOp::YMinusOne => y.wrapping_sub(1),
            AluOp::XPlusY => x.wrapping_add(y),
            AluOp::XMinusY => x.wrapping_sub(y),
            AluOp::YMinusX => y.wrapping_sub(x),
            AluOp::XAndY => x & y,
            AluOp::XOrY => x | y,
        }
    }

    fn reads_y(self) -> bool {
        !matches!(
            self,
            AluOp::Zero | AluOp::One | AluOp::NegOne | AluOp::X | AluOp::NotX | AluOp::NegX
                | AluOp::XPlusOne | AluOp::XMinusOne
        )
    }
}

/// Computation part of a C-instruction. `use_m` selects `M` over `A` as `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comp {
    pub op: AluOp,
    pub use_m: bool,
}

impl Comp {
    /// True when the computation reads `M`
    pub fn reads_memory(&self) -> bool {
        self.use_m && self.op.reads_y()
    }

    pub fn parse(text: &str) -> Option<Self> {
        // Mnemonics with a `y` operand are listed with `A`; `M` forms are derived.
        let (normalized, use_m) = if text.contains('M') {
            (text.replace('M', "A"), true)
        } else {
            (text.to_string(), false)
        };

        let op = match normalized.as_str() {
            "0" => AluOp::Zero,
            "1" => AluOp::One,
            "-1" => AluOp::NegOne,
            "D" => AluOp::X,
            "A" => AluOp::Y,
            "!D" => AluOp::NotX,
            "!A" => AluOp::NotY,
            "-D" => AluOp::NegX,
            "-A" => AluOp::NegY,
            "D+1" | "1+D" => AluOp::XPlusOne,
            "A+1" | "1+A" => AluOp::YPlusOne,
            "D-1" => AluOp::XMinusOne,
            "A-1" => AluOp::YMinusOne,
            "D+A" | "A+D" => AluOp::XPlusY,
            "D-A" => AluOp::XMinusY,
            "A-D" => AluOp::YMinusX,
            "D&A" | "A&D" => AluOp::XAndY,
            "D|A" | "A|D" => AluOp::XOrY,
            _ => return None,
        };

        // `A` and `M` never appear together
        if use_m && text.contains('A') {
            return None;
        }

        Some(Comp { op, use_m })
    }
}

/// Destination registers of a C-instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dest {
    pub a: bool,
    pub d: bool,
    pub m: bool,
}

impl Dest {
    pub fn parse(text: &str) -> Option<Self> {
        let mut dest = Dest::default();
        for c in text.chars() {
            let slot = match c {
                'A' => &mut dest.a,
                'D' => &mut dest.d,
                'M' => &mut dest.m,
                _ => return None,
            };
            if *slot {
                return None;
            }
            *slot = true;
        }
        if text.is_empty() {
            return None;
        }
        Some(dest)
    }
}

/// Jump condition, tested against the ALU output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Jgt,
    Jeq,
    Jge,
    Jlt,
    Jne,
    Jle,
    Jmp,
}

impl Jump {
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "JGT" => Jump::Jgt,
            "JEQ" => Jump::Jeq,
            "JGE" => Jump::Jge,
            "JLT" => Jump::Jlt,
            "JNE" => Jump::Jne,
            "JLE" => Jump::Jle,
            "JMP" => Jump::Jmp,
            _ => return None,
        })
    }

    pub fn taken(self, value: i16) -> bool {
        match self {
            Jump::Jgt => value > 0,
            Jump::Jeq => value == 0,
            Jump::Jge => value >= 0,
            Jump::Jlt => value < 0,
            Jump::Jne => value != 0,
            Jump::Jle => value <= 0,
            Jump::Jmp => true,
        }
    }
}

/// A resolved Hack instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    /// `@value`
    Load(u16),
    /// `dest=comp;jump`
    Compute {
        dest: Dest,
        comp: Comp,
        jump: Option<Jump>,
    },
}
