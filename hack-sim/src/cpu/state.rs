/// CPU execution states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    Running,
    /// PC ran past the last instruction
    Halted,
}

/// Why a bounded run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Halted,
    ReachedAddress(u16),
}
