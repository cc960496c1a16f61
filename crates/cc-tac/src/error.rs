use thiserror::Error;

/// Faults raised while loading a TAC stream, before execution ever starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("engine must be STOPPED to load (currently {0:?})")]
    NotStopped(crate::vm::State),

    #[error("instruction {0} has a malformed label operand")]
    MalformedLabel(u32),

    #[error("jump target for label {0} does not resolve to any LABEL instruction")]
    UnresolvedLabel(u16),
}

/// Faults raised by individual opcode dispatch during `step`/`run`. Each
/// variant matches one of spec.md's `VM-runtime` error kinds.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VmFault {
    #[error("invalid opcode byte {0}")]
    InvalidOpcode(u8),

    #[error("invalid operand at pc {pc}")]
    InvalidOperand { pc: u32 },

    #[error("division by zero at pc {pc}")]
    DivisionByZero { pc: u32 },

    #[error("invalid memory access at pc {pc}")]
    InvalidMemory { pc: u32 },

    #[error("call stack overflow at pc {pc}")]
    StackOverflow { pc: u32 },

    #[error("step limit exceeded")]
    MaxSteps,
}
