use avm_isa::{HostOp, Label};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("Stack underflow")]
    StackUnderflow,

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },

    #[error("Label {0} is set more than once")]
    DuplicateLabel(Label),

    #[error("Unknown label {0}")]
    UnknownLabel(Label),

    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(usize),

    #[error("Host cannot execute {0}")]
    UnsupportedHostOp(HostOp),

    #[error("Host failure: {0}")]
    Host(String),
}

pub type VmResult<T> = Result<T, VmError>;
