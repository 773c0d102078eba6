use std::{collections::BTreeMap, fmt};

use alloy_primitives::U256;

use crate::{ContractId, Label, Value};

/// Primitive operations of the target stack machine.
///
/// Operand convention: the top of the stack is the first operand. For example `Sub` pops
/// `a` then `b` and pushes `a - b`, and `Lt` pushes `a < b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AvmOp {
    Push(Value),
    Pop,
    /// Duplicates the `n`-th item (`0` is the top).
    Dup(u8),
    /// Exchanges the top with the `n`-th item (`n >= 1`).
    Swap(u8),

    Add,
    Mul,
    Sub,
    Div,
    Sdiv,
    Mod,
    Smod,
    AddMod,
    MulMod,
    Exp,
    SignExtend,

    Lt,
    Gt,
    Slt,
    Sgt,
    /// Structural equality over any two values.
    Eq,
    IsZero,

    And,
    Or,
    Xor,
    Not,
    Byte,

    /// Pops a label and transfers control to it.
    Jump,
    /// Pops a label then a condition, and jumps if the condition is non-zero.
    CJump,
    /// Raises a fault that unwinds the current call.
    Error,

    /// A capability provided by the host runtime.
    Host(HostOp),
}

impl AvmOp {
    /// Returns `(pops, pushes)` for primitive operations.
    ///
    /// Host operations are opaque to the compiler and return `None`.
    #[must_use]
    pub const fn stack_effect(&self) -> Option<(usize, usize)> {
        let effect = match self {
            Self::Push(_) => (0, 1),
            Self::Pop | Self::Jump => (1, 0),
            Self::Dup(n) => (*n as usize + 1, *n as usize + 2),
            Self::Swap(n) => (*n as usize + 1, *n as usize + 1),
            Self::Add
            | Self::Mul
            | Self::Sub
            | Self::Div
            | Self::Sdiv
            | Self::Mod
            | Self::Smod
            | Self::Exp
            | Self::SignExtend
            | Self::Lt
            | Self::Gt
            | Self::Slt
            | Self::Sgt
            | Self::Eq
            | Self::And
            | Self::Or
            | Self::Xor
            | Self::Byte => (2, 1),
            Self::AddMod | Self::MulMod => (3, 1),
            Self::IsZero | Self::Not => (1, 1),
            Self::CJump => (2, 0),
            Self::Error => (0, 0),
            Self::Host(_) => return None,
        };
        Some(effect)
    }

    #[must_use]
    pub fn push(value: impl Into<Value>) -> Self {
        Self::Push(value.into())
    }
}

impl fmt::Display for AvmOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(value) => write!(f, "push {value}"),
            Self::Pop => write!(f, "pop"),
            Self::Dup(n) => write!(f, "dup{n}"),
            Self::Swap(n) => write!(f, "swap{n}"),
            Self::Add => write!(f, "add"),
            Self::Mul => write!(f, "mul"),
            Self::Sub => write!(f, "sub"),
            Self::Div => write!(f, "div"),
            Self::Sdiv => write!(f, "sdiv"),
            Self::Mod => write!(f, "mod"),
            Self::Smod => write!(f, "smod"),
            Self::AddMod => write!(f, "addmod"),
            Self::MulMod => write!(f, "mulmod"),
            Self::Exp => write!(f, "exp"),
            Self::SignExtend => write!(f, "signextend"),
            Self::Lt => write!(f, "lt"),
            Self::Gt => write!(f, "gt"),
            Self::Slt => write!(f, "slt"),
            Self::Sgt => write!(f, "sgt"),
            Self::Eq => write!(f, "eq"),
            Self::IsZero => write!(f, "iszero"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Xor => write!(f, "xor"),
            Self::Not => write!(f, "not"),
            Self::Byte => write!(f, "byte"),
            Self::Jump => write!(f, "jump"),
            Self::CJump => write!(f, "cjump"),
            Self::Error => write!(f, "error"),
            Self::Host(op) => write!(f, "host.{op}"),
        }
    }
}

/// Flavour of a call-family operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallKind {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
}

impl CallKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::CallCode => "callcode",
            Self::DelegateCall => "delegatecall",
            Self::StaticCall => "staticcall",
        }
    }
}

/// Fields of the host-owned call frame record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallFrameField {
    ContractId,
}

/// Registration record handed to the host during initialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractDescriptor {
    /// Code point of the contract routine.
    pub entry: Label,
    pub id: ContractId,
    /// Initial persistent storage.
    pub storage: BTreeMap<U256, U256>,
}

/// Capabilities consumed from the host runtime.
///
/// Their semantics belong to the host; the compiler only decides where they are invoked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostOp {
    Initialize(Vec<ContractDescriptor>),
    GetNextMessage,
    SetupInitialCall,

    Stop,
    Return,
    Revert,
    SelfDestruct,
    Call { kind: CallKind, return_label: Label },

    BalanceGet,
    ExtBalance,
    Sha3,

    MemoryLoad,
    MemoryStore,
    MemoryStore8,
    MemorySize,
    /// Pops a byte range, then `dest_offset`, `offset` and `size`, and copies into memory.
    CopyToMemory,

    StorageLoad,
    StorageStore,
    Log { topics: u8 },

    MessageOrigin,
    MessageCaller,
    MessageValue,
    MessageDataLoad,
    MessageDataSize,
    MessageDataCopy,
    ReturnDataSize,
    ReturnDataCopy,

    Timestamp,
    BlockNumber,

    GetCallFrame,
    CallFrame(CallFrameField),
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialize(contracts) => write!(f, "initialize[{}]", contracts.len()),
            Self::GetNextMessage => write!(f, "get_next_message"),
            Self::SetupInitialCall => write!(f, "setup_initial_call"),
            Self::Stop => write!(f, "stop"),
            Self::Return => write!(f, "return"),
            Self::Revert => write!(f, "revert"),
            Self::SelfDestruct => write!(f, "selfdestruct"),
            Self::Call { kind, return_label } => {
                write!(f, "{}(return to {return_label})", kind.as_str())
            }
            Self::BalanceGet => write!(f, "balance_get"),
            Self::ExtBalance => write!(f, "ext_balance"),
            Self::Sha3 => write!(f, "sha3"),
            Self::MemoryLoad => write!(f, "memory_load"),
            Self::MemoryStore => write!(f, "memory_store"),
            Self::MemoryStore8 => write!(f, "memory_store8"),
            Self::MemorySize => write!(f, "memory_size"),
            Self::CopyToMemory => write!(f, "copy_to_memory"),
            Self::StorageLoad => write!(f, "storage_load"),
            Self::StorageStore => write!(f, "storage_store"),
            Self::Log { topics } => write!(f, "log{topics}"),
            Self::MessageOrigin => write!(f, "message_origin"),
            Self::MessageCaller => write!(f, "message_caller"),
            Self::MessageValue => write!(f, "message_value"),
            Self::MessageDataLoad => write!(f, "message_data_load"),
            Self::MessageDataSize => write!(f, "message_data_size"),
            Self::MessageDataCopy => write!(f, "message_data_copy"),
            Self::ReturnDataSize => write!(f, "return_data_size"),
            Self::ReturnDataCopy => write!(f, "return_data_copy"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::BlockNumber => write!(f, "block_number"),
            Self::GetCallFrame => write!(f, "get_call_frame"),
            Self::CallFrame(CallFrameField::ContractId) => write!(f, "call_frame.contract_id"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_effect_of_primitives() {
        assert_eq!(AvmOp::Div.stack_effect(), Some((2, 1)));
        assert_eq!(AvmOp::AddMod.stack_effect(), Some((3, 1)));
        assert_eq!(AvmOp::Dup(1).stack_effect(), Some((2, 3)));
        assert_eq!(AvmOp::Swap(2).stack_effect(), Some((3, 3)));
        assert_eq!(AvmOp::Host(HostOp::Stop).stack_effect(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(AvmOp::push(4u64).to_string(), "push 0x4");
        assert_eq!(AvmOp::Dup(0).to_string(), "dup0");
        assert_eq!(
            AvmOp::Host(HostOp::Log { topics: 3 }).to_string(),
            "host.log3"
        );
        assert_eq!(
            AvmOp::Host(HostOp::Call {
                kind: CallKind::DelegateCall,
                return_label: Label::call_return(2, 9),
            })
            .to_string(),
            "host.delegatecall(return to @call_return_2_9)"
        );
    }
}
