use std::fmt;

use alloy_primitives::{Bytes, U256};

use crate::Label;

/// A value that can live on the target machine's stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A 256-bit word.
    Int(U256),
    /// A code point.
    Label(Label),
    /// An immutable byte range (contract code).
    Bytes(Bytes),
    /// The absent marker.
    ///
    /// Lookup routines leave this on the stack when a key is missing. It is a distinct
    /// variant so it can never be mistaken for a legitimate integer, label or byte range.
    None,
}

impl From<U256> for Value {
    fn from(value: U256) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Int(U256::from(value))
    }
}

impl From<Label> for Value {
    fn from(label: Label) -> Self {
        Self::Label(label)
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "0x{value:x}"),
            Self::Label(label) => write!(f, "{label}"),
            Self::Bytes(bytes) => write!(f, "bytes[{}]", bytes.len()),
            Self::None => write!(f, "none"),
        }
    }
}
