use std::fmt;

use alloy_primitives::U256;
use avm_isa::SourcePc;

use crate::Opcode;

/// A decoded source instruction. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Immediate operand, present for the push family only.
    pub operand: Option<U256>,
    /// Offset of the opcode byte in the originating byte stream.
    pub pc: SourcePc,
}

impl Instruction {
    #[must_use]
    pub const fn new(opcode: Opcode, operand: Option<U256>, pc: SourcePc) -> Self {
        Self { opcode, operand, pc }
    }

    #[must_use]
    pub fn mnemonic(&self) -> String {
        self.opcode.mnemonic()
    }

    #[must_use]
    pub const fn byte(&self) -> u8 {
        self.opcode.byte()
    }

    /// Bytes this instruction occupies in the source stream.
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        1 + self.opcode.operand_size()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operand {
            Some(operand) => write!(f, "{} 0x{operand:x} @ {}", self.opcode, self.pc),
            None => write!(f, "{} @ {}", self.opcode, self.pc),
        }
    }
}
