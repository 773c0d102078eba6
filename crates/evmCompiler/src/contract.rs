use std::collections::BTreeMap;

use alloy_primitives::{Bytes, U256};
use avm_isa::ContractId;

use crate::{Disassembler, EvmDisassembler, Instruction};

/// A deployed source contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub id: ContractId,
    pub code: Bytes,
    /// Decoded from `code`, before any normalization.
    pub instructions: Vec<Instruction>,
    /// Initial persistent storage.
    pub storage: BTreeMap<U256, U256>,
}

impl Contract {
    pub fn new(
        id: ContractId,
        code: impl Into<Bytes>,
        storage: BTreeMap<U256, U256>,
        disassembler: &impl Disassembler,
    ) -> Self {
        let code = code.into();
        let instructions = disassembler.disassemble(&code);
        Self {
            id,
            code,
            instructions,
            storage,
        }
    }

    /// Decodes `code` with the default disassembler and starts from empty storage.
    pub fn from_code(id: ContractId, code: impl Into<Bytes>) -> Self {
        Self::new(id, code, BTreeMap::new(), &EvmDisassembler)
    }

    #[must_use]
    pub fn with_storage(mut self, storage: BTreeMap<U256, U256>) -> Self {
        self.storage = storage;
        self
    }

    /// Instruction count plus the nominal operand width of every instruction.
    #[must_use]
    pub fn code_size(&self) -> u64 {
        self.instructions
            .iter()
            .map(|instruction| instruction.encoded_len() as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_size_counts_operands() {
        let contract = Contract::from_code(2, vec![0x60, 0x01, 0x61, 0x00, 0x02, 0x00]);
        assert_eq!(contract.instructions.len(), 3);
        assert_eq!(contract.code_size(), 6);
    }

    #[test]
    fn test_truncated_push_counts_nominal_width() {
        let contract = Contract::from_code(2, vec![0x00, 0x63, 0xaa]);
        assert_eq!(contract.code_size(), 6);
    }
}
