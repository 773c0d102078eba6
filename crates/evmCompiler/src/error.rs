use alloy_primitives::U256;
use avm_isa::{ContractId, SourcePc};
use thiserror::Error;

use crate::{Instruction, Opcode};

/// The single compile-time failure channel. Any of these aborts the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Opcode {opcode} is not supported (contract {contract}, pc {pc})")]
    Unsupported {
        opcode: Opcode,
        contract: ContractId,
        pc: SourcePc,
    },

    #[error("Unhandled instruction {instruction} in contract {contract}")]
    UnhandledInstruction {
        contract: ContractId,
        instruction: Instruction,
    },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Lookup key 0x{0:x} appears more than once")]
    DuplicateKey(U256),
}

/// Errors raised while reading contract descriptions from disk.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Cannot read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Contract {contract}: malformed hex in {field}: {source}")]
    Hex {
        contract: ContractId,
        field: &'static str,
        source: hex::FromHexError,
    },

    #[error("Contract {contract}: storage word {value} is wider than 32 bytes")]
    WordTooWide { contract: ContractId, value: String },

    #[error("Contract id {0} is listed more than once")]
    DuplicateContract(ContractId),
}

pub type CompileResult<T> = Result<T, CompileError>;
