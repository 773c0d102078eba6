use alloy_primitives::U256;
use avm_isa::ContractId;

/// First byte of the metadata marker for the legacy single-entry encoding (`LOG1`).
pub const METADATA_MARKER_V1: u8 = 0xA1;
/// First byte of the metadata marker for the two-entry encoding (`LOG2`).
pub const METADATA_MARKER_V2: u8 = 0xA2;
/// Second byte of every metadata marker (`PUSH6`).
pub const METADATA_MARKER_TAIL: u8 = 0x65;

/// `0xA165` and `0xA265` as 16-bit words, as they appear inside push operands.
pub const METADATA_WORD_V1: u64 = 0xA165;
pub const METADATA_WORD_V2: u64 = 0xA265;

/// The designated invalid instruction. Other unassigned bytes are nonstandard.
pub const CANONICAL_INVALID_OPCODE: u8 = 0xFE;

/// Identifier of the interrupt pseudo-contract.
pub const INTERRUPT_CONTRACT_ID: ContractId = 1;

/// Size reported for the interrupt pseudo-contract.
pub const INTERRUPT_CONTRACT_SIZE: u64 = 1;

pub const DEFAULT_GAS_PRICE: u64 = 1;
pub const DEFAULT_GAS_LIMIT: u64 = 10_000_000_000;
pub const DEFAULT_GAS_REMAINING: u64 = 9_999_999_999;

/// Token type passed to the host balance accessors.
pub const NATIVE_TOKEN_TYPE: u64 = 0;

/// Mask selecting the low 160 bits of a word (an address).
#[must_use]
pub fn address_mask() -> U256 {
    (U256::from(1) << 160) - U256::from(1)
}
