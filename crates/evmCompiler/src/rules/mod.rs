//! Per-opcode translation rules.
//!
//! Every opcode belongs to exactly one [`RuleKind`], decided by a single exhaustive match.
//! Each category module only sees the context its rules need.

mod arith;
mod bitwise;
mod contract_rules;
mod instance_rules;
mod static_rules;

use alloy_primitives::Bytes;
use avm_isa::{Block, ContractId};

pub use arith::{zero_guarded, zero_guarded_modular};
pub use bitwise::{arithmetic_shift_right, shift_left, shift_right};

use crate::{CompileError, CompileResult, Diagnostics, GasStandIns, Instruction, Opcode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Needs nothing beyond the instruction itself.
    Static,
    /// Needs the owning contract's code, or calls its jump dispatch or a global lookup.
    ContractScoped,
    /// Needs this instruction's position and the owning contract id.
    InstanceScoped,
    /// Has no faithful translation; compilation aborts.
    Unsupported,
    /// Decoded but covered by no rule; compilation aborts.
    Unknown,
}

impl Opcode {
    #[must_use]
    pub const fn rule_kind(&self) -> RuleKind {
        match self {
            Self::Stop
            | Self::Add
            | Self::Mul
            | Self::Sub
            | Self::Div
            | Self::Sdiv
            | Self::Mod
            | Self::Smod
            | Self::AddMod
            | Self::MulMod
            | Self::Exp
            | Self::SignExtend
            | Self::Lt
            | Self::Gt
            | Self::Slt
            | Self::Sgt
            | Self::Eq
            | Self::IsZero
            | Self::And
            | Self::Or
            | Self::Xor
            | Self::Not
            | Self::Byte
            | Self::Shl
            | Self::Shr
            | Self::Sar
            | Self::Sha3
            | Self::Address
            | Self::Balance
            | Self::Origin
            | Self::Caller
            | Self::CallValue
            | Self::CallDataLoad
            | Self::CallDataSize
            | Self::CallDataCopy
            | Self::GasPrice
            | Self::ReturnDataSize
            | Self::ReturnDataCopy
            | Self::Timestamp
            | Self::Number
            | Self::GasLimit
            | Self::SelfBalance
            | Self::Pop
            | Self::MLoad
            | Self::MStore
            | Self::MStore8
            | Self::SLoad
            | Self::SStore
            | Self::MSize
            | Self::Gas
            | Self::Dup(_)
            | Self::Swap(_)
            | Self::Return
            | Self::Revert
            | Self::SelfDestruct => RuleKind::Static,
            Self::Log(0) | Self::ChainId => RuleKind::Unknown,
            Self::Log(_) => RuleKind::Static,
            Self::Jump
            | Self::JumpI
            | Self::CodeSize
            | Self::CodeCopy
            | Self::ExtCodeSize
            | Self::ExtCodeCopy
            | Self::ExtCodeHash => RuleKind::ContractScoped,
            Self::Push(_)
            | Self::JumpDest
            | Self::Call
            | Self::CallCode
            | Self::DelegateCall
            | Self::StaticCall
            | Self::Invalid(_) => RuleKind::InstanceScoped,
            Self::BlockHash
            | Self::Coinbase
            | Self::Difficulty
            | Self::GetPc
            | Self::Create
            | Self::Create2 => RuleKind::Unsupported,
        }
    }
}

/// Everything a rule may read about the contract being translated.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub contract: ContractId,
    /// Raw code of the contract.
    pub code: &'a Bytes,
    pub gas: &'a GasStandIns,
}

/// Translates one instruction into an annotated target block.
pub fn translate_instruction(
    instruction: &Instruction,
    context: &RuleContext<'_>,
    diagnostics: &mut Diagnostics,
) -> CompileResult<Block> {
    let block = match instruction.opcode.rule_kind() {
        RuleKind::Static => static_rules::translate(instruction, context.gas, diagnostics),
        RuleKind::ContractScoped => contract_rules::translate(instruction, context, diagnostics),
        RuleKind::InstanceScoped => {
            instance_rules::translate(instruction, context.contract, diagnostics)
        }
        RuleKind::Unsupported => {
            return Err(CompileError::Unsupported {
                opcode: instruction.opcode,
                contract: context.contract,
                pc: instruction.pc,
            });
        }
        RuleKind::Unknown => None,
    };
    block
        .map(|block| block.with_annotation(instruction.to_string()))
        .ok_or_else(|| CompileError::UnhandledInstruction {
            contract: context.contract,
            instruction: instruction.clone(),
        })
}
