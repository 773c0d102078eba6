use alloy_primitives::U256;
use avm_isa::{Block, CallKind, ContractId, HostOp, Label};

use crate::{
    DiagnosticKind, Diagnostics, Instruction, Opcode, constants::CANONICAL_INVALID_OPCODE,
};

/// Rules that depend on where this exact instruction sits.
pub(super) fn translate(
    instruction: &Instruction,
    contract: ContractId,
    diagnostics: &mut Diagnostics,
) -> Option<Block> {
    let mut block = Block::new();
    match instruction.opcode {
        Opcode::Push(_) => {
            block.push(instruction.operand.unwrap_or_default());
        }
        Opcode::JumpDest => {
            block.set_label(Label::jump_dest(contract, instruction.pc));
        }
        Opcode::Call => call(&mut block, CallKind::Call, contract, instruction),
        Opcode::CallCode => call(&mut block, CallKind::CallCode, contract, instruction),
        Opcode::DelegateCall => call(&mut block, CallKind::DelegateCall, contract, instruction),
        Opcode::StaticCall => call(&mut block, CallKind::StaticCall, contract, instruction),
        Opcode::Invalid(byte) => {
            if byte != CANONICAL_INVALID_OPCODE {
                diagnostics.report(instruction.pc, DiagnosticKind::NonstandardInvalid(byte));
            }
            // Revert with empty return data.
            block
                .push(U256::ZERO)
                .push(U256::ZERO)
                .host(HostOp::Revert);
        }
        _ => return None,
    }
    Some(block)
}

/// Hands the call to the host and marks where execution resumes afterwards.
fn call(block: &mut Block, kind: CallKind, contract: ContractId, instruction: &Instruction) {
    let return_label = Label::call_return(contract, instruction.pc);
    block
        .host(HostOp::Call {
            kind,
            return_label: return_label.clone(),
        })
        .set_label(return_label);
}
