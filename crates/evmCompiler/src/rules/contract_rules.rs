use alloy_primitives::U256;
use avm_isa::{AvmOp, Block, GlobalTable, HostOp, Label, Value};

use super::RuleContext;
use crate::{DiagnosticKind, Diagnostics, Instruction, Opcode, call_lookup};

/// Rules that read the owning contract or call one of the shared lookups.
pub(super) fn translate(
    instruction: &Instruction,
    context: &RuleContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<Block> {
    let mut block = Block::new();
    match instruction.opcode {
        Opcode::Jump => {
            block
                .extend(jump_dispatch(instruction, context))
                .extend(fault_if_absent_else(AvmOp::Jump));
        }
        Opcode::JumpI => {
            block
                .extend(jump_dispatch(instruction, context))
                .extend(fault_if_absent_else(AvmOp::CJump));
        }
        Opcode::CodeSize => {
            block.push(U256::from(context.code.len()));
        }
        Opcode::CodeCopy => {
            block.push(context.code.clone()).host(HostOp::CopyToMemory);
        }
        Opcode::ExtCodeSize => {
            warn_approximate(instruction, diagnostics);
            block
                .extend(global_lookup(GlobalTable::Sizes, instruction, context))
                .extend(fault_if_absent());
        }
        Opcode::ExtCodeHash => {
            warn_approximate(instruction, diagnostics);
            block
                .extend(global_lookup(GlobalTable::Hashes, instruction, context))
                .extend(fault_if_absent());
        }
        Opcode::ExtCodeCopy => {
            warn_approximate(instruction, diagnostics);
            block
                .extend(global_lookup(GlobalTable::Code, instruction, context))
                .extend(fault_if_absent())
                .host(HostOp::CopyToMemory);
        }
        _ => return None,
    }
    Some(block)
}

fn jump_dispatch(instruction: &Instruction, context: &RuleContext<'_>) -> Block {
    call_lookup(
        Label::JumpDispatch(context.contract),
        Label::lookup_return(context.contract, instruction.pc),
    )
}

fn global_lookup(table: GlobalTable, instruction: &Instruction, context: &RuleContext<'_>) -> Block {
    call_lookup(
        Label::GlobalLookup(table),
        Label::lookup_return(context.contract, instruction.pc),
    )
}

fn warn_approximate(instruction: &Instruction, diagnostics: &mut Diagnostics) {
    diagnostics.report(
        instruction.pc,
        DiagnosticKind::ApproximateOpcode(instruction.opcode),
    );
}

fn is_absent() -> Block {
    let mut block = Block::new();
    block.dup(0).push(Value::None).op(AvmOp::Eq);
    block
}

/// Faults when the lookup result on top of the stack is absent, and keeps it otherwise.
fn fault_if_absent() -> Block {
    let mut fault = Block::new();
    fault.error();
    let mut block = is_absent();
    block.if_then(fault);
    block
}

/// Faults on an absent lookup result, and otherwise consumes it with `op`.
fn fault_if_absent_else(op: AvmOp) -> Block {
    let mut fault = Block::new();
    fault.error();
    let mut present = Block::new();
    present.op(op);
    let mut block = is_absent();
    block.if_else(fault, present);
    block
}
