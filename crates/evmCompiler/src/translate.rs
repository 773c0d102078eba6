use std::collections::BTreeMap;

use alloy_primitives::U256;
use avm_isa::{AvmOp, Block, ContractId, HostOp, Label, SourcePc};
use tracing::{debug, instrument};

use crate::{
    CompileOptions, CompileResult, Contract, Diagnostic, Diagnostics, Instruction, Opcode, RuleContext, StaticLookup,
    normalize::{rewrite_self_balance, strip_trailing_metadata},
    translate_instruction,
};

/// Valid jump destinations of one contract, by program counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JumpTable(StaticLookup<Label>);

impl JumpTable {
    /// One entry per `JUMPDEST`, labelled with its contract and program counter.
    #[must_use]
    pub fn build(contract: ContractId, instructions: &[Instruction]) -> Self {
        let entries: BTreeMap<U256, Label> = instructions
            .iter()
            .filter(|instruction| instruction.opcode == Opcode::JumpDest)
            .map(|instruction| {
                (
                    U256::from(instruction.pc),
                    Label::jump_dest(contract, instruction.pc),
                )
            })
            .collect();
        Self(StaticLookup::new(entries))
    }

    #[must_use]
    pub fn get(&self, pc: SourcePc) -> Option<&Label> {
        self.0.get(&U256::from(pc))
    }

    /// Destination program counters in ascending order.
    pub fn destinations(&self) -> impl Iterator<Item = SourcePc> {
        self.0.keys().map(|pc| pc.to::<SourcePc>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Routine resolving a program counter on top of the stack to its label.
    #[must_use]
    pub fn dispatch_routine(&self) -> Block {
        self.0.routine()
    }

    /// The dispatch routine shared by every jump of `contract`.
    #[must_use]
    pub fn subroutine(&self, contract: ContractId) -> Block {
        self.0.subroutine(Label::JumpDispatch(contract))
    }
}

/// The translated, self-contained routine of one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRoutine {
    pub id: ContractId,
    pub entry: Label,
    pub jump_table: JumpTable,
    pub block: Block,
    pub diagnostics: Vec<Diagnostic>,
}

/// Applies the enabled normalization passes.
#[must_use]
pub fn normalize_instructions(
    contract: ContractId,
    instructions: &[Instruction],
    options: &CompileOptions,
) -> Vec<Instruction> {
    let mut instructions = instructions.to_vec();
    if options.strip_metadata {
        let before = instructions.len();
        instructions = strip_trailing_metadata(&instructions);
        debug!(
            contract,
            stripped = before - instructions.len(),
            "metadata removed"
        );
    }
    if options.rewrite_self_balance {
        let before = instructions.len();
        instructions = rewrite_self_balance(&instructions);
        debug!(
            contract,
            rewritten = (before - instructions.len()) / 3,
            "self-balance idioms rewritten"
        );
    }
    instructions
}

#[instrument(skip_all, fields(contract = contract.id))]
pub fn translate_contract(
    contract: &Contract,
    options: &CompileOptions,
) -> CompileResult<ContractRoutine> {
    let instructions = normalize_instructions(contract.id, &contract.instructions, options);
    let jump_table = JumpTable::build(contract.id, &instructions);
    let context = RuleContext {
        contract: contract.id,
        code: &contract.code,
        gas: &options.gas,
    };

    let entry = Label::contract_entry(contract.id);
    let mut diagnostics = Diagnostics::new(contract.id);
    let mut block = Block::annotated(format!("contract {}", contract.id));
    block.set_label(entry.clone());
    for instruction in &instructions {
        block.nest(translate_instruction(instruction, &context, &mut diagnostics)?);
    }
    // Running off the end of the code stops, as on the source machine.
    block.nest(Block::from(vec![AvmOp::Host(HostOp::Stop)]).with_annotation("end of code"));
    if instructions
        .iter()
        .any(|instruction| matches!(instruction.opcode, Opcode::Jump | Opcode::JumpI))
    {
        block.nest(jump_table.subroutine(contract.id));
    }

    debug!(
        instructions = instructions.len(),
        jump_destinations = jump_table.len(),
        "contract translated"
    );
    Ok(ContractRoutine {
        id: contract.id,
        entry,
        jump_table,
        block,
        diagnostics: diagnostics.into_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompileError;

    fn translate(code: &[u8]) -> CompileResult<ContractRoutine> {
        translate_contract(
            &Contract::from_code(4, code.to_vec()),
            &CompileOptions::default(),
        )
    }

    #[test]
    fn test_jump_table_keys_are_jumpdests() {
        // JUMPDEST; PUSH1 0x5b; JUMPDEST; STOP
        let routine = translate(&[0x5b, 0x60, 0x5b, 0x5b, 0x00]).unwrap();
        assert_eq!(routine.jump_table.destinations().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(routine.jump_table.get(3), Some(&Label::jump_dest(4, 3)));
        assert_eq!(routine.jump_table.get(2), None);
        assert_eq!(
            routine.block.labels(),
            vec![
                &Label::contract_entry(4),
                &Label::jump_dest(4, 0),
                &Label::jump_dest(4, 3),
            ]
        );
    }

    #[test]
    fn test_blocks_are_annotated_with_instruction() {
        let routine = translate(&[0x60, 0x01, 0x00]).unwrap();
        let listing = routine.block.to_string();
        assert!(listing.contains("// PUSH1 0x1 @ 0"));
        assert!(listing.contains("// STOP @ 2"));
    }

    #[test]
    fn test_unsupported_opcode_aborts() {
        let error = translate(&[0x60, 0x00, 0x58]).unwrap_err();
        assert_eq!(
            error,
            CompileError::Unsupported {
                opcode: Opcode::GetPc,
                contract: 4,
                pc: 2,
            }
        );
        assert!(error.to_string().contains("GETPC"));
    }

    #[test]
    fn test_jump_dispatch_is_emitted_once() {
        // JUMPDEST; PUSH1 0; JUMP; PUSH1 0; PUSH1 0; JUMPI
        let routine = translate(&[0x5b, 0x60, 0x00, 0x56, 0x60, 0x00, 0x60, 0x00, 0x57]).unwrap();
        let labels = routine.block.labels();
        assert_eq!(
            labels
                .iter()
                .filter(|label| ***label == Label::JumpDispatch(4))
                .count(),
            1
        );
        assert!(labels.contains(&&Label::lookup_return(4, 3)));
        assert!(labels.contains(&&Label::lookup_return(4, 8)));
    }

    #[test]
    fn test_no_dispatch_without_jumps() {
        let routine = translate(&[0x5b, 0x00]).unwrap();
        assert!(!routine.block.labels().contains(&&Label::JumpDispatch(4)));
    }

    #[test]
    fn test_normalize_respects_options() {
        let contract = Contract::from_code(4, vec![0x00, 0xa1, 0x65, 0, 0, 0, 0, 0, 0]);
        let options = CompileOptions::default().with_strip_metadata(false);
        assert_eq!(normalize_instructions(4, &contract.instructions, &options).len(), 3);
        assert_eq!(
            normalize_instructions(4, &contract.instructions, &CompileOptions::default()).len(),
            1
        );
    }
}
