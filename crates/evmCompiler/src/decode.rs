use alloy_primitives::U256;

use crate::{Instruction, Opcode};

/// Turns raw contract code into an ordered instruction stream.
pub trait Disassembler {
    fn disassemble(&self, code: &[u8]) -> Vec<Instruction>;
}

/// Linear-sweep decoder for source-machine bytecode.
///
/// Push operands running past the end of the code are zero-padded on the right, since code
/// beyond its end reads as zero on the source machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvmDisassembler;

impl Disassembler for EvmDisassembler {
    fn disassemble(&self, code: &[u8]) -> Vec<Instruction> {
        let mut instructions = Vec::new();
        let mut pc = 0;
        while pc < code.len() {
            let opcode = Opcode::from_byte(code[pc]);
            let size = opcode.operand_size();
            let operand = (size > 0).then(|| {
                let start = (pc + 1).min(code.len());
                let end = (pc + 1 + size).min(code.len());
                let mut word = [0u8; 32];
                word[32 - size..32 - size + (end - start)].copy_from_slice(&code[start..end]);
                U256::from_be_bytes(word)
            });
            instructions.push(Instruction::new(opcode, operand, pc));
            pc += 1 + size;
        }
        instructions
    }
}
