//! Instruction-stream normalization run before translation.

use alloy_primitives::U256;

use crate::{
    Instruction, Opcode,
    constants::{
        METADATA_MARKER_TAIL, METADATA_MARKER_V1, METADATA_MARKER_V2, METADATA_WORD_V1,
        METADATA_WORD_V2, address_mask,
    },
};

/// Drops the compiler-appended metadata section at the end of a contract.
///
/// Scans backward for the two-instruction marker `(A1|A2, 65)` and truncates right before it.
/// A push operand that embeds a marker word stops the scan first; that instruction is kept
/// and everything after it is dropped. This is a heuristic and can misfire on code that
/// happens to contain marker-like bytes.
#[must_use]
pub fn strip_trailing_metadata(instructions: &[Instruction]) -> Vec<Instruction> {
    for i in (0..instructions.len().saturating_sub(1)).rev() {
        let first = instructions[i].byte();
        let second = instructions[i + 1].byte();
        if (first == METADATA_MARKER_V1 || first == METADATA_MARKER_V2)
            && second == METADATA_MARKER_TAIL
        {
            return instructions[..i].to_vec();
        }
        if instructions[i].operand.is_some_and(contains_end_marker) {
            return instructions[..=i].to_vec();
        }
    }
    instructions.to_vec()
}

/// Whether some 16-bit window of `value`, on a byte boundary, reads `0xA165` or `0xA265`.
///
/// The window slides one byte at a time until the remaining value is below `0xA265`, so a
/// bare `0xA165` in the most significant position is not reported.
#[must_use]
pub fn contains_end_marker(value: U256) -> bool {
    let floor = U256::from(METADATA_WORD_V2);
    let mask = U256::from(0xffff);
    let mut value = value;
    while value >= floor {
        let low = value & mask;
        if low == U256::from(METADATA_WORD_V1) || low == floor {
            return true;
        }
        value >>= 8;
    }
    false
}

/// Replaces every `ADDRESS; PUSH20 <mask>; AND; BALANCE` run by one `SELFBALANCE`.
///
/// The replacement takes the program counter of the `ADDRESS` it starts from.
#[must_use]
pub fn rewrite_self_balance(instructions: &[Instruction]) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(instructions.len());
    let mut i = 0;
    while i < instructions.len() {
        if is_self_balance_idiom(&instructions[i..]) {
            out.push(Instruction::new(Opcode::SelfBalance, None, instructions[i].pc));
            i += 4;
        } else {
            out.push(instructions[i].clone());
            i += 1;
        }
    }
    out
}

fn is_self_balance_idiom(window: &[Instruction]) -> bool {
    match window {
        [address, push, and, balance, ..] => {
            address.opcode == Opcode::Address
                && push.opcode == Opcode::Push(20)
                && push.operand == Some(address_mask())
                && and.opcode == Opcode::And
                && balance.opcode == Opcode::Balance
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Disassembler, EvmDisassembler};

    fn decode(code: &[u8]) -> Vec<Instruction> {
        EvmDisassembler.disassemble(code)
    }

    #[test]
    fn test_strip_marker_pair() {
        // PUSH1 1; STOP; LOG1; PUSH6 ...
        let instructions = decode(&[0x60, 0x01, 0x00, 0xa1, 0x65, 1, 2, 3, 4, 5, 6]);
        let stripped = strip_trailing_metadata(&instructions);
        assert_eq!(stripped, instructions[..2].to_vec());
    }

    #[test]
    fn test_strip_v2_marker() {
        let instructions = decode(&[0x00, 0xa2, 0x65, 0, 0, 0, 0, 0, 0, 0x00]);
        assert_eq!(strip_trailing_metadata(&instructions), instructions[..1].to_vec());
    }

    #[test]
    fn test_operand_embedding_marker_is_kept() {
        // PUSH3 0xa26500 embeds the marker word; the trailing STOP is dropped.
        let instructions = decode(&[0x5b, 0x62, 0xa2, 0x65, 0x00, 0x00, 0x00]);
        let stripped = strip_trailing_metadata(&instructions);
        assert_eq!(stripped, instructions[..2].to_vec());
    }

    #[test]
    fn test_no_marker_is_unchanged() {
        let instructions = decode(&[0x60, 0x05, 0x60, 0x03, 0x01, 0x00]);
        assert_eq!(strip_trailing_metadata(&instructions), instructions);
    }

    #[test]
    fn test_contains_end_marker() {
        assert!(contains_end_marker(U256::from(0xa265)));
        assert!(contains_end_marker(U256::from(0x01_a165)));
        assert!(contains_end_marker(U256::from(0x12_a265_34)));
        assert!(!contains_end_marker(U256::from(0xa165)));
        assert!(!contains_end_marker(U256::from(0xa1_6500)));
        assert!(!contains_end_marker(U256::from(0xa2_64ff)));
        assert!(!contains_end_marker(U256::ZERO));
    }

    #[test]
    fn test_rewrite_self_balance() {
        let mut code = vec![0x5b, 0x30, 0x73];
        code.extend([0xff; 20]);
        code.extend([0x16, 0x31, 0x00]);
        let rewritten = rewrite_self_balance(&decode(&code));
        assert_eq!(
            rewritten,
            vec![
                Instruction::new(Opcode::JumpDest, None, 0),
                Instruction::new(Opcode::SelfBalance, None, 1),
                Instruction::new(Opcode::Stop, None, 25),
            ]
        );
    }

    #[test]
    fn test_rewrite_needs_exact_mask() {
        let mut code = vec![0x30, 0x73];
        code.extend([0xff; 19]);
        code.extend([0xfe, 0x16, 0x31]);
        let instructions = decode(&code);
        assert_eq!(rewrite_self_balance(&instructions), instructions);
    }

    #[test]
    fn test_rewrite_partial_idiom_at_end() {
        let instructions = decode(&[0x30, 0x16]);
        assert_eq!(rewrite_self_balance(&instructions), instructions);
    }
}
