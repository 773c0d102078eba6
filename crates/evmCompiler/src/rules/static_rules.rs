use avm_isa::{AvmOp, Block, CallFrameField, HostOp};

use super::{arith, bitwise};
use crate::{
    DiagnosticKind, Diagnostics, GasStandIns, Instruction, Opcode, constants::NATIVE_TOKEN_TYPE,
};

/// Rules that depend on nothing but the opcode.
pub(super) fn translate(
    instruction: &Instruction,
    gas: &GasStandIns,
    diagnostics: &mut Diagnostics,
) -> Option<Block> {
    if let Some(op) = primitive(instruction.opcode) {
        return Some(Block::from(vec![op]));
    }
    let mut block = Block::new();
    match instruction.opcode {
        Opcode::Div => return Some(arith::zero_guarded(AvmOp::Div)),
        Opcode::Sdiv => return Some(arith::zero_guarded(AvmOp::Sdiv)),
        Opcode::Mod => return Some(arith::zero_guarded(AvmOp::Mod)),
        Opcode::Smod => return Some(arith::zero_guarded(AvmOp::Smod)),
        Opcode::AddMod => return Some(arith::zero_guarded_modular(AvmOp::AddMod)),
        Opcode::MulMod => return Some(arith::zero_guarded_modular(AvmOp::MulMod)),
        Opcode::Shl => {
            block.swap(1).extend(bitwise::shift_left());
        }
        Opcode::Shr => {
            block.swap(1).extend(bitwise::shift_right());
        }
        Opcode::Sar => {
            block.swap(1).extend(bitwise::arithmetic_shift_right());
        }
        Opcode::Dup(n) => {
            block.dup(n - 1);
        }
        Opcode::Swap(n) => {
            block.swap(n);
        }
        Opcode::GasPrice => {
            block.push(gas.price);
        }
        Opcode::GasLimit => {
            block.push(gas.limit);
        }
        Opcode::Gas => {
            block.push(gas.remaining);
        }
        Opcode::Address => {
            block
                .host(HostOp::GetCallFrame)
                .host(HostOp::CallFrame(CallFrameField::ContractId));
        }
        Opcode::Balance => {
            diagnostics.report(
                instruction.pc,
                DiagnosticKind::ApproximateOpcode(instruction.opcode),
            );
            block
                .push(NATIVE_TOKEN_TYPE)
                .swap(1)
                .host(HostOp::ExtBalance);
        }
        Opcode::SelfBalance => {
            block.push(NATIVE_TOKEN_TYPE).host(HostOp::BalanceGet);
        }
        Opcode::Log(topics @ 1..=4) => {
            block.host(HostOp::Log { topics });
        }
        opcode => {
            block.host(host_accessor(opcode)?);
        }
    }
    Some(block)
}

/// Opcodes with a one-to-one target primitive.
const fn primitive(opcode: Opcode) -> Option<AvmOp> {
    let op = match opcode {
        Opcode::Add => AvmOp::Add,
        Opcode::Mul => AvmOp::Mul,
        Opcode::Sub => AvmOp::Sub,
        Opcode::Exp => AvmOp::Exp,
        Opcode::SignExtend => AvmOp::SignExtend,
        Opcode::Lt => AvmOp::Lt,
        Opcode::Gt => AvmOp::Gt,
        Opcode::Slt => AvmOp::Slt,
        Opcode::Sgt => AvmOp::Sgt,
        Opcode::Eq => AvmOp::Eq,
        Opcode::IsZero => AvmOp::IsZero,
        Opcode::And => AvmOp::And,
        Opcode::Or => AvmOp::Or,
        Opcode::Xor => AvmOp::Xor,
        Opcode::Not => AvmOp::Not,
        Opcode::Byte => AvmOp::Byte,
        Opcode::Pop => AvmOp::Pop,
        _ => return None,
    };
    Some(op)
}

/// Opcodes answered by a single host capability.
const fn host_accessor(opcode: Opcode) -> Option<HostOp> {
    let op = match opcode {
        Opcode::Stop => HostOp::Stop,
        Opcode::Return => HostOp::Return,
        Opcode::Revert => HostOp::Revert,
        Opcode::SelfDestruct => HostOp::SelfDestruct,
        Opcode::Sha3 => HostOp::Sha3,
        Opcode::Origin => HostOp::MessageOrigin,
        Opcode::Caller => HostOp::MessageCaller,
        Opcode::CallValue => HostOp::MessageValue,
        Opcode::CallDataLoad => HostOp::MessageDataLoad,
        Opcode::CallDataSize => HostOp::MessageDataSize,
        Opcode::CallDataCopy => HostOp::MessageDataCopy,
        Opcode::ReturnDataSize => HostOp::ReturnDataSize,
        Opcode::ReturnDataCopy => HostOp::ReturnDataCopy,
        Opcode::Timestamp => HostOp::Timestamp,
        Opcode::Number => HostOp::BlockNumber,
        Opcode::MLoad => HostOp::MemoryLoad,
        Opcode::MStore => HostOp::MemoryStore,
        Opcode::MStore8 => HostOp::MemoryStore8,
        Opcode::MSize => HostOp::MemorySize,
        Opcode::SLoad => HostOp::StorageLoad,
        Opcode::SStore => HostOp::StorageStore,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;

    fn rule(opcode: Opcode) -> Option<Block> {
        let mut diagnostics = Diagnostics::new(2);
        translate(
            &Instruction::new(opcode, None, 0),
            &GasStandIns::default(),
            &mut diagnostics,
        )
    }

    #[test]
    fn test_every_static_opcode_has_a_rule() {
        for byte in 0..=u8::MAX {
            let opcode = Opcode::from_byte(byte);
            if opcode.rule_kind() == crate::RuleKind::Static {
                assert!(rule(opcode).is_some(), "{opcode}");
            }
        }
    }

    #[test]
    fn test_dup_is_zero_based() {
        assert_eq!(rule(Opcode::Dup(1)).unwrap().ops(), vec![&AvmOp::Dup(0)]);
        assert_eq!(rule(Opcode::Swap(3)).unwrap().ops(), vec![&AvmOp::Swap(3)]);
    }

    #[test]
    fn test_gas_stand_ins() {
        assert_eq!(
            rule(Opcode::GasLimit).unwrap().ops(),
            vec![&AvmOp::push(U256::from(10_000_000_000u64))]
        );
        assert_eq!(
            rule(Opcode::Gas).unwrap().ops(),
            vec![&AvmOp::push(U256::from(9_999_999_999u64))]
        );
    }

    #[test]
    fn test_balance_warns_but_self_balance_does_not() {
        let mut diagnostics = Diagnostics::new(2);
        let gas = GasStandIns::default();
        translate(&Instruction::new(Opcode::SelfBalance, None, 1), &gas, &mut diagnostics);
        translate(&Instruction::new(Opcode::Balance, None, 4), &gas, &mut diagnostics);
        let entries = diagnostics.into_vec();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pc, 4);
        assert_eq!(entries[0].kind, DiagnosticKind::ApproximateOpcode(Opcode::Balance));
    }

    #[test]
    fn test_log0_has_no_rule() {
        assert_eq!(rule(Opcode::Log(0)), None);
        assert_eq!(rule(Opcode::ChainId), None);
    }
}
