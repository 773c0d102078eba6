mod common;

use alloy_primitives::{I256, U256};
use avm_isa::Value;
use avm_vm::Outcome;
use common::{run_block, rule_for, stack_of, word};
use evm_compiler::Opcode;
use proptest::prelude::*;

fn operand() -> impl Strategy<Value = U256> {
    prop_oneof![
        1 => Just(U256::ZERO),
        1 => (0u64..16).prop_map(U256::from),
        1 => (0u64..16).prop_map(|v| U256::ZERO.wrapping_sub(U256::from(v))),
        3 => any::<[u8; 32]>().prop_map(word),
    ]
}

fn reference(opcode: Opcode, a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::ZERO;
    }
    match opcode {
        Opcode::Div => a / b,
        Opcode::Mod => a % b,
        Opcode::Sdiv => I256::from_raw(a).wrapping_div(I256::from_raw(b)).into_raw(),
        Opcode::Smod => I256::from_raw(a).wrapping_rem(I256::from_raw(b)).into_raw(),
        _ => unreachable!(),
    }
}

/// Runs `opcode`'s rule with `operands` listed top first.
fn evaluate(opcode: Opcode, operands: &[U256]) -> Vec<Value> {
    let mut bottom_first = operands.to_vec();
    bottom_first.reverse();
    let (outcome, stack) = run_block(&rule_for(opcode), stack_of(&bottom_first));
    assert_eq!(outcome, Ok(Outcome::Finished));
    stack.as_slice().to_vec()
}

proptest! {
    #[test]
    fn test_guarded_division_matches_reference(a in operand(), b in operand()) {
        for opcode in [Opcode::Div, Opcode::Sdiv, Opcode::Mod, Opcode::Smod] {
            prop_assert_eq!(
                evaluate(opcode, &[a, b]),
                vec![Value::Int(reference(opcode, a, b))]
            );
        }
    }

    #[test]
    fn test_guarded_modular_matches_reference(a in operand(), b in operand(), n in operand()) {
        let expected_add = if n.is_zero() { U256::ZERO } else { a.add_mod(b, n) };
        let expected_mul = if n.is_zero() { U256::ZERO } else { a.mul_mod(b, n) };
        prop_assert_eq!(evaluate(Opcode::AddMod, &[a, b, n]), vec![Value::Int(expected_add)]);
        prop_assert_eq!(evaluate(Opcode::MulMod, &[a, b, n]), vec![Value::Int(expected_mul)]);
    }
}

#[test]
fn test_zero_divisor_keeps_stack_depth() {
    let below = U256::from(99);
    for opcode in [Opcode::Div, Opcode::Sdiv, Opcode::Mod, Opcode::Smod] {
        for divisor in [U256::ZERO, U256::from(3)] {
            let (_, stack) = run_block(
                &rule_for(opcode),
                stack_of(&[below, divisor, U256::from(12)]),
            );
            assert_eq!(stack.len(), 2, "{opcode} with divisor {divisor}");
            assert_eq!(stack.as_slice()[0], Value::Int(below));
        }
    }
}

#[test]
fn test_signed_division_examples() {
    let minus = |v: u64| U256::ZERO.wrapping_sub(U256::from(v));
    assert_eq!(
        evaluate(Opcode::Sdiv, &[minus(7), U256::from(2)]),
        vec![Value::Int(minus(3))]
    );
    assert_eq!(
        evaluate(Opcode::Smod, &[minus(7), U256::from(2)]),
        vec![Value::Int(minus(1))]
    );
    // MIN / -1 overflows back to MIN.
    let min = I256::MIN.into_raw();
    assert_eq!(evaluate(Opcode::Sdiv, &[min, minus(1)]), vec![Value::Int(min)]);
}

#[test]
fn test_direct_mappings_follow_operand_order() {
    assert_eq!(
        evaluate(Opcode::Sub, &[U256::from(10), U256::from(3)]),
        vec![Value::Int(U256::from(7))]
    );
    assert_eq!(
        evaluate(Opcode::Lt, &[U256::from(1), U256::from(2)]),
        vec![Value::Int(U256::from(1))]
    );
    assert_eq!(
        evaluate(Opcode::Exp, &[U256::from(2), U256::from(10)]),
        vec![Value::Int(U256::from(1024))]
    );
    assert_eq!(
        evaluate(Opcode::SignExtend, &[U256::ZERO, U256::from(0x80)]),
        vec![Value::Int(U256::MAX - U256::from(0x7f))]
    );
    assert_eq!(
        evaluate(Opcode::Byte, &[U256::from(31), U256::from(0x1234)]),
        vec![Value::Int(U256::from(0x34))]
    );
}
