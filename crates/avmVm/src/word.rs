//! 256-bit two's-complement word semantics.
//!
//! Division and modulo by zero yield zero, matching the source machine.

use alloy_primitives::{I256, U256};
use avm_isa::AvmOp;

fn bool_word(value: bool) -> U256 {
    U256::from(u8::from(value))
}

const fn signed(value: U256) -> I256 {
    I256::from_raw(value)
}

/// Applies a two-operand word operation. `a` is the top of the stack.
#[must_use]
pub fn binary(op: &AvmOp, a: U256, b: U256) -> Option<U256> {
    let result = match op {
        AvmOp::Add => a.wrapping_add(b),
        AvmOp::Mul => a.wrapping_mul(b),
        AvmOp::Sub => a.wrapping_sub(b),
        AvmOp::Div => {
            if b.is_zero() {
                U256::ZERO
            } else {
                a / b
            }
        }
        AvmOp::Sdiv => {
            if b.is_zero() {
                U256::ZERO
            } else {
                signed(a).wrapping_div(signed(b)).into_raw()
            }
        }
        AvmOp::Mod => {
            if b.is_zero() {
                U256::ZERO
            } else {
                a % b
            }
        }
        AvmOp::Smod => {
            if b.is_zero() {
                U256::ZERO
            } else {
                signed(a).wrapping_rem(signed(b)).into_raw()
            }
        }
        AvmOp::Exp => a.wrapping_pow(b),
        AvmOp::SignExtend => sign_extend(a, b),
        AvmOp::Lt => bool_word(a < b),
        AvmOp::Gt => bool_word(a > b),
        AvmOp::Slt => bool_word(signed(a) < signed(b)),
        AvmOp::Sgt => bool_word(signed(a) > signed(b)),
        AvmOp::And => a & b,
        AvmOp::Or => a | b,
        AvmOp::Xor => a ^ b,
        AvmOp::Byte => byte(a, b),
        _ => return None,
    };
    Some(result)
}

/// Applies a three-operand modular operation. `a` is the top of the stack.
#[must_use]
pub fn ternary(op: &AvmOp, a: U256, b: U256, n: U256) -> Option<U256> {
    if !matches!(op, AvmOp::AddMod | AvmOp::MulMod) {
        return None;
    }
    if n.is_zero() {
        return Some(U256::ZERO);
    }
    Some(match op {
        AvmOp::AddMod => a.add_mod(b, n),
        _ => a.mul_mod(b, n),
    })
}

#[must_use]
pub fn unary(op: &AvmOp, a: U256) -> Option<U256> {
    match op {
        AvmOp::IsZero => Some(bool_word(a.is_zero())),
        AvmOp::Not => Some(!a),
        _ => None,
    }
}

/// Extends the sign of the `k`-th byte (counted from the least significant) of `value`.
#[must_use]
pub fn sign_extend(k: U256, value: U256) -> U256 {
    if k >= U256::from(31) {
        return value;
    }
    let bit = k.to::<usize>() * 8 + 7;
    let mask = (U256::from(1) << (bit + 1)) - U256::from(1);
    if value.bit(bit) { value | !mask } else { value & mask }
}

/// The `i`-th byte of `value`, counted from the most significant.
#[must_use]
pub fn byte(i: U256, value: U256) -> U256 {
    if i >= U256::from(32) {
        return U256::ZERO;
    }
    let shift = 8 * (31 - i.to::<usize>());
    (value >> shift) & U256::from(0xff)
}
