//! Shifts synthesised from `exp`, `mul` and `div`.
//!
//! Each routine expects `value` on top of `shift`, the reverse of the source order, so the
//! caller emits `swap1` first.

use alloy_primitives::U256;
use avm_isa::{AvmOp, Block};

const MAX_SHIFT: u64 = 255;

/// `value << shift`, zero once `shift` exceeds 255.
#[must_use]
pub fn shift_left() -> Block {
    let mut scaled = Block::new();
    scaled.swap(1).push(2u64).op(AvmOp::Exp).op(AvmOp::Mul);
    overflow_guard(scaled)
}

/// Logical `value >> shift`, zero once `shift` exceeds 255.
#[must_use]
pub fn shift_right() -> Block {
    let mut scaled = Block::new();
    scaled
        .swap(1)
        .push(2u64)
        .op(AvmOp::Exp)
        .swap(1)
        .op(AvmOp::Div);
    overflow_guard(scaled)
}

/// Arithmetic `value >> shift`: negative values are complemented around a logical shift.
#[must_use]
pub fn arithmetic_shift_right() -> Block {
    let mut negative = Block::new();
    negative.op(AvmOp::Not).extend(shift_right()).op(AvmOp::Not);
    let mut block = Block::new();
    block
        .push(U256::ZERO)
        .dup(1)
        .op(AvmOp::Slt)
        .if_else(negative, shift_right());
    block
}

fn overflow_guard(in_range: Block) -> Block {
    let mut overflow = Block::new();
    overflow.pop().pop().push(U256::ZERO);
    let mut block = Block::new();
    block
        .push(MAX_SHIFT)
        .dup(2)
        .op(AvmOp::Gt)
        .if_else(overflow, in_range);
    block
}
