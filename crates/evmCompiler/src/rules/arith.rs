use avm_isa::{AvmOp, Block};

/// Wraps a two-operand division-like `op` so a zero divisor yields zero.
///
/// The divisor is the second operand. When it is zero the first operand is dropped and the
/// zero divisor itself is left as the result, so both arms end one item deep.
#[must_use]
pub fn zero_guarded(op: AvmOp) -> Block {
    let mut zero = Block::new();
    zero.pop();
    let mut nonzero = Block::new();
    nonzero.op(op);

    let mut block = Block::new();
    block.dup(1).op(AvmOp::IsZero).if_else(zero, nonzero);
    block
}

/// Same guard for `addmod`/`mulmod`, whose modulus is the third operand.
#[must_use]
pub fn zero_guarded_modular(op: AvmOp) -> Block {
    let mut zero = Block::new();
    zero.pop().pop();
    let mut nonzero = Block::new();
    nonzero.op(op);

    let mut block = Block::new();
    block.dup(2).op(AvmOp::IsZero).if_else(zero, nonzero);
    block
}

#[cfg(test)]
mod tests {
    use avm_isa::Statement;

    use super::*;

    fn net_effect(block: &Block) -> isize {
        block
            .ops()
            .iter()
            .map(|op| {
                let (pops, pushes) = op.stack_effect().unwrap();
                pushes as isize - pops as isize
            })
            .sum()
    }

    fn arms(block: &Block) -> (&Block, &Block) {
        match block.statements.last() {
            Some(Statement::IfElse { then, otherwise }) => (then, otherwise),
            _ => panic!("guard must end with a conditional"),
        }
    }

    #[test]
    fn test_arms_have_equal_stack_effect() {
        for op in [AvmOp::Div, AvmOp::Sdiv, AvmOp::Mod, AvmOp::Smod] {
            let guarded = zero_guarded(op);
            let (zero, nonzero) = arms(&guarded);
            assert_eq!(net_effect(zero), net_effect(nonzero));
            assert_eq!(net_effect(zero), -1);
        }
        for op in [AvmOp::AddMod, AvmOp::MulMod] {
            let guarded = zero_guarded_modular(op);
            let (zero, nonzero) = arms(&guarded);
            assert_eq!(net_effect(zero), net_effect(nonzero));
            assert_eq!(net_effect(zero), -2);
        }
    }
}
