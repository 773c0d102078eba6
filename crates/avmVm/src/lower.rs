use std::{collections::BTreeMap, fmt};

use avm_isa::{AvmOp, Block, Label, Statement};

use crate::{VmError, VmResult};

/// Position in linear code.
pub type CodeAddress = usize;

/// A flat instruction produced by lowering structured blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinearOp {
    Op(AvmOp),
    /// Pops a condition and jumps if it is zero.
    BranchIfZero(CodeAddress),
    Goto(CodeAddress),
}

/// Linear code with every label resolved to an address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearCode {
    pub ops: Vec<LinearOp>,
    pub labels: BTreeMap<Label, CodeAddress>,
}

impl LinearCode {
    pub fn address_of(&self, label: &Label) -> VmResult<CodeAddress> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| VmError::UnknownLabel(label.clone()))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Flattens a structured block, resolving labels and structured branches.
pub fn lower(block: &Block) -> VmResult<LinearCode> {
    let mut code = LinearCode::default();
    lower_into(block, &mut code)?;
    Ok(code)
}

fn lower_into(block: &Block, code: &mut LinearCode) -> VmResult<()> {
    for statement in &block.statements {
        match statement {
            Statement::Op(op) => code.ops.push(LinearOp::Op(op.clone())),
            Statement::SetLabel(label) => {
                if code.labels.insert(label.clone(), code.ops.len()).is_some() {
                    return Err(VmError::DuplicateLabel(label.clone()));
                }
            }
            Statement::IfElse { then, otherwise } => {
                let branch = code.ops.len();
                code.ops.push(LinearOp::BranchIfZero(0));
                lower_into(then, code)?;
                let skip_else = code.ops.len();
                code.ops.push(LinearOp::Goto(0));
                let else_start = code.ops.len();
                lower_into(otherwise, code)?;
                let end = code.ops.len();
                code.ops[branch] = LinearOp::BranchIfZero(else_start);
                code.ops[skip_else] = LinearOp::Goto(end);
            }
            Statement::Loop(body) => {
                let start = code.ops.len();
                lower_into(body, code)?;
                code.ops.push(LinearOp::Goto(start));
            }
            Statement::Block(inner) => lower_into(inner, code)?,
        }
    }
    Ok(())
}

impl fmt::Display for LinearCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels_at: BTreeMap<CodeAddress, Vec<&Label>> = BTreeMap::new();
        for (label, address) in &self.labels {
            labels_at.entry(*address).or_default().push(label);
        }
        for (address, op) in self.ops.iter().enumerate() {
            for label in labels_at.get(&address).into_iter().flatten() {
                writeln!(f, "{label}:")?;
            }
            match op {
                LinearOp::Op(op) => writeln!(f, "{address:>6}: {op}")?,
                LinearOp::BranchIfZero(target) => writeln!(f, "{address:>6}: brz {target}")?,
                LinearOp::Goto(target) => writeln!(f, "{address:>6}: goto {target}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_if_else() {
        let mut then = Block::new();
        then.push(1u64);
        let mut otherwise = Block::new();
        otherwise.push(2u64);
        let mut block = Block::new();
        block.if_else(then, otherwise);

        let code = lower(&block).unwrap();
        assert_eq!(
            code.ops,
            vec![
                LinearOp::BranchIfZero(3),
                LinearOp::Op(AvmOp::push(1u64)),
                LinearOp::Goto(4),
                LinearOp::Op(AvmOp::push(2u64)),
            ]
        );
    }

    #[test]
    fn test_lower_loop_jumps_back() {
        let mut body = Block::new();
        body.host(avm_isa::HostOp::GetNextMessage);
        let mut block = Block::new();
        block.push(0u64).loop_forever(body);

        let code = lower(&block).unwrap();
        assert_eq!(code.ops.last(), Some(&LinearOp::Goto(1)));
    }

    #[test]
    fn test_labels_resolve_to_next_op() {
        let mut block = Block::new();
        block.pop().set_label(Label::jump_dest(1, 2)).pop();
        let code = lower(&block).unwrap();
        assert_eq!(code.address_of(&Label::jump_dest(1, 2)), Ok(1));
        assert_eq!(
            code.address_of(&Label::jump_dest(1, 3)),
            Err(VmError::UnknownLabel(Label::jump_dest(1, 3)))
        );
    }

    #[test]
    fn test_duplicate_label_is_rejected() {
        let mut block = Block::new();
        block
            .set_label(Label::RunLoopStart)
            .set_label(Label::RunLoopStart);
        assert_eq!(
            lower(&block),
            Err(VmError::DuplicateLabel(Label::RunLoopStart))
        );
    }
}
