use std::fmt;

use crate::{AvmOp, HostOp, Label, Value};

/// One element of a structured code block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    Op(AvmOp),
    /// Marks the current position with a label.
    SetLabel(Label),
    /// Pops a condition; runs `then` if it is non-zero, `otherwise` if it is zero.
    IfElse { then: Block, otherwise: Block },
    /// Runs `body` forever. Only the host can stop it, by never delivering another message.
    Loop(Block),
    Block(Block),
}

/// A sequence of statements, optionally annotated with a diagnostic comment.
///
/// This is the unit handed to the external assembler. Labels are symbolic and resolved there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Block {
    pub annotation: Option<String>,
    pub statements: Vec<Statement>,
}

impl Block {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            annotation: None,
            statements: Vec::new(),
        }
    }

    pub fn annotated(annotation: impl Into<String>) -> Self {
        Self {
            annotation: Some(annotation.into()),
            statements: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn op(&mut self, op: AvmOp) -> &mut Self {
        self.statements.push(Statement::Op(op));
        self
    }

    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.op(AvmOp::Push(value.into()))
    }

    pub fn pop(&mut self) -> &mut Self {
        self.op(AvmOp::Pop)
    }

    pub fn dup(&mut self, n: u8) -> &mut Self {
        self.op(AvmOp::Dup(n))
    }

    pub fn swap(&mut self, n: u8) -> &mut Self {
        self.op(AvmOp::Swap(n))
    }

    pub fn host(&mut self, op: HostOp) -> &mut Self {
        self.op(AvmOp::Host(op))
    }

    pub fn jump(&mut self) -> &mut Self {
        self.op(AvmOp::Jump)
    }

    pub fn cjump(&mut self) -> &mut Self {
        self.op(AvmOp::CJump)
    }

    pub fn error(&mut self) -> &mut Self {
        self.op(AvmOp::Error)
    }

    pub fn set_label(&mut self, label: Label) -> &mut Self {
        self.statements.push(Statement::SetLabel(label));
        self
    }

    pub fn if_else(&mut self, then: Self, otherwise: Self) -> &mut Self {
        self.statements.push(Statement::IfElse { then, otherwise });
        self
    }

    /// Conditional with an empty else arm.
    pub fn if_then(&mut self, then: Self) -> &mut Self {
        self.if_else(then, Self::new())
    }

    pub fn loop_forever(&mut self, body: Self) -> &mut Self {
        self.statements.push(Statement::Loop(body));
        self
    }

    /// Appends `block` as a nested block, keeping its annotation.
    pub fn nest(&mut self, block: Self) -> &mut Self {
        self.statements.push(Statement::Block(block));
        self
    }

    /// Appends the statements of `block` inline, dropping its annotation.
    pub fn extend(&mut self, block: Self) -> &mut Self {
        self.statements.extend(block.statements);
        self
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.statements.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Every label set anywhere in this block, in emission order.
    #[must_use]
    pub fn labels(&self) -> Vec<&Label> {
        let mut labels = Vec::new();
        self.visit(&mut |statement| {
            if let Statement::SetLabel(label) = statement {
                labels.push(label);
            }
        });
        labels
    }

    /// Every primitive operation anywhere in this block, in emission order.
    #[must_use]
    pub fn ops(&self) -> Vec<&AvmOp> {
        let mut ops = Vec::new();
        self.visit(&mut |statement| {
            if let Statement::Op(op) = statement {
                ops.push(op);
            }
        });
        ops
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Statement)) {
        for statement in &self.statements {
            f(statement);
            match statement {
                Statement::IfElse { then, otherwise } => {
                    then.visit(f);
                    otherwise.visit(f);
                }
                Statement::Loop(body) | Statement::Block(body) => body.visit(f),
                Statement::Op(_) | Statement::SetLabel(_) => {}
            }
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        if let Some(annotation) = &self.annotation {
            writeln!(f, "{pad}// {annotation}")?;
        }
        for statement in &self.statements {
            match statement {
                Statement::Op(op) => writeln!(f, "{pad}{op}")?,
                Statement::SetLabel(label) => writeln!(f, "{label}:")?,
                Statement::IfElse { then, otherwise } => {
                    writeln!(f, "{pad}if {{")?;
                    then.write_indented(f, indent + 1)?;
                    if !otherwise.is_empty() {
                        writeln!(f, "{pad}}} else {{")?;
                        otherwise.write_indented(f, indent + 1)?;
                    }
                    writeln!(f, "{pad}}}")?;
                }
                Statement::Loop(body) => {
                    writeln!(f, "{pad}loop {{")?;
                    body.write_indented(f, indent + 1)?;
                    writeln!(f, "{pad}}}")?;
                }
                Statement::Block(block) => block.write_indented(f, indent)?,
            }
        }
        Ok(())
    }
}

impl From<Vec<AvmOp>> for Block {
    fn from(ops: Vec<AvmOp>) -> Self {
        Self {
            annotation: None,
            statements: ops.into_iter().map(Statement::Op).collect(),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
