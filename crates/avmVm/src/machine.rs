use alloy_primitives::U256;
use avm_isa::{AvmOp, HostOp, Label, Value};
use tracing::trace;

use crate::{CodeAddress, LinearCode, LinearOp, VmError, VmResult, word};

pub const DEFAULT_STEP_LIMIT: usize = 1 << 20;

/// The evaluation stack. The last element is the top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack(Vec<Value>);

impl Stack {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    pub fn pop(&mut self) -> VmResult<Value> {
        self.0.pop().ok_or(VmError::StackUnderflow)
    }

    pub fn pop_int(&mut self) -> VmResult<U256> {
        match self.pop()? {
            Value::Int(value) => Ok(value),
            other => Err(VmError::TypeMismatch {
                expected: "integer",
                found: other.to_string(),
            }),
        }
    }

    pub fn pop_label(&mut self) -> VmResult<Label> {
        match self.pop()? {
            Value::Label(label) => Ok(label),
            other => Err(VmError::TypeMismatch {
                expected: "label",
                found: other.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn top(&self) -> Option<&Value> {
        self.0.last()
    }

    /// The `n`-th item from the top (`0` is the top).
    pub fn peek(&self, n: usize) -> VmResult<&Value> {
        self.0
            .len()
            .checked_sub(n + 1)
            .map(|index| &self.0[index])
            .ok_or(VmError::StackUnderflow)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Items from bottom to top.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    fn dup(&mut self, n: usize) -> VmResult<()> {
        let value = self.peek(n)?.clone();
        self.0.push(value);
        Ok(())
    }

    fn swap(&mut self, n: usize) -> VmResult<()> {
        let top = self.0.len().checked_sub(1).ok_or(VmError::StackUnderflow)?;
        let other = top.checked_sub(n).ok_or(VmError::StackUnderflow)?;
        self.0.swap(top, other);
        Ok(())
    }
}

impl<V: Into<Value>> FromIterator<V> for Stack {
    /// Builds a stack from items listed bottom to top.
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// What the machine should do after a host operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// The host runtime, as seen from the machine.
pub trait Host {
    fn execute(&mut self, op: &HostOp, stack: &mut Stack) -> VmResult<Flow>;
}

/// A host without capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHost;

impl Host for NoHost {
    fn execute(&mut self, op: &HostOp, _stack: &mut Stack) -> VmResult<Flow> {
        Err(VmError::UnsupportedHostOp(op.clone()))
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Execution ran past the last instruction.
    Finished,
    /// The host asked the machine to stop.
    Halted,
    /// An `error` operation was executed.
    Fault,
}

/// Reference interpreter for lowered target code.
#[derive(Debug)]
pub struct Machine<'a> {
    code: &'a LinearCode,
    pub stack: Stack,
    pc: CodeAddress,
    steps: usize,
    step_limit: usize,
}

impl<'a> Machine<'a> {
    #[must_use]
    pub const fn new(code: &'a LinearCode) -> Self {
        Self {
            code,
            stack: Stack::new(),
            pc: 0,
            steps: 0,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: Stack) -> Self {
        self.stack = stack;
        self
    }

    #[must_use]
    pub const fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    pub fn start_at(&mut self, label: &Label) -> VmResult<()> {
        self.pc = self.code.address_of(label)?;
        Ok(())
    }

    #[must_use]
    pub const fn pc(&self) -> CodeAddress {
        self.pc
    }

    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    pub fn run(&mut self, host: &mut impl Host) -> VmResult<Outcome> {
        let code = self.code;
        while let Some(op) = code.ops.get(self.pc) {
            if self.steps >= self.step_limit {
                return Err(VmError::StepLimitExceeded(self.step_limit));
            }
            self.steps += 1;
            self.pc += 1;
            match op {
                LinearOp::Goto(target) => self.pc = *target,
                LinearOp::BranchIfZero(target) => {
                    if self.stack.pop_int()?.is_zero() {
                        self.pc = *target;
                    }
                }
                LinearOp::Op(op) => {
                    if let Some(outcome) = self.step(op, host)? {
                        return Ok(outcome);
                    }
                }
            }
        }
        Ok(Outcome::Finished)
    }

    fn step(&mut self, op: &AvmOp, host: &mut impl Host) -> VmResult<Option<Outcome>> {
        trace!(pc = self.pc - 1, %op, depth = self.stack.len());
        match op {
            AvmOp::Push(value) => self.stack.push(value.clone()),
            AvmOp::Pop => {
                self.stack.pop()?;
            }
            AvmOp::Dup(n) => self.stack.dup(usize::from(*n))?,
            AvmOp::Swap(n) => self.stack.swap(usize::from(*n))?,
            AvmOp::Eq => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                self.stack.push(U256::from(u8::from(a == b)));
            }
            AvmOp::IsZero | AvmOp::Not => {
                let a = self.stack.pop_int()?;
                self.stack.push(word::unary(op, a).unwrap_or_default());
            }
            AvmOp::AddMod | AvmOp::MulMod => {
                let a = self.stack.pop_int()?;
                let b = self.stack.pop_int()?;
                let n = self.stack.pop_int()?;
                self.stack.push(word::ternary(op, a, b, n).unwrap_or_default());
            }
            AvmOp::Jump => {
                let label = self.stack.pop_label()?;
                self.pc = self.code.address_of(&label)?;
            }
            AvmOp::CJump => {
                let label = self.stack.pop_label()?;
                if !self.stack.pop_int()?.is_zero() {
                    self.pc = self.code.address_of(&label)?;
                }
            }
            AvmOp::Error => return Ok(Some(Outcome::Fault)),
            AvmOp::Host(host_op) => {
                if host.execute(host_op, &mut self.stack)? == Flow::Halt {
                    return Ok(Some(Outcome::Halted));
                }
            }
            _ => {
                let a = self.stack.pop_int()?;
                let b = self.stack.pop_int()?;
                self.stack.push(word::binary(op, a, b).unwrap_or_default());
            }
        }
        Ok(None)
    }
}
