#![allow(dead_code, unreachable_pub)]

use alloy_primitives::U256;
use avm_isa::{Block, ContractDescriptor, HostOp, Value};
use avm_vm::{Flow, Host, Machine, Outcome, Stack, VmError, VmResult, lower};
use evm_compiler::{
    CompileOptions, Contract, Diagnostics, GasStandIns, Instruction, Opcode, Program,
    RuleContext, compile_program, translate_instruction,
};

/// Records what the generated code asks of the host.
#[derive(Debug, Default)]
pub struct TestHost {
    /// Messages still to deliver before the dispatch loop is halted.
    pub messages_left: usize,
    pub registered: Vec<ContractDescriptor>,
    pub initial_calls: usize,
    pub stopped: bool,
    pub reverted: bool,
    pub copied: Vec<Value>,
}

impl TestHost {
    pub fn with_messages(messages_left: usize) -> Self {
        Self {
            messages_left,
            ..Self::default()
        }
    }
}

impl Host for TestHost {
    fn execute(&mut self, op: &HostOp, stack: &mut Stack) -> VmResult<Flow> {
        match op {
            HostOp::Initialize(descriptors) => self.registered.clone_from(descriptors),
            HostOp::GetNextMessage => {
                if self.messages_left == 0 {
                    return Ok(Flow::Halt);
                }
                self.messages_left -= 1;
            }
            HostOp::SetupInitialCall => self.initial_calls += 1,
            HostOp::Stop => {
                self.stopped = true;
                return Ok(Flow::Halt);
            }
            HostOp::Revert => {
                stack.pop_int()?;
                stack.pop_int()?;
                self.reverted = true;
                return Ok(Flow::Halt);
            }
            HostOp::CopyToMemory => {
                let source = stack.pop()?;
                for _ in 0..3 {
                    stack.pop_int()?;
                }
                self.copied.push(source);
            }
            other => return Err(VmError::UnsupportedHostOp(other.clone())),
        }
        Ok(Flow::Continue)
    }
}

/// Words listed bottom to top.
pub fn stack_of(words: &[U256]) -> Stack {
    words.iter().copied().collect()
}

/// Runs a self-contained block from its first statement.
pub fn run_block(block: &Block, stack: Stack) -> (VmResult<Outcome>, Stack) {
    let code = lower(block).unwrap();
    let mut machine = Machine::new(&code).with_stack(stack);
    let outcome = machine.run(&mut TestHost::default());
    (outcome, machine.stack)
}

/// Runs the whole program from the entry label of contract `id`.
pub fn run_contract(
    program: &Program,
    id: u64,
    stack: Stack,
    host: &mut TestHost,
    step_limit: usize,
) -> (VmResult<Outcome>, Stack) {
    let code = lower(&program.to_block()).unwrap();
    let mut machine = Machine::new(&code)
        .with_stack(stack)
        .with_step_limit(step_limit);
    machine.start_at(&program.routine(id).unwrap().entry).unwrap();
    let outcome = machine.run(host);
    (outcome, machine.stack)
}

/// The value a lookup routine leaves for `key`.
pub fn query(routine: &Block, key: U256) -> Value {
    let (outcome, stack) = run_block(routine, stack_of(&[key]));
    assert_eq!(outcome, Ok(Outcome::Finished));
    assert_eq!(stack.len(), 1, "lookup must leave exactly one value");
    stack.top().cloned().unwrap()
}

/// Translation of a lone static instruction, outside any contract.
pub fn rule_for(opcode: Opcode) -> Block {
    let code = Default::default();
    let gas = GasStandIns::default();
    let context = RuleContext {
        contract: 2,
        code: &code,
        gas: &gas,
    };
    translate_instruction(
        &Instruction::new(opcode, None, 0),
        &context,
        &mut Diagnostics::new(2),
    )
    .unwrap()
}

/// Compiles `(id, code)` pairs sequentially with default options.
pub fn compile(contracts: impl IntoIterator<Item = (u64, Vec<u8>)>) -> Program {
    compile_program(
        contracts
            .into_iter()
            .map(|(id, code)| Contract::from_code(id, code))
            .collect(),
        &CompileOptions::default().with_parallel(false),
    )
    .unwrap()
}

/// Big-endian 32-byte strategy input to a word.
pub fn word(bytes: [u8; 32]) -> U256 {
    U256::from_be_bytes(bytes)
}
