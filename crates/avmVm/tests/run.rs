use alloy_primitives::U256;
use avm_isa::{AvmOp, Block, HostOp, Label, Value};
use avm_vm::{Flow, Host, Machine, Outcome, Stack, VmResult, lower};

/// Delivers a fixed number of messages, each carrying its sequence number.
#[derive(Debug)]
struct Messages {
    remaining: u64,
    served: Vec<U256>,
}

impl Host for Messages {
    fn execute(&mut self, op: &HostOp, stack: &mut Stack) -> VmResult<Flow> {
        match op {
            HostOp::GetNextMessage => {
                if self.remaining == 0 {
                    return Ok(Flow::Halt);
                }
                stack.push(self.remaining);
                self.remaining -= 1;
            }
            HostOp::SetupInitialCall => self.served.push(stack.pop_int()?),
            _ => unreachable!("unexpected {op}"),
        }
        Ok(Flow::Continue)
    }
}

#[test]
fn test_message_loop_until_host_halts() {
    let mut body = Block::new();
    body.host(HostOp::GetNextMessage)
        .host(HostOp::SetupInitialCall);
    let mut program = Block::new();
    program
        .push(Label::RunLoopStart)
        .jump()
        .error()
        .set_label(Label::RunLoopStart)
        .loop_forever(body);

    let code = lower(&program).unwrap();
    let mut host = Messages {
        remaining: 3,
        served: Vec::new(),
    };
    let mut machine = Machine::new(&code);
    assert_eq!(machine.run(&mut host), Ok(Outcome::Halted));
    assert_eq!(
        host.served,
        vec![U256::from(3), U256::from(2), U256::from(1)]
    );
    assert!(machine.stack.is_empty());
}

#[test]
fn test_nested_branches() {
    // max(a, b) with a on top.
    let mut keep_a = Block::new();
    keep_a.swap(1).pop();
    let mut keep_b = Block::new();
    keep_b.pop();
    let mut block = Block::new();
    block
        .dup(1)
        .dup(1)
        .op(AvmOp::Gt)
        .if_else(keep_a, keep_b);
    let code = lower(&block).unwrap();

    for (a, b, expected) in [(5u64, 3u64, 5u64), (2, 9, 9), (4, 4, 4)] {
        let mut machine =
            Machine::new(&code).with_stack([U256::from(b), U256::from(a)].into_iter().collect());
        machine.run(&mut avm_vm::NoHost).unwrap();
        assert_eq!(machine.stack.as_slice(), &[Value::from(expected)]);
    }
}
