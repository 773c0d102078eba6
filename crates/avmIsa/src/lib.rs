//! Target stack-machine instruction set: values, labels, primitive and host operations,
//! and the structured code blocks handed to the assembler.

mod block;
mod label;
mod op;
mod value;

pub use alloy_primitives::{Bytes, U256};
pub use block::*;
pub use label::*;
pub use op::*;
pub use value::*;
