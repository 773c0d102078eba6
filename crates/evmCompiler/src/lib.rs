//! Compiles deployed source-machine contracts into one target-machine program.
//!
//! Pipeline: decode ([`Disassembler`]), normalize ([`normalize`]), build jump tables and global
//! tables ([`StaticLookup`]), translate each instruction ([`translate_instruction`]) and assemble
//! ([`Compiler`]).

pub mod constants;
mod assemble;
mod contract;
mod decode;
mod diagnostics;
mod error;
mod hash;
pub mod input;
mod instruction;
mod logs;
mod lookup;
pub mod normalize;
mod opcode;
mod options;
mod rules;
mod translate;

pub use assemble::*;
pub use contract::*;
pub use decode::*;
pub use diagnostics::*;
pub use error::*;
pub use hash::*;
pub use instruction::*;
pub use logs::*;
pub use lookup::*;
pub use opcode::*;
pub use options::*;
pub use rules::*;
pub use translate::*;
