//! Reference stack machine for lowered target code.
//!
//! The compiler never depends on this crate; it exists so generated routines can be
//! executed and checked against the source machine's semantics.

mod error;
mod lower;
mod machine;
pub mod word;

pub use error::*;
pub use lower::*;
pub use machine::*;
