use std::fmt;

use avm_isa::{ContractId, SourcePc};
use tracing::warn;

use crate::Opcode;

/// A non-fatal compile-time finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub contract: ContractId,
    pub pc: SourcePc,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The opcode is translated, but its cross-machine semantics are only approximate.
    ApproximateOpcode(Opcode),
    /// An unassigned opcode byte other than the designated invalid instruction.
    NonstandardInvalid(u8),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::ApproximateOpcode(opcode) => write!(
                f,
                "contract {} pc {}: {opcode} is only approximately supported",
                self.contract, self.pc
            ),
            DiagnosticKind::NonstandardInvalid(byte) => write!(
                f,
                "contract {} pc {}: nonstandard invalid opcode 0x{byte:02x}",
                self.contract, self.pc
            ),
        }
    }
}

/// Collects diagnostics for one contract and mirrors each one to the log.
#[derive(Debug)]
pub struct Diagnostics {
    contract: ContractId,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub const fn new(contract: ContractId) -> Self {
        Self {
            contract,
            entries: Vec::new(),
        }
    }

    pub fn report(&mut self, pc: SourcePc, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            contract: self.contract,
            pc,
            kind,
        };
        warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
