use std::fmt;

/// Identifier assigned to a contract by the compiler.
pub type ContractId = u64;

/// Offset of an instruction in the source byte stream.
pub type SourcePc = usize;

/// Structured label for code locations in the target program
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    /// Contract routine entry point: @contract_entry_{id}
    ContractEntry(ContractId),
    /// Valid source jump destination: @jumpdest_{contract}_{pc}
    JumpDest { contract: ContractId, pc: SourcePc },
    /// Resumption point after a call-family instruction: @call_return_{contract}_{pc}
    CallReturn { contract: ContractId, pc: SourcePc },
    /// Head of the global message dispatch loop: @run_loop_start
    RunLoopStart,
    /// Shared jump-destination lookup of one contract: @jump_dispatch_{id}
    JumpDispatch(ContractId),
    /// Shared lookup over a program-wide table: @lookup_{table}
    GlobalLookup(GlobalTable),
    /// Resumption point after a shared lookup: @lookup_return_{contract}_{pc}
    LookupReturn { contract: ContractId, pc: SourcePc },
}

/// Program-wide tables keyed by contract id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GlobalTable {
    Code,
    Hashes,
    Sizes,
    Entries,
}

impl GlobalTable {
    pub const ALL: [Self; 4] = [Self::Code, Self::Hashes, Self::Sizes, Self::Entries];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Hashes => "hashes",
            Self::Sizes => "sizes",
            Self::Entries => "entries",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContractEntry(id) => write!(f, "@contract_entry_{id}"),
            Self::JumpDest { contract, pc } => write!(f, "@jumpdest_{contract}_{pc}"),
            Self::CallReturn { contract, pc } => write!(f, "@call_return_{contract}_{pc}"),
            Self::RunLoopStart => write!(f, "@run_loop_start"),
            Self::JumpDispatch(id) => write!(f, "@jump_dispatch_{id}"),
            Self::GlobalLookup(table) => write!(f, "@lookup_{}", table.as_str()),
            Self::LookupReturn { contract, pc } => write!(f, "@lookup_return_{contract}_{pc}"),
        }
    }
}

impl Label {
    #[must_use]
    pub const fn contract_entry(id: ContractId) -> Self {
        Self::ContractEntry(id)
    }

    #[must_use]
    pub const fn jump_dest(contract: ContractId, pc: SourcePc) -> Self {
        Self::JumpDest { contract, pc }
    }

    #[must_use]
    pub const fn call_return(contract: ContractId, pc: SourcePc) -> Self {
        Self::CallReturn { contract, pc }
    }

    #[must_use]
    pub const fn lookup_return(contract: ContractId, pc: SourcePc) -> Self {
        Self::LookupReturn { contract, pc }
    }

    /// The contract this label is scoped to, if any.
    #[must_use]
    pub const fn contract(&self) -> Option<ContractId> {
        match self {
            Self::ContractEntry(id)
            | Self::JumpDest { contract: id, .. }
            | Self::CallReturn { contract: id, .. }
            | Self::JumpDispatch(id)
            | Self::LookupReturn { contract: id, .. } => Some(*id),
            Self::RunLoopStart | Self::GlobalLookup(_) => None,
        }
    }
}
