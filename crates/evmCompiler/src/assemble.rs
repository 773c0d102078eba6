use std::{collections::BTreeMap, fmt};

use alloy_primitives::{Bytes, U256};
use avm_isa::{Block, ContractDescriptor, ContractId, GlobalTable, HostOp, Label};
use rayon::prelude::*;
use tracing::{info, info_span};

use crate::{
    CodeHasher, CompileOptions, CompileResult, Contract, ContractRoutine, Diagnostic,
    Keccak256Hasher, StaticLookup, translate_contract,
};

/// Process-wide tables, all keyed by contract id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalTables {
    pub code: StaticLookup<Bytes>,
    pub hashes: StaticLookup<U256>,
    pub sizes: StaticLookup<U256>,
    pub entries: StaticLookup<Label>,
}

impl GlobalTables {
    /// Fails on repeated contract ids. The interrupt pseudo-contract always gets a size.
    pub fn build(
        contracts: &[Contract],
        hasher: &impl CodeHasher,
        interrupt_contract: ContractId,
    ) -> CompileResult<Self> {
        let code = StaticLookup::try_from_pairs(
            contracts
                .iter()
                .map(|contract| (U256::from(contract.id), contract.code.clone())),
        )?;
        let hashes = StaticLookup::new(
            contracts
                .iter()
                .map(|contract| (U256::from(contract.id), hasher.hash(&contract.code)))
                .collect(),
        );
        let mut sizes: BTreeMap<U256, U256> = contracts
            .iter()
            .map(|contract| (U256::from(contract.id), U256::from(contract.code_size())))
            .collect();
        sizes.insert(
            U256::from(interrupt_contract),
            U256::from(crate::constants::INTERRUPT_CONTRACT_SIZE),
        );
        let entries = StaticLookup::new(
            contracts
                .iter()
                .map(|contract| (U256::from(contract.id), Label::contract_entry(contract.id)))
                .collect(),
        );
        Ok(Self {
            code,
            hashes,
            sizes: StaticLookup::new(sizes),
            entries,
        })
    }

    /// One shared lookup per table, entered at `Label::GlobalLookup(table)`.
    #[must_use]
    pub fn lookup_routines(&self) -> Block {
        let mut block = Block::annotated("global lookups");
        for table in GlobalTable::ALL {
            let label = Label::GlobalLookup(table);
            block.nest(match table {
                GlobalTable::Code => self.code.subroutine(label),
                GlobalTable::Hashes => self.hashes.subroutine(label),
                GlobalTable::Sizes => self.sizes.subroutine(label),
                GlobalTable::Entries => self.entries.subroutine(label),
            });
        }
        block
    }
}

/// The assembled program. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Registers every contract with the host, then enters the dispatch loop.
    pub initialization: Block,
    /// Fetches a message and sets up its call, forever.
    pub dispatch_loop: Block,
    /// The shared global lookups, each emitted once.
    pub lookups: Block,
    /// In ascending id order.
    pub contracts: Vec<ContractRoutine>,
    pub globals: GlobalTables,
    pub diagnostics: Vec<Diagnostic>,
}

impl Program {
    #[must_use]
    pub fn routine(&self, id: ContractId) -> Option<&ContractRoutine> {
        self.contracts.iter().find(|routine| routine.id == id)
    }

    /// The whole program as one block for the assembler.
    #[must_use]
    pub fn to_block(&self) -> Block {
        let mut block = Block::new();
        block
            .nest(self.initialization.clone())
            .nest(self.dispatch_loop.clone())
            .nest(self.lookups.clone());
        for routine in &self.contracts {
            block.nest(routine.block.clone());
        }
        block
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_block())
    }
}

fn initialization(contracts: &[Contract]) -> Block {
    let descriptors = contracts
        .iter()
        .map(|contract| ContractDescriptor {
            entry: Label::contract_entry(contract.id),
            id: contract.id,
            storage: contract.storage.clone(),
        })
        .collect();
    let mut block = Block::annotated("initialization");
    block
        .host(HostOp::Initialize(descriptors))
        .push(Label::RunLoopStart)
        .jump();
    block
}

fn dispatch_loop() -> Block {
    let mut body = Block::new();
    body.host(HostOp::GetNextMessage)
        .host(HostOp::SetupInitialCall);
    let mut block = Block::annotated("dispatch loop");
    block.set_label(Label::RunLoopStart).loop_forever(body);
    block
}

/// Compiles a set of contracts into one program.
#[derive(Debug, Clone, Default)]
pub struct Compiler<H = Keccak256Hasher> {
    options: CompileOptions,
    hasher: H,
}

impl Compiler {
    #[must_use]
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            hasher: Keccak256Hasher,
        }
    }
}

impl<H: CodeHasher> Compiler<H> {
    #[must_use]
    pub fn with_hasher<H2: CodeHasher>(self, hasher: H2) -> Compiler<H2> {
        Compiler {
            options: self.options,
            hasher,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn compile(&self, mut contracts: Vec<Contract>) -> CompileResult<Program> {
        let _span = info_span!("Compiling program", contracts = contracts.len()).entered();
        contracts.sort_by_key(|contract| contract.id);

        let globals = GlobalTables::build(&contracts, &self.hasher, self.options.interrupt_contract)?;
        let options = &self.options;

        let translated: Vec<CompileResult<ContractRoutine>> = if options.parallel {
            contracts
                .par_iter()
                .map(|contract| translate_contract(contract, options))
                .collect()
        } else {
            contracts
                .iter()
                .map(|contract| translate_contract(contract, options))
                .collect()
        };
        // The first failure in id order wins, whatever the scheduling.
        let contract_routines = translated.into_iter().collect::<CompileResult<Vec<_>>>()?;

        let diagnostics: Vec<Diagnostic> = contract_routines
            .iter()
            .flat_map(|routine| routine.diagnostics.iter().cloned())
            .collect();
        info!(
            contracts = contracts.len(),
            instructions = contracts
                .iter()
                .map(|contract| contract.instructions.len())
                .sum::<usize>(),
            warnings = diagnostics.len(),
            "program assembled"
        );

        Ok(Program {
            initialization: initialization(&contracts),
            dispatch_loop: dispatch_loop(),
            lookups: globals.lookup_routines(),
            contracts: contract_routines,
            globals,
            diagnostics,
        })
    }
}

/// Compiles `contracts` with the default hasher.
pub fn compile_program(contracts: Vec<Contract>, options: &CompileOptions) -> CompileResult<Program> {
    Compiler::new(*options).compile(contracts)
}
