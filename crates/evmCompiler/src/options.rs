use alloy_primitives::U256;
use avm_isa::ContractId;

use crate::constants::{
    DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE, DEFAULT_GAS_REMAINING, INTERRUPT_CONTRACT_ID,
};

/// Fixed values pushed in place of gas introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasStandIns {
    pub price: U256,
    pub limit: U256,
    pub remaining: U256,
}

impl Default for GasStandIns {
    fn default() -> Self {
        Self {
            price: U256::from(DEFAULT_GAS_PRICE),
            limit: U256::from(DEFAULT_GAS_LIMIT),
            remaining: U256::from(DEFAULT_GAS_REMAINING),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub strip_metadata: bool,
    pub rewrite_self_balance: bool,
    /// Translate contracts on the rayon pool. Output order does not depend on it.
    pub parallel: bool,
    pub gas: GasStandIns,
    /// Id whose code-size entry is forced to a nonzero value.
    pub interrupt_contract: ContractId,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            strip_metadata: true,
            rewrite_self_balance: true,
            parallel: true,
            gas: GasStandIns::default(),
            interrupt_contract: INTERRUPT_CONTRACT_ID,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub const fn with_strip_metadata(mut self, strip_metadata: bool) -> Self {
        self.strip_metadata = strip_metadata;
        self
    }

    #[must_use]
    pub const fn with_rewrite_self_balance(mut self, rewrite_self_balance: bool) -> Self {
        self.rewrite_self_balance = rewrite_self_balance;
        self
    }

    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub const fn with_gas(mut self, gas: GasStandIns) -> Self {
        self.gas = gas;
        self
    }

    #[must_use]
    pub const fn with_interrupt_contract(mut self, id: ContractId) -> Self {
        self.interrupt_contract = id;
        self
    }
}
