//! Static lookup tables compiled to balanced binary-search code.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use avm_isa::{AvmOp, Block, Label, Value};

use crate::LookupError;

/// A finite, immutable map from integer keys to values, plus the target code that queries it.
///
/// On the Rust side a miss is an `Option::None`. Inside generated code it is the dedicated
/// `Value::None` marker, which no legitimate value can equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLookup<V> {
    entries: BTreeMap<U256, V>,
}

impl<V> Default for StaticLookup<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V: Clone + Into<Value>> StaticLookup<V> {
    #[must_use]
    pub const fn new(entries: BTreeMap<U256, V>) -> Self {
        Self { entries }
    }

    /// Builds a table from pairs, rejecting repeated keys.
    pub fn try_from_pairs(pairs: impl IntoIterator<Item = (U256, V)>) -> Result<Self, LookupError> {
        let mut entries = BTreeMap::new();
        for (key, value) in pairs {
            if entries.insert(key, value).is_some() {
                return Err(LookupError::DuplicateKey(key));
            }
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn get(&self, key: &U256) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &U256> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&U256, &V)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn contains_key(&self, key: &U256) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Target code that pops a key and pushes its value, or `Value::None` on a miss.
    #[must_use]
    pub fn routine(&self) -> Block {
        let entries: Vec<(U256, Value)> = self
            .entries
            .iter()
            .map(|(key, value)| (*key, value.clone().into()))
            .collect();
        search(&entries)
    }

    /// The routine emitted once under `label`, for use through [`call_lookup`].
    #[must_use]
    pub fn subroutine(&self, label: Label) -> Block {
        lookup_subroutine(label, self.routine())
    }
}

/// Wraps a lookup routine so it can be shared by every call site.
///
/// Expects the key on top of a return label. Leaves the value and jumps back.
#[must_use]
pub fn lookup_subroutine(label: Label, routine: Block) -> Block {
    let mut block = Block::annotated(format!("lookup {label}"));
    block.set_label(label).extend(routine).swap(1).jump();
    block
}

/// Calls the shared lookup at `routine` with the key on top of the stack, resuming at
/// `return_label` with the value in place of the key.
#[must_use]
pub fn call_lookup(routine: Label, return_label: Label) -> Block {
    let mut block = Block::new();
    block
        .push(return_label.clone())
        .swap(1)
        .push(routine)
        .jump()
        .set_label(return_label);
    block
}

/// Compiles `mapping` into a lookup routine. See [`StaticLookup::routine`].
#[must_use]
pub fn compile_lookup<V: Clone + Into<Value>>(mapping: &BTreeMap<U256, V>) -> Block {
    StaticLookup::new(mapping.clone()).routine()
}

/// Emits a binary search over sorted `entries`, expecting the key on top of the stack.
///
/// Every path consumes the key and leaves exactly one value. The number of branches taken is
/// at most `ceil(log2(n)) + 1`.
fn search(entries: &[(U256, Value)]) -> Block {
    let mut block = Block::new();
    match entries {
        [] => {
            block.pop().push(Value::None);
        }
        [(key, value)] => {
            let mut found = Block::new();
            found.push(value.clone());
            let mut missing = Block::new();
            missing.push(Value::None);
            block.push(*key).op(AvmOp::Eq).if_else(found, missing);
        }
        _ => {
            let (left, right) = entries.split_at(entries.len() / 2);
            block
                .push(right[0].0)
                .dup(1)
                .op(AvmOp::Lt)
                .if_else(search(left), search(right));
        }
    }
    block
}
