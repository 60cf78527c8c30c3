//! The spendable-output set.
//!
//! Maps an [`OutputRef`] to the [`TxOutput`] it refers to. Every entry is
//! money that exists and has not been claimed by any applied transaction.
//! The map itself is never exposed; the ledger engine is the single writer.

use std::collections::HashMap;

use crate::errors::{UtxoError, UtxoResult};
use crate::transaction::{OutputRef, TxOutput};

/// Set of currently spendable outputs, keyed by output reference.
///
/// `Clone` performs a deep value copy; the engine clones the caller's set at
/// construction so later mutation never aliases caller-owned state.
#[derive(Debug, Clone, Default)]
pub struct UtxoSet {
    entries: HashMap<OutputRef, TxOutput>,
}

impl UtxoSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `reference` is a live, unspent output.
    pub fn contains(&self, reference: &OutputRef) -> bool {
        self.entries.contains_key(reference)
    }

    /// Look up the output behind `reference`. Callers on the validation
    /// path check `contains` first or treat `None` as a hard error.
    pub fn get(&self, reference: &OutputRef) -> Option<&TxOutput> {
        self.entries.get(reference)
    }

    /// Add or overwrite an entry.
    pub fn insert(&mut self, reference: OutputRef, output: TxOutput) {
        self.entries.insert(reference, output);
    }

    /// Delete an entry, returning it. Removing an absent reference is a
    /// caller bug, not a normal outcome.
    pub fn remove(&mut self, reference: &OutputRef) -> UtxoResult<TxOutput> {
        self.entries
            .remove(reference)
            .ok_or(UtxoError::NotFound(*reference))
    }

    /// Iterate over all entries. Order is unspecified and must not be
    /// relied upon.
    pub fn iter(&self) -> impl Iterator<Item = (&OutputRef, &TxOutput)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all spendable values; `None` on overflow.
    pub fn total_value(&self) -> Option<u64> {
        self.entries
            .values()
            .try_fold(0u64, |sum, output| sum.checked_add(output.value))
    }
}
