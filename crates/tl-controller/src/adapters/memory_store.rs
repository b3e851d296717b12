//! In-memory contract state store.

use crate::ports::outbound::{StateStore, WriteSet};
use shared_types::AccountName;
use std::collections::BTreeMap;

/// [`StateStore`] backed by an in-process map, keyed by `(scope, key)`.
///
/// The default store for a standalone controller and for tests. Replaceable
/// with a persistent adapter without touching the domain layer.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    entries: BTreeMap<(AccountName, Vec<u8>), Vec<u8>>,
}

impl MemoryStateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, scope: &AccountName, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(&(scope.clone(), key.to_vec())).cloned()
    }

    fn apply(&mut self, writes: WriteSet) {
        for (slot, value) in writes {
            match value {
                Some(value) => {
                    self.entries.insert(slot, value);
                }
                None => {
                    self.entries.remove(&slot);
                }
            }
        }
    }
}
