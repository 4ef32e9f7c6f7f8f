// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]

pub mod snapshot;
pub mod symbol;

use std::sync::{Arc, OnceLock};

pub use snapshot::{executed_checks_from_evidence, KGSnapshot};
pub use symbol::{RawSymbol, Symbol, SymbolId};

/// The external source of truth the mirror reads from. The core never
/// writes through this trait; it is a read path only.
pub trait KnowledgeGraphSource: Send + Sync {
    /// Returns every symbol known to the source, in no particular order.
    fn load_symbols(&self) -> Vec<RawSymbol>;
}

/// A source with no symbols, used where no external graph is wired up.
#[derive(Default)]
pub struct EmptyKnowledgeGraphSource;

impl KnowledgeGraphSource for EmptyKnowledgeGraphSource {
    fn load_symbols(&self) -> Vec<RawSymbol> {
        Vec::new()
    }
}

/// Lazily loads and caches a `KGSnapshot` behind a single-flight guard.
///
/// Checks that never query the symbol graph must not trigger the load; only
/// the first call to `get_or_load` pays the loading cost, and it is safe to
/// call concurrently from multiple worker threads.
pub struct KnowledgeGraph {
    source: Arc<dyn KnowledgeGraphSource>,
    snapshot: OnceLock<KGSnapshot>,
}

impl KnowledgeGraph {
    /// Creates a mirror backed by `source`; no load happens yet.
    #[must_use]
    pub fn new(source: Arc<dyn KnowledgeGraphSource>) -> Self {
        KnowledgeGraph {
            source,
            snapshot: OnceLock::new(),
        }
    }

    /// Returns the snapshot, loading it on first access.
    pub fn get_or_load(&self) -> &KGSnapshot {
        self.snapshot
            .get_or_init(|| KGSnapshot::from_raw(self.source.load_symbols()))
    }

    /// True if the snapshot has already been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.snapshot.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl KnowledgeGraphSource for CountingSource {
        fn load_symbols(&self) -> Vec<RawSymbol> {
            let _ = self.calls.fetch_add(1, Ordering::SeqCst);
            vec![RawSymbol {
                fqname: "a".to_owned(),
                file: "a.py".to_owned(),
                parent_fqname: None,
                kind: "function".to_owned(),
            }]
        }
    }

    #[test]
    fn loads_lazily_and_only_once() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let kg = KnowledgeGraph::new(source.clone());
        assert!(!kg.is_loaded());

        let _ = kg.get_or_load();
        let _ = kg.get_or_load();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
