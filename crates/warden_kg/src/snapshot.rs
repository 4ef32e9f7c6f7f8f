// SPDX-License-Identifier: Apache-2.0

//! The immutable, point-in-time view of the symbol graph.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::symbol::{RawSymbol, Symbol, SymbolId};

/// A read-only projection of the symbol graph, built once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct KGSnapshot {
    arena: Vec<Symbol>,
    by_fqname: HashMap<String, SymbolId>,
    by_file: HashMap<String, Vec<SymbolId>>,
}

impl KGSnapshot {
    /// Builds a snapshot from the raw symbols returned by an external
    /// source, resolving parent/child references to ids.
    #[must_use]
    pub fn from_raw(raw: Vec<RawSymbol>) -> Self {
        let mut by_fqname = HashMap::new();
        let mut arena = Vec::with_capacity(raw.len());
        for (i, r) in raw.iter().enumerate() {
            let id = SymbolId(i as u32);
            let _ = by_fqname.insert(r.fqname.clone(), id);
            arena.push(Symbol {
                id,
                fqname: r.fqname.clone(),
                file: r.file.clone(),
                parent: None,
                children: Vec::new(),
                kind: r.kind.clone(),
            });
        }
        for (i, r) in raw.iter().enumerate() {
            let Some(parent_name) = &r.parent_fqname else {
                continue;
            };
            let Some(&parent_id) = by_fqname.get(parent_name) else {
                continue;
            };
            let child_id = SymbolId(i as u32);
            arena[i].parent = Some(parent_id);
            arena[parent_id.0 as usize].children.push(child_id);
        }

        let mut by_file: HashMap<String, Vec<SymbolId>> = HashMap::new();
        for symbol in &arena {
            by_file.entry(symbol.file.clone()).or_default().push(symbol.id);
        }

        KGSnapshot {
            arena,
            by_fqname,
            by_file,
        }
    }

    /// Every symbol declared in `file`.
    #[must_use]
    pub fn symbols_in(&self, file: &str) -> Vec<&Symbol> {
        self.by_file
            .get(file)
            .into_iter()
            .flatten()
            .filter_map(|id| self.get(*id))
            .collect()
    }

    /// Looks up a symbol by its fully qualified name.
    #[must_use]
    pub fn symbol_by_fqname(&self, name: &str) -> Option<&Symbol> {
        self.by_fqname.get(name).and_then(|id| self.get(*id))
    }

    /// Resolves an id to its symbol.
    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.arena.get(id.0 as usize)
    }

    /// Total number of symbols in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True when the arena holds no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

/// Reads the `executed_rules` field out of a prior audit evidence artifact,
/// for delta analysis. Tolerates a missing or malformed file by returning an
/// empty set rather than failing — the knowledge-graph mirror is read-only
/// and best-effort with respect to history it did not itself produce.
#[must_use]
pub fn executed_checks_from_evidence(path: &Path) -> BTreeSet<String> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return BTreeSet::new();
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&contents) else {
        return BTreeSet::new();
    };
    value
        .get("executed_rules")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
