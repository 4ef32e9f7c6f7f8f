// SPDX-License-Identifier: Apache-2.0

//! The symbol arena. Parent/child links are stored as `SymbolId`s rather than
//! pointers, so the graph can hold back-references without an ownership
//! cycle.

use serde::{Deserialize, Serialize};

/// Stable handle into a `KGSnapshot`'s symbol arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// A raw symbol record as read from the external source of truth, prior to
/// being placed in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSymbol {
    /// Fully qualified name, unique within the source.
    pub fqname: String,
    /// Repository-relative path the symbol is defined in.
    pub file: String,
    /// Fully qualified name of the enclosing symbol, if any.
    pub parent_fqname: Option<String>,
    /// Symbol kind (`function`, `class`, `module`, ...), free-form.
    pub kind: String,
}

/// One symbol placed in the arena, with parent/child links resolved to ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// This symbol's id within the arena.
    pub id: SymbolId,
    /// Fully qualified name.
    pub fqname: String,
    /// Repository-relative path the symbol is defined in.
    pub file: String,
    /// Enclosing symbol, if any.
    pub parent: Option<SymbolId>,
    /// Symbols declared directly inside this one.
    pub children: Vec<SymbolId>,
    /// Symbol kind, free-form.
    pub kind: String,
}
