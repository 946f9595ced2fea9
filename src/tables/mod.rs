//! Dispatch table data model and compilation.
//!
//! The dispatch table is the compiled artifact of the analysis pass: an
//! ordered sequence of entries, one per distinct action type, each carrying
//! the priority-sorted reducers applicable to that type. The main entry
//! point is [`DispatchTableBuilder`], which collects reducer descriptors and
//! extra routable types, then compiles them against a
//! [`TypeRelation`](crate::hierarchy::TypeRelation) oracle.
//!
//! # Table invariants
//!
//! Compiled tables uphold three guarantees that the runtime dispatcher and
//! emitters rely on:
//!
//! 1. **Aggregation completeness** — a reducer accepting type `T` appears in
//!    the entry of `T` and of every subtype of `T`.
//! 2. **Specificity order** — an entry whose type is a strict subtype of
//!    another's precedes it. First-match routing would otherwise send
//!    subtype instances to the supertype's (smaller) reducer list.
//! 3. **Entry uniqueness** — at most one entry per action type. Entries with
//!    no reducers are kept in the table; emitters prune them.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fluxtable::actions::Action;
//! use fluxtable::hierarchy::TypeHierarchy;
//! use fluxtable::reducers::ReducerDescriptor;
//! use fluxtable::stores::Store;
//! use fluxtable::tables::DispatchTableBuilder;
//!
//! struct SessionStore;
//! impl Store for SessionStore {
//!     type State = u32;
//! }
//!
//! struct Base;
//! impl Action for Base {}
//! struct Derived;
//! impl Action for Derived {}
//!
//! let hierarchy = Arc::new(
//!     TypeHierarchy::builder()
//!         .subtype_of::<Derived, Base>()
//!         .build()
//!         .unwrap(),
//! );
//!
//! let table = DispatchTableBuilder::new(hierarchy)
//!     .add_action_type::<Derived>()
//!     .add_reducer(ReducerDescriptor::stateless::<SessionStore, Base, _>(
//!         "on_base",
//!         |_| 0,
//!     ))
//!     .compile()
//!     .unwrap();
//!
//! // Derived's entry aggregates the Base reducer and precedes Base's entry.
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.entries()[0].reducers.len(), 1);
//! ```

mod builder;


pub use builder::{DispatchTableBuilder, TableCompileError};

use crate::actions::ActionTypeId;
use crate::reducers::ReducerDescriptor;

/// One decision branch of the compiled dispatcher.
///
/// `reducers` is sorted ascending by priority; equal priorities keep the
/// order in which the descriptors were declared.
#[derive(Debug, Clone)]
pub struct DispatchEntry {
    /// The action type this entry branches on.
    pub entry_type: ActionTypeId,
    /// Applicable reducers, priority-sorted.
    pub reducers: Vec<ReducerDescriptor>,
}

impl DispatchEntry {
    /// True when no reducer is interested in this type.
    ///
    /// Inert entries are valid table members; emitters drop them.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.reducers.is_empty()
    }
}

/// The compiled, immutable dispatch table.
///
/// Built once by [`DispatchTableBuilder::compile`]; consumed read-only by
/// the [`Dispatcher`](crate::dispatcher::Dispatcher) and by emitters. Entry
/// order is the routing order: subtypes first, arrival order for
/// incomparable types.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: Vec<DispatchEntry>,
}

impl DispatchTable {
    pub(crate) fn from_entries(entries: Vec<DispatchEntry>) -> Self {
        Self { entries }
    }

    /// Entries in routing order.
    #[must_use]
    pub fn entries(&self) -> &[DispatchEntry] {
        &self.entries
    }

    /// The entry branching on exactly `ty`, if present.
    #[must_use]
    pub fn entry(&self, ty: ActionTypeId) -> Option<&DispatchEntry> {
        self.entries.iter().find(|e| e.entry_type == ty)
    }

    /// Number of entries, inert ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for a table with no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterator over entries in routing order.
    pub fn iter(&self) -> std::slice::Iter<'_, DispatchEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a DispatchTable {
    type Item = &'a DispatchEntry;
    type IntoIter = std::slice::Iter<'a, DispatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
