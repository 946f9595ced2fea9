//! DispatchTableBuilder: from flat reducer declarations to the ordered table.
//!
//! Compilation runs three phases over an immutable input set:
//!
//! 1. **Action type set** — union of every descriptor's accepted type with
//!    the explicitly added extra types, deduplicated by identity, in
//!    first-declaration order (extras first, matching the order they are
//!    fed to the builder).
//! 2. **Aggregation** — for each type `T` in the set, collect every
//!    descriptor whose accepted type is `T` or a supertype of `T`, then
//!    stable-sort ascending by priority.
//! 3. **Specificity ordering** — arrange entries so strict subtypes precede
//!    their supertypes, keeping arrival order for incomparable pairs.
//!
//! Phase 3 deliberately avoids a comparator sort: the subtype relation is a
//! strict partial order, and comparator-based sorts only consult the pairs
//! the algorithm happens to compare, so a transitively implied constraint
//! can be missed. Instead the builder runs a stable topological pass —
//! repeatedly emitting the earliest-arrived entry whose strict subtypes are
//! all already emitted — which is deterministic in the input order alone.

use std::sync::Arc;

use miette::Diagnostic;
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{debug, instrument};

use super::{DispatchEntry, DispatchTable};
use crate::actions::{Action, ActionTypeId};
use crate::hierarchy::{RelationError, TypeRelation};
use crate::reducers::ReducerDescriptor;

/// Failure compiling a dispatch table. All variants are terminal for the
/// analysis pass: no partial table is ever produced.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum TableCompileError {
    /// A descriptor's accepted type is outside the oracle's declared set.
    #[error("reducer {reducer} accepts action type {type_name} unknown to the type relation")]
    #[diagnostic(
        code(fluxtable::tables::malformed_descriptor),
        help("Declare the accepted type in the hierarchy before compiling the table.")
    )]
    MalformedDescriptor {
        reducer: String,
        type_name: &'static str,
    },

    /// An explicitly added routable type is outside the oracle's set.
    #[error("extra action type {type_name} is unknown to the type relation")]
    #[diagnostic(
        code(fluxtable::tables::unknown_action_type),
        help("Declare the type in the hierarchy or drop the add_action_type call.")
    )]
    UnknownActionType { type_name: &'static str },

    /// The oracle failed to answer a subtype query.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Relation(#[from] RelationError),

    /// The oracle reported mutually-subtyped distinct types, so no
    /// subtypes-first order exists.
    #[error("type relation is inconsistent: no specificity order exists for {type_names:?}")]
    #[diagnostic(code(fluxtable::tables::inconsistent_relation))]
    InconsistentRelation { type_names: Vec<&'static str> },
}

/// Collects reducer declarations and compiles them into a [`DispatchTable`].
///
/// The builder is the analysis-time surface of the crate: feed it the flat
/// descriptor collection (plus any types that must be routable despite
/// having no direct reducer) and call [`compile`](Self::compile). The oracle
/// is injected, never implemented here.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use fluxtable::actions::Action;
/// use fluxtable::hierarchy::TypeHierarchy;
/// use fluxtable::tables::DispatchTableBuilder;
///
/// struct Ping;
/// impl Action for Ping {}
///
/// let hierarchy = Arc::new(TypeHierarchy::builder().register::<Ping>().build().unwrap());
/// let table = DispatchTableBuilder::new(hierarchy)
///     .add_action_type::<Ping>()
///     .compile()
///     .unwrap();
///
/// // Ping has no reducers: its entry exists but is inert.
/// assert!(table.entries()[0].is_inert());
/// ```
pub struct DispatchTableBuilder {
    relation: Arc<dyn TypeRelation>,
    reducers: Vec<ReducerDescriptor>,
    extra_types: Vec<ActionTypeId>,
}

impl DispatchTableBuilder {
    /// Creates a builder compiling against the given subtype oracle.
    #[must_use]
    pub fn new(relation: Arc<dyn TypeRelation>) -> Self {
        Self {
            relation,
            reducers: Vec::new(),
            extra_types: Vec::new(),
        }
    }

    /// Adds one reducer declaration. Declaration order is the tiebreak for
    /// equal priorities.
    #[must_use]
    pub fn add_reducer(mut self, descriptor: ReducerDescriptor) -> Self {
        self.reducers.push(descriptor);
        self
    }

    /// Adds a type the table must branch on even if no reducer accepts it
    /// directly (downstream consumers may want to observe such entries).
    #[must_use]
    pub fn add_action_type<A: Action>(mut self) -> Self {
        self.extra_types.push(ActionTypeId::of::<A>());
        self
    }

    /// Declared reducers, in declaration order.
    #[must_use]
    pub fn reducers(&self) -> &[ReducerDescriptor] {
        &self.reducers
    }

    /// The distinct action types the compiled table will branch on:
    /// explicitly added types first, then each descriptor's accepted type,
    /// deduplicated by identity. An empty builder yields an empty set.
    #[must_use]
    pub fn action_type_set(&self) -> Vec<ActionTypeId> {
        let mut seen: FxHashSet<ActionTypeId> = FxHashSet::default();
        let mut set = Vec::new();
        let declared = self
            .extra_types
            .iter()
            .copied()
            .chain(self.reducers.iter().map(ReducerDescriptor::accepted_type));
        for ty in declared {
            if seen.insert(ty) {
                set.push(ty);
            }
        }
        set
    }

    /// Compiles the declarations into an ordered, immutable table.
    ///
    /// # Errors
    ///
    /// - [`TableCompileError::MalformedDescriptor`] /
    ///   [`TableCompileError::UnknownActionType`] when a declaration names a
    ///   type the oracle does not know.
    /// - [`TableCompileError::Relation`] when the oracle fails a query.
    /// - [`TableCompileError::InconsistentRelation`] when the oracle's facts
    ///   admit no subtypes-first order.
    #[instrument(skip(self), fields(reducers = self.reducers.len()), err)]
    pub fn compile(self) -> Result<DispatchTable, TableCompileError> {
        self.validate_declarations()?;

        let action_types = self.action_type_set();
        let mut entries = Vec::with_capacity(action_types.len());
        for ty in action_types {
            entries.push(self.aggregate_entry(ty)?);
        }

        let entries = self.order_by_specificity(entries)?;
        debug!(entries = entries.len(), "dispatch table compiled");
        Ok(DispatchTable::from_entries(entries))
    }

    /// Fails fast on declarations the oracle cannot reason about. Running
    /// before any aggregation keeps the error attached to the offending
    /// declaration rather than to some later query.
    fn validate_declarations(&self) -> Result<(), TableCompileError> {
        for descriptor in &self.reducers {
            if !self.relation.contains(descriptor.accepted_type()) {
                return Err(TableCompileError::MalformedDescriptor {
                    reducer: descriptor.name().to_owned(),
                    type_name: descriptor.accepted_type().name(),
                });
            }
        }
        for ty in &self.extra_types {
            if !self.relation.contains(*ty) {
                return Err(TableCompileError::UnknownActionType {
                    type_name: ty.name(),
                });
            }
        }
        Ok(())
    }

    /// Aggregation phase for one action type: every reducer whose accepted
    /// type is `ty` or a supertype of `ty`, stable-sorted by priority.
    fn aggregate_entry(&self, ty: ActionTypeId) -> Result<DispatchEntry, TableCompileError> {
        let mut reducers = Vec::new();
        for descriptor in &self.reducers {
            if self
                .relation
                .is_subtype_or_equal(ty, descriptor.accepted_type())?
            {
                reducers.push(descriptor.clone());
            }
        }
        // Vec preserves declaration order; the stable sort keeps it for ties.
        reducers.sort_by_key(ReducerDescriptor::priority);
        Ok(DispatchEntry {
            entry_type: ty,
            reducers,
        })
    }

    /// Ordering phase: stable topological pass over the strict-subtype
    /// relation. Each round emits the earliest-arrived entry all of whose
    /// strict subtypes (within the set) are already emitted, so subtypes
    /// always precede supertypes and incomparable entries keep arrival
    /// order.
    fn order_by_specificity(
        &self,
        entries: Vec<DispatchEntry>,
    ) -> Result<Vec<DispatchEntry>, TableCompileError> {
        let n = entries.len();

        // strict[i][j]: entry i's type is a strict subtype of entry j's.
        // Queried once per ordered pair; any oracle failure aborts here.
        let mut strict = vec![vec![false; n]; n];
        for (i, a) in entries.iter().enumerate() {
            for (j, b) in entries.iter().enumerate() {
                if i != j {
                    strict[i][j] = self
                        .relation
                        .is_subtype_or_equal(a.entry_type, b.entry_type)?;
                }
            }
        }

        let mut emitted = vec![false; n];
        let mut ordered = Vec::with_capacity(n);
        while ordered.len() < n {
            let next = (0..n).find(|&i| {
                !emitted[i] && (0..n).all(|j| emitted[j] || !strict[j][i])
            });
            match next {
                Some(i) => {
                    emitted[i] = true;
                    ordered.push(i);
                }
                None => {
                    // Remaining entries all have an unemitted strict subtype:
                    // the relation contains a mutual-subtype knot.
                    let type_names = entries
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !emitted[*i])
                        .map(|(_, e)| e.entry_type.name())
                        .collect();
                    return Err(TableCompileError::InconsistentRelation { type_names });
                }
            }
        }

        let mut slots: Vec<Option<DispatchEntry>> = entries.into_iter().map(Some).collect();
        Ok(ordered
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect())
    }
}
