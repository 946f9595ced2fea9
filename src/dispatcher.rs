//! The runtime routing artifact compiled from a dispatch table.
//!
//! [`Dispatcher`] pairs an immutable [`DispatchTable`] with the caller's
//! [`StoreRegistry`] and routes action instances: the first entry (in table
//! order) whose type the action's runtime type is a subtype of — or is —
//! fires, and only that one. Within the fired entry, reducers run in stored
//! (priority) order and each store's state is replaced immediately, so a
//! later reducer on the same store observes the earlier one's output.
//!
//! Because the table is immutable, resolving a concrete action type to its
//! entry is memoized: the linear first-match scan runs once per distinct
//! type, then becomes a map lookup. The outcome is indistinguishable from
//! scanning every time.
//!
//! # Concurrency
//!
//! One logical dispatch happens at a time: [`route`](Dispatcher::route)
//! takes `&mut self`, so exclusive access is enforced by the borrow checker
//! rather than a lock. Callers dispatching from several threads wrap the
//! dispatcher in their own exclusion primitive.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use fluxtable::actions::Action;
//! use fluxtable::dispatcher::{Dispatcher, RouteOutcome};
//! use fluxtable::hierarchy::TypeHierarchy;
//! use fluxtable::reducers::ReducerDescriptor;
//! use fluxtable::stores::{Store, StoreRegistry};
//! use fluxtable::tables::DispatchTableBuilder;
//!
//! struct CounterStore;
//! impl Store for CounterStore {
//!     type State = u32;
//! }
//!
//! struct Increment;
//! impl Action for Increment {}
//!
//! let hierarchy = Arc::new(
//!     TypeHierarchy::builder().register::<Increment>().build().unwrap(),
//! );
//! let table = DispatchTableBuilder::new(hierarchy.clone())
//!     .add_reducer(ReducerDescriptor::stateful::<CounterStore, Increment, _>(
//!         "bump",
//!         |_, n| n + 1,
//!     ))
//!     .compile()
//!     .unwrap();
//!
//! let stores = StoreRegistry::new().with_store::<CounterStore>(0);
//! let mut dispatcher = Dispatcher::new(table, stores, hierarchy).unwrap();
//!
//! let outcome = dispatcher.route(&Increment).unwrap();
//! assert!(matches!(outcome, RouteOutcome::Handled { .. }));
//! assert_eq!(dispatcher.state::<CounterStore>(), Some(&1));
//! ```

use std::any::Any;
use std::sync::Arc;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{instrument, trace};

use crate::actions::{Action, ActionTypeId};
use crate::hierarchy::{RelationError, TypeRelation};
use crate::reducers::ApplyError;
use crate::stores::{Store, StoreRegistry};
use crate::tables::DispatchTable;

/// Failure constructing the dispatcher or routing an action.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum DispatchError {
    /// The table references a store the registry has no slot for.
    #[error("reducer {reducer} targets store {store} which has no registered slot")]
    #[diagnostic(
        code(fluxtable::dispatcher::unknown_store),
        help("Register the store with StoreRegistry::with_store before building the dispatcher.")
    )]
    UnknownStore { store: &'static str, reducer: String },

    /// A type-erased reducer application failed (wrong registry pairing).
    #[error(transparent)]
    #[diagnostic(transparent)]
    Apply(#[from] ApplyError),

    /// The oracle failed a runtime subtype query.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Relation(#[from] RelationError),
}

/// Result of routing one action instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Exactly one entry fired.
    Handled {
        /// The entry type that matched.
        entry_type: ActionTypeId,
        /// How many reducers ran.
        reducers_applied: usize,
    },
    /// No entry matched; the action was dropped with no side effect.
    Unhandled,
}

/// Executable routing artifact: compiled table + store slots + oracle.
pub struct Dispatcher {
    table: DispatchTable,
    stores: StoreRegistry,
    relation: Arc<dyn TypeRelation>,
    /// Memoized (concrete action type -> table entry index) resolution.
    /// `None` records a definitive miss.
    resolution: FxHashMap<ActionTypeId, Option<usize>>,
}

impl Dispatcher {
    /// Builds the dispatcher, validating that every store the table's
    /// reducers target has a slot in `stores`.
    ///
    /// # Errors
    ///
    /// [`DispatchError::UnknownStore`] naming the first reducer whose store
    /// is missing.
    pub fn new(
        table: DispatchTable,
        stores: StoreRegistry,
        relation: Arc<dyn TypeRelation>,
    ) -> Result<Self, DispatchError> {
        for entry in &table {
            for descriptor in &entry.reducers {
                if !stores.contains(descriptor.store()) {
                    return Err(DispatchError::UnknownStore {
                        store: descriptor.store().name(),
                        reducer: descriptor.name().to_owned(),
                    });
                }
            }
        }
        Ok(Self {
            table,
            stores,
            relation,
            resolution: FxHashMap::default(),
        })
    }

    /// The compiled table this dispatcher routes with.
    #[must_use]
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Read access to the store slots.
    #[must_use]
    pub fn stores(&self) -> &StoreRegistry {
        &self.stores
    }

    /// Current state of store `S`, if registered.
    #[must_use]
    pub fn state<S: Store>(&self) -> Option<&S::State> {
        self.stores.state::<S>()
    }

    /// Routes one action instance.
    ///
    /// At most one entry fires. An action whose type matches no entry (or
    /// was never declared at all) is dropped: that is a valid outcome, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Only for broken pairings — a relation failure on a declared type, or
    /// a reducer application hitting state of the wrong type. State already
    /// replaced by earlier reducers in the pass stays replaced.
    #[instrument(skip(self, action), fields(action = %ActionTypeId::of::<A>()))]
    pub fn route<A: Action>(&mut self, action: &A) -> Result<RouteOutcome, DispatchError> {
        let action_type = ActionTypeId::of::<A>();
        let Some(index) = self.resolve(action_type)? else {
            trace!("no matching entry, action dropped");
            return Ok(RouteOutcome::Unhandled);
        };

        let entry = &self.table.entries()[index];
        let action_any: &dyn Any = action;
        for descriptor in &entry.reducers {
            let prior = if descriptor.needs_prior_state() {
                match self.stores.raw_state(descriptor.store()) {
                    Some(state) => Some(state),
                    None => {
                        return Err(DispatchError::UnknownStore {
                            store: descriptor.store().name(),
                            reducer: descriptor.name().to_owned(),
                        });
                    }
                }
            } else {
                None
            };
            let next = descriptor.invoke(action_any, prior)?;
            // Replace immediately: same-store reducers later in this entry
            // must observe the update.
            self.stores.replace_raw(descriptor.store(), next);
            trace!(reducer = descriptor.name(), store = %descriptor.store(), "state replaced");
        }

        Ok(RouteOutcome::Handled {
            entry_type: entry.entry_type,
            reducers_applied: entry.reducers.len(),
        })
    }

    /// First-match resolution with memoization. Inert entries are skipped,
    /// exactly as an emitter omits their branches; aggregation guarantees a
    /// subtype's entry is never smaller than its supertypes', so skipping
    /// cannot reorder which reducers run.
    fn resolve(&mut self, action_type: ActionTypeId) -> Result<Option<usize>, DispatchError> {
        if let Some(cached) = self.resolution.get(&action_type) {
            return Ok(*cached);
        }

        let mut matched = None;
        if self.relation.contains(action_type) {
            for (index, entry) in self.table.entries().iter().enumerate() {
                if entry.is_inert() {
                    continue;
                }
                if self
                    .relation
                    .is_subtype_or_equal(action_type, entry.entry_type)?
                {
                    matched = Some(index);
                    break;
                }
            }
        }

        self.resolution.insert(action_type, matched);
        Ok(matched)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("entries", &self.table.len())
            .field("stores", &self.stores.len())
            .field("resolved_types", &self.resolution.len())
            .finish_non_exhaustive()
    }
}
