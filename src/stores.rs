//! Stores: typed state containers and the runtime registry of their slots.
//!
//! A store owns exactly one state value. Dispatch never mutates that value
//! in place; a reducer returns a replacement and the registry swaps it in.
//! At the type level a store is just a marker type with an associated
//! `State` — the registry holds the actual values, type-erased, keyed by
//! [`StoreId`].
//!
//! # Examples
//!
//! ```rust
//! use fluxtable::stores::{Store, StoreRegistry};
//!
//! struct SessionStore;
//! impl Store for SessionStore {
//!     type State = Option<String>;
//! }
//!
//! let registry = StoreRegistry::new().with_store::<SessionStore>(None);
//! assert_eq!(registry.state::<SessionStore>(), Some(&None));
//! ```

use std::any::{Any, TypeId};
use std::fmt;

use rustc_hash::FxHashMap;

/// Marker trait for store types.
///
/// The store type itself carries no data; it names a state slot and fixes
/// the slot's state type. Reducer descriptors reference stores through
/// [`StoreId`], and the runtime dispatcher resolves those ids against a
/// [`StoreRegistry`].
pub trait Store: 'static {
    /// The state value this store owns.
    type State: Send + 'static;
}

/// Opaque identifier for a store type. Identity by underlying type identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId {
    type_id: TypeId,
    name: &'static str,
}

impl StoreId {
    /// Identity of the store type `S`.
    #[must_use]
    pub fn of<S: Store>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        }
    }

    /// Fully qualified store type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Unqualified store type name, used by emitters.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl fmt::Debug for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StoreId").field(&self.name).finish()
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Runtime registry mapping store identity to the store's current state.
///
/// Supplied by the caller when constructing a
/// [`Dispatcher`](crate::dispatcher::Dispatcher); the dispatcher validates
/// at construction that every store a compiled reducer targets has a slot
/// here. State slots are replaced wholesale, in reducer order, during a
/// dispatch pass.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    slots: FxHashMap<StoreId, StateSlot>,
}

/// Type-erased state cell for one store.
struct StateSlot {
    state: Box<dyn Any + Send>,
}

impl fmt::Debug for StateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSlot").finish_non_exhaustive()
    }
}

impl StoreRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a store with its initial state.
    ///
    /// Registering the same store twice replaces the earlier initial state.
    #[must_use]
    pub fn with_store<S: Store>(mut self, initial: S::State) -> Self {
        self.insert::<S>(initial);
        self
    }

    /// Registers a store with its initial state.
    pub fn insert<S: Store>(&mut self, initial: S::State) {
        self.slots.insert(
            StoreId::of::<S>(),
            StateSlot {
                state: Box::new(initial),
            },
        );
    }

    /// Current state of store `S`, if registered.
    #[must_use]
    pub fn state<S: Store>(&self) -> Option<&S::State> {
        self.slots
            .get(&StoreId::of::<S>())
            .and_then(|slot| slot.state.downcast_ref::<S::State>())
    }

    /// Whether a slot exists for `id`.
    #[must_use]
    pub fn contains(&self, id: StoreId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Number of registered stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no store is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Type-erased view of a store's current state.
    pub(crate) fn raw_state(&self, id: StoreId) -> Option<&(dyn Any + Send)> {
        self.slots.get(&id).map(|slot| slot.state.as_ref())
    }

    /// Replaces a store's state wholesale. Returns false when the store has
    /// no slot.
    pub(crate) fn replace_raw(&mut self, id: StoreId, state: Box<dyn Any + Send>) -> bool {
        match self.slots.get_mut(&id) {
            Some(slot) => {
                slot.state = state;
                true
            }
            None => false,
        }
    }
}
