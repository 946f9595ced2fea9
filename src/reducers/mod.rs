//! Reducer descriptors: the analysis-time record of one declared reducer.
//!
//! A reducer is a pure function mapping `(action, optional prior state)` to
//! a replacement state value for exactly one store. The table builder works
//! on [`ReducerDescriptor`]s — flat, immutable records naming the owning
//! store, the accepted action type, an explicit priority, and whether the
//! function also consumes the store's current state.
//!
//! Descriptors are built through the typed constructors
//! ([`stateless`](ReducerDescriptor::stateless) /
//! [`stateful`](ReducerDescriptor::stateful)), which erase the concrete
//! action and state types behind a checked closure. The erasure is what lets
//! one table hold reducers over heterogeneous stores; the checks surface as
//! [`ApplyError`] instead of panics if a table is ever paired with the wrong
//! registry.
//!
//! # Examples
//!
//! ```rust
//! use fluxtable::actions::Action;
//! use fluxtable::reducers::ReducerDescriptor;
//! use fluxtable::stores::Store;
//!
//! struct CounterStore;
//! impl Store for CounterStore {
//!     type State = u32;
//! }
//!
//! struct Increment;
//! impl Action for Increment {}
//!
//! let descriptor = ReducerDescriptor::stateful::<CounterStore, Increment, _>(
//!     "bump",
//!     |_action, count| count + 1,
//! )
//! .with_priority(10);
//!
//! assert_eq!(descriptor.priority(), 10);
//! assert!(descriptor.needs_prior_state());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::actions::{Action, ActionTypeId};
use crate::stores::{Store, StoreId};

/// Baseline priority assigned when a declaration carries none.
///
/// Lower priorities run earlier; ties keep declaration order.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Type-erased reducer application.
///
/// Receives the action and, when the descriptor asks for it, the owning
/// store's current state; returns the replacement state, boxed.
pub type ReducerFn = Arc<
    dyn Fn(&dyn Any, Option<&(dyn Any + Send)>) -> Result<Box<dyn Any + Send>, ApplyError>
        + Send
        + Sync,
>;

/// Failure applying a type-erased reducer.
///
/// These indicate a table paired with a mismatched store registry or a
/// hand-built descriptor; tables assembled through the typed constructors
/// and a validated [`Dispatcher`](crate::dispatcher::Dispatcher) never hit
/// them.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ApplyError {
    /// The routed action is not the type this reducer accepts.
    #[error("reducer {reducer} received an action that is not {expected}")]
    #[diagnostic(code(fluxtable::reducers::action_downcast))]
    ActionDowncast {
        reducer: String,
        expected: &'static str,
    },

    /// The store slot holds state of an unexpected type.
    #[error("reducer {reducer} read prior state that is not {expected}")]
    #[diagnostic(code(fluxtable::reducers::state_downcast))]
    StateDowncast {
        reducer: String,
        expected: &'static str,
    },

    /// The descriptor asks for prior state but none was supplied.
    #[error("reducer {reducer} requires prior state but none was provided")]
    #[diagnostic(code(fluxtable::reducers::missing_prior_state))]
    MissingPriorState { reducer: String },
}

/// Immutable record of one declared reducer function.
///
/// Created once at analysis time; the table builder copies descriptors into
/// every [`DispatchEntry`](crate::tables::DispatchEntry) whose type the
/// reducer applies to.
#[derive(Clone)]
pub struct ReducerDescriptor {
    store: StoreId,
    accepted_type: ActionTypeId,
    priority: i32,
    needs_prior_state: bool,
    name: String,
    apply: ReducerFn,
}

impl ReducerDescriptor {
    /// Descriptor for a reducer that derives the new state from the action
    /// alone.
    pub fn stateless<S, A, F>(name: impl Into<String>, reduce: F) -> Self
    where
        S: Store,
        A: Action,
        F: Fn(&A) -> S::State + Send + Sync + 'static,
    {
        let name = name.into();
        let reducer_name = name.clone();
        let apply: ReducerFn = Arc::new(move |action, _prior| {
            let action = action
                .downcast_ref::<A>()
                .ok_or_else(|| ApplyError::ActionDowncast {
                    reducer: reducer_name.clone(),
                    expected: std::any::type_name::<A>(),
                })?;
            Ok(Box::new(reduce(action)) as Box<dyn Any + Send>)
        });
        Self {
            store: StoreId::of::<S>(),
            accepted_type: ActionTypeId::of::<A>(),
            priority: DEFAULT_PRIORITY,
            needs_prior_state: false,
            name,
            apply,
        }
    }

    /// Descriptor for a reducer that also reads the store's current state.
    pub fn stateful<S, A, F>(name: impl Into<String>, reduce: F) -> Self
    where
        S: Store,
        A: Action,
        F: Fn(&A, &S::State) -> S::State + Send + Sync + 'static,
    {
        let name = name.into();
        let reducer_name = name.clone();
        let apply: ReducerFn = Arc::new(move |action, prior| {
            let action = action
                .downcast_ref::<A>()
                .ok_or_else(|| ApplyError::ActionDowncast {
                    reducer: reducer_name.clone(),
                    expected: std::any::type_name::<A>(),
                })?;
            let prior = prior.ok_or_else(|| ApplyError::MissingPriorState {
                reducer: reducer_name.clone(),
            })?;
            let prior = prior
                .downcast_ref::<S::State>()
                .ok_or_else(|| ApplyError::StateDowncast {
                    reducer: reducer_name.clone(),
                    expected: std::any::type_name::<S::State>(),
                })?;
            Ok(Box::new(reduce(action, prior)) as Box<dyn Any + Send>)
        });
        Self {
            store: StoreId::of::<S>(),
            accepted_type: ActionTypeId::of::<A>(),
            priority: DEFAULT_PRIORITY,
            needs_prior_state: true,
            name,
            apply,
        }
    }

    /// Overrides the baseline priority. Lower runs earlier.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The store this reducer targets.
    #[must_use]
    pub fn store(&self) -> StoreId {
        self.store
    }

    /// The action type this reducer declared as its parameter.
    #[must_use]
    pub fn accepted_type(&self) -> ActionTypeId {
        self.accepted_type
    }

    /// Execution priority within a dispatch entry.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether the reducer also consumes the store's current state.
    #[must_use]
    pub fn needs_prior_state(&self) -> bool {
        self.needs_prior_state
    }

    /// Declared reducer name, used in diagnostics and emission.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the type-erased reducer function.
    pub(crate) fn invoke(
        &self,
        action: &dyn Any,
        prior: Option<&(dyn Any + Send)>,
    ) -> Result<Box<dyn Any + Send>, ApplyError> {
        (self.apply)(action, prior)
    }
}

impl fmt::Debug for ReducerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerDescriptor")
            .field("name", &self.name)
            .field("store", &self.store)
            .field("accepted_type", &self.accepted_type)
            .field("priority", &self.priority)
            .field("needs_prior_state", &self.needs_prior_state)
            .finish_non_exhaustive()
    }
}
