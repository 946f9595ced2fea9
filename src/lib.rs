//! # Fluxtable: Build-ahead Dispatch Table Compiler for Typed Reducers
//!
//! Fluxtable analyzes a flat set of declared reducer functions — each bound
//! to a store (a typed state container) and an action type — and compiles a
//! single ordered dispatch table that routes any action instance to every
//! applicable reducer, in deterministic order. Analysis runs once, ahead of
//! dispatch; routing afterwards is pure type-directed lookup over immutable
//! data.
//!
//! ## Core Concepts
//!
//! - **Actions**: Immutable messages whose runtime type drives routing
//! - **Stores**: Containers owning one state value each, replaced (never
//!   mutated in place) by reducer results
//! - **Reducers**: Pure `(action, optional prior state) -> new state`
//!   functions with explicit priorities
//! - **Hierarchy**: An author-declared subtype relation between action
//!   types, injected as an oracle
//! - **Dispatch table**: The compiled, specificity-ordered routing
//!   structure; subtypes branch before their supertypes
//!
//! ## Quick Start
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
//! // A store owning a counter.
//! struct CounterStore;
//! impl Store for CounterStore {
//!     type State = i64;
//! }
//!
//! // Actions with a declared subtype edge: Reset is-a CounterAction.
//! struct CounterAction;
//! impl Action for CounterAction {}
//! struct Reset;
//! impl Action for Reset {}
//!
//! let hierarchy = Arc::new(
//!     TypeHierarchy::builder()
//!         .subtype_of::<Reset, CounterAction>()
//!         .build()
//!         .unwrap(),
//! );
//!
//! // Compile the table once...
//! let table = DispatchTableBuilder::new(hierarchy.clone())
//!     .add_reducer(ReducerDescriptor::stateful::<CounterStore, CounterAction, _>(
//!         "count_any",
//!         |_, n| n + 1,
//!     ))
//!     .add_reducer(
//!         ReducerDescriptor::stateless::<CounterStore, Reset, _>("reset", |_| 0)
//!             .with_priority(10),
//!     )
//!     .compile()
//!     .unwrap();
//!
//! // ...and route against it.
//! let stores = StoreRegistry::new().with_store::<CounterStore>(0);
//! let mut dispatcher = Dispatcher::new(table, stores, hierarchy).unwrap();
//!
//! dispatcher.route(&CounterAction).unwrap();
//! assert_eq!(dispatcher.state::<CounterStore>(), Some(&1));
//!
//! // Reset fires its own reducer first (priority 10), then the inherited
//! // CounterAction reducer — exactly one table entry fires.
//! let outcome = dispatcher.route(&Reset).unwrap();
//! assert!(matches!(outcome, RouteOutcome::Handled { reducers_applied: 2, .. }));
//! assert_eq!(dispatcher.state::<CounterStore>(), Some(&1));
//! ```
//!
//! ## Emitting the Table
//!
//! The compiled table is plain data; emitters render it for external build
//! steps without touching the builder:
//!
//! ```rust
//! use fluxtable::emit::{JsonEmitter, TableEmitter};
//! # use std::sync::Arc;
//! # use fluxtable::hierarchy::TypeHierarchy;
//! # use fluxtable::tables::DispatchTableBuilder;
//! # let hierarchy = Arc::new(TypeHierarchy::builder().build().unwrap());
//! # let table = DispatchTableBuilder::new(hierarchy).compile().unwrap();
//! let json = JsonEmitter::pretty().emit(&table).unwrap();
//! ```
//!
//! ## Routing Guarantees
//!
//! - Exactly one table entry fires per action (or none: unmatched actions
//!   are dropped, which is a valid outcome, not an error)
//! - Within the fired entry, reducers run in ascending priority order;
//!   equal priorities keep declaration order
//! - A store's state is replaced after each of its reducers, so same-store
//!   reducers later in the entry observe the earlier result; stores are
//!   updated sequentially, never snapshotted mid-pass
//!
//! ## Module Guide
//!
//! - [`actions`] - Action marker trait and opaque type identity
//! - [`hierarchy`] - Subtype oracle and the declared hierarchy backing it
//! - [`reducers`] - Reducer descriptors and typed constructors
//! - [`stores`] - Store trait and the runtime state registry
//! - [`tables`] - Table data model and the compilation algorithm
//! - [`dispatcher`] - The runtime routing artifact
//! - [`emit`] - Table projection and textual emitters
//! - [`telemetry`] - Tracing subscriber setup

pub mod actions;
pub mod dispatcher;
pub mod emit;
pub mod hierarchy;
pub mod reducers;
pub mod stores;
pub mod tables;
pub mod telemetry;
