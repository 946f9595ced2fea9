//! Shared action types, stores, and hierarchy fixtures for the integration
//! suites.
//!
//! The hierarchy mirrors the shape the routing guarantees are stated over:
//! `Derived` and `Sibling` are both subtypes of `Base`; `Unrelated` is
//! declared but related to nothing.

// Not every suite touches every fixture.
#![allow(dead_code)]

use std::sync::Arc;

use fluxtable::actions::Action;
use fluxtable::hierarchy::TypeHierarchy;
use fluxtable::stores::Store;

pub struct Base;
impl Action for Base {}

pub struct Derived;
impl Action for Derived {}

pub struct Sibling;
impl Action for Sibling {}

pub struct Unrelated;
impl Action for Unrelated {}

/// Store holding an append-only trace of reducer names, for asserting
/// execution order.
pub struct TraceStore;
impl Store for TraceStore {
    type State = Vec<String>;
}

/// Second trace store, for cross-store scenarios.
pub struct OtherStore;
impl Store for OtherStore {
    type State = Vec<String>;
}

#[allow(dead_code)]
pub fn diamondless_hierarchy() -> Arc<TypeHierarchy> {
    Arc::new(
        TypeHierarchy::builder()
            .subtype_of::<Derived, Base>()
            .subtype_of::<Sibling, Base>()
            .register::<Unrelated>()
            .build()
            .expect("fixture hierarchy is acyclic"),
    )
}

/// A stateful trace reducer: appends its own name to the store's log.
#[allow(dead_code)]
pub fn trace_reducer<S, A>(name: &str) -> fluxtable::reducers::ReducerDescriptor
where
    S: Store<State = Vec<String>>,
    A: Action,
{
    let tag = name.to_owned();
    fluxtable::reducers::ReducerDescriptor::stateful::<S, A, _>(name, move |_action, log| {
        let mut next = log.clone();
        next.push(tag.clone());
        next
    })
}
