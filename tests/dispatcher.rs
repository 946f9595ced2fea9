mod common;
use common::*;

use fluxtable::actions::ActionTypeId;
use fluxtable::dispatcher::{DispatchError, Dispatcher, RouteOutcome};
use fluxtable::reducers::ReducerDescriptor;
use fluxtable::stores::StoreRegistry;
use fluxtable::tables::DispatchTableBuilder;

fn trace_stores() -> StoreRegistry {
    StoreRegistry::new()
        .with_store::<TraceStore>(Vec::new())
        .with_store::<OtherStore>(Vec::new())
}

/// Scenario A: R1 on Base priority 10, R2 on Derived priority 5. A Derived
/// instance executes [R2, R1] and only those; a Base instance executes [R1].
#[test]
fn derived_instance_runs_own_then_inherited_reducers() {
    let hierarchy = diamondless_hierarchy();
    let table = DispatchTableBuilder::new(hierarchy.clone())
        .add_reducer(trace_reducer::<TraceStore, Base>("r1").with_priority(10))
        .add_reducer(trace_reducer::<TraceStore, Derived>("r2").with_priority(5))
        .compile()
        .unwrap();
    let mut dispatcher = Dispatcher::new(table, trace_stores(), hierarchy).unwrap();

    let outcome = dispatcher.route(&Derived).unwrap();
    assert_eq!(
        outcome,
        RouteOutcome::Handled {
            entry_type: ActionTypeId::of::<Derived>(),
            reducers_applied: 2,
        }
    );
    assert_eq!(
        dispatcher.state::<TraceStore>().unwrap(),
        &vec!["r2".to_owned(), "r1".to_owned()]
    );

    let outcome = dispatcher.route(&Base).unwrap();
    assert_eq!(
        outcome,
        RouteOutcome::Handled {
            entry_type: ActionTypeId::of::<Base>(),
            reducers_applied: 1,
        }
    );
    assert_eq!(
        dispatcher.state::<TraceStore>().unwrap(),
        &vec!["r2".to_owned(), "r1".to_owned(), "r1".to_owned()]
    );
}

/// Scenario B: an action type no reducer (and no entry) covers is dropped
/// without touching any store.
#[test]
fn unmatched_action_is_a_noop() {
    let hierarchy = diamondless_hierarchy();
    let table = DispatchTableBuilder::new(hierarchy.clone())
        .add_reducer(trace_reducer::<TraceStore, Derived>("on_derived"))
        .compile()
        .unwrap();
    let mut dispatcher = Dispatcher::new(table, trace_stores(), hierarchy).unwrap();

    assert_eq!(dispatcher.route(&Unrelated).unwrap(), RouteOutcome::Unhandled);
    assert!(dispatcher.state::<TraceStore>().unwrap().is_empty());

    // A type never declared in the hierarchy at all is equally a no-op.
    struct NeverDeclared;
    impl fluxtable::actions::Action for NeverDeclared {}
    assert_eq!(
        dispatcher.route(&NeverDeclared).unwrap(),
        RouteOutcome::Unhandled
    );
}

/// Scenario C: reducers on different stores both accept Base; priority 1
/// runs before priority 2 regardless of store identity, and both stores end
/// up updated.
#[test]
fn cross_store_reducers_run_in_priority_order() {
    let hierarchy = diamondless_hierarchy();
    let table = DispatchTableBuilder::new(hierarchy.clone())
        .add_reducer(trace_reducer::<OtherStore, Base>("second").with_priority(2))
        .add_reducer(trace_reducer::<TraceStore, Base>("first").with_priority(1))
        .compile()
        .unwrap();
    let mut dispatcher = Dispatcher::new(table, trace_stores(), hierarchy).unwrap();

    dispatcher.route(&Base).unwrap();
    assert_eq!(dispatcher.state::<TraceStore>().unwrap(), &vec!["first".to_owned()]);
    assert_eq!(dispatcher.state::<OtherStore>().unwrap(), &vec!["second".to_owned()]);
}

/// State threading: two reducers on the same store within one entry — the
/// second observes the first's output as prior state.
#[test]
fn same_store_reducers_observe_each_other_in_order() {
    let hierarchy = diamondless_hierarchy();
    let table = DispatchTableBuilder::new(hierarchy.clone())
        .add_reducer(trace_reducer::<TraceStore, Base>("a").with_priority(1))
        .add_reducer(trace_reducer::<TraceStore, Base>("b").with_priority(2))
        .compile()
        .unwrap();
    let mut dispatcher = Dispatcher::new(table, trace_stores(), hierarchy).unwrap();

    dispatcher.route(&Base).unwrap();
    // "b" appended onto the state "a" produced.
    assert_eq!(
        dispatcher.state::<TraceStore>().unwrap(),
        &vec!["a".to_owned(), "b".to_owned()]
    );
}

/// Single-fire: a Derived dispatch must not additionally fire the Base
/// entry, even though Base's entry also matches the instance.
#[test]
fn exactly_one_entry_fires_per_action() {
    let hierarchy = diamondless_hierarchy();
    let table = DispatchTableBuilder::new(hierarchy.clone())
        .add_reducer(trace_reducer::<TraceStore, Base>("on_base"))
        .add_reducer(trace_reducer::<TraceStore, Derived>("on_derived"))
        .compile()
        .unwrap();
    let mut dispatcher = Dispatcher::new(table, trace_stores(), hierarchy).unwrap();

    dispatcher.route(&Derived).unwrap();
    let log = dispatcher.state::<TraceStore>().unwrap();
    // The Derived entry holds both reducers; had the Base entry also fired,
    // on_base would appear twice.
    assert_eq!(log.iter().filter(|n| n.as_str() == "on_base").count(), 1);
}

/// Stateless reducers replace state without reading it.
#[test]
fn stateless_reducer_ignores_prior_state() {
    let hierarchy = diamondless_hierarchy();
    let table = DispatchTableBuilder::new(hierarchy.clone())
        .add_reducer(ReducerDescriptor::stateless::<TraceStore, Base, _>(
            "wipe",
            |_| vec!["fresh".to_owned()],
        ))
        .compile()
        .unwrap();
    let stores = StoreRegistry::new().with_store::<TraceStore>(vec!["stale".to_owned()]);
    let mut dispatcher = Dispatcher::new(table, stores, hierarchy).unwrap();

    dispatcher.route(&Base).unwrap();
    assert_eq!(dispatcher.state::<TraceStore>().unwrap(), &vec!["fresh".to_owned()]);
}

/// Repeated dispatches of the same type hit the memoized resolution and
/// still behave identically.
#[test]
fn memoized_resolution_is_stable_across_dispatches() {
    let hierarchy = diamondless_hierarchy();
    let table = DispatchTableBuilder::new(hierarchy.clone())
        .add_reducer(trace_reducer::<TraceStore, Base>("on_base"))
        .compile()
        .unwrap();
    let mut dispatcher = Dispatcher::new(table, trace_stores(), hierarchy).unwrap();

    for _ in 0..3 {
        let outcome = dispatcher.route(&Derived).unwrap();
        assert!(matches!(outcome, RouteOutcome::Handled { .. }));
    }
    assert_eq!(dispatcher.state::<TraceStore>().unwrap().len(), 3);
}

/// Construction validates store slots up front: a table whose reducers
/// target an unregistered store is rejected by name.
#[test]
fn missing_store_slot_fails_construction() {
    let hierarchy = diamondless_hierarchy();
    let table = DispatchTableBuilder::new(hierarchy.clone())
        .add_reducer(trace_reducer::<TraceStore, Base>("on_base"))
        .compile()
        .unwrap();

    let err = Dispatcher::new(table, StoreRegistry::new(), hierarchy).unwrap_err();
    match err {
        DispatchError::UnknownStore { reducer, .. } => assert_eq!(reducer, "on_base"),
        other => panic!("expected UnknownStore, got {other:?}"),
    }
}
