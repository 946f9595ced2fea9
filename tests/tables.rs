mod common;
use common::*;

use fluxtable::actions::ActionTypeId;
use fluxtable::reducers::{ReducerDescriptor, DEFAULT_PRIORITY};
use fluxtable::tables::DispatchTableBuilder;

/// Aggregation completeness: for every action type T and descriptor d, if T
/// is a subtype of d's accepted type then d appears in T's entry.
#[test]
fn every_entry_aggregates_all_applicable_reducers() {
    use fluxtable::hierarchy::TypeRelation;

    let hierarchy = diamondless_hierarchy();
    let table = DispatchTableBuilder::new(hierarchy.clone())
        .add_reducer(trace_reducer::<TraceStore, Base>("on_base"))
        .add_reducer(trace_reducer::<TraceStore, Derived>("on_derived"))
        .add_reducer(trace_reducer::<OtherStore, Sibling>("on_sibling"))
        .add_action_type::<Unrelated>()
        .compile()
        .unwrap();

    for entry in &table {
        for (accepted, name) in [
            (ActionTypeId::of::<Base>(), "on_base"),
            (ActionTypeId::of::<Derived>(), "on_derived"),
            (ActionTypeId::of::<Sibling>(), "on_sibling"),
        ] {
            let applicable = hierarchy
                .is_subtype_or_equal(entry.entry_type, accepted)
                .unwrap();
            let present = entry.reducers.iter().any(|r| r.name() == name);
            assert_eq!(
                applicable, present,
                "{name} presence in entry {} disagrees with the relation",
                entry.entry_type
            );
        }
    }
}

/// Specificity ordering: strict subtypes precede their supertypes in the
/// table, whatever the declaration order.
#[test]
fn subtype_entries_precede_supertype_entries() {
    let hierarchy = diamondless_hierarchy();

    // Deliberately declare the broad type first.
    let table = DispatchTableBuilder::new(hierarchy)
        .add_reducer(trace_reducer::<TraceStore, Base>("on_base"))
        .add_reducer(trace_reducer::<TraceStore, Derived>("on_derived"))
        .add_reducer(trace_reducer::<TraceStore, Sibling>("on_sibling"))
        .compile()
        .unwrap();

    let position = |ty: ActionTypeId| {
        table
            .iter()
            .position(|e| e.entry_type == ty)
            .expect("entry present")
    };

    assert!(position(ActionTypeId::of::<Derived>()) < position(ActionTypeId::of::<Base>()));
    assert!(position(ActionTypeId::of::<Sibling>()) < position(ActionTypeId::of::<Base>()));
}

/// Recompiling identical input produces the identical entry order.
#[test]
fn compilation_is_reproducible() {
    let build = || {
        DispatchTableBuilder::new(diamondless_hierarchy())
            .add_reducer(trace_reducer::<TraceStore, Sibling>("s"))
            .add_reducer(trace_reducer::<TraceStore, Base>("b"))
            .add_reducer(trace_reducer::<TraceStore, Derived>("d"))
            .add_action_type::<Unrelated>()
            .compile()
            .unwrap()
    };

    let first: Vec<_> = build().iter().map(|e| e.entry_type).collect();
    let second: Vec<_> = build().iter().map(|e| e.entry_type).collect();
    assert_eq!(first, second);
}

/// Unset priorities land on the documented baseline.
#[test]
fn default_priority_is_the_baseline() {
    let descriptor = trace_reducer::<TraceStore, Base>("plain");
    assert_eq!(descriptor.priority(), DEFAULT_PRIORITY);
}

/// Priorities order reducers within an entry; negative values are ordinary
/// priorities that sort ahead of the baseline.
#[test]
fn priority_sort_handles_negative_and_duplicate_values() {
    let table = DispatchTableBuilder::new(diamondless_hierarchy())
        .add_reducer(trace_reducer::<TraceStore, Base>("late").with_priority(50))
        .add_reducer(trace_reducer::<TraceStore, Base>("early").with_priority(-5))
        .add_reducer(trace_reducer::<TraceStore, Base>("tie_a").with_priority(50))
        .add_reducer(trace_reducer::<OtherStore, Base>("tie_b").with_priority(50))
        .compile()
        .unwrap();

    let entry = table.entry(ActionTypeId::of::<Base>()).unwrap();
    let names: Vec<_> = entry.reducers.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["early", "late", "tie_a", "tie_b"]);
}

/// Duplicate declarations of the same accepted type collapse into one
/// entry holding every declaration.
#[test]
fn duplicate_accepted_types_share_one_entry() {
    let table = DispatchTableBuilder::new(diamondless_hierarchy())
        .add_reducer(trace_reducer::<TraceStore, Base>("a"))
        .add_reducer(trace_reducer::<TraceStore, Base>("b"))
        .add_action_type::<Base>()
        .compile()
        .unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.entries()[0].reducers.len(), 2);
}

/// with_priority builds on the typed constructors without disturbing the
/// descriptor's routing fields.
#[test]
fn with_priority_preserves_descriptor_identity() {
    let descriptor = ReducerDescriptor::stateless::<TraceStore, Base, _>("fixed", |_| Vec::new())
        .with_priority(7);
    assert_eq!(descriptor.priority(), 7);
    assert_eq!(descriptor.accepted_type(), ActionTypeId::of::<Base>());
    assert!(!descriptor.needs_prior_state());
}
