//! Subtype relation oracle and the declared type hierarchy backing it.
//!
//! The dispatch table builder never inspects action types itself; it only
//! asks an oracle "is `A` a subtype of (or the same as) `B`?". The original
//! system answered that question with host reflection. Rust exposes no
//! subtype metadata for arbitrary types, so this module supplies the
//! documented alternative: an explicit, author-declared hierarchy graph.
//!
//! - [`TypeRelation`] is the oracle capability consumed by the builder and
//!   the runtime dispatcher.
//! - [`TypeHierarchy`] implements it from declared `subtype_of` edges, with
//!   the reflexive–transitive closure computed once, up front.
//!
//! A query naming a type the oracle has never seen is a hard error, never a
//! silent "no relation": incomplete subtype facts would otherwise corrupt
//! the table's ordering invariant without any visible symptom.
//!
//! # Examples
//!
//! ```rust
//! use fluxtable::actions::Action;
//! use fluxtable::hierarchy::{TypeHierarchy, TypeRelation};
//! use fluxtable::actions::ActionTypeId;
//!
//! struct Base;
//! impl Action for Base {}
//! struct Derived;
//! impl Action for Derived {}
//!
//! let hierarchy = TypeHierarchy::builder()
//!     .subtype_of::<Derived, Base>()
//!     .build()
//!     .unwrap();
//!
//! let base = ActionTypeId::of::<Base>();
//! let derived = ActionTypeId::of::<Derived>();
//! assert!(hierarchy.is_subtype_or_equal(derived, base).unwrap());
//! assert!(!hierarchy.is_subtype_or_equal(base, derived).unwrap());
//! ```

#[cfg(feature = "petgraph-compat")]
mod petgraph_compat;

#[cfg(feature = "petgraph-compat")]
pub use petgraph_compat::{HierarchyConversion, HierarchyDiGraph, TypeIndexMap};

use miette::Diagnostic;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::actions::{Action, ActionTypeId};

/// Oracle answering subtype queries over the closed set of declared action
/// types.
///
/// Consumed by [`DispatchTableBuilder`](crate::tables::DispatchTableBuilder)
/// during compilation and by [`Dispatcher`](crate::dispatcher::Dispatcher)
/// when resolving a concrete action type to a table entry.
pub trait TypeRelation: Send + Sync {
    /// True when `sub` is `sup` itself or a (transitive) subtype of it.
    ///
    /// # Errors
    ///
    /// Fails when either type is outside the oracle's declared set. Callers
    /// on the analysis path must abort on this error rather than assume "no
    /// relation".
    fn is_subtype_or_equal(
        &self,
        sub: ActionTypeId,
        sup: ActionTypeId,
    ) -> Result<bool, RelationError>;

    /// Whether the oracle knows `ty` at all.
    ///
    /// The runtime dispatcher uses this to turn actions of never-declared
    /// types into a clean unhandled outcome instead of an oracle error.
    fn contains(&self, ty: ActionTypeId) -> bool;
}

/// Failure answering a subtype query.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum RelationError {
    /// A query named a type outside the declared set.
    #[error("unknown action type in subtype query: {type_name}")]
    #[diagnostic(
        code(fluxtable::hierarchy::unknown_type),
        help("Register the type with TypeHierarchyBuilder::register or declare it in a subtype_of edge.")
    )]
    UnknownType { type_name: &'static str },
}

/// Failure constructing a [`TypeHierarchy`] from declared edges.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum HierarchyError {
    /// The declared `subtype_of` edges contain a cycle.
    #[error("cycle in declared type hierarchy involving {type_name}")]
    #[diagnostic(
        code(fluxtable::hierarchy::cycle),
        help("Subtype declarations must form a DAG; remove the circular subtype_of edge.")
    )]
    CycleDetected { type_name: &'static str },
}

/// Author-declared action type hierarchy.
///
/// Immutable once built: the reflexive–transitive ancestor closure is
/// computed by [`TypeHierarchyBuilder::build`] and queries afterwards are
/// pure lookups.
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    /// Declaration order, preserved for iteration and graph export.
    types: Vec<ActionTypeId>,
    /// Direct supertype edges as declared.
    parents: FxHashMap<ActionTypeId, Vec<ActionTypeId>>,
    /// Reflexive–transitive closure: every type maps to itself plus all
    /// ancestors.
    ancestors: FxHashMap<ActionTypeId, FxHashSet<ActionTypeId>>,
}

impl TypeHierarchy {
    /// Start declaring a hierarchy.
    #[must_use]
    pub fn builder() -> TypeHierarchyBuilder {
        TypeHierarchyBuilder::new()
    }

    /// Declared types, in declaration order.
    #[must_use]
    pub fn types(&self) -> &[ActionTypeId] {
        &self.types
    }

    /// Direct declared supertypes of `ty`, in declaration order.
    #[must_use]
    pub fn direct_supertypes(&self, ty: ActionTypeId) -> &[ActionTypeId] {
        self.parents.get(&ty).map_or(&[], Vec::as_slice)
    }
}

impl TypeRelation for TypeHierarchy {
    fn is_subtype_or_equal(
        &self,
        sub: ActionTypeId,
        sup: ActionTypeId,
    ) -> Result<bool, RelationError> {
        if !self.contains(sup) {
            return Err(RelationError::UnknownType {
                type_name: sup.name(),
            });
        }
        let ancestors = self
            .ancestors
            .get(&sub)
            .ok_or(RelationError::UnknownType {
                type_name: sub.name(),
            })?;
        Ok(ancestors.contains(&sup))
    }

    fn contains(&self, ty: ActionTypeId) -> bool {
        self.ancestors.contains_key(&ty)
    }
}

/// Fluent builder collecting type registrations and `subtype_of` edges.
///
/// Declaration order is meaningful: it is the enumeration order downstream
/// consumers (the table builder's action type set, graph export) observe for
/// otherwise-unordered types.
#[derive(Debug, Default)]
pub struct TypeHierarchyBuilder {
    types: Vec<ActionTypeId>,
    seen: FxHashSet<ActionTypeId>,
    edges: Vec<(ActionTypeId, ActionTypeId)>,
}

impl TypeHierarchyBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `A` as a member of the hierarchy with no supertypes of its
    /// own. Redundant registration is a no-op.
    #[must_use]
    pub fn register<A: Action>(mut self) -> Self {
        self.register_id(ActionTypeId::of::<A>());
        self
    }

    /// Declares `Sub` as a direct subtype of `Sup`, registering both ends.
    #[must_use]
    pub fn subtype_of<Sub: Action, Sup: Action>(mut self) -> Self {
        let sub = ActionTypeId::of::<Sub>();
        let sup = ActionTypeId::of::<Sup>();
        self.register_id(sub);
        self.register_id(sup);
        self.edges.push((sub, sup));
        self
    }

    fn register_id(&mut self, ty: ActionTypeId) {
        if self.seen.insert(ty) {
            self.types.push(ty);
        }
    }

    /// Computes the ancestor closure and finalizes the hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::CycleDetected`] when the declared edges do
    /// not form a DAG (this includes a type declared as its own subtype).
    pub fn build(self) -> Result<TypeHierarchy, HierarchyError> {
        let mut parents: FxHashMap<ActionTypeId, Vec<ActionTypeId>> = FxHashMap::default();
        for ty in &self.types {
            parents.entry(*ty).or_default();
        }
        for (sub, sup) in &self.edges {
            let direct = parents.entry(*sub).or_default();
            if !direct.contains(sup) {
                direct.push(*sup);
            }
        }

        let mut ancestors: FxHashMap<ActionTypeId, FxHashSet<ActionTypeId>> = FxHashMap::default();
        let mut in_progress: FxHashSet<ActionTypeId> = FxHashSet::default();
        for ty in &self.types {
            Self::close_over(*ty, &parents, &mut ancestors, &mut in_progress)?;
        }

        Ok(TypeHierarchy {
            types: self.types,
            parents,
            ancestors,
        })
    }

    /// Depth-first closure with an in-progress set for cycle detection.
    fn close_over(
        ty: ActionTypeId,
        parents: &FxHashMap<ActionTypeId, Vec<ActionTypeId>>,
        ancestors: &mut FxHashMap<ActionTypeId, FxHashSet<ActionTypeId>>,
        in_progress: &mut FxHashSet<ActionTypeId>,
    ) -> Result<(), HierarchyError> {
        if ancestors.contains_key(&ty) {
            return Ok(());
        }
        if !in_progress.insert(ty) {
            return Err(HierarchyError::CycleDetected {
                type_name: ty.name(),
            });
        }

        let mut closure: FxHashSet<ActionTypeId> = FxHashSet::default();
        closure.insert(ty);
        if let Some(direct) = parents.get(&ty) {
            for sup in direct.clone() {
                Self::close_over(sup, parents, ancestors, in_progress)?;
                if let Some(sup_closure) = ancestors.get(&sup) {
                    closure.extend(sup_closure.iter().copied());
                }
            }
        }

        in_progress.remove(&ty);
        ancestors.insert(ty, closure);
        Ok(())
    }
}
