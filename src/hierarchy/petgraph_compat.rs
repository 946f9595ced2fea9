//! Optional petgraph compatibility layer for the declared type hierarchy.
//!
//! Converts a [`TypeHierarchy`] into a petgraph `DiGraph` (edges run from
//! subtype to direct supertype) for analysis with petgraph's algorithm
//! library, plus DOT export for visualization.
//!
//! # Feature Gate
//!
//! Only available when the `petgraph-compat` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! fluxtable = { version = "0.1", features = ["petgraph-compat"] }
//! ```
//!
//! # Examples
//!
//! ```ignore
//! use fluxtable::hierarchy::TypeHierarchy;
//!
//! let hierarchy = TypeHierarchy::builder()
//!     .subtype_of::<Derived, Base>()
//!     .build()?;
//!
//! let conversion = hierarchy.to_petgraph();
//! assert!(!petgraph::algo::is_cyclic_directed(&conversion.graph));
//!
//! let dot = hierarchy.to_dot();
//! // digraph {
//! //     0 [ label = "Derived" ]
//! //     1 [ label = "Base" ]
//! //     0 -> 1 [ ]
//! // }
//! ```

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use super::TypeHierarchy;
use crate::actions::ActionTypeId;

/// petgraph representation of a declared hierarchy.
///
/// Node weights are the unqualified type names; edge weights are unit.
pub type HierarchyDiGraph = DiGraph<&'static str, ()>;

/// Mapping from [`ActionTypeId`] to petgraph `NodeIndex`.
pub type TypeIndexMap = FxHashMap<ActionTypeId, NodeIndex>;

/// Result of converting a [`TypeHierarchy`] to petgraph form.
#[derive(Debug, Clone)]
pub struct HierarchyConversion {
    /// The petgraph directed graph (subtype -> direct supertype).
    pub graph: HierarchyDiGraph,
    /// Mapping from action type id to petgraph index.
    pub index_map: TypeIndexMap,
}

impl HierarchyConversion {
    /// Look up the petgraph index for an action type.
    #[must_use]
    pub fn index_of(&self, ty: ActionTypeId) -> Option<NodeIndex> {
        self.index_map.get(&ty).copied()
    }
}

impl TypeHierarchy {
    /// Convert the declared hierarchy to a petgraph `DiGraph`.
    ///
    /// Types appear in declaration order; only direct declared edges are
    /// materialized (the transitive closure stays internal).
    #[must_use]
    pub fn to_petgraph(&self) -> HierarchyConversion {
        let mut graph = HierarchyDiGraph::new();
        let mut index_map: TypeIndexMap = FxHashMap::default();

        for ty in self.types() {
            let idx = graph.add_node(ty.short_name());
            index_map.insert(*ty, idx);
        }
        for ty in self.types() {
            for sup in self.direct_supertypes(*ty) {
                if let (Some(&from), Some(&to)) = (index_map.get(ty), index_map.get(sup)) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        HierarchyConversion { graph, index_map }
    }

    /// Export the declared hierarchy in DOT format.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let conversion = self.to_petgraph();
        format!(
            "{:?}",
            Dot::with_config(&conversion.graph, &[Config::EdgeNoLabel])
        )
    }
}
