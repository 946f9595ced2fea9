//! Emission: rendering a compiled table into an external artifact.
//!
//! The table builder's output is plain data with no knowledge of any output
//! format; this module is the swappable collaborator that turns it into
//! something a build step can write out. There is no algorithmic content
//! here — emitters fill templates from [`TableSpec`], a serde-friendly
//! projection of the table with inert entries pruned.
//!
//! Two emitters ship with the crate:
//!
//! - [`JsonEmitter`] — the spec as JSON, for build tooling that consumes
//!   the table elsewhere.
//! - [`RustSourceEmitter`] — a routing-function skeleton in `match` shape,
//!   mirroring the class the original build pass generated.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use fluxtable::actions::Action;
//! use fluxtable::emit::{JsonEmitter, TableEmitter, TableSpec};
//! use fluxtable::hierarchy::TypeHierarchy;
//! use fluxtable::reducers::ReducerDescriptor;
//! use fluxtable::stores::Store;
//! use fluxtable::tables::DispatchTableBuilder;
//!
//! struct CounterStore;
//! impl Store for CounterStore {
//!     type State = u32;
//! }
//! struct Tick;
//! impl Action for Tick {}
//!
//! let hierarchy = Arc::new(TypeHierarchy::builder().register::<Tick>().build().unwrap());
//! let table = DispatchTableBuilder::new(hierarchy)
//!     .add_reducer(ReducerDescriptor::stateless::<CounterStore, Tick, _>("on_tick", |_| 0))
//!     .compile()
//!     .unwrap();
//!
//! let spec = TableSpec::project(&table);
//! assert_eq!(spec.entries[0].entry_type, "Tick");
//!
//! let json = JsonEmitter::pretty().emit(&table).unwrap();
//! assert!(json.contains("on_tick"));
//! ```

use std::fmt::Write as _;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tables::DispatchTable;

/// Failure rendering a table.
#[derive(Debug, Error, Diagnostic)]
pub enum EmitError {
    /// JSON serialization of the table spec failed.
    #[error(transparent)]
    #[diagnostic(code(fluxtable::emit::serialize))]
    Serialize(#[from] serde_json::Error),

    /// Formatting into the output buffer failed.
    #[error(transparent)]
    #[diagnostic(code(fluxtable::emit::format))]
    Format(#[from] std::fmt::Error),
}

/// Serde-friendly projection of a compiled table.
///
/// Carries names and routing metadata only; the reducer closures stay in
/// the table. Inert entries are pruned — a branch with no reducers emits
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub entries: Vec<EntrySpec>,
}

/// One emitted branch: an action type and its reducer calls, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySpec {
    pub entry_type: String,
    pub reducers: Vec<ReducerSpec>,
}

/// One reducer call within a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducerSpec {
    pub name: String,
    pub store: String,
    pub priority: i32,
    pub needs_prior_state: bool,
}

impl TableSpec {
    /// Projects a compiled table, pruning inert entries.
    #[must_use]
    pub fn project(table: &DispatchTable) -> Self {
        let entries = table
            .iter()
            .filter(|entry| !entry.is_inert())
            .map(|entry| EntrySpec {
                entry_type: entry.entry_type.short_name().to_owned(),
                reducers: entry
                    .reducers
                    .iter()
                    .map(|descriptor| ReducerSpec {
                        name: descriptor.name().to_owned(),
                        store: descriptor.store().short_name().to_owned(),
                        priority: descriptor.priority(),
                        needs_prior_state: descriptor.needs_prior_state(),
                    })
                    .collect(),
            })
            .collect();
        Self { entries }
    }
}

/// A renderer from compiled table to textual artifact.
///
/// Emitters consume the table read-only and never reach back into builder
/// internals; swapping the output format means swapping the emitter.
pub trait TableEmitter {
    /// Renders the table.
    fn emit(&self, table: &DispatchTable) -> Result<String, EmitError>;
}

/// Emits the table spec as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter {
    pretty: bool,
}

impl JsonEmitter {
    /// Compact output.
    #[must_use]
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Human-readable, indented output.
    #[must_use]
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl TableEmitter for JsonEmitter {
    fn emit(&self, table: &DispatchTable) -> Result<String, EmitError> {
        let spec = TableSpec::project(table);
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&spec)?
        } else {
            serde_json::to_string(&spec)?
        };
        Ok(rendered)
    }
}

/// Emits a first-match routing function skeleton in Rust `match` shape.
///
/// The output is a readable artifact for code review and golden tests, one
/// arm per non-inert entry in table order, each arm listing its reducer
/// calls with the store state threaded the way the runtime dispatcher
/// threads it.
#[derive(Debug, Clone)]
pub struct RustSourceEmitter {
    function_name: String,
}

impl Default for RustSourceEmitter {
    fn default() -> Self {
        Self {
            function_name: "reduce".to_owned(),
        }
    }
}

impl RustSourceEmitter {
    /// Emitter naming the generated routing function `function_name`.
    #[must_use]
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
        }
    }
}

impl TableEmitter for RustSourceEmitter {
    fn emit(&self, table: &DispatchTable) -> Result<String, EmitError> {
        let spec = TableSpec::project(table);
        let mut out = String::new();
        writeln!(out, "fn {}(action: &dyn Action) {{", self.function_name)?;
        writeln!(out, "    match_first! {{ action,")?;
        for entry in &spec.entries {
            writeln!(out, "        is {} => {{", entry.entry_type)?;
            for reducer in &entry.reducers {
                let call = if reducer.needs_prior_state {
                    format!("{}(action, {}.state)", reducer.name, reducer.store)
                } else {
                    format!("{}(action)", reducer.name)
                };
                writeln!(out, "            {}.set_state({call});", reducer.store)?;
            }
            writeln!(out, "        }}")?;
        }
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        Ok(out)
    }
}
