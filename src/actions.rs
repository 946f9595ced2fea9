//! Action types and their opaque identity.
//!
//! Actions are the immutable messages the dispatcher routes: the runtime type
//! of an action decides which reducers process it. This module defines the
//! [`Action`] marker trait implemented by user action types and
//! [`ActionTypeId`], the opaque identity value the rest of the crate keys on.
//!
//! Identity is the host type's identity ([`std::any::TypeId`]); the carried
//! name exists only for diagnostics and emission and never participates in
//! comparisons beyond what type identity already implies.
//!
//! # Examples
//!
//! ```rust
//! use fluxtable::actions::{Action, ActionTypeId};
//!
//! #[derive(Debug)]
//! struct LoginCompleted {
//!     user: String,
//! }
//! impl Action for LoginCompleted {}
//!
//! let id = ActionTypeId::of::<LoginCompleted>();
//! assert_eq!(id, ActionTypeId::of::<LoginCompleted>());
//! assert_eq!(id.short_name(), "LoginCompleted");
//! ```

use std::any::{Any, TypeId};
use std::fmt;

/// Marker trait for dispatchable action types.
///
/// An action is an immutable message; the dispatcher inspects only its
/// runtime type, never its payload. Implementations carry whatever data
/// their reducers need.
///
/// The `Any` supertrait is what lets the runtime artifact hand a type-erased
/// `&dyn Any` to reducer closures; `Send` keeps compiled tables transferable
/// across threads.
pub trait Action: Any + Send {}

/// Opaque identifier for an action type.
///
/// Participates in the subtype relation answered by
/// [`TypeRelation`](crate::hierarchy::TypeRelation). Two ids are equal
/// exactly when they identify the same host type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionTypeId {
    type_id: TypeId,
    name: &'static str,
}

impl ActionTypeId {
    /// Identity of the action type `A`.
    #[must_use]
    pub fn of<A: Action>() -> Self {
        Self {
            type_id: TypeId::of::<A>(),
            name: std::any::type_name::<A>(),
        }
    }

    /// Fully qualified type name, as reported by the host compiler.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Unqualified type name (the last path segment), used by emitters.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl fmt::Debug for ActionTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActionTypeId").field(&self.name).finish()
    }
}

impl fmt::Display for ActionTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
