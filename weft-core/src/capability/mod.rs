//! Capabilities
//!
//! Every source type declares the outputs it can expose, and every node type
//! the updates it can run. Both are described by a [`Namespace`]: a
//! build-once descriptor composed from the base type's namespace plus the
//! type's own additions.
//!
//! # Declaring a type
//!
//! Namespaces are usually built once per type and kept in a static:
//!
//! ```rust
//! use std::sync::LazyLock;
//! use weft_core::capability::Capabilities;
//!
//! static FUNCTION: LazyLock<Capabilities> = LazyLock::new(|| {
//!     Capabilities::builder("Function")
//!         .names(["Value", "Jacobian"])
//!         .build()
//!         .expect("function outputs")
//! });
//!
//! assert_eq!(FUNCTION.len(), 2);
//! ```

mod namespace;
mod source;

pub use namespace::{Namespace, NamespaceBuilder};
pub use source::Source;

use crate::ids::{OutputId, UpdateId};

/// Namespace of a source type's outputs.
pub type Capabilities = Namespace<OutputId>;

/// Namespace of a node type's updates.
pub type UpdateSet = Namespace<UpdateId>;
