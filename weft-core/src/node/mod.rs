//! Schedulable Nodes
//!
//! A node is a source whose computation is split into named updates. At
//! construction a node binds each update to a callable and declares four
//! kinds of edges:
//!
//! - output dependencies: which updates produce which outputs
//! - internal dependencies: which updates of the same node must run first
//! - input dependencies: which outputs of other entities must be fresh first
//! - direct dependencies: outputs that are aliases of another entity's output
//!
//! Nodes never call each other. The [`Planner`](crate::plan::Planner) reads
//! these declarations and decides the order in which updates run.
//!
//! # Example
//!
//! ```rust
//! use std::sync::LazyLock;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use weft_core::capability::{Capabilities, UpdateSet};
//! use weft_core::node::NodeBase;
//! use weft_core::{IdAllocator, OutputId, Result, UpdateId};
//!
//! static OUTPUTS: LazyLock<Capabilities> =
//!     LazyLock::new(|| Capabilities::builder("Counter").names(["Value"]).build().unwrap());
//! static UPDATES: LazyLock<UpdateSet> =
//!     LazyLock::new(|| UpdateSet::builder("Counter").names(["Step"]).build().unwrap());
//!
//! struct Counter {
//!     base: NodeBase<Counter>,
//!     value: AtomicU32,
//! }
//!
//! impl Counter {
//!     fn new(ids: &IdAllocator) -> Result<Self> {
//!         let mut base = NodeBase::new(ids.next_id(), &OUTPUTS, &UPDATES);
//!         base.register_update(UpdateId::new(0), |c: &Counter| {
//!             c.value.fetch_add(1, Ordering::Relaxed);
//!         })?;
//!         base.add_output_dependency(OutputId::new(0), UpdateId::new(0))?;
//!         Ok(Self { base, value: AtomicU32::new(0) })
//!     }
//! }
//!
//! weft_core::impl_node!(Counter, base);
//! ```

mod base;
mod dependencies;

pub use base::{NodeBase, UpdateFn};
pub use dependencies::{Dependencies, InputDependency};

use crate::capability::{Source, UpdateSet};
use crate::error::Result;
use crate::ids::UpdateId;

/// A source whose outputs are refreshed by scheduled updates.
pub trait Node: Source {
    /// The node's declared dependency edges.
    fn dependencies(&self) -> &Dependencies;

    /// The update namespace of this node's type.
    fn updates(&self) -> &UpdateSet;

    /// Run the callable registered for `update`.
    ///
    /// Fails if `update` is unknown, statically disabled or was never
    /// registered.
    fn update(&self, update: UpdateId) -> Result<()>;

    /// Display name of an update, for logs.
    fn update_name(&self, update: UpdateId) -> &'static str {
        self.updates().name(update).unwrap_or("<unknown>")
    }
}

/// Implement [`Source`] and [`Node`] for a type embedding a
/// [`NodeBase`] field.
///
/// The optional `dynamic = method` form forwards
/// [`Source::is_output_dynamically_enabled`] to `self.method(output)`.
#[macro_export]
macro_rules! impl_node {
    (@node $ty:ty, $base:ident) => {
        impl $crate::node::Node for $ty {
            fn dependencies(&self) -> &$crate::node::Dependencies {
                self.$base.dependencies()
            }

            fn updates(&self) -> &$crate::capability::UpdateSet {
                self.$base.updates()
            }

            fn update(&self, update: $crate::UpdateId) -> $crate::Result<()> {
                self.$base.run(self, update)
            }
        }
    };
    ($ty:ty, $base:ident) => {
        impl $crate::capability::Source for $ty {
            fn source_id(&self) -> $crate::SourceId {
                self.$base.source_id()
            }

            fn outputs(&self) -> &$crate::capability::Capabilities {
                self.$base.outputs()
            }

            fn as_node(&self) -> ::std::option::Option<&dyn $crate::node::Node> {
                ::std::option::Option::Some(self)
            }
        }

        $crate::impl_node!(@node $ty, $base);
    };
    ($ty:ty, $base:ident, dynamic = $predicate:ident) => {
        impl $crate::capability::Source for $ty {
            fn source_id(&self) -> $crate::SourceId {
                self.$base.source_id()
            }

            fn outputs(&self) -> &$crate::capability::Capabilities {
                self.$base.outputs()
            }

            fn is_output_dynamically_enabled(&self, output: $crate::OutputId) -> bool {
                self.$predicate(output)
            }

            fn as_node(&self) -> ::std::option::Option<&dyn $crate::node::Node> {
                ::std::option::Option::Some(self)
            }
        }

        $crate::impl_node!(@node $ty, $base);
    };
}
