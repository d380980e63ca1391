//! Identifiers
//!
//! Sources, outputs and updates are referred to by small integer ids.
//! Output and update ids are dense indices into a type's namespace, while
//! source ids are stable per-object identities handed out by an explicit
//! [`IdAllocator`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Stable identity of a source or node instance.
///
/// Used as the memoization key during planning, so it must never be reused
/// while a planner may still hold entries for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(u64);

impl SourceId {
    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SourceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of an output in a type's flattened capability namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputId(u32);

impl OutputId {
    /// Create an output id from its dense index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output {}", self.0)
    }
}

/// Index of an update step in a node type's update namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UpdateId(u32);

impl UpdateId {
    /// Create an update id from its dense index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for UpdateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "update {}", self.0)
    }
}

/// An id living in a dense namespace.
///
/// Implemented by [`OutputId`] and [`UpdateId`] so that both namespaces
/// share the same descriptor type.
pub trait NamespaceIndex: Copy + Eq + fmt::Display {
    /// Build the id from its position in the namespace.
    fn from_index(index: usize) -> Self;

    /// Position of the id in the namespace.
    fn index(self) -> usize;

    /// Error reported when the id or name is not part of a namespace.
    fn unknown(namespace: &'static str, what: String) -> Error;
}

impl NamespaceIndex for OutputId {
    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }

    fn unknown(namespace: &'static str, what: String) -> Error {
        Error::UnknownOutput {
            namespace,
            output: what,
        }
    }
}

impl NamespaceIndex for UpdateId {
    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }

    fn unknown(namespace: &'static str, what: String) -> Error {
        Error::UnknownUpdate {
            namespace,
            update: what,
        }
    }
}

/// Hands out [`SourceId`]s.
///
/// One allocator is passed to whatever factory builds the nodes of a model,
/// so ids are deterministic for a given construction order.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    /// Create an allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Issue the next unused id.
    pub fn next_id(&self) -> SourceId {
        SourceId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids issued so far (when started at 0).
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ids_are_unique() {
        let ids = IdAllocator::new();
        let id1 = ids.next_id();
        let id2 = ids.next_id();
        assert_ne!(id1, id2);
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn allocators_are_independent_and_deterministic() {
        let a = IdAllocator::new();
        let b = IdAllocator::new();

        assert_eq!(a.next_id(), b.next_id());
        assert_eq!(a.next_id().raw(), 1);
        assert_eq!(IdAllocator::starting_at(10).next_id(), SourceId::from(10));
    }

    #[test]
    fn namespace_index_round_trips_position() {
        assert_eq!(OutputId::from_index(3), OutputId::new(3));
        assert_eq!(UpdateId::new(7).index(), 7);
    }
}
