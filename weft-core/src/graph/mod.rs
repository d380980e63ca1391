//! Dependency Graph
//!
//! A generic directed graph over opaque dense indices. It knows nothing about
//! nodes, updates or calls: the planner maps its calls onto indices, and
//! other layers use it wherever a dependency relation must be linearized.
//!
//! # Overview
//!
//! - Nodes are dense indices `0..n` handed out by [`Digraph::add_node`].
//! - An edge `(from, to)` means `from` depends on `to`.
//! - [`Digraph::order`] gives a topological order or fails on a cycle.
//! - [`Digraph::reduce`] partitions the nodes into strongly connected
//!   components and builds the acyclic graph between them.
//! - [`Digraph::grouped_order`] orders those components.
//!
//! # Design Decisions
//!
//! 1. Both edge directions are stored, so removing a node only touches its
//!    neighbours.
//!
//! 2. Traversals use explicit stacks. A long dependency chain costs heap,
//!    not call-stack depth.
//!
//! 3. Parallel edges collapse into one.

mod digraph;
mod scc;

pub use digraph::Digraph;
pub use scc::Reduction;
