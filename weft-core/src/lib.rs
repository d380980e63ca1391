//! Weft Core
//!
//! This crate provides the update engine of a task-based control library.
//! Computations such as jacobians, positions or constraint residuals are
//! composed at runtime into a web of nodes; the engine refreshes them in
//! dependency order, exactly once per cycle, and only the ones something
//! actually asked for.
//!
//! It implements:
//!
//! - Output and update namespaces with static and dynamic enablement
//! - Schedulable nodes declaring their dependency edges
//! - A generic directed graph with topological ordering and SCC reduction
//! - A planner compiling interest requests into an execution plan
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `capability`: namespaces of outputs/updates and the [`Source`] trait
//! - `node`: the [`Node`] trait and the [`NodeBase`] embedded in node types
//! - `graph`: dependency graph, ordering and strongly connected components
//! - `plan`: interest sets, the planner and its plans
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_core::{InterestSet, Planner};
//!
//! let mut interest = InterestSet::new();
//! interest.add(constraint.clone(), constraint_outputs.id("Value")?)?;
//!
//! let mut planner = Planner::new();
//! planner.add(interest);
//! planner.update()?;
//!
//! // Every control cycle:
//! planner.execute()?;
//! ```
//!
//! [`Source`]: capability::Source
//! [`Node`]: node::Node
//! [`NodeBase`]: node::NodeBase

pub mod capability;
pub mod error;
pub mod graph;
pub mod ids;
pub mod node;
pub mod plan;

pub use error::{Error, Result};
pub use graph::{Digraph, Reduction};
pub use ids::{IdAllocator, OutputId, SourceId, UpdateId};
pub use plan::{InterestSet, Plan, Planner, PlannerConfig};
