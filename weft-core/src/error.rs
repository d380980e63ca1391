//! Error types for the update engine.
//!
//! Every error names the identifier that caused it so the layer owning the
//! node graph can report which declaration to fix.

use thiserror::Error;

use crate::ids::{OutputId, SourceId, UpdateId};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for declaration, planning and execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Declaration Errors (E100-E199)
    // =========================================================================
    /// A name appears twice in a namespace chain.
    #[error("E101: Name '{name}' is declared twice in namespace '{namespace}'")]
    DuplicateName {
        /// The namespace being built.
        namespace: &'static str,
        /// The duplicated name.
        name: &'static str,
    },

    /// An output id or name is not part of the namespace.
    #[error("E102: Unknown output {output} for '{namespace}'")]
    UnknownOutput {
        /// The namespace that was queried.
        namespace: &'static str,
        /// Display form of the requested output (id or name).
        output: String,
    },

    /// An update id or name is not part of the namespace.
    #[error("E103: Unknown update {update} for '{namespace}'")]
    UnknownUpdate {
        /// The namespace that was queried.
        namespace: &'static str,
        /// Display form of the requested update (id or name).
        update: String,
    },

    /// The output is statically disabled for this type.
    #[error("E104: Output {output} of source {source_id} is statically disabled")]
    DisabledOutput {
        /// The source exposing the output.
        source_id: SourceId,
        /// The disabled output.
        output: OutputId,
    },

    /// The update is statically disabled for this type.
    #[error("E105: Update {update} of node {source_id} is statically disabled")]
    DisabledUpdate {
        /// The node owning the update.
        source_id: SourceId,
        /// The disabled update.
        update: UpdateId,
    },

    /// A callable is already registered for the update.
    #[error("E106: Update {update} of node {source_id} is registered twice")]
    DuplicateUpdate {
        /// The node owning the update.
        source_id: SourceId,
        /// The update registered twice.
        update: UpdateId,
    },

    /// The update has no registered callable.
    #[error("E107: Update {update} of node {source_id} was never registered")]
    UnregisteredUpdate {
        /// The node owning the update.
        source_id: SourceId,
        /// The missing update.
        update: UpdateId,
    },

    /// The same dependency edge was declared twice.
    #[error("E108: Dependency '{dependency}' declared twice on node {source_id}")]
    DuplicateDependency {
        /// The node the declaration was made on.
        source_id: SourceId,
        /// Description of the repeated edge.
        dependency: String,
    },

    /// An output is declared both as produced by an update and as a proxy.
    #[error("E109: Output {output} of node {source_id} is already declared as {existing}")]
    ConflictingDependency {
        /// The node the declaration was made on.
        source_id: SourceId,
        /// The output with conflicting declarations.
        output: OutputId,
        /// What the output was declared as first.
        existing: &'static str,
    },

    /// An update is declared as its own internal dependency.
    #[error("E110: Update {update} of node {source_id} cannot depend on itself")]
    SelfDependency {
        /// The node the declaration was made on.
        source_id: SourceId,
        /// The update.
        update: UpdateId,
    },

    /// Two distinct objects report the same identity.
    #[error("E111: Source id {source_id} is shared by two different objects")]
    DuplicateSourceId {
        /// The contested id.
        source_id: SourceId,
    },

    // =========================================================================
    // Disabled Output Use (E200-E299)
    // =========================================================================
    /// The output exists but is dynamically disabled on this instance.
    #[error("E201: Output {output} of source {source_id} is not used by this instance")]
    UnusedOutput {
        /// The source exposing the output.
        source_id: SourceId,
        /// The dynamically disabled output.
        output: OutputId,
    },

    // =========================================================================
    // Structural Errors (E300-E399)
    // =========================================================================
    /// The dependency graph contains a cycle.
    #[error("E301: Dependency cycle detected through graph nodes {nodes:?}")]
    Cycle {
        /// Graph node indices found on the cycle.
        nodes: Vec<usize>,
    },

    /// An edge or removal refers to a graph node that does not exist.
    #[error("E302: Graph node {index} does not exist")]
    UnknownGraphNode {
        /// The offending index.
        index: usize,
    },

    // =========================================================================
    // Misuse Errors (E400-E499)
    // =========================================================================
    /// `execute()` was called before any successful `update()`.
    #[error("E401: No plan has been compiled; call update() first")]
    NoPlan,

    /// An update was requested on a source that is not a schedulable node.
    #[error("E402: Source {source_id} is not a schedulable node")]
    NotANode {
        /// The plain source.
        source_id: SourceId,
    },
}

impl Error {
    /// Whether this error comes from the structural (cycle) check.
    pub fn is_cycle(&self) -> bool {
        matches!(self, Error::Cycle { .. })
    }
}
