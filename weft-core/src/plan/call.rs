//! Calls and Plans
//!
//! A [`Call`] is one update of one node: the unit the planner orders and the
//! executor runs. A [`Plan`] is the ordered list of calls produced by
//! [`Planner::update`](super::Planner::update).

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::capability::Source;
use crate::error::{Error, Result};
use crate::ids::{SourceId, UpdateId};

/// Identity of a call: `(node, update)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CallKey {
    /// The node the update runs on.
    pub source: SourceId,
    /// The update.
    pub update: UpdateId,
}

/// One update of one node.
#[derive(Clone)]
pub struct Call {
    node: Arc<dyn Source>,
    update: UpdateId,
}

impl Call {
    pub(crate) fn new(node: Arc<dyn Source>, update: UpdateId) -> Self {
        Self { node, update }
    }

    /// Identity of the call.
    pub fn key(&self) -> CallKey {
        CallKey {
            source: self.node.source_id(),
            update: self.update,
        }
    }

    /// Identity of the node the call runs on.
    pub fn source_id(&self) -> SourceId {
        self.node.source_id()
    }

    /// The update this call runs.
    pub fn update(&self) -> UpdateId {
        self.update
    }

    /// The node this call runs on.
    pub fn node(&self) -> &Arc<dyn Source> {
        &self.node
    }

    /// Run the update.
    pub fn run(&self) -> Result<()> {
        let node = self.node.as_node().ok_or(Error::NotANode {
            source_id: self.node.source_id(),
        })?;
        node.update(self.update)
    }

    /// Human readable label, e.g. `#3 Jacobian.UpdateValue`.
    pub fn label(&self) -> String {
        let update = self
            .node
            .as_node()
            .map(|n| n.update_name(self.update))
            .unwrap_or("<not a node>");
        format!(
            "{} {}.{}",
            self.node.source_id(),
            self.node.outputs().type_name(),
            update
        )
    }
}

impl PartialEq for Call {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Call {}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Serializable description of a planned call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    /// The node the update runs on.
    pub source: SourceId,
    /// Type name of the node.
    pub node_type: &'static str,
    /// The update.
    pub update: UpdateId,
    /// Display name of the update.
    pub update_name: &'static str,
}

/// Size of the last compiled plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlanStats {
    /// Distinct calls scheduled.
    pub calls: usize,
    /// Distinct dependency edges between calls.
    pub edges: usize,
    /// Distinct `(source, output)` pairs resolved during discovery.
    pub resolved_outputs: usize,
    /// Interest sets the plan was compiled from.
    pub interests: usize,
}

/// Dependency-consistent sequence of calls.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    calls: Vec<Call>,
}

impl Plan {
    pub(crate) fn new(calls: Vec<Call>) -> Self {
        Self { calls }
    }

    /// Get the number of calls.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether the plan schedules nothing.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// The calls in run order.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Iterate over the calls in run order.
    pub fn iter(&self) -> std::slice::Iter<'_, Call> {
        self.calls.iter()
    }

    /// Position of a call in the plan.
    pub fn position(&self, key: &CallKey) -> Option<usize> {
        self.calls.iter().position(|c| c.key() == *key)
    }

    /// Whether the plan schedules the call.
    pub fn contains(&self, key: &CallKey) -> bool {
        self.position(key).is_some()
    }

    /// Keys of every call, in plan order.
    pub fn keys(&self) -> Vec<CallKey> {
        self.calls.iter().map(Call::key).collect()
    }

    /// Serializable description of every call, in plan order.
    pub fn describe(&self) -> Vec<PlanEntry> {
        self.calls
            .iter()
            .map(|call| PlanEntry {
                source: call.source_id(),
                node_type: call.node.outputs().type_name(),
                update: call.update,
                update_name: call
                    .node
                    .as_node()
                    .map(|n| n.update_name(call.update))
                    .unwrap_or("<not a node>"),
            })
            .collect()
    }

    /// JSON dump of [`describe`](Self::describe), for debugging.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.describe())
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Call;
    type IntoIter = std::slice::Iter<'a, Call>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.iter()
    }
}
