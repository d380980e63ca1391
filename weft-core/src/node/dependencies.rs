//! Dependency declarations of a node.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::capability::Source;
use crate::ids::{OutputId, SourceId, UpdateId};

/// An output of another entity: `(source, output)`.
#[derive(Clone)]
pub struct InputDependency {
    source: Arc<dyn Source>,
    output: OutputId,
}

impl InputDependency {
    pub(crate) fn new(source: Arc<dyn Source>, output: OutputId) -> Self {
        Self { source, output }
    }

    /// The entity exposing the output.
    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
    }

    /// Identity of the entity exposing the output.
    pub fn source_id(&self) -> SourceId {
        self.source.source_id()
    }

    /// The output depended upon.
    pub fn output(&self) -> OutputId {
        self.output
    }

    fn same_as(&self, source: SourceId, output: OutputId) -> bool {
        self.source_id() == source && self.output == output
    }
}

impl fmt::Debug for InputDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            self.source.source_id(),
            self.source.output_name(self.output)
        )
    }
}

/// The four dependency maps of a node.
///
/// All maps keep declaration order so planning is deterministic.
#[derive(Debug, Default, Clone)]
pub struct Dependencies {
    /// Output -> updates producing it.
    output: IndexMap<OutputId, SmallVec<[UpdateId; 2]>>,

    /// Update -> updates of the same node that must run first.
    internal: IndexMap<UpdateId, SmallVec<[UpdateId; 4]>>,

    /// Update -> outputs of other entities that must be fresh first.
    input: IndexMap<UpdateId, Vec<InputDependency>>,

    /// Output -> the output it is an alias of.
    direct: IndexMap<OutputId, InputDependency>,
}

impl Dependencies {
    /// Updates producing `output`.
    pub fn producers(&self, output: OutputId) -> &[UpdateId] {
        self.output.get(&output).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Updates of the same node `update` needs run first.
    pub fn internal(&self, update: UpdateId) -> &[UpdateId] {
        self.internal.get(&update).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// External outputs `update` needs fresh first.
    pub fn inputs(&self, update: UpdateId) -> &[InputDependency] {
        self.input.get(&update).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The aliased output if `output` is a proxy.
    pub fn direct(&self, output: OutputId) -> Option<&InputDependency> {
        self.direct.get(&output)
    }

    /// Outputs with at least one producing update, in declaration order.
    pub fn produced_outputs(&self) -> impl Iterator<Item = OutputId> + '_ {
        self.output.keys().copied()
    }

    /// Outputs declared as proxies, in declaration order.
    pub fn direct_outputs(&self) -> impl Iterator<Item = OutputId> + '_ {
        self.direct.keys().copied()
    }

    /// Whether `output` is either produced or proxied.
    pub fn is_declared(&self, output: OutputId) -> bool {
        self.output.contains_key(&output) || self.direct.contains_key(&output)
    }

    /// Every distinct source referenced by input or direct dependencies.
    pub fn sources(&self) -> Vec<Arc<dyn Source>> {
        let mut seen: IndexMap<SourceId, Arc<dyn Source>> = IndexMap::new();
        let inputs = self.input.values().flatten();
        for dep in inputs.chain(self.direct.values()) {
            seen.entry(dep.source_id())
                .or_insert_with(|| Arc::clone(&dep.source));
        }
        seen.into_values().collect()
    }

    pub(crate) fn has_producer(&self, output: OutputId, update: UpdateId) -> bool {
        self.producers(output).contains(&update)
    }

    pub(crate) fn push_producer(&mut self, output: OutputId, update: UpdateId) {
        self.output.entry(output).or_default().push(update);
    }

    pub(crate) fn has_internal(&self, update: UpdateId, depends_on: UpdateId) -> bool {
        self.internal(update).contains(&depends_on)
    }

    pub(crate) fn push_internal(&mut self, update: UpdateId, depends_on: UpdateId) {
        self.internal.entry(update).or_default().push(depends_on);
    }

    pub(crate) fn has_input(&self, update: UpdateId, source: SourceId, output: OutputId) -> bool {
        self.inputs(update).iter().any(|d| d.same_as(source, output))
    }

    pub(crate) fn push_input(&mut self, update: UpdateId, dependency: InputDependency) {
        self.input.entry(update).or_default().push(dependency);
    }

    pub(crate) fn set_direct(&mut self, output: OutputId, dependency: InputDependency) {
        self.direct.insert(output, dependency);
    }
}
