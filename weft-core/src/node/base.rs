//! Node Base
//!
//! [`NodeBase`] is embedded in every node type. It owns the node's identity,
//! its namespaces, the table mapping each [`UpdateId`] to the callable that
//! performs it, and the node's [`Dependencies`].
//!
//! All declarations are validated when they are made: a node that was
//! constructed without error only references updates it registered and
//! outputs that were enabled at declaration time.

use std::fmt;
use std::sync::Arc;

use crate::capability::{Capabilities, Source, UpdateSet};
use crate::error::{Error, Result};
use crate::ids::{NamespaceIndex, OutputId, SourceId, UpdateId};

use super::dependencies::{Dependencies, InputDependency};

/// Callable bound to one update of a node of type `N`.
pub type UpdateFn<N> = Box<dyn Fn(&N) + Send + Sync>;

/// Identity, dispatch table and declarations of a node of type `N`.
pub struct NodeBase<N> {
    id: SourceId,
    outputs: &'static Capabilities,
    updates: &'static UpdateSet,

    /// Indexed by update id.
    table: Vec<Option<UpdateFn<N>>>,

    dependencies: Dependencies,
}

impl<N: 'static> NodeBase<N> {
    /// Create the base of a node with the given namespaces.
    pub fn new(id: SourceId, outputs: &'static Capabilities, updates: &'static UpdateSet) -> Self {
        let mut table = Vec::with_capacity(updates.len());
        table.resize_with(updates.len(), || None);
        Self {
            id,
            outputs,
            updates,
            table,
            dependencies: Dependencies::default(),
        }
    }

    /// Identity of the node.
    pub fn source_id(&self) -> SourceId {
        self.id
    }

    /// The node type's output namespace.
    pub fn outputs(&self) -> &'static Capabilities {
        self.outputs
    }

    /// The node type's update namespace.
    pub fn updates(&self) -> &'static UpdateSet {
        self.updates
    }

    /// Every dependency declared so far.
    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    /// Whether a callable is bound to `update`.
    pub fn is_registered(&self, update: UpdateId) -> bool {
        matches!(self.table.get(update.index()), Some(Some(_)))
    }

    /// Bind `f` to `update`.
    pub fn register_update<F>(&mut self, update: UpdateId, f: F) -> Result<()>
    where
        F: Fn(&N) + Send + Sync + 'static,
    {
        self.updates.require(update)?;
        if !self.updates.is_statically_enabled(update) {
            return Err(Error::DisabledUpdate {
                source_id: self.id,
                update,
            });
        }
        let slot = &mut self.table[update.index()];
        if slot.is_some() {
            return Err(Error::DuplicateUpdate {
                source_id: self.id,
                update,
            });
        }
        *slot = Some(Box::new(f));
        Ok(())
    }

    /// Bind several updates at once.
    pub fn register_updates<I>(&mut self, updates: I) -> Result<()>
    where
        I: IntoIterator<Item = (UpdateId, UpdateFn<N>)>,
    {
        for (update, f) in updates {
            self.register_update(update, f)?;
        }
        Ok(())
    }

    /// Declare that `update` produces `output`.
    pub fn add_output_dependency(&mut self, output: OutputId, update: UpdateId) -> Result<()> {
        self.check_own_output(output)?;
        self.check_update(update)?;
        if self.dependencies.direct(output).is_some() {
            return Err(Error::ConflictingDependency {
                source_id: self.id,
                output,
                existing: "direct dependency",
            });
        }
        if self.dependencies.has_producer(output, update) {
            return Err(Error::DuplicateDependency {
                source_id: self.id,
                dependency: format!("{output} <- {update}"),
            });
        }
        self.dependencies.push_producer(output, update);
        Ok(())
    }

    /// Declare that `update` produces every output in `outputs`.
    pub fn add_output_dependencies<I>(&mut self, outputs: I, update: UpdateId) -> Result<()>
    where
        I: IntoIterator<Item = OutputId>,
    {
        for output in outputs {
            self.add_output_dependency(output, update)?;
        }
        Ok(())
    }

    /// Declare that `update` needs `depends_on` of the same node run first.
    pub fn add_internal_dependency(&mut self, update: UpdateId, depends_on: UpdateId) -> Result<()> {
        self.check_update(update)?;
        self.check_update(depends_on)?;
        if update == depends_on {
            return Err(Error::SelfDependency {
                source_id: self.id,
                update,
            });
        }
        if self.dependencies.has_internal(update, depends_on) {
            return Err(Error::DuplicateDependency {
                source_id: self.id,
                dependency: format!("{update} -> {depends_on}"),
            });
        }
        self.dependencies.push_internal(update, depends_on);
        Ok(())
    }

    /// Declare that `update` needs `output` of `source` to be fresh first.
    pub fn add_input_dependency(
        &mut self,
        update: UpdateId,
        source: Arc<dyn Source>,
        output: OutputId,
    ) -> Result<()> {
        self.check_update(update)?;
        source.check_output(output)?;
        if self
            .dependencies
            .has_input(update, source.source_id(), output)
        {
            return Err(Error::DuplicateDependency {
                source_id: self.id,
                dependency: format!("{update} -> {}.{}", source.source_id(), output),
            });
        }
        self.dependencies
            .push_input(update, InputDependency::new(source, output));
        Ok(())
    }

    /// Declare that `update` needs every output in `outputs` of `source`.
    pub fn add_input_dependencies<I>(
        &mut self,
        update: UpdateId,
        source: Arc<dyn Source>,
        outputs: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = OutputId>,
    {
        for output in outputs {
            self.add_input_dependency(update, Arc::clone(&source), output)?;
        }
        Ok(())
    }

    /// Declare `output` as an alias of `source_output` on `source`.
    ///
    /// The output has no update of its own: making it fresh means making
    /// the aliased output fresh.
    pub fn add_direct_dependency(
        &mut self,
        output: OutputId,
        source: Arc<dyn Source>,
        source_output: OutputId,
    ) -> Result<()> {
        self.check_own_output(output)?;
        if !self.dependencies.producers(output).is_empty() {
            return Err(Error::ConflictingDependency {
                source_id: self.id,
                output,
                existing: "produced output",
            });
        }
        if self.dependencies.direct(output).is_some() {
            return Err(Error::DuplicateDependency {
                source_id: self.id,
                dependency: format!("{output} = alias"),
            });
        }
        source.check_output(source_output)?;
        self.dependencies
            .set_direct(output, InputDependency::new(source, source_output));
        Ok(())
    }

    /// Run the callable bound to `update` on `node`.
    pub fn run(&self, node: &N, update: UpdateId) -> Result<()> {
        self.updates.require(update)?;
        if !self.updates.is_statically_enabled(update) {
            return Err(Error::DisabledUpdate {
                source_id: self.id,
                update,
            });
        }
        match self.table.get(update.index()) {
            Some(Some(f)) => {
                f(node);
                Ok(())
            }
            _ => Err(Error::UnregisteredUpdate {
                source_id: self.id,
                update,
            }),
        }
    }

    fn check_own_output(&self, output: OutputId) -> Result<()> {
        self.outputs.require(output)?;
        if !self.outputs.is_statically_enabled(output) {
            return Err(Error::DisabledOutput {
                source_id: self.id,
                output,
            });
        }
        Ok(())
    }

    fn check_update(&self, update: UpdateId) -> Result<()> {
        self.updates.require(update)?;
        if !self.updates.is_statically_enabled(update) {
            return Err(Error::DisabledUpdate {
                source_id: self.id,
                update,
            });
        }
        if !self.is_registered(update) {
            return Err(Error::UnregisteredUpdate {
                source_id: self.id,
                update,
            });
        }
        Ok(())
    }
}

impl<N> fmt::Debug for NodeBase<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeBase")
            .field("id", &self.id)
            .field("type", &self.outputs.type_name())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
