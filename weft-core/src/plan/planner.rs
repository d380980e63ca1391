//! Planner
//!
//! The planner turns interest sets into a [`Plan`] and runs it.
//!
//! # Algorithm
//!
//! `update()` works in two phases:
//!
//! 1. Discovery. Every `(source, output)` pair of every interest set is
//!    resolved into the calls that make it fresh:
//!    - a direct dependency resolves to whatever its alias resolves to
//!    - an output of a node resolves to one call per producing update
//!    - an output of a plain source resolves to nothing
//!
//!    A call is created the first time it is seen. Creating it resolves its
//!    internal dependencies into sibling calls and its input dependencies
//!    through the same output resolution, recording an edge to every call
//!    found. Output resolution is memoized by `(SourceId, OutputId)`, so a
//!    value needed along several paths is scheduled once.
//!
//! 2. Compilation. The calls and edges are loaded into a fresh
//!    [`Digraph`], whose topological order becomes the plan. A cycle
//!    anywhere aborts the update and no partial plan is produced.
//!
//! Both phases only build metadata. If either fails, the previous plan is
//! still there and can keep running.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

use crate::capability::Source;
use crate::error::{Error, Result};
use crate::graph::Digraph;
use crate::ids::{OutputId, SourceId, UpdateId};
use crate::node::Node;

use super::call::{Call, CallKey, Plan, PlanStats};
use super::config::PlannerConfig;
use super::interest::InterestSet;

type Resolved = SmallVec<[usize; 2]>;

/// Accumulates interest sets, compiles them into a plan and executes it.
#[derive(Debug, Default)]
pub struct Planner {
    config: PlannerConfig,
    interests: Vec<InterestSet>,
    plan: Option<Plan>,
    stats: Option<PlanStats>,
}

impl Planner {
    /// Create an empty planner with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a planner with the given configuration.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Queue an interest set for the next `update()`.
    ///
    /// The current plan is not affected.
    pub fn add(&mut self, interest: InterestSet) {
        self.interests.push(interest);
    }

    /// Number of queued interest sets.
    pub fn interest_count(&self) -> usize {
        self.interests.len()
    }

    /// The interest sets added so far, in order.
    pub fn interests(&self) -> &[InterestSet] {
        &self.interests
    }

    /// Discover and compile a new plan, replacing the current one.
    pub fn update(&mut self) -> Result<()> {
        let compiled = Discovery::run(&self.interests).and_then(Discovery::compile);

        match compiled {
            Ok((plan, mut stats)) => {
                stats.interests = self.interests.len();
                tracing::debug!(
                    calls = stats.calls,
                    edges = stats.edges,
                    resolved_outputs = stats.resolved_outputs,
                    interests = stats.interests,
                    "Compiled update plan"
                );
                self.plan = Some(plan);
                self.stats = Some(stats);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kept_previous = self.plan.is_some(),
                    "Plan compilation failed"
                );
                Err(e)
            }
        }
    }

    /// Run every call of the current plan once, in order.
    pub fn execute(&self) -> Result<()> {
        let plan = self.plan.as_ref().ok_or(Error::NoPlan)?;
        for call in plan {
            if self.config.trace_execution {
                tracing::trace!(call = %call.label(), "Running update");
            }
            call.run()?;
        }
        Ok(())
    }

    /// The current plan, if `update()` has succeeded.
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    /// Size of the current plan.
    pub fn stats(&self) -> Option<PlanStats> {
        self.stats
    }

    /// Drop every interest set and the current plan.
    pub fn clear(&mut self) {
        tracing::debug!(interests = self.interests.len(), "Clearing planner");
        self.interests.clear();
        self.plan = None;
        self.stats = None;
    }
}

/// State of one discovery pass.
#[derive(Default)]
struct Discovery {
    /// Call identity -> call; the position is the graph node index.
    calls: IndexMap<CallKey, Call>,

    /// `(from, to)`: call `from` depends on call `to`.
    edges: IndexSet<(usize, usize)>,

    /// Memoized output resolution.
    resolved: HashMap<(SourceId, OutputId), Resolved>,

    /// Direct dependencies being followed, to catch alias loops.
    aliasing: HashSet<(SourceId, OutputId)>,

    /// The object behind every id seen so far.
    owners: HashMap<SourceId, Arc<dyn Source>>,
}

impl Discovery {
    fn run(interests: &[InterestSet]) -> Result<Self> {
        let mut discovery = Self::default();
        for interest in interests {
            for (source, output) in interest.iter() {
                discovery.resolve_output(source, output)?;
            }
        }
        Ok(discovery)
    }

    /// Calls that must run for `output` of `source` to be fresh.
    fn resolve_output(&mut self, source: &Arc<dyn Source>, output: OutputId) -> Result<Resolved> {
        self.claim(source)?;
        let key = (source.source_id(), output);
        if let Some(resolved) = self.resolved.get(&key) {
            return Ok(resolved.clone());
        }
        source.check_output(output)?;

        let Some(node) = source.as_node() else {
            self.resolved.insert(key, Resolved::new());
            return Ok(Resolved::new());
        };

        let resolved = match node.dependencies().direct(output) {
            Some(alias) => {
                if !self.aliasing.insert(key) {
                    tracing::warn!(
                        source = %key.0,
                        output = source.output_name(output),
                        "Direct dependencies alias each other"
                    );
                    return Err(Error::Cycle { nodes: Vec::new() });
                }
                let resolved = self.resolve_output(alias.source(), alias.output())?;
                self.aliasing.remove(&key);
                resolved
            }
            None => {
                let mut resolved = Resolved::new();
                for &update in node.dependencies().producers(output) {
                    resolved.push(self.call(source, node, update)?);
                }
                resolved
            }
        };

        self.resolved.insert(key, resolved.clone());
        Ok(resolved)
    }

    /// Record `source` as the owner of its id.
    ///
    /// Memoization is keyed by id: two objects sharing one are an error.
    fn claim(&mut self, source: &Arc<dyn Source>) -> Result<()> {
        let source_id = source.source_id();
        match self.owners.get(&source_id) {
            Some(owner) if Arc::ptr_eq(owner, source) => Ok(()),
            Some(_) => Err(Error::DuplicateSourceId { source_id }),
            None => {
                self.owners.insert(source_id, Arc::clone(source));
                Ok(())
            }
        }
    }

    /// Index of the call `(node, update)`, creating it on first sight.
    fn call(&mut self, source: &Arc<dyn Source>, node: &dyn Node, update: UpdateId) -> Result<usize> {
        let key = CallKey {
            source: node.source_id(),
            update,
        };
        if let Some((index, _, call)) = self.calls.get_full(&key) {
            if !Arc::ptr_eq(call.node(), source) {
                return Err(Error::DuplicateSourceId { source_id: key.source });
            }
            return Ok(index);
        }
        // Insert before recursing so a call reached again through a cycle
        // gets an edge instead of a second entry.
        let (index, _) = self
            .calls
            .insert_full(key, Call::new(Arc::clone(source), update));

        for &dependency in node.dependencies().internal(update) {
            let to = self.call(source, node, dependency)?;
            self.edges.insert((index, to));
        }
        for input in node.dependencies().inputs(update) {
            for to in self.resolve_output(input.source(), input.output())? {
                self.edges.insert((index, to));
            }
        }
        Ok(index)
    }

    fn compile(self) -> Result<(Plan, PlanStats)> {
        let mut graph = Digraph::with_capacity(self.calls.len());
        for _ in 0..self.calls.len() {
            graph.add_node();
        }
        for &(from, to) in &self.edges {
            graph.add_edge(from, to)?;
        }

        let order = match graph.order() {
            Ok(order) => order,
            Err(Error::Cycle { nodes }) => {
                let calls: Vec<String> = nodes
                    .iter()
                    .filter_map(|i| self.calls.get_index(*i))
                    .map(|(_, call)| call.label())
                    .collect();
                tracing::warn!(?calls, "Dependency cycle between calls");
                return Err(Error::Cycle { nodes });
            }
            Err(e) => return Err(e),
        };

        let stats = PlanStats {
            calls: self.calls.len(),
            edges: self.edges.len(),
            resolved_outputs: self.resolved.len(),
            interests: 0,
        };
        let mut slots: Vec<Option<Call>> = self.calls.into_values().map(Some).collect();
        let calls = order.into_iter().filter_map(|i| slots[i].take()).collect();

        Ok((Plan::new(calls), stats))
    }
}
