//! Directed Graph
//!
//! A dense-index directed graph used to linearize dependency relations.
//! An edge `(from, to)` means "`from` depends on `to`": `to` must come first
//! in any order produced by [`Digraph::order`].
//!
//! Removed indices are tombstoned and never handed out again, so indices a
//! caller holds stay meaningful for the lifetime of the graph.

use smallvec::SmallVec;

use crate::error::{Error, Result};

type Adjacency = SmallVec<[usize; 4]>;

/// Visit state of a node during ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    /// On the active DFS stack.
    Active,
    Done,
}

/// Dense-index directed graph.
#[derive(Debug, Clone, Default)]
pub struct Digraph {
    /// `dependencies[from]`: nodes `from` depends on, in insertion order.
    pub(super) dependencies: Vec<Adjacency>,

    /// `dependents[to]`: nodes depending on `to`.
    pub(super) dependents: Vec<Adjacency>,

    pub(super) alive: Vec<bool>,

    live: usize,
    edge_count: usize,
}

impl Digraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with room for `nodes` nodes.
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            dependencies: Vec::with_capacity(nodes),
            dependents: Vec::with_capacity(nodes),
            alive: Vec::with_capacity(nodes),
            live: 0,
            edge_count: 0,
        }
    }

    /// Build a graph of `nodes` nodes from a list of `(from, to)` edges.
    pub fn from_edges(nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut graph = Self::with_capacity(nodes);
        for _ in 0..nodes {
            graph.add_node();
        }
        for &(from, to) in edges {
            graph.add_edge(from, to)?;
        }
        Ok(graph)
    }

    /// Allocate the next index.
    pub fn add_node(&mut self) -> usize {
        let index = self.alive.len();
        self.dependencies.push(Adjacency::new());
        self.dependents.push(Adjacency::new());
        self.alive.push(true);
        self.live += 1;
        index
    }

    /// Record that `from` must come after `to`.
    ///
    /// Returns `false` if the edge already existed.
    pub fn add_edge(&mut self, from: usize, to: usize) -> Result<bool> {
        self.require(from)?;
        self.require(to)?;
        Ok(self.insert_edge(from, to))
    }

    pub(super) fn insert_edge(&mut self, from: usize, to: usize) -> bool {
        if self.dependencies[from].contains(&to) {
            return false;
        }
        self.dependencies[from].push(to);
        self.dependents[to].push(from);
        self.edge_count += 1;
        true
    }

    /// Drop `index` and every edge touching it.
    pub fn remove_node(&mut self, index: usize) -> Result<()> {
        self.require(index)?;

        let outgoing = std::mem::take(&mut self.dependencies[index]);
        for to in &outgoing {
            self.dependents[*to].retain(|from| *from != index);
        }
        // A self-loop was already dropped from the incoming list above.
        let incoming = std::mem::take(&mut self.dependents[index]);
        for from in &incoming {
            self.dependencies[*from].retain(|to| *to != index);
        }
        self.edge_count -= outgoing.len() + incoming.len();

        self.alive[index] = false;
        self.live -= 1;
        Ok(())
    }

    /// Whether `index` is a live node.
    pub fn contains(&self, index: usize) -> bool {
        self.alive.get(index).copied().unwrap_or(false)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// Get the number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether the graph has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live node indices in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(index, _)| index)
    }

    /// Nodes `index` depends on.
    pub fn dependencies(&self, index: usize) -> &[usize] {
        self.dependencies.get(index).map(|a| a.as_slice()).unwrap_or(&[])
    }

    /// Nodes depending on `index`.
    pub fn dependents(&self, index: usize) -> &[usize] {
        self.dependents.get(index).map(|a| a.as_slice()).unwrap_or(&[])
    }

    /// Every edge as `(from, to)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.dependencies
            .iter()
            .enumerate()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (from, *to)))
    }

    /// Remove every node and edge. Indices restart at 0.
    pub fn clear(&mut self) {
        self.dependencies.clear();
        self.dependents.clear();
        self.alive.clear();
        self.live = 0;
        self.edge_count = 0;
    }

    /// Topological order: every node comes after all the nodes it depends on.
    ///
    /// Depth-first post-order with an explicit stack. Roots are taken in
    /// ascending index order and edges in insertion order, so the result is
    /// deterministic. An edge back into the active stack is a cycle and
    /// fails with [`Error::Cycle`] listing the nodes on it.
    pub fn order(&self) -> Result<Vec<usize>> {
        let mut marks = vec![Mark::Unvisited; self.alive.len()];
        let mut order = Vec::with_capacity(self.live);
        // (node, next dependency to look at)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in self.nodes() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::Active;
            stack.push((root, 0));

            while let Some(top) = stack.last_mut() {
                let (node, next) = *top;
                let Some(&dependency) = self.dependencies[node].get(next) else {
                    marks[node] = Mark::Done;
                    order.push(node);
                    stack.pop();
                    continue;
                };
                top.1 += 1;

                match marks[dependency] {
                    Mark::Unvisited => {
                        marks[dependency] = Mark::Active;
                        stack.push((dependency, 0));
                    }
                    Mark::Active => {
                        let nodes = stack
                            .iter()
                            .map(|(n, _)| *n)
                            .skip_while(|n| *n != dependency)
                            .collect();
                        return Err(Error::Cycle { nodes });
                    }
                    Mark::Done => {}
                }
            }
        }

        Ok(order)
    }

    fn require(&self, index: usize) -> Result<()> {
        if self.contains(index) {
            Ok(())
        } else {
            Err(Error::UnknownGraphNode { index })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(order: &[usize], node: usize) -> usize {
        order.iter().position(|n| *n == node).unwrap()
    }

    #[test]
    fn linear_chain_orders_dependencies_first() {
        // 2 depends on 1 depends on 0
        let graph = Digraph::from_edges(3, &[(2, 1), (1, 0)]).unwrap();
        assert_eq!(graph.order().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn diamond_orders_every_edge() {
        let edges = [(3, 1), (3, 2), (1, 0), (2, 0)];
        let graph = Digraph::from_edges(4, &edges).unwrap();
        let order = graph.order().unwrap();

        assert_eq!(order.len(), 4);
        for (from, to) in edges {
            assert!(position(&order, to) < position(&order, from));
        }
    }

    #[test]
    fn cycle_is_reported_with_members() {
        let graph = Digraph::from_edges(4, &[(0, 1), (1, 2), (2, 1), (3, 0)]).unwrap();
        match graph.order() {
            Err(Error::Cycle { nodes }) => {
                let mut nodes = nodes;
                nodes.sort();
                assert_eq!(nodes, vec![1, 2]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let graph = Digraph::from_edges(1, &[(0, 0)]).unwrap();
        assert!(graph.order().unwrap_err().is_cycle());
    }

    #[test]
    fn parallel_edges_collapse() {
        let mut graph = Digraph::from_edges(2, &[(1, 0)]).unwrap();
        assert!(!graph.add_edge(1, 0).unwrap());
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dependents(0), &[1]);
    }

    #[test]
    fn edges_to_unknown_nodes_fail() {
        let mut graph = Digraph::new();
        let a = graph.add_node();
        assert_eq!(
            graph.add_edge(a, 5),
            Err(Error::UnknownGraphNode { index: 5 })
        );
    }

    #[test]
    fn removed_nodes_drop_their_edges() {
        let mut graph = Digraph::from_edges(3, &[(2, 1), (1, 0), (1, 1)]).unwrap();
        graph.remove_node(1).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.contains(1));
        assert!(graph.dependencies(2).is_empty());
        assert_eq!(graph.order().unwrap(), vec![0, 2]);

        // Indices are not reused.
        assert_eq!(graph.add_node(), 3);
        assert!(graph.remove_node(1).is_err());
    }

    #[test]
    fn clear_resets_indices() {
        let mut graph = Digraph::from_edges(2, &[(0, 1)]).unwrap();
        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.add_node(), 0);
    }

    #[test]
    fn long_chain_does_not_recurse() {
        let n = 100_000;
        let edges: Vec<(usize, usize)> = (1..n).map(|i| (i, i - 1)).collect();
        let graph = Digraph::from_edges(n, &edges).unwrap();
        let order = graph.order().unwrap();
        assert_eq!(order.first(), Some(&0));
        assert_eq!(order.last(), Some(&(n - 1)));
    }
}
