//! Strongly Connected Components
//!
//! Groups of mutually dependent nodes cannot be ordered among themselves.
//! [`Digraph::reduce`] finds these groups (Tarjan's algorithm, iterative) and
//! builds the condensed graph between them, which is always acyclic.

use super::digraph::Digraph;
use crate::error::Result;

/// Result of [`Digraph::reduce`].
#[derive(Debug, Clone)]
pub struct Reduction {
    /// Maximal mutually reachable groups. Group `g` is node `g` of
    /// `condensed`. Members are in ascending order.
    pub groups: Vec<Vec<usize>>,

    /// One node per group; edges only between distinct groups.
    pub condensed: Digraph,

    /// `membership[i]`: group of original node `i` (`None` if removed).
    pub membership: Vec<Option<usize>>,
}

impl Reduction {
    /// Group containing original node `index`.
    pub fn group_of(&self, index: usize) -> Option<usize> {
        self.membership.get(index).copied().flatten()
    }

    /// Whether the original graph had no cycles.
    pub fn is_acyclic(&self, original: &Digraph) -> bool {
        self.groups.iter().all(|g| g.len() == 1)
            && original.edges().all(|(from, to)| from != to)
    }
}

impl Digraph {
    /// Strongly connected component decomposition.
    pub fn reduce(&self) -> Reduction {
        let n = self.alive.len();
        let mut index: Vec<Option<usize>> = vec![None; n];
        let mut lowlink = vec![0usize; n];
        let mut on_stack = vec![false; n];
        let mut component_stack: Vec<usize> = Vec::new();
        let mut membership: Vec<Option<usize>> = vec![None; n];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut counter = 0;

        // (node, next dependency to look at)
        let mut calls: Vec<(usize, usize)> = Vec::new();

        for root in self.nodes() {
            if index[root].is_some() {
                continue;
            }
            index[root] = Some(counter);
            lowlink[root] = counter;
            counter += 1;
            component_stack.push(root);
            on_stack[root] = true;
            calls.push((root, 0));

            while let Some(top) = calls.last_mut() {
                let (v, next) = *top;

                if let Some(&w) = self.dependencies[v].get(next) {
                    top.1 += 1;
                    match index[w] {
                        None => {
                            index[w] = Some(counter);
                            lowlink[w] = counter;
                            counter += 1;
                            component_stack.push(w);
                            on_stack[w] = true;
                            calls.push((w, 0));
                        }
                        Some(w_index) if on_stack[w] => {
                            lowlink[v] = lowlink[v].min(w_index);
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                calls.pop();
                if let Some(&(parent, _)) = calls.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[v]);
                }

                if index[v] == Some(lowlink[v]) {
                    let group_id = groups.len();
                    let mut group = Vec::new();
                    while let Some(w) = component_stack.pop() {
                        on_stack[w] = false;
                        membership[w] = Some(group_id);
                        group.push(w);
                        if w == v {
                            break;
                        }
                    }
                    group.sort_unstable();
                    groups.push(group);
                }
            }
        }

        let mut condensed = Digraph::with_capacity(groups.len());
        for _ in 0..groups.len() {
            condensed.add_node();
        }
        for (from, to) in self.edges() {
            if let (Some(gf), Some(gt)) = (membership[from], membership[to]) {
                if gf != gt {
                    condensed.insert_edge(gf, gt);
                }
            }
        }

        Reduction {
            groups,
            condensed,
            membership,
        }
    }

    /// Topological order of the strongly connected components.
    ///
    /// Each element is one group; members of a group are not ordered among
    /// themselves.
    pub fn grouped_order(&self) -> Result<Vec<Vec<usize>>> {
        let Reduction {
            groups, condensed, ..
        } = self.reduce();
        let order = condensed.order()?;

        let mut groups: Vec<Option<Vec<usize>>> = groups.into_iter().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|g| groups[g].take())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn sample() -> Digraph {
        Digraph::from_edges(
            6,
            &[(0, 3), (3, 1), (1, 0), (1, 2), (1, 4), (2, 5), (5, 2)],
        )
        .unwrap()
    }

    fn as_sets(groups: &[Vec<usize>]) -> BTreeSet<BTreeSet<usize>> {
        groups
            .iter()
            .map(|g| g.iter().copied().collect())
            .collect()
    }

    #[test]
    fn reduce_finds_maximal_groups() {
        let reduction = sample().reduce();

        let expected: BTreeSet<BTreeSet<usize>> = [vec![0, 1, 3], vec![4], vec![2, 5]]
            .iter()
            .map(|g| g.iter().copied().collect())
            .collect();
        assert_eq!(as_sets(&reduction.groups), expected);
    }

    #[test]
    fn condensed_graph_has_edges_from_big_group_only() {
        let reduction = sample().reduce();
        let big = reduction.group_of(0).unwrap();

        assert_eq!(reduction.condensed.node_count(), 3);
        assert_eq!(reduction.condensed.edge_count(), 2);
        for (from, to) in reduction.condensed.edges() {
            assert_eq!(from, big);
            assert_ne!(to, big);
        }
        assert_eq!(reduction.group_of(2), reduction.group_of(5));
    }

    #[test]
    fn grouped_order_puts_dependencies_first() {
        let order = sample().grouped_order().unwrap();

        assert_eq!(order.len(), 3);
        assert_eq!(order.last().unwrap(), &vec![0, 1, 3]);
    }

    #[test]
    fn acyclic_graph_reduces_to_singletons() {
        let graph = Digraph::from_edges(3, &[(2, 1), (1, 0)]).unwrap();
        let reduction = graph.reduce();

        assert!(reduction.is_acyclic(&graph));
        assert_eq!(graph.grouped_order().unwrap(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn removed_nodes_belong_to_no_group() {
        let mut graph = sample();
        graph.remove_node(4).unwrap();
        let reduction = graph.reduce();

        assert_eq!(reduction.group_of(4), None);
        assert_eq!(reduction.groups.len(), 2);
        assert_eq!(reduction.condensed.edge_count(), 1);
    }
}
