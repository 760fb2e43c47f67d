//! Immutable compressed representation of a job's stage graph

use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::mem;

/// Directed stage-dependency graph of one job, stored as compressed sparse rows.
///
/// Nodes are dense indices `0..node_count` with the original stage identifiers
/// kept alongside. Edges are free of self-loops and duplicates; each adjacency
/// list is sorted. Built through [`GraphBuilder`](crate::graph::GraphBuilder)
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobGraph {
    /// offsets[i] to offsets[i+1] is the edge range of node i
    offsets: Vec<u32>,

    /// Concatenated, sorted adjacency lists
    targets: Vec<u32>,

    /// Original stage identifiers indexed by node
    stage_ids: Vec<String>,
}

impl JobGraph {
    pub(crate) fn from_parts(offsets: Vec<u32>, targets: Vec<u32>, stage_ids: Vec<String>) -> Self {
        debug_assert_eq!(offsets.len(), stage_ids.len() + 1);
        Self {
            offsets,
            targets,
            stage_ids,
        }
    }

    /// Graph with no stages at all
    pub fn empty() -> Self {
        Self::from_parts(vec![0], Vec::new(), Vec::new())
    }

    /// Build a graph from `(from, to)` stage pairs
    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut builder = crate::graph::GraphBuilder::new();
        for (src, dst) in edges {
            builder.add_edge(src.as_ref(), dst.as_ref());
        }
        builder.build()
    }

    pub fn node_count(&self) -> usize {
        self.stage_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stage_ids.is_empty()
    }

    pub fn stage_id(&self, node: usize) -> Option<&str> {
        self.stage_ids.get(node).map(String::as_str)
    }

    pub fn stage_ids(&self) -> &[String] {
        &self.stage_ids
    }

    /// Get outgoing edges for a node
    pub fn outgoing_edges(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.targets[start..end]
    }

    /// Check if there's an edge from src to dst
    pub fn has_edge(&self, src: usize, dst: u32) -> bool {
        self.outgoing_edges(src).binary_search(&dst).is_ok()
    }

    pub fn out_degree(&self, node: usize) -> usize {
        (self.offsets[node + 1] - self.offsets[node]) as usize
    }

    pub fn in_degrees(&self) -> Vec<u32> {
        let mut degrees = vec![0u32; self.node_count()];
        for &dst in &self.targets {
            degrees[dst as usize] += 1;
        }
        degrees
    }

    /// Total (in + out) degree of every node
    pub fn degrees(&self) -> Vec<u32> {
        let mut degrees = self.in_degrees();
        for (node, degree) in degrees.iter_mut().enumerate() {
            *degree += self.out_degree(node) as u32;
        }
        degrees
    }

    /// Iterate over all `(src, dst)` edges in node order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.node_count()).flat_map(move |src| {
            self.outgoing_edges(src)
                .iter()
                .map(move |&dst| (src, dst as usize))
        })
    }

    /// Structural copy as a petgraph digraph, node indices preserved
    pub fn to_petgraph(&self) -> DiGraph<(), ()> {
        let mut graph = DiGraph::with_capacity(self.node_count(), self.edge_count());
        for _ in 0..self.node_count() {
            graph.add_node(());
        }
        graph.extend_with_edges(self.edges().map(|(src, dst)| (src as u32, dst as u32)));
        graph
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<u32>();
        let targets = self.targets.capacity() * mem::size_of::<u32>();
        let ids = self.stage_ids.iter().map(|s| s.capacity()).sum::<usize>();

        base + offsets + targets + ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_graph_degrees() {
        let graph = JobGraph::from_edges([("1", "2"), ("2", "3")]);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.in_degrees(), vec![0, 1, 1]);
        assert_eq!(graph.degrees(), vec![1, 2, 1]);
        assert!(graph.has_edge(0, 1));
        assert!(!graph.has_edge(1, 0));
    }

    #[test]
    fn petgraph_copy_keeps_structure() {
        let graph = JobGraph::from_edges([("a", "b"), ("b", "c"), ("c", "a")]);
        let pg = graph.to_petgraph();

        assert_eq!(pg.node_count(), 3);
        assert_eq!(pg.edge_count(), 3);
    }

    #[test]
    fn empty_graph() {
        let graph = JobGraph::empty();
        assert!(graph.is_empty());
        assert_eq!(graph.edges().count(), 0);
        assert!(graph.memory_usage() > 0);
    }
}
