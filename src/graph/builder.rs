//! Graph construction module

use crate::graph::JobGraph;
use std::collections::HashMap;

/// Builder for incrementally constructing a JobGraph from stage identifiers
#[derive(Debug, Default)]
pub struct GraphBuilder {
    /// Mapping from stage IDs to node indices
    id_to_index: HashMap<String, u32>,

    /// Stage IDs in insertion order
    stage_ids: Vec<String>,

    /// Adjacency lists for each node
    adjacency_lists: Vec<Vec<u32>>,

    /// Self-loops seen and dropped
    dropped_loops: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            stage_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
            dropped_loops: 0,
        }
    }

    /// Get or create a node index for the given stage ID
    pub fn add_stage(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.stage_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.stage_ids.push(id.to_string());
        self.adjacency_lists.push(Vec::new());

        idx
    }

    /// Add a dependency edge; both stages are created on demand
    pub fn add_edge(&mut self, src_id: &str, dst_id: &str) {
        let src_idx = self.add_stage(src_id);
        let dst_idx = self.add_stage(dst_id);

        if src_idx == dst_idx {
            self.dropped_loops += 1;
            return;
        }

        self.adjacency_lists[src_idx as usize].push(dst_idx);
    }

    pub fn node_count(&self) -> usize {
        self.stage_ids.len()
    }

    /// Build the immutable graph, sorting and deduplicating adjacency lists
    pub fn build(mut self) -> JobGraph {
        if self.dropped_loops > 0 {
            log::debug!("Dropped {} self-loop edges", self.dropped_loops);
        }

        let mut offsets = Vec::with_capacity(self.stage_ids.len() + 1);
        offsets.push(0);

        let mut targets = Vec::new();
        for list in &mut self.adjacency_lists {
            list.sort_unstable();
            list.dedup();
            targets.extend_from_slice(list);
            offsets.push(targets.len() as u32);
        }

        JobGraph::from_parts(offsets, targets, self.stage_ids)
    }
}
