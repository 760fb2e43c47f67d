//! Cluster analysis module

pub mod linkage;
pub mod metrics;

pub use linkage::{single_linkage, Dendrogram, DisjointSets, Merge, ThresholdLinkage};
pub use metrics::summarize;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A group of structurally similar jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Cluster label as found in the assignment
    pub id: usize,

    /// Members of this cluster (original graph indices, ascending)
    pub members: Vec<usize>,

    /// Size of the cluster
    pub size: usize,

    /// Largest defined distance between two members
    pub diameter: f64,

    /// Mean defined distance between members (0 for singletons)
    pub mean_distance: f64,
}

/// Uninteresting but valid clustering outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Degeneracy {
    AllSingletons,
    SingleCluster,
}

/// Cluster label of every graph, by original index.
///
/// Labels are numbered by first appearance, so index 0 always carries
/// label 0 and the labels depend only on the partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    cluster_count: usize,
}

impl ClusterAssignment {
    /// Relabel arbitrary group keys (e.g. union-find roots) in first-appearance order
    pub fn from_roots<K: Copy + Eq + std::hash::Hash>(roots: &[K]) -> Self {
        let mut label_of: HashMap<K, usize> = HashMap::new();
        let labels = roots
            .iter()
            .map(|root| {
                let next = label_of.len();
                *label_of.entry(*root).or_insert(next)
            })
            .collect();

        Self {
            labels,
            cluster_count: label_of.len(),
        }
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<usize> {
        self.labels.get(index).copied()
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    pub fn members(&self, label: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == label)
            .map(|(index, _)| index)
            .collect()
    }

    /// Members of every cluster, indexed by label
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.cluster_count];
        for (index, &label) in self.labels.iter().enumerate() {
            groups[label].push(index);
        }
        groups
    }

    pub fn same_cluster(&self, a: usize, b: usize) -> bool {
        matches!((self.label(a), self.label(b)), (Some(x), Some(y)) if x == y)
    }

    /// Whether the outcome collapsed to one of the trivial partitions
    pub fn degeneracy(&self) -> Option<Degeneracy> {
        if self.labels.len() < 2 {
            return None;
        }
        if self.cluster_count == self.labels.len() {
            Some(Degeneracy::AllSingletons)
        } else if self.cluster_count == 1 {
            Some(Degeneracy::SingleCluster)
        } else {
            None
        }
    }
}
