//! Single-linkage agglomeration with a distance threshold

use crate::cluster::ClusterAssignment;
use crate::error::ClusterError;
use crate::matrix::DistanceMatrix;
use serde::{Deserialize, Serialize};

/// Union-Find over graph indices
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set, valid at roots (for union by size)
    size: Vec<u32>,
}

impl DisjointSets {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let px = self.parent[x as usize];
        if px != x {
            self.parent[x as usize] = self.find(px);
        }
        self.parent[x as usize]
    }

    /// Union the sets containing x and y, returning the new root if they were apart
    pub fn union(&mut self, x: u32, y: u32) -> Option<u32> {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return None;
        }

        // attach smaller tree under root of larger tree
        let (big, small) = if self.size[root_x as usize] >= self.size[root_y as usize] {
            (root_x, root_y)
        } else {
            (root_y, root_x)
        };
        self.parent[small as usize] = big;
        self.size[big as usize] += self.size[small as usize];
        Some(big)
    }

    /// Get the size of the set containing x
    pub fn size(&mut self, x: u32) -> u32 {
        let root = self.find(x);
        self.size[root as usize]
    }
}

/// One agglomeration step.
///
/// Cluster ids follow the usual hierarchical-clustering numbering: the
/// original items are `0..n` and the k-th merge creates cluster `n + k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    /// Number of original items in the merged cluster
    pub size: usize,
}

/// Complete single-linkage merge sequence over the defined cells of a matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    leaves: usize,
    merges: Vec<Merge>,
    /// Original index pair whose distance triggered each merge
    links: Vec<(usize, usize)>,
}

fn validate_threshold(threshold: f64) -> Result<(), ClusterError> {
    if threshold.is_nan() || threshold < 0.0 {
        return Err(ClusterError::InvalidThreshold(threshold));
    }
    Ok(())
}

/// Build the single-linkage dendrogram.
///
/// Candidate pairs are visited in ascending `(distance, i, j)` order; the
/// first pair joining two different clusters is the closest pair of clusters
/// under the min-linkage rule, with ties going to the lowest index pair.
/// Undefined cells never produce a merge.
pub fn single_linkage(matrix: &DistanceMatrix) -> Dendrogram {
    let n = matrix.len();
    let mut candidates: Vec<(usize, usize, f64)> = matrix.defined_pairs().collect();
    candidates.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));

    let mut sets = DisjointSets::new(n);
    // current cluster id of every root
    let mut cluster_of: Vec<usize> = (0..n).collect();
    let mut merges = Vec::with_capacity(n.saturating_sub(1));
    let mut links = Vec::with_capacity(n.saturating_sub(1));

    for (i, j, distance) in candidates {
        if merges.len() + 1 >= n {
            break;
        }

        let left = cluster_of[sets.find(i as u32) as usize];
        let right = cluster_of[sets.find(j as u32) as usize];
        if let Some(root) = sets.union(i as u32, j as u32) {
            let id = n + merges.len();
            cluster_of[root as usize] = id;
            merges.push(Merge {
                left: left.min(right),
                right: left.max(right),
                distance,
                size: sets.size(root) as usize,
            });
            links.push((i, j));
        }
    }

    Dendrogram {
        leaves: n,
        merges,
        links,
    }
}

impl Dendrogram {
    pub fn leaves(&self) -> usize {
        self.leaves
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Number of merges admissible at the threshold (merge distance ≤ threshold)
    pub fn merges_within(&self, threshold: f64) -> usize {
        self.merges
            .iter()
            .take_while(|m| m.distance <= threshold)
            .count()
    }

    /// Replay merges until the next one would exceed the threshold
    pub fn cut(&self, threshold: f64) -> Result<ClusterAssignment, ClusterError> {
        validate_threshold(threshold)?;

        let mut sets = DisjointSets::new(self.leaves);
        for &(i, j) in self.links.iter().take(self.merges_within(threshold)) {
            sets.union(i as u32, j as u32);
        }

        let roots: Vec<u32> = (0..self.leaves as u32).map(|x| sets.find(x)).collect();
        Ok(ClusterAssignment::from_roots(&roots))
    }
}

/// Threshold-stopped single-linkage clustering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdLinkage {
    threshold: f64,
}

impl ThresholdLinkage {
    pub fn new(threshold: f64) -> Result<Self, ClusterError> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Cluster the matrix, returning the labels and the merges that were applied
    pub fn fit(&self, matrix: &DistanceMatrix) -> Result<(ClusterAssignment, Dendrogram), ClusterError> {
        let mut dendrogram = single_linkage(matrix);
        let assignment = dendrogram.cut(self.threshold)?;

        let applied = dendrogram.merges_within(self.threshold);
        dendrogram.merges.truncate(applied);
        dendrogram.links.truncate(applied);

        log::info!(
            "Single linkage at threshold {}: {} merges, {} clusters",
            self.threshold,
            applied,
            assignment.cluster_count()
        );
        Ok((assignment, dendrogram))
    }

    pub fn assign(&self, matrix: &DistanceMatrix) -> Result<ClusterAssignment, ClusterError> {
        self.fit(matrix).map(|(assignment, _)| assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn chain() -> DistanceMatrix {
        // 0 -0.1- 1 -0.2- 2, 3 far away
        DistanceMatrix::from_dense(array![
            [0.0, 0.1, 0.3, 0.9],
            [0.1, 0.0, 0.2, 0.8],
            [0.3, 0.2, 0.0, 0.7],
            [0.9, 0.8, 0.7, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn disjoint_sets_union_and_size() {
        let mut sets = DisjointSets::new(4);
        assert!(sets.union(0, 1).is_some());
        assert!(sets.union(1, 0).is_none());
        sets.union(2, 3);
        sets.union(0, 3);
        assert_eq!(sets.size(2), 4);
        assert_eq!(sets.find(0), sets.find(3));
    }

    #[test]
    fn merge_sequence_uses_single_linkage() {
        let dendrogram = single_linkage(&chain());
        let merges = dendrogram.merges();

        assert_eq!(merges.len(), 3);
        assert_eq!((merges[0].left, merges[0].right, merges[0].size), (0, 1, 2));
        assert_eq!(merges[0].distance, 0.1);
        // {0,1} joins 2 through the 0.2 link, not the 0.3 one
        assert_eq!((merges[1].left, merges[1].right), (2, 4));
        assert_eq!(merges[1].distance, 0.2);
        assert_eq!((merges[2].left, merges[2].right, merges[2].size), (3, 5, 4));
        assert_eq!(merges[2].distance, 0.7);
    }

    #[test]
    fn threshold_is_inclusive() {
        let assignment = ThresholdLinkage::new(0.2).unwrap().assign(&chain()).unwrap();
        assert_eq!(assignment.labels(), &[0, 0, 0, 1]);

        let assignment = ThresholdLinkage::new(0.19).unwrap().assign(&chain()).unwrap();
        assert_eq!(assignment.labels(), &[0, 0, 1, 2]);
    }

    #[test]
    fn zero_and_infinite_thresholds() {
        let singletons = ThresholdLinkage::new(0.0).unwrap().assign(&chain()).unwrap();
        assert_eq!(singletons.cluster_count(), 4);

        let one = ThresholdLinkage::new(f64::INFINITY).unwrap().assign(&chain()).unwrap();
        assert_eq!(one.cluster_count(), 1);
    }

    #[test]
    fn zero_distance_pairs_merge_at_zero_threshold() {
        let m = DistanceMatrix::from_dense(array![[0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [1.0, 1.0, 0.0]]).unwrap();
        let assignment = ThresholdLinkage::new(0.0).unwrap().assign(&m).unwrap();
        assert_eq!(assignment.labels(), &[0, 0, 1]);
    }

    #[test]
    fn ties_break_on_lowest_index_pair() {
        let m = DistanceMatrix::from_dense(array![
            [0.0, 0.5, 0.5],
            [0.5, 0.0, 0.5],
            [0.5, 0.5, 0.0],
        ])
        .unwrap();
        let dendrogram = single_linkage(&m);
        assert_eq!((dendrogram.merges()[0].left, dendrogram.merges()[0].right), (0, 1));
        assert_eq!((dendrogram.merges()[1].left, dendrogram.merges()[1].right), (2, 3));
    }

    #[test]
    fn undefined_cells_never_merge() {
        let mut matrix = DistanceMatrix::undefined(3);
        matrix.set(0, 1, 0.1);

        let assignment = ThresholdLinkage::new(f64::INFINITY).unwrap().assign(&matrix).unwrap();
        assert_eq!(assignment.labels(), &[0, 0, 1]);
    }

    #[test]
    fn fit_keeps_only_applied_merges() {
        let (assignment, dendrogram) = ThresholdLinkage::new(0.15).unwrap().fit(&chain()).unwrap();
        assert_eq!(assignment.cluster_count(), 3);
        assert_eq!(dendrogram.merges().len(), 1);
    }

    #[test]
    fn rejects_invalid_thresholds() {
        assert_eq!(ThresholdLinkage::new(-0.1), Err(ClusterError::InvalidThreshold(-0.1)));
        assert!(ThresholdLinkage::new(f64::NAN).is_err());
        assert!(single_linkage(&chain()).cut(-1.0).is_err());
    }
}
