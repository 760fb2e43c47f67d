//! Cluster statistics and metrics

use crate::cluster::{Cluster, ClusterAssignment};
use crate::matrix::DistanceMatrix;
use itertools::Itertools;

/// Build a summary for every cluster, largest first (ties by label)
pub fn summarize(assignment: &ClusterAssignment, matrix: &DistanceMatrix) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = assignment
        .groups()
        .into_iter()
        .enumerate()
        .map(|(id, members)| {
            let (diameter, mean_distance) = intra_distances(matrix, &members);
            Cluster {
                id,
                size: members.len(),
                members,
                diameter,
                mean_distance,
            }
        })
        .collect();

    clusters.sort_by(|a, b| b.size.cmp(&a.size).then(a.id.cmp(&b.id)));
    clusters
}

/// Maximum and mean of the defined distances between members
pub fn intra_distances(matrix: &DistanceMatrix, members: &[usize]) -> (f64, f64) {
    let distances: Vec<f64> = members
        .iter()
        .tuple_combinations()
        .filter_map(|(&a, &b)| matrix.get(a, b))
        .collect();

    if distances.is_empty() {
        return (0.0, 0.0);
    }

    let max = distances.iter().copied().fold(0.0, f64::max);
    let mean = distances.iter().sum::<f64>() / distances.len() as f64;
    (max, mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn matrix() -> DistanceMatrix {
        DistanceMatrix::from_dense(array![
            [0.0, 0.1, 0.6, 0.7],
            [0.1, 0.0, 0.5, 0.8],
            [0.6, 0.5, 0.0, 0.05],
            [0.7, 0.8, 0.05, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn summaries_report_diameter_and_mean() {
        let assignment = ClusterAssignment::from_roots(&[0u32, 0, 1, 1]);
        let clusters = summarize(&assignment, &matrix());

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].id, 0);
        assert_eq!(clusters[0].members, vec![0, 1]);
        assert_eq!(clusters[0].diameter, 0.1);
        assert_eq!(clusters[1].mean_distance, 0.05);
    }

    #[test]
    fn larger_clusters_come_first() {
        let assignment = ClusterAssignment::from_roots(&[0u32, 1, 1, 1]);
        let clusters = summarize(&assignment, &matrix());
        assert_eq!(clusters[0].size, 3);
        assert_eq!(clusters[1].diameter, 0.0);
    }
}
