//! Network portrait divergence
//!
//! The portrait `B[l][k]` counts stages that have exactly `k` stages at
//! shortest-path distance `l` downstream of them. Two portraits are compared
//! through the Jensen–Shannon divergence (base 2) of the distributions
//! `P(l, k) ∝ k · B[l][k]`, so the result lies in `[0, 1]`.

use crate::distance::divergence::jensen_shannon_discrete;
use crate::distance::{checked, GraphDistanceMetric};
use crate::error::DistanceError;
use crate::graph::JobGraph;
use petgraph::algo::dijkstra;

#[derive(Debug, Clone, Copy, Default)]
pub struct PortraitDivergence;

impl PortraitDivergence {
    /// Portrait rows indexed by distance, columns by reachable count
    pub fn portrait(graph: &JobGraph) -> Vec<Vec<f64>> {
        if graph.is_empty() {
            return vec![vec![0.0, 1.0]];
        }

        let pg = graph.to_petgraph();
        let n = graph.node_count();
        let mut rows: Vec<Vec<f64>> = Vec::new();

        for source in pg.node_indices() {
            let distances = dijkstra(&pg, source, None, |_| 1usize);

            let mut shells: Vec<usize> = Vec::new();
            for &d in distances.values() {
                if shells.len() <= d {
                    shells.resize(d + 1, 0);
                }
                shells[d] += 1;
            }

            for (l, &k) in shells.iter().enumerate() {
                if rows.len() <= l {
                    rows.resize_with(l + 1, || vec![0.0; n + 1]);
                }
                rows[l][k] += 1.0;
            }
        }

        rows
    }

    fn weighted(portrait: &[Vec<f64>], rows: usize, cols: usize) -> Vec<f64> {
        let mut flat = vec![0.0; rows * cols];
        for (l, row) in portrait.iter().enumerate() {
            for (k, &count) in row.iter().enumerate() {
                flat[l * cols + k] = k as f64 * count;
            }
        }
        flat
    }
}

impl GraphDistanceMetric for PortraitDivergence {
    type Signature = Vec<Vec<f64>>;

    fn name(&self) -> &'static str {
        "portrait-divergence"
    }

    fn signature(&self, graph: &JobGraph) -> Result<Vec<Vec<f64>>, DistanceError> {
        Ok(Self::portrait(graph))
    }

    fn compare(&self, a: &Vec<Vec<f64>>, b: &Vec<Vec<f64>>) -> Result<f64, DistanceError> {
        let rows = a.len().max(b.len());
        let cols = a.iter().chain(b.iter()).map(Vec::len).max().unwrap_or(0);

        let p = Self::weighted(a, rows, cols);
        let q = Self::weighted(b, rows, cols);
        checked(jensen_shannon_discrete(&p, &q, 2.0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portrait_of_a_directed_path() {
        let path = JobGraph::from_edges([("1", "2"), ("2", "3")]);
        let portrait = PortraitDivergence::portrait(&path);

        assert_eq!(portrait.len(), 3);
        assert_eq!(portrait[0][1], 3.0);
        assert_eq!(portrait[1][1], 2.0);
        assert_eq!(portrait[2][1], 1.0);
    }

    #[test]
    fn cycle_differs_from_path() {
        let path = JobGraph::from_edges([("1", "2"), ("2", "3")]);
        let cycle = JobGraph::from_edges([("1", "2"), ("2", "3"), ("3", "1")]);
        let d = PortraitDivergence.distance(&path, &cycle).unwrap();
        assert!(d > 0.0 && d <= 1.0);
    }

    #[test]
    fn isomorphic_graphs_share_a_portrait() {
        let a = JobGraph::from_edges([("1", "2"), ("1", "3"), ("3", "4")]);
        let b = JobGraph::from_edges([("x", "w"), ("x", "y"), ("w", "z")]);
        assert_eq!(PortraitDivergence.distance(&a, &b).unwrap(), 0.0);
    }
}
