//! Degree-distribution divergence

use crate::distance::divergence::jensen_shannon_discrete;
use crate::distance::{checked, GraphDistanceMetric};
use crate::error::DistanceError;
use crate::graph::JobGraph;

/// Jensen–Shannon divergence (natural log) between total-degree histograms
#[derive(Debug, Clone, Copy, Default)]
pub struct DegreeDivergence;

impl DegreeDivergence {
    /// Count of stages per total degree `0..=max_degree`
    pub fn histogram(graph: &JobGraph) -> Vec<f64> {
        if graph.is_empty() {
            return vec![1.0];
        }

        let degrees = graph.degrees();
        let max_degree = degrees.iter().copied().max().unwrap_or(0) as usize;
        let mut hist = vec![0.0; max_degree + 1];
        for degree in degrees {
            hist[degree as usize] += 1.0;
        }
        hist
    }
}

impl GraphDistanceMetric for DegreeDivergence {
    type Signature = Vec<f64>;

    fn name(&self) -> &'static str {
        "degree-divergence"
    }

    fn signature(&self, graph: &JobGraph) -> Result<Vec<f64>, DistanceError> {
        Ok(Self::histogram(graph))
    }

    fn compare(&self, a: &Vec<f64>, b: &Vec<f64>) -> Result<f64, DistanceError> {
        checked(jensen_shannon_discrete(a, b, std::f64::consts::E)?)
    }
}
