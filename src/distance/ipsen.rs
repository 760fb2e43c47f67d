//! Ipsen–Mikhailov distance
//!
//! Treats the undirected skeleton as a network of unit masses and springs:
//! vibrational frequencies are the square roots of the combinatorial
//! Laplacian eigenvalues, smoothed with a Lorentzian and compared in L2.

use crate::distance::divergence::{l2_curves, Grid};
use crate::distance::{checked, GraphDistanceMetric};
use crate::error::DistanceError;
use crate::graph::eigen::{symmetric_eigenvalues, JacobiSettings};
use crate::graph::laplacian::{combinatorial_laplacian, symmetric_adjacency, LaplacianMode};
use crate::graph::JobGraph;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpsenMikhailovConfig {
    /// Lorentzian half width at half maximum
    pub hwhm: f64,

    /// Frequencies beyond this bound are not sampled
    pub upper: f64,

    pub grid_points: usize,

    pub max_sweeps: usize,

    pub tolerance: f64,
}

impl Default for IpsenMikhailovConfig {
    fn default() -> Self {
        let jacobi = JacobiSettings::default();
        Self {
            hwhm: 0.08,
            upper: 8.0,
            grid_points: 4001,
            max_sweeps: jacobi.max_sweeps,
            tolerance: jacobi.tolerance,
        }
    }
}

pub struct IpsenMikhailov {
    config: IpsenMikhailovConfig,
    grid: Grid,
}

impl IpsenMikhailov {
    pub fn new(config: IpsenMikhailovConfig) -> Result<Self, DistanceError> {
        if !(config.hwhm.is_finite() && config.hwhm > 0.0) {
            return Err(DistanceError::InvalidParameter(format!(
                "lorentzian bandwidth must be positive, got {}",
                config.hwhm
            )));
        }
        let grid = Grid::new(0.0, config.upper, config.grid_points)?;
        Ok(Self { config, grid })
    }

    /// Vibrational frequencies, zero mode excluded
    pub fn frequencies(&self, graph: &JobGraph) -> Result<Vec<f64>, DistanceError> {
        let weights = symmetric_adjacency(graph, LaplacianMode::Skeleton);
        let settings = JacobiSettings {
            max_sweeps: self.config.max_sweeps,
            tolerance: self.config.tolerance,
        };
        let eigenvalues = symmetric_eigenvalues(&combinatorial_laplacian(&weights), settings)?;

        Ok(eigenvalues.into_iter().skip(1).map(|v| v.abs().sqrt()).collect())
    }
}

impl GraphDistanceMetric for IpsenMikhailov {
    /// Lorentzian density of frequencies sampled on the grid
    type Signature = Vec<f64>;

    fn name(&self) -> &'static str {
        "ipsen-mikhailov"
    }

    fn signature(&self, graph: &JobGraph) -> Result<Vec<f64>, DistanceError> {
        let gamma = self.config.hwhm;
        let modes = self.frequencies(graph)?;
        if modes.is_empty() {
            return Ok(vec![0.0; self.grid.points]);
        }

        let norm: f64 = modes.iter().map(|&w| FRAC_PI_2 + (w / gamma).atan()).sum();
        Ok(self
            .grid
            .iter()
            .map(|x| {
                modes
                    .iter()
                    .map(|&w| gamma / ((x - w) * (x - w) + gamma * gamma))
                    .sum::<f64>()
                    / norm
            })
            .collect())
    }

    fn compare(&self, a: &Vec<f64>, b: &Vec<f64>) -> Result<f64, DistanceError> {
        checked(l2_curves(a, b, self.grid.step()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric() -> IpsenMikhailov {
        IpsenMikhailov::new(IpsenMikhailovConfig::default()).unwrap()
    }

    #[test]
    fn triangle_frequencies() {
        let triangle = JobGraph::from_edges([("1", "2"), ("2", "3"), ("3", "1")]);
        let modes = metric().frequencies(&triangle).unwrap();
        assert_eq!(modes.len(), 2);
        for w in modes {
            assert!((w - 3f64.sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn direction_is_ignored() {
        let forward = JobGraph::from_edges([("1", "2"), ("2", "3")]);
        let backward = JobGraph::from_edges([("3", "2"), ("2", "1")]);
        assert!(metric().distance(&forward, &backward).unwrap() < 1e-9);
    }

    #[test]
    fn distinguishes_path_from_triangle() {
        let path = JobGraph::from_edges([("1", "2"), ("2", "3")]);
        let triangle = JobGraph::from_edges([("1", "2"), ("2", "3"), ("3", "1")]);
        assert!(metric().distance(&path, &triangle).unwrap() > 0.1);
    }

    #[test]
    fn single_stage_has_no_modes() {
        let m = metric();
        let sig = m.signature(&JobGraph::empty()).unwrap();
        assert!(sig.iter().all(|&v| v == 0.0));
        let path = JobGraph::from_edges([("1", "2")]);
        assert!(m.distance(&JobGraph::empty(), &path).unwrap() > 0.0);
    }
}
