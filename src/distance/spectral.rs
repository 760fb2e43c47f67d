//! Laplacian spectral density distance
//!
//! Each graph's normalized Laplacian spectrum is smoothed into a continuous
//! density on `[0, 2]` and the densities are compared, which keeps graphs of
//! different sizes comparable.

use crate::distance::divergence::{jensen_shannon_curves, l2_curves, Grid};
use crate::distance::{checked, GraphDistanceMetric};
use crate::error::DistanceError;
use crate::graph::eigen::{symmetric_eigenvalues, JacobiSettings};
use crate::graph::laplacian::{normalized_laplacian, symmetric_adjacency, LaplacianMode};
use crate::graph::JobGraph;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Cauchy, Continuous, ContinuousCDF, Normal};

/// Upper end of the normalized Laplacian spectrum
const SPECTRUM_MAX: f64 = 2.0;

/// Ratio between half width at half maximum and standard deviation of a Gaussian
const HWHM_PER_STD: f64 = 1.1775;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kernel {
    #[default]
    Normal,
    Lorentzian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Measure {
    #[default]
    JensenShannon,
    Euclidean,
}

/// Parameters of the spectral density metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// Directed-graph policy for building the Laplacian
    pub laplacian: LaplacianMode,

    pub kernel: Kernel,

    /// Kernel half width at half maximum (bandwidth)
    pub hwhm: f64,

    pub measure: Measure,

    /// Number of evaluation points on `[0, 2]`
    pub grid_points: usize,

    pub max_sweeps: usize,

    pub tolerance: f64,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        let jacobi = JacobiSettings::default();
        Self {
            laplacian: LaplacianMode::Augmented,
            kernel: Kernel::Normal,
            hwhm: 0.011775,
            measure: Measure::JensenShannon,
            grid_points: 2001,
            max_sweeps: jacobi.max_sweeps,
            tolerance: jacobi.tolerance,
        }
    }
}

/// Smoothed spectrum of one graph sampled on the metric's grid
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralDensity {
    pub eigenvalues: Vec<f64>,
    pub density: Vec<f64>,
}

enum KernelShape {
    Normal(Normal),
    Lorentzian(Cauchy),
}

impl KernelShape {
    fn pdf(&self, x: f64) -> f64 {
        match self {
            Self::Normal(d) => d.pdf(x),
            Self::Lorentzian(d) => d.pdf(x),
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        match self {
            Self::Normal(d) => d.cdf(x),
            Self::Lorentzian(d) => d.cdf(x),
        }
    }
}

pub struct LaplacianSpectral {
    config: SpectralConfig,
    grid: Grid,
    kernel: KernelShape,
}

impl LaplacianSpectral {
    pub fn new(config: SpectralConfig) -> Result<Self, DistanceError> {
        if !(config.hwhm.is_finite() && config.hwhm > 0.0) {
            return Err(DistanceError::InvalidParameter(format!(
                "kernel bandwidth must be positive, got {}",
                config.hwhm
            )));
        }
        if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
            return Err(DistanceError::InvalidParameter(format!(
                "eigen tolerance must be positive, got {}",
                config.tolerance
            )));
        }

        let grid = Grid::new(0.0, SPECTRUM_MAX, config.grid_points)?;
        let kernel = match config.kernel {
            Kernel::Normal => Normal::new(0.0, config.hwhm / HWHM_PER_STD).map(KernelShape::Normal),
            Kernel::Lorentzian => Cauchy::new(0.0, config.hwhm).map(KernelShape::Lorentzian),
        }
        .map_err(|e| DistanceError::InvalidParameter(e.to_string()))?;

        Ok(Self {
            config,
            grid,
            kernel,
        })
    }

    pub fn config(&self) -> &SpectralConfig {
        &self.config
    }

    /// Absolute eigenvalues of the normalized Laplacian, ascending
    pub fn spectrum(&self, graph: &JobGraph) -> Result<Vec<f64>, DistanceError> {
        let weights = symmetric_adjacency(graph, self.config.laplacian);
        let laplacian = normalized_laplacian(&weights);
        let settings = JacobiSettings {
            max_sweeps: self.config.max_sweeps,
            tolerance: self.config.tolerance,
        };

        let mut values: Vec<f64> = symmetric_eigenvalues(&laplacian, settings)?
            .into_iter()
            .map(f64::abs)
            .collect();
        values.sort_by(|a, b| a.total_cmp(b));
        Ok(values)
    }

    /// Kernel density of a spectrum, normalized to unit mass on `[0, 2]`
    pub fn density(&self, eigenvalues: &[f64]) -> Result<Vec<f64>, DistanceError> {
        let mass: f64 = eigenvalues
            .iter()
            .map(|&ev| self.kernel.cdf(SPECTRUM_MAX - ev) - self.kernel.cdf(-ev))
            .sum();
        if !(mass.is_finite() && mass > 0.0) {
            return Err(DistanceError::InvalidValue(mass));
        }

        Ok(self
            .grid
            .iter()
            .map(|x| eigenvalues.iter().map(|&ev| self.kernel.pdf(x - ev)).sum::<f64>() / mass)
            .collect())
    }
}

impl GraphDistanceMetric for LaplacianSpectral {
    type Signature = SpectralDensity;

    fn name(&self) -> &'static str {
        "laplacian-spectral"
    }

    fn signature(&self, graph: &JobGraph) -> Result<SpectralDensity, DistanceError> {
        let eigenvalues = self.spectrum(graph)?;
        let density = self.density(&eigenvalues)?;
        log::debug!(
            "Spectrum of {} stages / {} links: {} eigenvalues",
            graph.node_count(),
            graph.edge_count(),
            eigenvalues.len()
        );
        Ok(SpectralDensity {
            eigenvalues,
            density,
        })
    }

    fn compare(&self, a: &SpectralDensity, b: &SpectralDensity) -> Result<f64, DistanceError> {
        let step = self.grid.step();
        let value = match self.config.measure {
            Measure::JensenShannon => jensen_shannon_curves(&a.density, &b.density, step),
            Measure::Euclidean => l2_curves(&a.density, &b.density, step),
        };
        checked(value)
    }
}
