//! Structural distances between job graphs
//!
//! Every metric splits its work in two: an expensive per-graph
//! [`signature`](GraphDistanceMetric::signature) (spectrum density, degree
//! histogram, portrait) and a cheap pairwise
//! [`compare`](GraphDistanceMetric::compare). The matrix builder caches the
//! signature of each graph and only ever calls `compare` per pair.

pub mod degree;
pub mod divergence;
pub mod ipsen;
pub mod portrait;
pub mod spectral;

use crate::error::DistanceError;
use crate::graph::JobGraph;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use degree::DegreeDivergence;
pub use ipsen::{IpsenMikhailov, IpsenMikhailovConfig};
pub use portrait::PortraitDivergence;
pub use spectral::{Kernel, LaplacianSpectral, Measure, SpectralConfig};

/// Strategy interface for graph dissimilarity
pub trait GraphDistanceMetric: Send + Sync {
    /// Per-graph summary the comparison works on
    type Signature: Send + Sync;

    fn name(&self) -> &'static str;

    fn signature(&self, graph: &JobGraph) -> Result<Self::Signature, DistanceError>;

    fn compare(&self, a: &Self::Signature, b: &Self::Signature) -> Result<f64, DistanceError>;

    /// One-off distance between two graphs
    fn distance(&self, a: &JobGraph, b: &JobGraph) -> Result<f64, DistanceError> {
        let sa = self.signature(a)?;
        let sb = self.signature(b)?;
        checked(self.compare(&sa, &sb)?)
    }
}

/// Distances below this are floating-point noise between isomorphic graphs
/// (eigenvalues from differently ordered matrices) and count as exactly zero.
pub const ZERO_TOLERANCE: f64 = 1e-6;

/// Reject values that are not usable as a distance; snap noise to zero
pub fn checked(value: f64) -> Result<f64, DistanceError> {
    if !value.is_finite() || value <= -ZERO_TOLERANCE {
        return Err(DistanceError::InvalidValue(value));
    }
    if value < ZERO_TOLERANCE {
        Ok(0.0)
    } else {
        Ok(value)
    }
}

/// Which metric a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    #[default]
    LaplacianSpectral,
    IpsenMikhailov,
    DegreeDivergence,
    PortraitDivergence,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::LaplacianSpectral,
        MetricKind::IpsenMikhailov,
        MetricKind::DegreeDivergence,
        MetricKind::PortraitDivergence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LaplacianSpectral => "laplacian-spectral",
            Self::IpsenMikhailov => "ipsen-mikhailov",
            Self::DegreeDivergence => "degree-divergence",
            Self::PortraitDivergence => "portrait-divergence",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown metric '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
