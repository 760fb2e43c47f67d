//! Configuration management for the job graph clusterer
//!
//! Every field has a default, so a TOML file only needs the values it changes:
//!
//! ```toml
//! threshold = 0.1
//! metric = "laplacian-spectral"
//!
//! [source]
//! path = "resources/stage_links.parquet"
//!
//! [spectral]
//! laplacian = "augmented"
//! hwhm = 0.011775
//! grid_points = 2001
//! ```

use crate::data::SourceFormat;
use crate::distance::{IpsenMikhailovConfig, MetricKind, SpectralConfig};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where job graphs are read from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: Option<PathBuf>,

    /// Inferred from the file extension when absent
    pub format: Option<SourceFormat>,
}

/// Settings for one clustering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Largest merge distance still admitted by single linkage
    pub threshold: f64,

    /// Distance metric used for every pair in the run
    pub metric: MetricKind,

    pub spectral: SpectralConfig,

    pub ipsen: IpsenMikhailovConfig,

    /// Number of worker threads (0 = use all available cores)
    pub threads: usize,

    pub source: SourceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            metric: MetricKind::LaplacianSpectral,
            spectral: SpectralConfig::default(),
            ipsen: IpsenMikhailovConfig::default(),
            threads: 0,
            source: SourceConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("in config file {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("parsing TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could use
    pub fn validate(&self) -> Result<()> {
        if self.threshold.is_nan() || self.threshold < 0.0 {
            bail!("threshold must be a non-negative number, got {}", self.threshold);
        }
        if !(self.spectral.hwhm.is_finite() && self.spectral.hwhm > 0.0) {
            bail!("spectral.hwhm must be positive, got {}", self.spectral.hwhm);
        }
        if self.spectral.grid_points < 2 {
            bail!("spectral.grid_points must be at least 2, got {}", self.spectral.grid_points);
        }
        if !(self.ipsen.hwhm.is_finite() && self.ipsen.hwhm > 0.0) {
            bail!("ipsen.hwhm must be positive, got {}", self.ipsen.hwhm);
        }
        if self.ipsen.grid_points < 2 {
            bail!("ipsen.grid_points must be at least 2, got {}", self.ipsen.grid_points);
        }
        Ok(())
    }

    /// Worker threads to use, resolving 0 to the number of cores
    pub fn worker_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            num_cpus::get()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{Kernel, Measure};
    use crate::graph::LaplacianMode;

    #[test]
    fn defaults_match_reference_run() {
        let config = Config::default();
        assert_eq!(config.threshold, 0.1);
        assert_eq!(config.metric, MetricKind::LaplacianSpectral);
        assert_eq!(config.spectral.laplacian, LaplacianMode::Augmented);
        assert!(config.validate().is_ok());
        assert!(config.worker_threads() >= 1);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            threshold = 0.25
            metric = "portrait-divergence"

            [source]
            path = "links.json"

            [spectral]
            kernel = "lorentzian"
            measure = "euclidean"
            laplacian = "skeleton"
            "#,
        )
        .unwrap();

        assert_eq!(config.threshold, 0.25);
        assert_eq!(config.metric, MetricKind::PortraitDivergence);
        assert_eq!(config.spectral.kernel, Kernel::Lorentzian);
        assert_eq!(config.spectral.measure, Measure::Euclidean);
        assert_eq!(config.spectral.laplacian, LaplacianMode::Skeleton);
        assert_eq!(config.spectral.grid_points, 2001);
        assert_eq!(config.source.path, Some(PathBuf::from("links.json")));
        assert_eq!(config.source.format, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Config::from_toml_str("threshold = -1.0").is_err());
        assert!(Config::from_toml_str("[spectral]\nhwhm = 0.0").is_err());
        assert!(Config::from_toml_str("metric = \"netlsd\"").is_err());
    }

    #[test]
    fn reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clusterer.toml");
        std::fs::write(&path, "threads = 3\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.worker_threads(), 3);
        assert!(Config::from_file(dir.path().join("missing.toml")).is_err());
    }
}
