//! Core library functions for the job graph clusterer
//!
//! Groups job stage-dependency graphs by structural similarity: a pluggable
//! graph distance fills a pairwise matrix, and single-linkage agglomeration
//! with a distance threshold turns it into cluster labels.

pub mod cluster;
pub mod config;
pub mod data;
pub mod distance;
pub mod error;
pub mod graph;
pub mod matrix;
pub mod pipeline;
pub mod report;

pub use anyhow::{anyhow, Result};
pub use cluster::{ClusterAssignment, ThresholdLinkage};
pub use config::Config;
pub use data::{GraphSource, JobId};
pub use distance::{GraphDistanceMetric, MetricKind};
pub use graph::JobGraph;
pub use matrix::{build_distance_matrix, DistanceMatrix};
pub use pipeline::{run, ClusteringRun};
