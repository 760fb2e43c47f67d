//! Read interface over a store of job stage graphs

use crate::graph::JobGraph;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Opaque identifier of a computation job
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The backing store could not serve a request; fatal to a run
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected schema: {0}")]
    Schema(String),

    #[error("unknown job: {0}")]
    UnknownJob(JobId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Pure read access to job graphs.
///
/// Implementations own their connection: it is acquired when the source is
/// opened and released when the source is dropped.
pub trait GraphSource {
    /// All jobs in a stable enumeration order
    fn list_job_ids(&self) -> Result<Vec<JobId>, SourceError>;

    fn load_graph(&self, job: &JobId) -> Result<JobGraph, SourceError>;
}

impl<S: GraphSource + ?Sized> GraphSource for &S {
    fn list_job_ids(&self) -> Result<Vec<JobId>, SourceError> {
        (**self).list_job_ids()
    }

    fn load_graph(&self, job: &JobId) -> Result<JobGraph, SourceError> {
        (**self).load_graph(job)
    }
}

impl<S: GraphSource + ?Sized> GraphSource for Box<S> {
    fn list_job_ids(&self) -> Result<Vec<JobId>, SourceError> {
        (**self).list_job_ids()
    }

    fn load_graph(&self, job: &JobId) -> Result<JobGraph, SourceError> {
        (**self).load_graph(job)
    }
}
