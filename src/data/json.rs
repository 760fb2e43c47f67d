//! JSON stage-link documents
//!
//! ```json
//! {"jobs": [
//!   {"job_id": "j1", "links": [[1, 2], [2, 3]]},
//!   {"job_id": "j2", "stages": ["solo"], "links": []}
//! ]}
//! ```
//!
//! `stages` lists stages that may have no links; stage ids may be strings or integers.

use crate::data::source::{GraphSource, JobId, SourceError};
use crate::graph::{GraphBuilder, JobGraph};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StageRef {
    Text(String),
    Number(i64),
}

impl StageRef {
    fn to_id(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct JobRecord {
    job_id: JobId,
    #[serde(default)]
    stages: Vec<StageRef>,
    #[serde(default)]
    links: Vec<(StageRef, StageRef)>,
}

#[derive(Debug, Deserialize)]
struct Document {
    jobs: Vec<JobRecord>,
}

/// Graph source backed by a JSON document read at open time
#[derive(Debug)]
pub struct JsonStageSource {
    jobs: Vec<JobRecord>,
    /// Position of every job in `jobs`
    index: HashMap<JobId, usize>,
}

impl JsonStageSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }

        log::info!("Reading JSON stage links: {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let document: Document = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SourceError> {
        Self::from_document(serde_json::from_str(text)?)
    }

    fn from_document(document: Document) -> Result<Self, SourceError> {
        let mut index = HashMap::with_capacity(document.jobs.len());
        for (position, job) in document.jobs.iter().enumerate() {
            if index.insert(job.job_id.clone(), position).is_some() {
                return Err(SourceError::Schema(format!("job {} listed twice", job.job_id)));
            }
        }

        log::info!("Loaded {} jobs", document.jobs.len());
        Ok(Self {
            jobs: document.jobs,
            index,
        })
    }
}

impl GraphSource for JsonStageSource {
    fn list_job_ids(&self) -> Result<Vec<JobId>, SourceError> {
        Ok(self.jobs.iter().map(|job| job.job_id.clone()).collect())
    }

    fn load_graph(&self, job: &JobId) -> Result<JobGraph, SourceError> {
        let record = self
            .index
            .get(job)
            .and_then(|&position| self.jobs.get(position))
            .ok_or_else(|| SourceError::UnknownJob(job.clone()))?;

        let mut builder = GraphBuilder::with_capacity(record.stages.len() + record.links.len());
        for (src, dst) in &record.links {
            builder.add_edge(&src.to_id(), &dst.to_id());
        }
        for stage in &record.stages {
            builder.add_stage(&stage.to_id());
        }
        Ok(builder.build())
    }
}
