//! In-memory graph source

use crate::data::source::{GraphSource, JobId, SourceError};
use crate::graph::JobGraph;

/// Jobs kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    jobs: Vec<(JobId, JobGraph)>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a job, replacing any previous graph with the same id in place
    pub fn insert(&mut self, job: impl Into<JobId>, graph: JobGraph) {
        let job = job.into();
        match self.jobs.iter_mut().find(|(id, _)| *id == job) {
            Some(slot) => slot.1 = graph,
            None => self.jobs.push((job, graph)),
        }
    }

    pub fn with_job(mut self, job: impl Into<JobId>, graph: JobGraph) -> Self {
        self.insert(job, graph);
        self
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl<J: Into<JobId>> FromIterator<(J, JobGraph)> for InMemorySource {
    fn from_iter<I: IntoIterator<Item = (J, JobGraph)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (job, graph) in iter {
            source.insert(job, graph);
        }
        source
    }
}

impl GraphSource for InMemorySource {
    fn list_job_ids(&self) -> Result<Vec<JobId>, SourceError> {
        Ok(self.jobs.iter().map(|(id, _)| id.clone()).collect())
    }

    fn load_graph(&self, job: &JobId) -> Result<JobGraph, SourceError> {
        self.jobs
            .iter()
            .find(|(id, _)| id == job)
            .map(|(_, graph)| graph.clone())
            .ok_or_else(|| SourceError::UnknownJob(job.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_replaces() {
        let path = JobGraph::from_edges([("1", "2")]);
        let source: InMemorySource = [("b", path.clone()), ("a", JobGraph::empty()), ("b", path.clone())]
            .into_iter()
            .collect();

        let ids = source.list_job_ids().unwrap();
        assert_eq!(ids, vec![JobId::new("b"), JobId::new("a")]);
        assert_eq!(source.load_graph(&JobId::new("b")).unwrap(), path);
        assert!(matches!(
            source.load_graph(&JobId::new("zzz")),
            Err(SourceError::UnknownJob(_))
        ));
    }
}
