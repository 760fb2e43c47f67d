//! Reporting of clustering results

use crate::cluster::{summarize, Cluster, Degeneracy, Merge};
use crate::pipeline::ClusteringRun;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;

/// Consumer of a finished run
pub trait Reporter {
    fn report(&mut self, run: &ClusteringRun) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Label vector in enumeration order, e.g. `[0 0 1]`
    #[default]
    Labels,
    Json,
}

/// Writes a run to any writer (stdout in the binary)
pub struct ConsoleReporter<W: Write> {
    out: W,
    format: ReportFormat,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, format: ReportFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Serialize)]
struct FailureReport {
    jobs: Vec<String>,
    error: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    metric: String,
    threshold: f64,
    job_ids: Vec<&'a str>,
    labels: &'a [usize],
    cluster_count: usize,
    degeneracy: Option<Degeneracy>,
    clusters: Vec<Cluster>,
    merges: &'a [Merge],
    failures: Vec<FailureReport>,
}

/// Render labels the way a numeric array prints: `[0 0 1]`
pub fn format_labels(labels: &[usize]) -> String {
    let body: Vec<String> = labels.iter().map(usize::to_string).collect();
    format!("[{}]", body.join(" "))
}

fn json_report(run: &ClusteringRun) -> JsonReport<'_> {
    let job = |index: usize| run.job_ids[index].to_string();

    let mut failures: Vec<FailureReport> = run
        .graph_failures
        .iter()
        .map(|f| FailureReport {
            jobs: vec![job(f.index)],
            error: f.error.to_string(),
        })
        .collect();
    failures.extend(run.pair_failures.iter().map(|f| FailureReport {
        jobs: vec![job(f.left), job(f.right)],
        error: f.error.to_string(),
    }));

    JsonReport {
        metric: run.metric.to_string(),
        threshold: run.threshold,
        job_ids: run.job_ids.iter().map(|id| id.as_str()).collect(),
        labels: run.assignment.labels(),
        cluster_count: run.assignment.cluster_count(),
        degeneracy: run.assignment.degeneracy(),
        clusters: summarize(&run.assignment, &run.matrix),
        merges: run.dendrogram.merges(),
        failures,
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, run: &ClusteringRun) -> Result<()> {
        match self.format {
            ReportFormat::Labels => {
                writeln!(self.out, "{}", format_labels(run.assignment.labels()))?;
            }
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut self.out, &json_report(run))?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::InMemorySource;
    use crate::graph::JobGraph;
    use crate::pipeline::run;

    fn sample_run() -> ClusteringRun {
        let source = InMemorySource::new()
            .with_job("j1", JobGraph::from_edges([("1", "2"), ("2", "3")]))
            .with_job("j2", JobGraph::from_edges([("1", "2"), ("2", "3")]))
            .with_job("j3", JobGraph::from_edges([("1", "2"), ("2", "3"), ("3", "1")]));
        run(&source, &Config::default()).unwrap()
    }

    #[test]
    fn labels_line() {
        let mut reporter = ConsoleReporter::new(Vec::new(), ReportFormat::Labels);
        reporter.report(&sample_run()).unwrap();
        assert_eq!(String::from_utf8(reporter.into_inner()).unwrap(), "[0 0 1]\n");
    }

    #[test]
    fn json_document() {
        let mut reporter = ConsoleReporter::new(Vec::new(), ReportFormat::Json);
        reporter.report(&sample_run()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&reporter.into_inner()).unwrap();
        assert_eq!(value["metric"], "laplacian-spectral");
        assert_eq!(value["labels"], serde_json::json!([0, 0, 1]));
        assert_eq!(value["job_ids"][2], "j3");
        assert_eq!(value["clusters"][0]["members"], serde_json::json!([0, 1]));
        assert_eq!(value["merges"].as_array().unwrap().len(), 1);
        assert!(value["failures"].as_array().unwrap().is_empty());
    }

    #[test]
    fn empty_labels() {
        assert_eq!(format_labels(&[]), "[]");
    }
}
