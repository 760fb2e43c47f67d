//! End-to-end run: load graphs, build the distance matrix, cluster

use crate::cluster::{ClusterAssignment, Dendrogram, ThresholdLinkage};
use crate::config::Config;
use crate::data::{GraphSource, JobId, SourceError};
use crate::distance::{
    DegreeDivergence, GraphDistanceMetric, IpsenMikhailov, LaplacianSpectral, MetricKind,
    PortraitDivergence,
};
use crate::error::ClusterError;
use crate::graph::JobGraph;
use crate::matrix::{build_distance_matrix, DistanceMatrix, GraphFailure, PairFailure};
use anyhow::{Context, Result};

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct ClusteringRun {
    /// Jobs in enumeration order; index i matches matrix row i and label i
    pub job_ids: Vec<JobId>,
    pub metric: MetricKind,
    pub threshold: f64,
    pub matrix: DistanceMatrix,
    pub assignment: ClusterAssignment,
    /// Merges applied before the threshold stopped agglomeration
    pub dendrogram: Dendrogram,
    pub graph_failures: Vec<GraphFailure>,
    pub pair_failures: Vec<PairFailure>,
}

/// Result of clustering an already loaded graph collection
#[derive(Debug, Clone)]
pub struct GraphClustering {
    pub matrix: DistanceMatrix,
    pub assignment: ClusterAssignment,
    pub dendrogram: Dendrogram,
    pub graph_failures: Vec<GraphFailure>,
    pub pair_failures: Vec<PairFailure>,
}

/// Enumerate the source's jobs and load each graph once
pub fn load_graphs<S: GraphSource + ?Sized>(
    source: &S,
) -> Result<(Vec<JobId>, Vec<JobGraph>), SourceError> {
    let job_ids = source.list_job_ids()?;
    log::info!("Loading {} job graphs", job_ids.len());

    let mut graphs = Vec::with_capacity(job_ids.len());
    for job in &job_ids {
        let graph = source.load_graph(job)?;
        log::debug!(
            "Job {}: {} stages, {} links",
            job,
            graph.node_count(),
            graph.edge_count()
        );
        graphs.push(graph);
    }

    let bytes: usize = graphs.iter().map(JobGraph::memory_usage).sum();
    log::info!(
        "Loaded {} graphs ({:.2} KB)",
        graphs.len(),
        bytes as f64 / 1024.0
    );

    Ok((job_ids, graphs))
}

/// Cluster graphs with a concrete metric
pub fn cluster_graphs<M: GraphDistanceMetric>(
    graphs: &[JobGraph],
    metric: &M,
    threshold: f64,
) -> Result<GraphClustering, ClusterError> {
    let linkage = ThresholdLinkage::new(threshold)?;
    let build = build_distance_matrix(graphs, metric);
    let (assignment, dendrogram) = linkage.fit(&build.matrix)?;

    if let Some(degeneracy) = assignment.degeneracy() {
        log::info!("Clustering is degenerate: {:?}", degeneracy);
    }

    Ok(GraphClustering {
        matrix: build.matrix,
        assignment,
        dendrogram,
        graph_failures: build.graph_failures,
        pair_failures: build.pair_failures,
    })
}

/// Instantiate the configured metric and cluster the graphs with it
pub fn cluster_with_config(graphs: &[JobGraph], config: &Config) -> Result<GraphClustering> {
    let threshold = config.threshold;
    let clustering = match config.metric {
        MetricKind::LaplacianSpectral => {
            let metric = LaplacianSpectral::new(config.spectral.clone())
                .context("configuring laplacian-spectral metric")?;
            cluster_graphs(graphs, &metric, threshold)?
        }
        MetricKind::IpsenMikhailov => {
            let metric = IpsenMikhailov::new(config.ipsen.clone())
                .context("configuring ipsen-mikhailov metric")?;
            cluster_graphs(graphs, &metric, threshold)?
        }
        MetricKind::DegreeDivergence => cluster_graphs(graphs, &DegreeDivergence, threshold)?,
        MetricKind::PortraitDivergence => cluster_graphs(graphs, &PortraitDivergence, threshold)?,
    };
    Ok(clustering)
}

/// Full run over a source
pub fn run<S: GraphSource + ?Sized>(source: &S, config: &Config) -> Result<ClusteringRun> {
    config.validate()?;
    log::info!(
        "Clustering with {} at threshold {}",
        config.metric,
        config.threshold
    );

    let (job_ids, graphs) = load_graphs(source)?;
    let clustering = cluster_with_config(&graphs, config)?;

    log::info!(
        "Assigned {} jobs to {} clusters",
        job_ids.len(),
        clustering.assignment.cluster_count()
    );

    Ok(ClusteringRun {
        job_ids,
        metric: config.metric,
        threshold: config.threshold,
        matrix: clustering.matrix,
        assignment: clustering.assignment,
        dendrogram: clustering.dendrogram,
        graph_failures: clustering.graph_failures,
        pair_failures: clustering.pair_failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemorySource;

    struct BrokenSource;

    impl GraphSource for BrokenSource {
        fn list_job_ids(&self) -> Result<Vec<JobId>, SourceError> {
            Err(SourceError::Unavailable("connection refused".to_string()))
        }

        fn load_graph(&self, job: &JobId) -> Result<JobGraph, SourceError> {
            Err(SourceError::UnknownJob(job.clone()))
        }
    }

    #[test]
    fn source_errors_surface_unchanged() {
        let err = run(&BrokenSource, &Config::default()).unwrap_err();
        let source_err = err.downcast_ref::<SourceError>().unwrap();
        assert!(matches!(source_err, SourceError::Unavailable(_)));
    }

    #[test]
    fn every_metric_runs_end_to_end() {
        let source = InMemorySource::new()
            .with_job("j1", JobGraph::from_edges([("1", "2"), ("2", "3")]))
            .with_job("j2", JobGraph::from_edges([("a", "b"), ("b", "c")]))
            .with_job("j3", JobGraph::from_edges([("1", "2"), ("1", "3"), ("1", "4"), ("1", "5")]));

        for metric in MetricKind::ALL {
            let config = Config {
                metric,
                ..Config::default()
            };
            let run = run(&source, &config).unwrap();
            assert_eq!(run.job_ids.len(), 3);
            assert!(run.assignment.same_cluster(0, 1), "{}", metric);
            assert!(!run.assignment.same_cluster(0, 2), "{}", metric);
        }
    }

    #[test]
    fn invalid_threshold_is_rejected_before_loading() {
        let config = Config {
            threshold: -0.5,
            ..Config::default()
        };
        assert!(run(&BrokenSource, &config).is_err());
        assert!(matches!(
            cluster_graphs(&[], &DegreeDivergence, f64::NAN),
            Err(ClusterError::InvalidThreshold(_))
        ));
    }
}
