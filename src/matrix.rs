//! Pairwise distance matrix over a collection of job graphs

use crate::distance::{checked, GraphDistanceMetric};
use crate::error::{DistanceError, MatrixError};
use crate::graph::JobGraph;
use dashmap::DashMap;
use itertools::Itertools;
use ndarray::Array2;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Tolerance used when validating symmetry of a precomputed matrix
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Symmetric N×N matrix of graph distances.
///
/// The diagonal is exactly zero and every defined entry is finite and
/// non-negative. A `None` cell means the distance could not be computed;
/// it never stands for zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    cells: Array2<Option<f64>>,
}

impl DistanceMatrix {
    /// Matrix with a zero diagonal and every other cell undefined
    pub fn undefined(n: usize) -> Self {
        let mut cells = Array2::from_elem((n, n), None);
        for i in 0..n {
            cells[[i, i]] = Some(0.0);
        }
        Self { cells }
    }

    /// Validate and wrap a precomputed dense matrix
    pub fn from_dense(values: Array2<f64>) -> Result<Self, MatrixError> {
        let (rows, cols) = values.dim();
        if rows != cols {
            return Err(MatrixError::NotSquare { rows, cols });
        }

        for ((row, col), &value) in values.indexed_iter() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(MatrixError::InvalidEntry { row, col, value });
            }
            if row == col && value != 0.0 {
                return Err(MatrixError::NonZeroDiagonal { index: row, value });
            }
            if row < col && (value - values[[col, row]]).abs() > SYMMETRY_TOLERANCE {
                return Err(MatrixError::Asymmetric { row, col });
            }
        }

        let mut matrix = Self::undefined(rows);
        for (i, j) in (0..rows).tuple_combinations() {
            matrix.set(i, j, values[[i, j]]);
        }
        Ok(matrix)
    }

    /// Write one canonical value into both mirrored cells
    pub(crate) fn set(&mut self, i: usize, j: usize, distance: f64) {
        self.cells[[i, j]] = Some(distance);
        self.cells[[j, i]] = Some(distance);
    }

    pub fn len(&self) -> usize {
        self.cells.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.cells[[i, j]]
    }

    /// Upper-triangle cells that hold a distance, as `(i, j, distance)` with `i < j`
    pub fn defined_pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.len())
            .tuple_combinations()
            .filter_map(move |(i, j)| self.get(i, j).map(|d| (i, j, d)))
    }

    /// Number of unordered pairs without a distance
    pub fn undefined_count(&self) -> usize {
        (0..self.len())
            .tuple_combinations()
            .filter(|&(i, j)| self.get(i, j).is_none())
            .count()
    }

    pub fn max_distance(&self) -> Option<f64> {
        self.defined_pairs().map(|(_, _, d)| d).reduce(f64::max)
    }
}

type SignatureSlot<S> = Arc<OnceLock<Result<Arc<S>, DistanceError>>>;

/// Per-graph signatures, each computed at most once.
///
/// Every index owns a `OnceLock` slot. The DashMap shard lock is only held
/// while the slot is looked up or inserted; the computation itself runs in
/// `get_or_init`, so concurrent first requests for the same graph wait for
/// a single computation while other graphs proceed. Failures are cached too.
pub struct SignatureCache<'g, M: GraphDistanceMetric> {
    metric: &'g M,
    graphs: &'g [JobGraph],
    slots: DashMap<usize, SignatureSlot<M::Signature>>,
    computations: AtomicUsize,
}

impl<'g, M: GraphDistanceMetric> SignatureCache<'g, M> {
    pub fn new(metric: &'g M, graphs: &'g [JobGraph]) -> Self {
        Self {
            metric,
            graphs,
            slots: DashMap::with_capacity(graphs.len()),
            computations: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, index: usize) -> Result<Arc<M::Signature>, DistanceError> {
        let slot = Arc::clone(&self.slots.entry(index).or_default());

        slot.get_or_init(|| {
            self.computations.fetch_add(1, Ordering::Relaxed);
            self.metric.signature(&self.graphs[index]).map(Arc::new)
        })
        .clone()
    }

    /// How many signatures were actually computed
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    /// Graphs whose signature failed, by index
    pub fn failures(&self) -> Vec<GraphFailure> {
        let mut failures: Vec<GraphFailure> = self
            .slots
            .iter()
            .filter_map(|slot| match slot.value().get() {
                Some(Err(error)) => Some(GraphFailure {
                    index: *slot.key(),
                    error: error.clone(),
                }),
                _ => None,
            })
            .collect();
        failures.sort_by_key(|f| f.index);
        failures
    }
}

/// A graph whose signature could not be computed; all its cells are undefined
#[derive(Debug, Clone, PartialEq)]
pub struct GraphFailure {
    pub index: usize,
    pub error: DistanceError,
}

/// A pair whose comparison failed although both signatures exist
#[derive(Debug, Clone, PartialEq)]
pub struct PairFailure {
    pub left: usize,
    pub right: usize,
    pub error: DistanceError,
}

#[derive(Debug, Clone)]
pub struct MatrixBuild {
    pub matrix: DistanceMatrix,
    pub graph_failures: Vec<GraphFailure>,
    pub pair_failures: Vec<PairFailure>,
    /// Signature computations performed; equals the number of graphs touched
    pub signature_computations: usize,
}

impl MatrixBuild {
    pub fn is_complete(&self) -> bool {
        self.graph_failures.is_empty() && self.pair_failures.is_empty()
    }
}

/// Evaluate the metric once per unordered pair, in parallel, and mirror each
/// result into both cells.
pub fn build_distance_matrix<M: GraphDistanceMetric>(graphs: &[JobGraph], metric: &M) -> MatrixBuild {
    let n = graphs.len();
    let cache = SignatureCache::new(metric, graphs);
    let pairs: Vec<(usize, usize)> = (0..n).tuple_combinations().collect();

    log::info!(
        "Computing {} pairwise {} distances over {} graphs",
        pairs.len(),
        metric.name(),
        n
    );

    let outcomes: Vec<(usize, usize, Option<Result<f64, DistanceError>>)> = pairs
        .into_par_iter()
        .map(|(i, j)| {
            let outcome = match (cache.get(i), cache.get(j)) {
                (Ok(a), Ok(b)) => Some(metric.compare(&a, &b).and_then(checked)),
                _ => None,
            };
            (i, j, outcome)
        })
        .collect();

    let mut matrix = DistanceMatrix::undefined(n);
    let mut pair_failures = Vec::new();
    for (i, j, outcome) in outcomes {
        match outcome {
            Some(Ok(distance)) => matrix.set(i, j, distance),
            Some(Err(error)) => {
                log::warn!("Distance between graphs {} and {} failed: {}", i, j, error);
                pair_failures.push(PairFailure {
                    left: i,
                    right: j,
                    error,
                });
            }
            None => {}
        }
    }

    let graph_failures = cache.failures();
    for failure in &graph_failures {
        log::warn!(
            "Graph {} excluded from comparison: {}",
            failure.index,
            failure.error
        );
    }

    log::info!(
        "Distance matrix ready: {} signatures computed, {} undefined pairs",
        cache.computations(),
        matrix.undefined_count()
    );

    MatrixBuild {
        matrix,
        graph_failures,
        pair_failures,
        signature_computations: cache.computations(),
    }
}
