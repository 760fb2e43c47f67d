//! Adjacency and Laplacian operators of a job graph

use crate::graph::JobGraph;
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a directed graph is turned into a symmetric operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaplacianMode {
    /// Bipartite block matrix `[[0, Aᵀ], [A, 0]]` over 2n nodes; keeps direction
    #[default]
    Augmented,
    /// Undirected skeleton `A ∨ Aᵀ` over n nodes
    Skeleton,
}

impl FromStr for LaplacianMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "augmented" => Ok(Self::Augmented),
            "skeleton" => Ok(Self::Skeleton),
            other => Err(format!("unknown laplacian mode '{}'", other)),
        }
    }
}

impl fmt::Display for LaplacianMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Augmented => f.write_str("augmented"),
            Self::Skeleton => f.write_str("skeleton"),
        }
    }
}

/// Dense directed adjacency matrix. A graph without stages is treated as one isolated stage.
pub fn adjacency(graph: &JobGraph) -> Array2<f64> {
    let n = graph.node_count().max(1);
    let mut adj = Array2::zeros((n, n));
    for (src, dst) in graph.edges() {
        adj[[src, dst]] = 1.0;
    }
    adj
}

/// Symmetric adjacency according to the chosen directed-graph policy
pub fn symmetric_adjacency(graph: &JobGraph, mode: LaplacianMode) -> Array2<f64> {
    let adj = adjacency(graph);
    let n = adj.nrows();

    match mode {
        LaplacianMode::Augmented => {
            let mut block = Array2::zeros((2 * n, 2 * n));
            block.slice_mut(s![..n, n..]).assign(&adj.t());
            block.slice_mut(s![n.., ..n]).assign(&adj);
            block
        }
        LaplacianMode::Skeleton => {
            let mut sym = adj.clone();
            for ((i, j), &value) in adj.indexed_iter() {
                if value > 0.0 {
                    sym[[j, i]] = value;
                }
            }
            sym
        }
    }
}

/// Combinatorial Laplacian `D - W` of a symmetric adjacency matrix
pub fn combinatorial_laplacian(weights: &Array2<f64>) -> Array2<f64> {
    let degrees = weights.sum_axis(ndarray::Axis(1));
    let mut lap = -weights.clone();
    for (i, degree) in degrees.iter().enumerate() {
        lap[[i, i]] += degree;
    }
    lap
}

/// Normalized Laplacian `I - D^-1/2 W D^-1/2`; isolated nodes keep a zero row and column
pub fn normalized_laplacian(weights: &Array2<f64>) -> Array2<f64> {
    let n = weights.nrows();
    let degrees = weights.sum_axis(ndarray::Axis(1));
    let inv_sqrt: Vec<f64> = degrees
        .iter()
        .map(|&d| if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 })
        .collect();

    let mut lap = Array2::zeros((n, n));
    for i in 0..n {
        if degrees[i] > 0.0 {
            lap[[i, i]] = 1.0 - weights[[i, i]] * inv_sqrt[i] * inv_sqrt[i];
        }
        for j in 0..n {
            if i != j && weights[[i, j]] != 0.0 {
                lap[[i, j]] = -weights[[i, j]] * inv_sqrt[i] * inv_sqrt[j];
            }
        }
    }
    lap
}
