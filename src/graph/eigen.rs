//! Deterministic symmetric eigenvalue solver (cyclic Jacobi)

use crate::error::DistanceError;
use ndarray::Array2;

/// Stopping rule for the Jacobi sweeps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobiSettings {
    /// Maximum number of full sweeps over the upper triangle
    pub max_sweeps: usize,

    /// Relative off-diagonal Frobenius norm considered converged
    pub tolerance: f64,
}

impl Default for JacobiSettings {
    fn default() -> Self {
        Self {
            max_sweeps: 64,
            tolerance: 1e-12,
        }
    }
}

fn off_diagonal_norm(a: &Array2<f64>) -> f64 {
    let n = a.nrows();
    let mut sum = 0.0;
    for p in 0..n {
        for q in (p + 1)..n {
            sum += a[[p, q]] * a[[p, q]];
        }
    }
    (2.0 * sum).sqrt()
}

/// Eigenvalues of a real symmetric matrix in ascending order.
///
/// Rotations are applied in a fixed cyclic order, so identical input always
/// yields bit-identical output. Only the upper triangle drives the rotations;
/// the caller is responsible for passing a symmetric matrix.
pub fn symmetric_eigenvalues(
    matrix: &Array2<f64>,
    settings: JacobiSettings,
) -> Result<Vec<f64>, DistanceError> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(DistanceError::InvalidParameter(format!(
            "eigenvalues need a square matrix, got {}x{}",
            n,
            matrix.ncols()
        )));
    }

    let mut a = matrix.to_owned();
    let scale = a.iter().map(|v| v * v).sum::<f64>().sqrt();
    if scale == 0.0 {
        return Ok(vec![0.0; n]);
    }
    if !scale.is_finite() {
        return Err(DistanceError::InvalidParameter(
            "matrix contains non-finite entries".to_string(),
        ));
    }

    let threshold = settings.tolerance * scale;
    let mut residual = off_diagonal_norm(&a);

    for _ in 0..settings.max_sweeps {
        if residual <= threshold {
            return Ok(sorted_diagonal(&a));
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }

                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // A <- A J
                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                // A <- Jᵀ A
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                a[[p, q]] = 0.0;
                a[[q, p]] = 0.0;
            }
        }

        residual = off_diagonal_norm(&a);
    }

    if residual <= threshold {
        return Ok(sorted_diagonal(&a));
    }

    Err(DistanceError::NonConvergence {
        sweeps: settings.max_sweeps,
        residual,
    })
}

fn sorted_diagonal(a: &Array2<f64>) -> Vec<f64> {
    let mut values: Vec<f64> = a.diag().to_vec();
    values.sort_by(|x, y| x.total_cmp(y));
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn diagonal_matrix() {
        let m = array![[3.0, 0.0], [0.0, -1.0]];
        let values = symmetric_eigenvalues(&m, JacobiSettings::default()).unwrap();
        assert_close(&values, &[-1.0, 3.0]);
    }

    #[test]
    fn two_by_two() {
        let m = array![[2.0, 1.0], [1.0, 2.0]];
        let values = symmetric_eigenvalues(&m, JacobiSettings::default()).unwrap();
        assert_close(&values, &[1.0, 3.0]);
    }

    #[test]
    fn triangle_laplacian() {
        let m = array![[2.0, -1.0, -1.0], [-1.0, 2.0, -1.0], [-1.0, -1.0, 2.0]];
        let values = symmetric_eigenvalues(&m, JacobiSettings::default()).unwrap();
        assert_close(&values, &[0.0, 3.0, 3.0]);
    }

    #[test]
    fn path_laplacian() {
        // P3: eigenvalues 0, 1, 3
        let m = array![[1.0, -1.0, 0.0], [-1.0, 2.0, -1.0], [0.0, -1.0, 1.0]];
        let values = symmetric_eigenvalues(&m, JacobiSettings::default()).unwrap();
        assert_close(&values, &[0.0, 1.0, 3.0]);
    }

    #[test]
    fn zero_matrix_and_empty() {
        let values = symmetric_eigenvalues(&Array2::zeros((3, 3)), JacobiSettings::default()).unwrap();
        assert_eq!(values, vec![0.0; 3]);

        let values = symmetric_eigenvalues(&Array2::zeros((0, 0)), JacobiSettings::default()).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn deterministic() {
        let m = array![[4.0, 1.0, 0.5], [1.0, 3.0, 0.25], [0.5, 0.25, 1.0]];
        let a = symmetric_eigenvalues(&m, JacobiSettings::default()).unwrap();
        let b = symmetric_eigenvalues(&m, JacobiSettings::default()).unwrap();
        assert_eq!(a, b);
        let trace: f64 = a.iter().sum();
        assert!((trace - 8.0).abs() < 1e-9);
    }

    #[test]
    fn reports_non_convergence() {
        let m = array![[4.0, 1.0, 0.5], [1.0, 3.0, 0.25], [0.5, 0.25, 1.0]];
        let settings = JacobiSettings {
            max_sweeps: 0,
            tolerance: 1e-12,
        };
        let err = symmetric_eigenvalues(&m, settings).unwrap_err();
        assert!(matches!(err, DistanceError::NonConvergence { sweeps: 0, .. }));
    }

    #[test]
    fn rejects_non_square() {
        let err = symmetric_eigenvalues(&Array2::zeros((2, 3)), JacobiSettings::default()).unwrap_err();
        assert!(matches!(err, DistanceError::InvalidParameter(_)));
    }
}
