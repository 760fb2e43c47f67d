//! Integrals and divergences shared by the metric implementations

use crate::error::DistanceError;

/// Uniform grid `[start, end]` with `points` samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl Grid {
    pub fn new(start: f64, end: f64, points: usize) -> Result<Self, DistanceError> {
        if points < 2 {
            return Err(DistanceError::InvalidParameter(format!(
                "evaluation grid needs at least 2 points, got {}",
                points
            )));
        }
        if !(start.is_finite() && end.is_finite() && end > start) {
            return Err(DistanceError::InvalidParameter(format!(
                "invalid evaluation interval [{}, {}]",
                start, end
            )));
        }
        Ok(Self { start, end, points })
    }

    pub fn step(&self) -> f64 {
        (self.end - self.start) / (self.points - 1) as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let step = self.step();
        (0..self.points).map(move |i| self.start + step * i as f64)
    }
}

/// Composite trapezoid rule over equally spaced samples
pub fn trapezoid(values: &[f64], step: f64) -> f64 {
    match values.len() {
        0 | 1 => 0.0,
        n => {
            let inner: f64 = values[1..n - 1].iter().sum();
            step * (inner + 0.5 * (values[0] + values[n - 1]))
        }
    }
}

/// Square root of the Jensen–Shannon divergence between two sampled densities
pub fn jensen_shannon_curves(p: &[f64], q: &[f64], step: f64) -> f64 {
    let mut kl_p = Vec::with_capacity(p.len());
    let mut kl_q = Vec::with_capacity(q.len());

    for (&a, &b) in p.iter().zip(q) {
        let m = 0.5 * (a + b);
        // x ln x -> 0, so a side without mass contributes nothing
        kl_p.push(if a > 0.0 { a * (a / m).ln() } else { 0.0 });
        kl_q.push(if b > 0.0 { b * (b / m).ln() } else { 0.0 });
    }

    let js = 0.5 * (trapezoid(&kl_p, step) + trapezoid(&kl_q, step));
    js.max(0.0).sqrt()
}

/// L2 distance between two sampled curves
pub fn l2_curves(p: &[f64], q: &[f64], step: f64) -> f64 {
    let squared: Vec<f64> = p.iter().zip(q).map(|(a, b)| (a - b) * (a - b)).collect();
    trapezoid(&squared, step).max(0.0).sqrt()
}

/// Jensen–Shannon divergence between two histograms, padded to equal length
/// and normalized; `base` selects the logarithm.
pub fn jensen_shannon_discrete(p: &[f64], q: &[f64], base: f64) -> Result<f64, DistanceError> {
    let p_total: f64 = p.iter().sum();
    let q_total: f64 = q.iter().sum();
    if p_total <= 0.0 || q_total <= 0.0 {
        return Err(DistanceError::InvalidParameter(
            "cannot compare an empty distribution".to_string(),
        ));
    }

    let len = p.len().max(q.len());
    let mut divergence = 0.0;
    for i in 0..len {
        let a = p.get(i).copied().unwrap_or(0.0) / p_total;
        let b = q.get(i).copied().unwrap_or(0.0) / q_total;
        let m = 0.5 * (a + b);
        if a > 0.0 {
            divergence += 0.5 * a * (a / m).ln();
        }
        if b > 0.0 {
            divergence += 0.5 * b * (b / m).ln();
        }
    }

    Ok((divergence / base.ln()).max(0.0))
}
