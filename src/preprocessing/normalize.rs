//! Z-score standardization

use crate::error::{Error, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Standard deviations below this are treated as constant columns
const MIN_STD: f64 = 1e-10;

/// Normalizer trait
pub trait Normalizer {
    /// Fit the normalizer to training data
    fn fit(&mut self, data: &Array2<f64>);

    /// Transform data using fitted parameters
    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>>;

    /// Fit and transform in one step
    fn fit_transform(&mut self, data: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(data);
        self.transform(data)
    }

    /// Inverse transform to original scale
    fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>>;
}

/// Per-column (x - mean) / std with population standard deviation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StandardNormalizer {
    pub mean: Option<Array1<f64>>,
    pub std: Option<Array1<f64>>,
}

impl StandardNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an already fitted normalizer
    pub fn from_stats(mean: Array1<f64>, std: Array1<f64>) -> Self {
        Self {
            mean: Some(mean),
            std: Some(std.mapv(guard_std)),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.std.is_some()
    }

    fn stats(&self, width: usize) -> Result<(&Array1<f64>, &Array1<f64>)> {
        let (mean, std) = match (&self.mean, &self.std) {
            (Some(mean), Some(std)) => (mean, std),
            _ => return Err(Error::InvalidInput("normalizer not fitted".into())),
        };
        if mean.len() != width {
            return Err(Error::ShapeMismatch {
                context: "normalizer columns",
                expected: mean.len(),
                actual: width,
            });
        }
        Ok((mean, std))
    }
}

fn guard_std(v: f64) -> f64 {
    if v.abs() < MIN_STD {
        1.0
    } else {
        v
    }
}

impl Normalizer for StandardNormalizer {
    /// Column statistics are computed on values divided by the column's
    /// largest magnitude, so values near `f64::MAX` do not overflow the sums
    fn fit(&mut self, data: &Array2<f64>) {
        let n = data.nrows().max(1) as f64;

        let mut mean = Array1::zeros(data.ncols());
        let mut std = Array1::zeros(data.ncols());
        for (j, column) in data.columns().into_iter().enumerate() {
            let peak = column.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            let scale = if peak > 0.0 && peak.is_finite() { peak } else { 1.0 };

            let scaled = column.mapv(|v| v / scale);
            let m = scaled.sum() / n;
            let var = scaled.mapv(|v| (v - m) * (v - m)).sum() / n;

            mean[j] = m * scale;
            std[j] = var.sqrt() * scale;
        }

        self.mean = Some(mean);
        self.std = Some(std.mapv(guard_std));
    }

    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, std) = self.stats(data.ncols())?;

        // halved operands keep `MAX - MIN` finite
        let mut result = Array2::zeros(data.dim());
        for ((i, j), &v) in data.indexed_iter() {
            result[[i, j]] = (0.5 * v - 0.5 * mean[j]) / std[j] * 2.0;
        }
        Ok(result)
    }

    fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, std) = self.stats(data.ncols())?;

        let mut result = Array2::zeros(data.dim());
        for (i, row) in data.rows().into_iter().enumerate() {
            let denormalized = &row * std + mean;
            result.row_mut(i).assign(&denormalized);
        }
        Ok(result)
    }
}
