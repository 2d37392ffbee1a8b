//! Reconstruction losses

use crate::error::{Error, Result};
use ndarray::{Array2, Zip};

/// Mean squared error over every element
pub fn mse(predicted: &Array2<f64>, target: &Array2<f64>) -> Result<f64> {
    check_shape(predicted, target, "mse target")?;
    let n = predicted.len().max(1) as f64;
    Ok(Zip::from(predicted)
        .and(target)
        .fold(0.0, |acc, &p, &t| acc + (p - t) * (p - t))
        / n)
}

/// Squared error restricted to observed cells.
///
/// The sum of masked squared errors is divided by the mask sum clamped to at
/// least 1, so an all-zero mask gives a zero loss and zero gradient.
pub fn masked_mse(predicted: &Array2<f64>, target: &Array2<f64>, mask: &Array2<f64>) -> Result<f64> {
    check_shape(predicted, target, "masked loss target")?;
    check_shape(predicted, mask, "masked loss mask")?;
    let total = Zip::from(predicted)
        .and(target)
        .and(mask)
        .fold(0.0, |acc, &p, &t, &m| acc + m * (p - t) * (p - t));
    Ok(total / mask_weight(mask))
}

/// Gradient of [`masked_mse`] with respect to `predicted`
pub fn masked_mse_grad(
    predicted: &Array2<f64>,
    target: &Array2<f64>,
    mask: &Array2<f64>,
) -> Result<Array2<f64>> {
    check_shape(predicted, target, "masked loss target")?;
    check_shape(predicted, mask, "masked loss mask")?;
    let scale = 2.0 / mask_weight(mask);
    Ok(Zip::from(predicted)
        .and(target)
        .and(mask)
        .map_collect(|&p, &t, &m| scale * m * (p - t)))
}

fn mask_weight(mask: &Array2<f64>) -> f64 {
    mask.sum().max(1.0)
}

fn check_shape(a: &Array2<f64>, b: &Array2<f64>, context: &'static str) -> Result<()> {
    if a.dim() != b.dim() {
        return Err(Error::ShapeMismatch {
            context,
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}
