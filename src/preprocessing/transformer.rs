//! Feature transformation of gap samples
//!
//! Pipeline, in order:
//!
//! 1. category filter
//! 2. presence mask of the target (before any fill)
//! 3. fill missing values
//! 4. clip non-finite values
//! 5. `ln(1 + max(v, 0))` for Balance_Sheet, Income_Statement and Dividend
//! 6. period-over-period percentage change for Equity, with row drops
//! 7. row alignment of input, target and mask
//! 8. standardization fitted on the input rows
//! 9. tensorization into per-sample vectors

use super::fill::FillMethod;
use super::frame::{Column, Frame, RawBatch, Role};
use super::normalize::{Normalizer, StandardNormalizer};
use crate::data::{Category, FieldTag};
use crate::error::{Error, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Substitute for exact zeros before dividing in the percentage change
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// Feature transformation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Categories kept by the filter
    pub categories: Vec<Category>,
    pub fill_method: FillMethod,
    pub log_compression: bool,
    pub percentage_change: bool,
    pub standardize: bool,
    pub epsilon: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            fill_method: FillMethod::Zero,
            log_compression: true,
            percentage_change: true,
            standardize: true,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

/// Standardization statistics shared by input and target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub input_columns: Vec<Column>,
    pub target_columns: Vec<Column>,
    pub input: StandardNormalizer,
    pub target: StandardNormalizer,
}

impl FeatureScaler {
    /// Fits on the input rows and derives target statistics from them.
    ///
    /// A target field is scaled with the pooled statistics of its `_BEFORE`
    /// and `_AFTER` columns; without input counterpart it is left unscaled.
    pub fn fit(input: &Frame, target_columns: &[Column]) -> Self {
        let mut normalizer = StandardNormalizer::new();
        normalizer.fit(&input.values);

        let width = input.ncols();
        let mean = normalizer.mean.clone().unwrap_or_else(|| Array1::zeros(width));
        let std = normalizer.std.clone().unwrap_or_else(|| Array1::ones(width));

        let position = |tag: &FieldTag, role: Role| {
            input
                .columns
                .iter()
                .position(|c| c.role == role && &c.tag == tag)
        };

        let mut target_mean = Array1::zeros(target_columns.len());
        let mut target_std = Array1::ones(target_columns.len());
        for (j, column) in target_columns.iter().enumerate() {
            let before = position(&column.tag, Role::Before);
            let after = position(&column.tag, Role::After);
            let (m, s) = match (before, after) {
                (Some(b), Some(a)) => pooled(mean[b], std[b], mean[a], std[a]),
                (Some(i), None) | (None, Some(i)) => (mean[i], std[i]),
                (None, None) => (0.0, 1.0),
            };
            target_mean[j] = m;
            target_std[j] = s;
        }

        Self {
            input_columns: input.columns.clone(),
            target_columns: target_columns.to_vec(),
            input: normalizer,
            target: StandardNormalizer::from_stats(target_mean, target_std),
        }
    }

    fn check_columns(&self, input: &[Column], target: &[Column]) -> Result<()> {
        if self.input_columns != input {
            return Err(Error::ShapeMismatch {
                context: "scaler input columns",
                expected: self.input_columns.len(),
                actual: input.len(),
            });
        }
        if self.target_columns != target {
            return Err(Error::ShapeMismatch {
                context: "scaler target columns",
                expected: self.target_columns.len(),
                actual: target.len(),
            });
        }
        Ok(())
    }

    /// Maps standardized target rows back to the transformed scale
    pub fn inverse_target(&self, values: &Array2<f64>) -> Result<Array2<f64>> {
        self.target.inverse_transform(values)
    }
}

/// Mean and std of two equally sized populations taken together.
///
/// Terms are halved and rescaled by the largest spread so statistics near
/// `f64::MAX` do not overflow.
fn pooled(mean_a: f64, std_a: f64, mean_b: f64, std_b: f64) -> (f64, f64) {
    let mean = 0.5 * mean_a + 0.5 * mean_b;
    let spread = 0.5 * mean_a - 0.5 * mean_b;
    let scale = std_a.max(std_b).max(spread.abs());
    let (a, b, d) = (std_a / scale, std_b / scale, spread / scale);
    let std = ((a * a + b * b) / 2.0 + d * d).sqrt() * scale;
    (mean, std.min(f64::MAX))
}

/// Model-ready sample
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSample {
    pub input: Array1<f64>,
    pub target: Array1<f64>,
    /// 1.0 where the target value was observed
    pub mask: Array1<f64>,
}

/// Aligned result of the transformation
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedBatch {
    pub input: Frame,
    pub target: Frame,
    pub mask: Array2<f64>,
    /// Present when standardization ran on a non-empty batch
    pub scaler: Option<FeatureScaler>,
}

impl TransformedBatch {
    pub fn len(&self) -> usize {
        self.input.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One sample per aligned row
    pub fn samples(&self) -> Vec<FeatureSample> {
        (0..self.len())
            .map(|r| FeatureSample {
                input: self.input.row(r),
                target: self.target.row(r),
                mask: self.mask.row(r).to_owned(),
            })
            .collect()
    }

    /// Re-exposes the output as a raw batch; masked target cells become missing
    pub fn to_raw(&self) -> RawBatch {
        let mut target = self.target.clone();
        target
            .values
            .zip_mut_with(&self.mask, |v, &m| {
                if m == 0.0 {
                    *v = f64::NAN;
                }
            });
        RawBatch::new(self.input.clone(), target)
    }
}

/// Applies the feature pipeline to raw batches
#[derive(Debug, Clone, Default)]
pub struct FeatureTransformer {
    config: TransformConfig,
}

impl FeatureTransformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Runs the full pipeline and fits the scaler on this batch
    pub fn fit_transform(&self, batch: &RawBatch) -> Result<TransformedBatch> {
        let (input, target, mask) = self.prepare(batch)?;

        let scaler = if self.config.standardize && !input.is_empty() {
            Some(FeatureScaler::fit(&input, &target.columns))
        } else {
            None
        };

        self.finish(input, target, mask, scaler)
    }

    /// Runs the pipeline with previously fitted statistics
    pub fn transform_with(&self, batch: &RawBatch, scaler: &FeatureScaler) -> Result<TransformedBatch> {
        let (input, target, mask) = self.prepare(batch)?;
        scaler.check_columns(&input.columns, &target.columns)?;
        let scaler = self.config.standardize.then(|| scaler.clone());
        self.finish(input, target, mask, scaler)
    }

    fn finish(
        &self,
        mut input: Frame,
        mut target: Frame,
        mask: Array2<f64>,
        scaler: Option<FeatureScaler>,
    ) -> Result<TransformedBatch> {
        if let Some(scaler) = &scaler {
            if !input.is_empty() {
                input.values = scaler.input.transform(&input.values)?;
                target.values = scaler.target.transform(&target.values)?;
            }
        }
        Ok(TransformedBatch {
            input,
            target,
            mask,
            scaler,
        })
    }

    /// Steps 1 to 7
    fn prepare(&self, batch: &RawBatch) -> Result<(Frame, Frame, Array2<f64>)> {
        if batch.input.nrows() != batch.target.nrows() {
            return Err(Error::ShapeMismatch {
                context: "raw batch rows",
                expected: batch.input.nrows(),
                actual: batch.target.nrows(),
            });
        }

        let keep = |c: &Column| {
            c.category()
                .map_or(false, |cat| self.config.categories.contains(&cat))
        };
        let input = batch.input.select_columns(keep);
        let target = batch.target.select_columns(keep);

        let mask = presence_mask(&target);

        let input = self.numeric(input);
        let target = self.numeric(target);

        let (input, target) = if self.config.percentage_change {
            (
                percentage_change(&input, self.config.epsilon),
                percentage_change(&target, self.config.epsilon),
            )
        } else {
            (input, target)
        };

        let (input, target, mask) = align_rows(input, target, &batch.target.index, &mask);
        debug!(
            rows = input.nrows(),
            dropped = batch.len() - input.nrows(),
            input_features = input.ncols(),
            target_features = target.ncols(),
            "Prepared feature batch"
        );
        Ok((input, target, mask))
    }

    /// Steps 3 to 5
    fn numeric(&self, frame: Frame) -> Frame {
        let filled = Frame::new(
            frame.columns.clone(),
            frame.index.clone(),
            self.config.fill_method.fill(&frame.values),
        );
        let clipped = filled.map_values(clip_extremum);
        if self.config.log_compression {
            log_compress(&clipped)
        } else {
            clipped
        }
    }
}

/// 1.0 for observed target cells, 0.0 for missing ones
pub fn presence_mask(target: &Frame) -> Array2<f64> {
    target.values.mapv(|v| if v.is_nan() { 0.0 } else { 1.0 })
}

/// NaN -> 0, +inf -> f64::MAX, -inf -> f64::MIN
pub fn clip_extremum(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else if v == f64::INFINITY {
        f64::MAX
    } else if v == f64::NEG_INFINITY {
        f64::MIN
    } else {
        v
    }
}

/// `ln(1 + max(v, 0))` on monetary columns, other columns untouched
pub fn log_compress(frame: &Frame) -> Frame {
    let mut values = frame.values.clone();
    for (j, column) in frame.columns.iter().enumerate() {
        if column.category().map_or(false, |c| c.is_monetary()) {
            values
                .column_mut(j)
                .mapv_inplace(|v| v.max(0.0).ln_1p());
        }
    }
    Frame::new(frame.columns.clone(), frame.index.clone(), values)
}

/// Percentage change of Equity columns relative to the previous row.
///
/// Exact zeros are replaced with `epsilon` first. Infinite changes become
/// missing. Rows where every Equity change is exactly -1 are removed, then
/// every row holding a missing value (always including the first) is
/// dropped. Frames without Equity columns pass through unchanged.
pub fn percentage_change(frame: &Frame, epsilon: f64) -> Frame {
    let equity = frame.category_columns(Category::Equity);
    if equity.is_empty() {
        return frame.clone();
    }

    let mut values = frame.values.clone();
    for &j in &equity {
        let source: Vec<f64> = frame
            .values
            .column(j)
            .iter()
            .map(|&v| if v == 0.0 { epsilon } else { v })
            .collect();
        let mut column = values.column_mut(j);
        for r in 0..source.len() {
            column[r] = if r == 0 {
                f64::NAN
            } else {
                let change = source[r] / source[r - 1] - 1.0;
                if change.is_infinite() {
                    f64::NAN
                } else {
                    change
                }
            };
        }
    }

    let keep: Vec<usize> = (0..values.nrows())
        .filter(|&r| {
            let row = values.row(r);
            let total_loss = equity.iter().all(|&j| row[j] == -1.0);
            let has_missing = row.iter().any(|v| v.is_nan());
            !total_loss && !has_missing
        })
        .collect();

    Frame::new(frame.columns.clone(), frame.index.clone(), values).select_rows(&keep)
}

/// Keeps rows present in both frames and reindexes the mask accordingly.
///
/// `mask_index` holds the row labels the mask was computed for.
fn align_rows(
    input: Frame,
    target: Frame,
    mask_index: &[usize],
    mask: &Array2<f64>,
) -> (Frame, Frame, Array2<f64>) {
    let target_labels: HashSet<usize> = target.index.iter().copied().collect();
    let common: HashSet<usize> = input
        .index
        .iter()
        .copied()
        .filter(|label| target_labels.contains(label))
        .collect();

    let input = input.retain_index(&common);
    let target = target.retain_index(&common);

    let mask_rows: HashMap<usize, usize> = mask_index
        .iter()
        .enumerate()
        .map(|(position, &label)| (label, position))
        .collect();
    let rows: Vec<usize> = target
        .index
        .iter()
        .filter_map(|label| mask_rows.get(label).copied())
        .collect();
    let mask = mask.select(Axis(0), &rows);

    (input, target, mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FieldTag;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    fn frame(names: &[&str], role: Role, values: Array2<f64>) -> Frame {
        let columns = names
            .iter()
            .map(|n| Column::new(FieldTag::parse(n), role))
            .collect();
        let index = (0..values.nrows()).collect();
        Frame::new(columns, index, values)
    }

    #[test]
    fn test_clip_extremum() {
        assert_eq!(clip_extremum(f64::NAN), 0.0);
        assert_eq!(clip_extremum(f64::INFINITY), f64::MAX);
        assert_eq!(clip_extremum(f64::NEG_INFINITY), f64::MIN);
        assert_eq!(clip_extremum(-3.5), -3.5);
    }

    #[test]
    fn test_log_compress_only_monetary() {
        let f = frame(
            &["Balance_Sheet___cash", "Dividend___amount", "Income_Statement___ebit", "Equity___commonStock"],
            Role::Target,
            array![[std::f64::consts::E - 1.0, -5.0, 0.0, 100.0]],
        );
        let out = log_compress(&f);
        assert_abs_diff_eq!(out.values[[0, 0]], 1.0, epsilon = 1e-12);
        assert_eq!(out.values[[0, 1]], 0.0);
        assert_eq!(out.values[[0, 2]], 0.0);
        assert_eq!(out.values[[0, 3]], 100.0);
    }

    #[test]
    fn test_percentage_change_with_zero() {
        let f = frame(&["Equity___commonStock"], Role::Target, array![[0.0], [100.0], [200.0]]);
        let out = percentage_change(&f, DEFAULT_EPSILON);

        assert_eq!(out.index, vec![1, 2]);
        assert_relative_eq!(
            out.values[[0, 0]],
            (100.0 - DEFAULT_EPSILON) / DEFAULT_EPSILON,
            max_relative = 1e-12
        );
        assert_abs_diff_eq!(out.values[[1, 0]], 1.0, epsilon = 1e-12);
        assert!(out.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_percentage_change_leaves_other_columns() {
        let f = frame(
            &["Balance_Sheet___cash", "Equity___commonStock"],
            Role::Target,
            array![[1.0, 10.0], [2.0, 20.0], [3.0, 10.0]],
        );
        let out = percentage_change(&f, DEFAULT_EPSILON);
        assert_eq!(out.values, array![[2.0, 1.0], [3.0, -0.5]]);
    }

    #[test]
    fn test_percentage_change_without_equity_is_identity() {
        let f = frame(&["Balance_Sheet___cash"], Role::Target, array![[1.0], [2.0]]);
        assert_eq!(percentage_change(&f, DEFAULT_EPSILON), f);
    }

    #[test]
    fn test_percentage_change_infinite_becomes_missing() {
        let f = frame(
            &["Equity___commonStock"],
            Role::Target,
            array![[1e-300], [f64::MAX], [f64::MAX]],
        );
        let out = percentage_change(&f, DEFAULT_EPSILON);
        assert_eq!(out.index, vec![2]);
        assert_eq!(out.values[[0, 0]], 0.0);
    }

    #[test]
    fn test_total_loss_rows_removed_only_when_all_equity_columns() {
        let f = frame(
            &["Equity___a", "Equity___b"],
            Role::Target,
            array![[1.0, 1.0], [1e-20, 2.0], [1.0, 1.0], [1e-20, 1e-20]],
        );
        let out = percentage_change(&f, DEFAULT_EPSILON);
        // row 1: a -> -1, b -> 1 (partial loss kept); row 3: both -> -1 (removed)
        assert_eq!(out.index, vec![1, 2]);
        assert_eq!(out.values[[0, 0]], -1.0);
    }

    #[test]
    fn test_mask_reflects_pre_fill_presence() {
        let input = frame(&["Balance_Sheet___cash"], Role::Before, array![[1.0], [3.0]]);
        let target = frame(
            &["Balance_Sheet___cash", "Income_Statement___ebit"],
            Role::Target,
            array![[f64::NAN, f64::INFINITY], [5.0, f64::NAN]],
        );
        let transformer = FeatureTransformer::new(TransformConfig {
            standardize: false,
            ..TransformConfig::default()
        });
        let out = transformer.fit_transform(&RawBatch::new(input, target)).unwrap();

        assert_eq!(out.mask, array![[0.0, 1.0], [1.0, 0.0]]);
        assert_eq!(out.target.values[[0, 0]], 0.0);
        assert!(out.target.values[[0, 1]].is_finite());
    }

    #[test]
    fn test_category_filter_drops_unknown_columns() {
        let input = frame(
            &["Cash_Flow___capex", "Balance_Sheet___cash"],
            Role::Before,
            array![[1.0, 2.0]],
        );
        let target = frame(&["Quarter", "Balance_Sheet___cash"], Role::Target, array![[1.0, 2.0]]);
        let out = FeatureTransformer::default()
            .fit_transform(&RawBatch::new(input, target))
            .unwrap();

        assert_eq!(out.input.column_names(), vec!["Balance_Sheet___cash_BEFORE"]);
        assert_eq!(out.target.column_names(), vec!["Balance_Sheet___cash"]);
    }

    #[test]
    fn test_configured_categories() {
        let input = frame(
            &["Dividend___amount", "Balance_Sheet___cash"],
            Role::Before,
            array![[1.0, 2.0]],
        );
        let target = frame(&["Dividend___amount"], Role::Target, array![[1.0]]);
        let transformer = FeatureTransformer::new(TransformConfig {
            categories: vec![Category::BalanceSheet],
            ..TransformConfig::default()
        });
        let out = transformer.fit_transform(&RawBatch::new(input, target)).unwrap();
        assert_eq!(out.input.ncols(), 1);
        assert_eq!(out.target.ncols(), 0);
    }

    #[test]
    fn test_alignment_after_independent_drops() {
        let input = frame(&["Equity___x"], Role::Before, array![[1.0], [2.0], [4.0], [8.0]]);
        let target = frame(
            &["Equity___x", "Balance_Sheet___cash"],
            Role::Target,
            array![[1.0, f64::NAN], [2.0, 1.0], [f64::INFINITY, f64::NAN], [3.0, 1.0]],
        );
        let transformer = FeatureTransformer::new(TransformConfig {
            standardize: false,
            ..TransformConfig::default()
        });
        let out = transformer.fit_transform(&RawBatch::new(input, target)).unwrap();

        // Input keeps rows 1..=3. In the target, +inf is clipped to MAX so
        // row 2 changes by MAX / 2 - 1, and row 3 by 3 / MAX - 1 == -1, a
        // total loss that removes it.
        assert_eq!(out.input.index, vec![1, 2]);
        assert_eq!(out.target.index, vec![1, 2]);
        assert_eq!(out.mask.nrows(), out.len());
        assert_eq!(out.mask.column(1).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_empty_after_alignment_is_not_an_error() {
        let input = frame(&["Equity___x"], Role::Before, array![[1.0]]);
        let target = frame(&["Equity___x"], Role::Target, array![[1.0]]);
        let out = FeatureTransformer::default()
            .fit_transform(&RawBatch::new(input, target))
            .unwrap();
        assert!(out.is_empty());
        assert!(out.scaler.is_none());
        assert!(out.samples().is_empty());
    }

    #[test]
    fn test_standardized_input_statistics() {
        let input = frame(
            &["Balance_Sheet___cash", "Income_Statement___ebit"],
            Role::Before,
            array![[10.0, 1.0], [100.0, 5.0], [1000.0, 3.0], [50.0, 9.0]],
        );
        let target = frame(
            &["Balance_Sheet___cash"],
            Role::Target,
            array![[20.0], [200.0], [2000.0], [f64::NAN]],
        );
        let out = FeatureTransformer::default()
            .fit_transform(&RawBatch::new(input, target))
            .unwrap();

        let mean = out.input.values.mean_axis(Axis(0)).unwrap();
        let std = out.input.values.std_axis(Axis(0), 0.0);
        for j in 0..2 {
            assert_abs_diff_eq!(mean[j], 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(std[j], 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_target_uses_pooled_input_statistics() {
        let cash = FieldTag::parse("Balance_Sheet___cash");
        let input = Frame::new(
            vec![
                Column::new(cash.clone(), Role::Before),
                Column::new(cash, Role::After),
            ],
            vec![0, 1],
            array![[0.0, 4.0], [2.0, 6.0]],
        );
        let target = frame(&["Balance_Sheet___cash"], Role::Target, array![[3.0], [3.0]]);

        let transformer = FeatureTransformer::new(TransformConfig {
            log_compression: false,
            ..TransformConfig::default()
        });
        let out = transformer.fit_transform(&RawBatch::new(input, target)).unwrap();
        let scaler = out.scaler.as_ref().unwrap();

        // before: mean 1, std 1; after: mean 5, std 1 -> pooled mean 3, var 1 + 4
        let target_mean = scaler.target.mean.as_ref().unwrap();
        let target_std = scaler.target.std.as_ref().unwrap();
        assert_abs_diff_eq!(target_mean[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(target_std[0], 5.0_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(out.target.values[[0, 0]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clipped_infinities_standardize_to_finite_values() {
        let close = FieldTag::parse("Equity___close");
        let inf = f64::INFINITY;
        let input = Frame::new(
            vec![
                Column::new(close.clone(), Role::Before),
                Column::new(close, Role::After),
            ],
            vec![0, 1, 2, 3],
            array![[1.0, 1.0], [inf, inf], [1.0, 1.0], [inf, inf]],
        );
        let target = frame(&["Equity___close"], Role::Target, array![[1.0], [inf], [1.0], [inf]]);

        let out = FeatureTransformer::default()
            .fit_transform(&RawBatch::new(input, target))
            .unwrap();

        assert_eq!(out.input.index, vec![1, 3]);
        assert!(out.input.values.iter().all(|v| v.is_finite()));
        assert!(out.target.values.iter().all(|v| v.is_finite()));
        let scaler = out.scaler.as_ref().unwrap();
        assert!(scaler.target.std.as_ref().unwrap().iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_transform_with_reproduces_fit() {
        let input = frame(
            &["Balance_Sheet___cash", "Equity___commonStock"],
            Role::Before,
            array![[10.0, 1.0], [100.0, 2.0], [1000.0, 3.0], [50.0, 6.0]],
        );
        let target = frame(
            &["Balance_Sheet___cash", "Equity___commonStock"],
            Role::Target,
            array![[20.0, 2.0], [f64::NAN, 3.0], [2000.0, 5.0], [70.0, 5.0]],
        );
        let batch = RawBatch::new(input, target);
        let transformer = FeatureTransformer::default();

        let fitted = transformer.fit_transform(&batch).unwrap();
        let scaler = fitted.scaler.clone().unwrap();
        let again = transformer.transform_with(&batch, &scaler).unwrap();

        assert_eq!(again, fitted);
    }

    #[test]
    fn test_transform_with_rejects_other_columns() {
        let batch = RawBatch::new(
            frame(&["Balance_Sheet___cash"], Role::Before, array![[1.0], [2.0]]),
            frame(&["Balance_Sheet___cash"], Role::Target, array![[1.0], [2.0]]),
        );
        let other = RawBatch::new(
            frame(&["Balance_Sheet___debt"], Role::Before, array![[1.0], [2.0]]),
            frame(&["Balance_Sheet___cash"], Role::Target, array![[1.0], [2.0]]),
        );
        let transformer = FeatureTransformer::default();
        let scaler = transformer.fit_transform(&batch).unwrap().scaler.unwrap();
        assert!(transformer.transform_with(&other, &scaler).is_err());
    }

    #[test]
    fn test_rerun_without_numeric_steps_is_noop() {
        let input = frame(
            &["Balance_Sheet___cash", "Equity___commonStock"],
            Role::Before,
            array![[10.0, f64::NAN], [f64::INFINITY, 2.0], [-3.0, 3.0]],
        );
        let target = frame(
            &["Balance_Sheet___cash", "Dividend___amount"],
            Role::Target,
            array![[20.0, f64::NAN], [f64::NAN, 3.0], [f64::NEG_INFINITY, 5.0]],
        );
        let transformer = FeatureTransformer::new(TransformConfig {
            log_compression: false,
            percentage_change: false,
            standardize: false,
            ..TransformConfig::default()
        });

        let first = transformer.fit_transform(&RawBatch::new(input, target)).unwrap();
        let second = transformer.fit_transform(&first.to_raw()).unwrap();

        assert_eq!(second, first);
    }
}
