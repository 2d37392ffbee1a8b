//! End-to-end orchestration
//!
//! fetch → extract → transform → train → publish, and reconstruction of
//! missing quarters with a published artifact. All I/O goes through the
//! injected [`FundamentalsStore`].

use crate::data::{CompanyKey, FundamentalsStore, QuarterlyRecord, QuarterlyTable};
use crate::error::{Error, Result};
use crate::extraction::GapExtractor;
use crate::model::EncoderDecoder;
use crate::preprocessing::{Column, FeatureScaler, FeatureTransformer, Frame, RawBatch, Role};
use crate::training::{EpochReport, Trainer, TrainingExample};
use crate::utils::Config;
use chrono::{DateTime, Utc};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything needed to reconstruct quarters later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingArtifact {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub model: EncoderDecoder,
    /// Present when standardization was enabled and samples existed
    pub scaler: Option<FeatureScaler>,
    /// Input feature order the model was trained on
    pub input_columns: Vec<Column>,
    /// Output feature order of the model
    pub target_columns: Vec<Column>,
    pub loss_history: Vec<EpochReport>,
    pub samples: usize,
    pub config: Config,
}

impl TrainingArtifact {
    pub fn input_names(&self) -> Vec<String> {
        self.input_columns.iter().map(ToString::to_string).collect()
    }

    pub fn target_names(&self) -> Vec<String> {
        self.target_columns.iter().map(ToString::to_string).collect()
    }

    /// Mean loss of the last epoch
    pub fn final_loss(&self) -> Option<f64> {
        self.loss_history.last().map(|r| r.mean_loss)
    }
}

/// Model output for one (before, after) pair
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// Position of the pair in the request
    pub sample: usize,
    pub columns: Vec<String>,
    /// Raw model output, (seq_len, target features)
    pub standardized: Array2<f64>,
    /// Output mapped back through standardization and log compression;
    /// Equity fields stay percentage changes
    pub values: Array2<f64>,
}

impl Reconstruction {
    /// First-step value of a target column by name
    pub fn value(&self, column: &str) -> Option<f64> {
        let j = self.columns.iter().position(|c| c == column)?;
        self.values.get((0, j)).copied()
    }
}

/// Fetches every company, skipping those the store cannot deliver
pub fn fetch_tables(store: &dyn FundamentalsStore, keys: &[CompanyKey]) -> Result<Vec<QuarterlyTable>> {
    let mut tables = Vec::with_capacity(keys.len());
    for key in keys {
        match store.fetch_company_table(key) {
            Ok(table) => tables.push(table),
            Err(e) if e.is_skippable() => {
                warn!(company = %key, error = %e, "Skipping company");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(tables)
}

/// Number of gap triples per company
pub fn count_gaps(store: &dyn FundamentalsStore, keys: &[CompanyKey], config: &Config) -> Result<Vec<(CompanyKey, usize)>> {
    let extractor = GapExtractor::new(config.extraction.completeness_threshold);
    let counts = fetch_tables(store, keys)?
        .into_iter()
        .map(|table| {
            let key = table.key.clone();
            let count = extractor.extract_tables(std::iter::once(table)).len();
            (key, count)
        })
        .collect();
    Ok(counts)
}

/// Trains a model on every gap found in the given companies and publishes
/// the resulting artifact through the store
pub fn run_training(store: &mut dyn FundamentalsStore, keys: &[CompanyKey], config: &Config) -> Result<TrainingArtifact> {
    config.validate()?;

    let tables = fetch_tables(&*store, keys)?;
    let companies = tables.len();
    let extractor = GapExtractor::new(config.extraction.completeness_threshold);
    let triples = extractor.extract_tables(tables);
    info!(companies, triples = triples.len(), "Extracted gap triples");

    let raw = RawBatch::from_triples(&triples);
    let transformer = FeatureTransformer::new(config.transform_config());
    let batch = transformer.fit_transform(&raw)?;
    if batch.input.ncols() == 0 || batch.target.ncols() == 0 {
        return Err(Error::InsufficientData(format!(
            "no feature columns from {} triples of {} companies",
            triples.len(),
            companies
        )));
    }
    info!(
        samples = batch.len(),
        input_features = batch.input.ncols(),
        target_features = batch.target.ncols(),
        "Prepared training set"
    );

    let mut model = EncoderDecoder::new(config.model_config(batch.input.ncols(), batch.target.ncols()))?;
    let examples: Vec<TrainingExample> = batch.samples().into_iter().map(TrainingExample::from).collect();
    let mut trainer = Trainer::new(config.training_config());
    let loss_history = trainer.train(&mut model, &examples)?;

    let artifact = TrainingArtifact {
        name: config.model.artifact_name.clone(),
        created_at: Utc::now(),
        model,
        scaler: batch.scaler.clone(),
        input_columns: batch.input.columns.clone(),
        target_columns: batch.target.columns.clone(),
        loss_history,
        samples: examples.len(),
        config: config.clone(),
    };
    store.publish_artifact(&artifact)?;
    Ok(artifact)
}

/// Reconstructs the quarter between each (before, after) pair.
///
/// Pairs removed by the feature pipeline (the first pair when Equity
/// percentage changes are enabled, or pairs yielding invalid changes)
/// produce no reconstruction.
pub fn reconstruct(artifact: &TrainingArtifact, pairs: &[(QuarterlyRecord, QuarterlyRecord)]) -> Result<Vec<Reconstruction>> {
    let raw = pairs_to_batch(&artifact.input_columns, &artifact.target_columns, pairs);
    let transformer = FeatureTransformer::new(artifact.config.transform_config());
    let batch = match &artifact.scaler {
        Some(scaler) => transformer.transform_with(&raw, scaler)?,
        None => transformer.fit_transform(&raw)?,
    };
    if batch.is_empty() {
        return Ok(Vec::new());
    }

    let seq_len = artifact.config.model.seq_len;
    let output = artifact.model.reconstruct(&batch.input.values, seq_len)?;
    let columns = artifact.target_names();
    let log_compressed = artifact.config.features.log_compression;

    let mut reconstructions = Vec::with_capacity(batch.len());
    for (r, standardized) in output.axis_iter(Axis(0)).enumerate() {
        let standardized = standardized.to_owned();
        let mut values = match &artifact.scaler {
            Some(scaler) => scaler.inverse_target(&standardized)?,
            None => standardized.clone(),
        };
        if log_compressed {
            for (j, column) in artifact.target_columns.iter().enumerate() {
                if column.category().map_or(false, |c| c.is_monetary()) {
                    values.column_mut(j).mapv_inplace(f64::exp_m1);
                }
            }
        }
        reconstructions.push(Reconstruction {
            sample: batch.input.index[r],
            columns: columns.clone(),
            standardized,
            values,
        });
    }
    Ok(reconstructions)
}

fn pairs_to_batch(input_columns: &[Column], target_columns: &[Column], pairs: &[(QuarterlyRecord, QuarterlyRecord)]) -> RawBatch {
    let input = Array2::from_shape_fn((pairs.len(), input_columns.len()), |(r, c)| {
        let column = &input_columns[c];
        let record = match column.role {
            Role::Before => &pairs[r].0,
            _ => &pairs[r].1,
        };
        record.get(&column.tag).unwrap_or(f64::NAN)
    });
    let target = Array2::from_elem((pairs.len(), target_columns.len()), f64::NAN);
    let index: Vec<usize> = (0..pairs.len()).collect();

    RawBatch::new(
        Frame::new(input_columns.to_vec(), index.clone(), input),
        Frame::new(target_columns.to_vec(), index, target),
    )
}
