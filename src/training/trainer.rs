//! Fixed-schedule training loop for the encoder-decoder

use super::loss::{masked_mse, masked_mse_grad};
use crate::error::{Error, Result};
use crate::model::{AnyOptimizer, EncoderDecoder, Optimizer, OptimizerKind};
use crate::preprocessing::FeatureSample;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Training configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Number of epochs
    pub epochs: usize,
    /// Learning rate
    pub learning_rate: f64,
    /// Optimizer used for every step
    pub optimizer: OptimizerKind,
    /// Number of decoded steps per sample
    pub seq_len: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            learning_rate: 0.001,
            optimizer: OptimizerKind::Adam,
            seq_len: 1,
        }
    }
}

/// One (input, target, mask) triple in model layout
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    /// (steps, input features)
    pub input: Array2<f64>,
    /// (seq_len, output features)
    pub target: Array2<f64>,
    /// Same shape as `target`, 1.0 where observed
    pub mask: Array2<f64>,
}

impl From<FeatureSample> for TrainingExample {
    fn from(sample: FeatureSample) -> Self {
        Self {
            input: sample.input.insert_axis(Axis(0)),
            target: sample.target.insert_axis(Axis(0)),
            mask: sample.mask.insert_axis(Axis(0)),
        }
    }
}

/// Per-epoch loss telemetry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    /// 1-based epoch index
    pub epoch: usize,
    /// Mean masked loss over the epoch's samples, 0.0 when there were none
    pub mean_loss: f64,
    pub samples: usize,
}

/// Trainer for encoder-decoder models
pub struct Trainer {
    config: TrainingConfig,
    optimizer: AnyOptimizer,
}

impl Trainer {
    /// Create a new trainer
    pub fn new(config: TrainingConfig) -> Self {
        let optimizer = AnyOptimizer::new(config.optimizer, config.learning_rate);
        Self { config, optimizer }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Forward, masked loss, backward and one optimizer update.
    /// Returns the loss before the update.
    pub fn train_step(&mut self, model: &mut EncoderDecoder, example: &TrainingExample) -> Result<f64> {
        let (output, trace) = model.forward_sample(example.input.view(), self.config.seq_len)?;
        let loss = masked_mse(&output, &example.target, &example.mask)?;
        let d_output = masked_mse_grad(&output, &example.target, &example.mask)?;
        let grads = model.backward(&trace, &d_output)?;
        self.optimizer.step(model, &grads)?;
        Ok(loss)
    }

    /// Runs the full epoch schedule over `examples` in order
    pub fn train(&mut self, model: &mut EncoderDecoder, examples: &[TrainingExample]) -> Result<Vec<EpochReport>> {
        self.validate(model, examples)?;
        self.optimizer.reset();
        if examples.is_empty() {
            warn!("No training samples; epochs will report zero loss");
        }

        let mut history = Vec::with_capacity(self.config.epochs);
        for epoch in 1..=self.config.epochs {
            let mut total_loss = 0.0;
            for example in examples {
                total_loss += self.train_step(model, example)?;
            }

            let mean_loss = if examples.is_empty() {
                0.0
            } else {
                total_loss / examples.len() as f64
            };
            info!(
                epoch,
                epochs = self.config.epochs,
                mean_loss,
                "Epoch [{}/{}], Loss: {:.6}",
                epoch,
                self.config.epochs,
                mean_loss
            );
            history.push(EpochReport {
                epoch,
                mean_loss,
                samples: examples.len(),
            });
        }

        Ok(history)
    }

    fn validate(&self, model: &EncoderDecoder, examples: &[TrainingExample]) -> Result<()> {
        if self.config.seq_len == 0 {
            return Err(Error::Config("seq_len must be positive".into()));
        }
        for (i, example) in examples.iter().enumerate() {
            let checks = [
                ("sample input features", model.input_size(), example.input.ncols()),
                ("sample target features", model.output_size(), example.target.ncols()),
                ("sample target steps", self.config.seq_len, example.target.nrows()),
                ("sample mask cells", example.target.len(), example.mask.len()),
            ];
            for (context, expected, actual) in checks {
                if expected != actual {
                    debug!(sample = i, context, expected, actual, "Rejected training set");
                    return Err(Error::ShapeMismatch {
                        context,
                        expected,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }
}
