//! # Training
//!
//! Masked reconstruction loss and the epoch loop.

mod loss;
mod trainer;

pub use loss::{masked_mse, masked_mse_grad, mse};
pub use trainer::{EpochReport, Trainer, TrainingConfig, TrainingExample};
