//! # Fundamentals Gap RNN
//!
//! Reconstruction of missing quarters in company fundamentals with an LSTM
//! encoder-decoder.
//!
//! ## Modules
//!
//! - `data`: quarterly records and tables, CSV / fundamentals JSON ingestion,
//!   and the storage boundary
//! - `extraction`: quarter-gap extraction from company histories
//! - `preprocessing`: masking, log compression, percentage change,
//!   row alignment and standardization
//! - `model`: LSTM encoder, autoregressive decoder and optimizers
//! - `training`: masked loss and the training loop
//! - `pipeline`: fetch, extract, transform, train and publish
//! - `utils`: configuration and logging
//!
//! ## Example
//!
//! ```no_run
//! use fundamentals_gap_rnn::{pipeline, CompanyKey, Config, DirectoryStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut store = DirectoryStore::new("data");
//!     let keys = vec![CompanyKey::new("USA", "NASDAQ", "AAPL")];
//!     let artifact = pipeline::run_training(&mut store, &keys, &Config::default())?;
//!     println!("final loss: {:?}", artifact.final_loss());
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod error;
pub mod extraction;
pub mod model;
pub mod pipeline;
pub mod preprocessing;
pub mod training;
pub mod utils;

// Re-export main types for convenience
pub use data::{
    Category, CompanyHistory, CompanyKey, DirectoryStore, FieldTag, FundamentalsStore,
    InMemoryStore, QuarterlyRecord, QuarterlyTable,
};
pub use error::{Error, Result};
pub use extraction::{GapExtractor, GapTriple};
pub use model::{Decoder, DecoderState, EncoderDecoder, Encoder, ModelConfig};
pub use pipeline::{Reconstruction, TrainingArtifact};
pub use preprocessing::{FeatureTransformer, FillMethod, RawBatch, TransformConfig, TransformedBatch};
pub use training::{EpochReport, Trainer, TrainingConfig, TrainingExample};
pub use utils::{setup_logging, Config};
