//! # Encoder-decoder model
//!
//! - `layers` - linear layer and the [`Parameters`] container trait
//! - `lstm` - LSTM cell with backpropagation through time
//! - `encoder` / `decoder` - the two halves of the network
//! - `seq2seq` - the combined model
//! - `optimizer` - Adam and SGD

mod config;
mod decoder;
mod encoder;
mod layers;
mod lstm;
mod optimizer;
mod seq2seq;

pub use config::{ModelConfig, DEFAULT_HIDDEN_SIZE, DEFAULT_LATENT_SIZE};
pub use decoder::{Decoder, DecoderState, DecoderStep, DecoderTrace};
pub use encoder::{Encoder, EncoderTrace};
pub use layers::{Linear, Parameters};
pub use lstm::{LstmCell, LstmState, StepCache};
pub use optimizer::{Adam, AnyOptimizer, Optimizer, OptimizerKind, Sgd};
pub use seq2seq::{EncoderDecoder, ForwardTrace};
