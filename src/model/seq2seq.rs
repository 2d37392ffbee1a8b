//! Encoder-decoder network that reconstructs a missing quarter from its
//! neighbours

use super::config::ModelConfig;
use super::decoder::{Decoder, DecoderTrace};
use super::encoder::{Encoder, EncoderTrace};
use super::layers::Parameters;
use crate::error::{Error, Result};
use ndarray::{Array2, Array3, ArrayView2, ArrayViewD, ArrayViewMutD, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Activations of one forward pass over a single sample
#[derive(Debug, Clone)]
pub struct ForwardTrace {
    encoder: EncoderTrace,
    decoder: DecoderTrace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderDecoder {
    pub config: ModelConfig,
    pub encoder: Encoder,
    pub decoder: Decoder,
}

impl EncoderDecoder {
    /// Initializes parameters from the configured seed
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let encoder = Encoder::new(config.input_size, config.hidden_size, config.latent_size, &mut rng);
        let decoder = Decoder::new(config.latent_size, config.hidden_size, config.output_size, &mut rng);
        Ok(Self {
            config,
            encoder,
            decoder,
        })
    }

    pub fn input_size(&self) -> usize {
        self.encoder.input_size()
    }

    pub fn output_size(&self) -> usize {
        self.decoder.output_size()
    }

    /// Runs one sample of shape (steps, features) and returns the
    /// (seq_len, output) reconstruction with its trace
    pub fn forward_sample(&self, input: ArrayView2<'_, f64>, seq_len: usize) -> Result<(Array2<f64>, ForwardTrace)> {
        let (latent, encoder) = self.encoder.encode(input)?;
        let (output, decoder) = self.decoder.decode(&latent, seq_len)?;
        Ok((output, ForwardTrace { encoder, decoder }))
    }

    /// Batched forward over a (batch, steps, features) tensor
    pub fn forward(&self, input: &Array3<f64>, seq_len: usize) -> Result<Array3<f64>> {
        let latents = self.encoder.forward(input)?;
        self.decoder.forward(&latents, seq_len)
    }

    /// Reconstructs one output sequence per row of a (batch, features) matrix
    pub fn reconstruct(&self, input: &Array2<f64>, seq_len: usize) -> Result<Array3<f64>> {
        self.forward(&input.clone().insert_axis(Axis(1)), seq_len)
    }

    /// Gradients of all parameters given dL/doutput of one sample
    pub fn backward(&self, trace: &ForwardTrace, d_output: &Array2<f64>) -> Result<EncoderDecoder> {
        if d_output.ncols() != self.output_size() {
            return Err(Error::ShapeMismatch {
                context: "output gradient",
                expected: self.output_size(),
                actual: d_output.ncols(),
            });
        }
        let mut grads = self.zeros_like();
        let d_latent = self.decoder.backward(&trace.decoder, d_output, &mut grads.decoder);
        self.encoder.backward(&trace.encoder, &d_latent, &mut grads.encoder);
        Ok(grads)
    }
}

impl Parameters for EncoderDecoder {
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        let mut tensors = self.encoder.tensors();
        tensors.extend(self.decoder.tensors());
        tensors
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        let mut tensors = self.encoder.tensors_mut();
        tensors.extend(self.decoder.tensors_mut());
        tensors
    }

    fn zeros_like(&self) -> Self {
        Self {
            config: self.config.clone(),
            encoder: self.encoder.zeros_like(),
            decoder: self.decoder.zeros_like(),
        }
    }
}
