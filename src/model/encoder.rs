//! Sequence encoder: LSTM over the input steps, final hidden state
//! projected to a latent vector

use super::layers::{Linear, Parameters};
use super::lstm::{LstmCell, LstmState, StepCache};
use crate::error::{Error, Result};
use ndarray::{Array1, Array2, Array3, ArrayView2, ArrayViewD, ArrayViewMutD, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encoder {
    pub lstm: LstmCell,
    pub fc: Linear,
}

/// Forward activations of one encoded sequence
#[derive(Debug, Clone)]
pub struct EncoderTrace {
    steps: Vec<StepCache>,
    final_hidden: Array1<f64>,
}

impl Encoder {
    pub fn new<R: Rng>(input_size: usize, hidden_size: usize, latent_size: usize, rng: &mut R) -> Self {
        Self {
            lstm: LstmCell::new(input_size, hidden_size, rng),
            fc: Linear::new(hidden_size, latent_size, rng),
        }
    }

    pub fn input_size(&self) -> usize {
        self.lstm.input_size()
    }

    pub fn hidden_size(&self) -> usize {
        self.lstm.hidden_size()
    }

    pub fn latent_size(&self) -> usize {
        self.fc.output_size()
    }

    /// Encodes one sequence of shape (seq_len, features)
    pub fn encode(&self, sequence: ArrayView2<'_, f64>) -> Result<(Array1<f64>, EncoderTrace)> {
        if sequence.nrows() == 0 {
            return Err(Error::InvalidInput("cannot encode an empty sequence".into()));
        }
        if sequence.ncols() != self.input_size() {
            return Err(Error::ShapeMismatch {
                context: "encoder features",
                expected: self.input_size(),
                actual: sequence.ncols(),
            });
        }

        let mut state = LstmState::zeros(self.hidden_size());
        let mut steps = Vec::with_capacity(sequence.nrows());
        for x in sequence.rows() {
            let (next, cache) = self.lstm.forward(&x.to_owned(), &state);
            steps.push(cache);
            state = next;
        }

        let latent = self.fc.forward(&state.hidden);
        Ok((
            latent,
            EncoderTrace {
                steps,
                final_hidden: state.hidden,
            },
        ))
    }

    /// Encodes a (batch, seq_len, features) tensor into (batch, latent)
    pub fn forward(&self, input: &Array3<f64>) -> Result<Array2<f64>> {
        let mut latents = Array2::zeros((input.len_of(Axis(0)), self.latent_size()));
        for (b, sequence) in input.outer_iter().enumerate() {
            let (latent, _) = self.encode(sequence)?;
            latents.row_mut(b).assign(&latent);
        }
        Ok(latents)
    }

    /// Treats a (batch, features) tensor as single-step sequences
    pub fn forward_2d(&self, input: &Array2<f64>) -> Result<Array2<f64>> {
        self.forward(&input.clone().insert_axis(Axis(1)))
    }

    /// Backpropagates dL/dlatent through the projection and all steps
    pub fn backward(&self, trace: &EncoderTrace, d_latent: &Array1<f64>, grads: &mut Encoder) {
        let mut dh = self.fc.backward(&trace.final_hidden, d_latent, &mut grads.fc);
        let mut dc = Array1::zeros(self.hidden_size());
        for cache in trace.steps.iter().rev() {
            let (_, dh_prev, dc_prev) = self.lstm.backward(cache, &dh, &dc, &mut grads.lstm);
            dh = dh_prev;
            dc = dc_prev;
        }
    }
}

impl Parameters for Encoder {
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        let mut tensors = self.lstm.tensors();
        tensors.extend(self.fc.tensors());
        tensors
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        let mut tensors = self.lstm.tensors_mut();
        tensors.extend(self.fc.tensors_mut());
        tensors
    }

    fn zeros_like(&self) -> Self {
        Self {
            lstm: self.lstm.zeros_like(),
            fc: self.fc.zeros_like(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_encoder_shapes() {
        let mut rng = StdRng::seed_from_u64(11);
        let encoder = Encoder::new(3, 8, 4, &mut rng);

        let latents = encoder.forward(&Array3::ones((2, 5, 3))).unwrap();
        assert_eq!(latents.dim(), (2, 4));

        let single = encoder.forward_2d(&Array2::ones((2, 3))).unwrap();
        assert_eq!(single.dim(), (2, 4));
    }

    #[test]
    fn test_encoder_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(11);
        let encoder = Encoder::new(3, 8, 4, &mut rng);
        let input = Array3::from_shape_fn((1, 2, 3), |(_, t, f)| (t + f) as f64 * 0.1);

        assert_eq!(encoder.forward(&input).unwrap(), encoder.forward(&input).unwrap());
    }

    #[test]
    fn test_encoder_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(11);
        let encoder = Encoder::new(3, 8, 4, &mut rng);

        assert!(matches!(
            encoder.forward(&Array3::ones((1, 1, 2))),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(encoder.encode(Array2::zeros((0, 3)).view()).is_err());
    }
}
