//! Autoregressive sequence decoder.
//!
//! Decoding is an explicit state machine: [`Decoder::init_state`] projects the
//! latent vector into the first [`DecoderState`], and each call to
//! [`Decoder::step`] consumes a state and returns the next one together with
//! the emitted output. The first step is fed zeros; every later step is fed
//! the previous step's raw hidden output.

use super::layers::{Linear, Parameters};
use super::lstm::{LstmCell, LstmState, StepCache};
use crate::error::{Error, Result};
use ndarray::{Array1, Array2, Array3, ArrayViewD, ArrayViewMutD, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Recurrent state between decoding steps
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderState {
    pub hidden: Array1<f64>,
    pub cell: Array1<f64>,
    /// Number of steps already taken
    pub step: usize,
}

impl DecoderState {
    /// Input for the next step: zeros before the first step, the previous
    /// hidden output afterwards
    pub fn next_input(&self) -> Array1<f64> {
        if self.step == 0 {
            Array1::zeros(self.hidden.len())
        } else {
            self.hidden.clone()
        }
    }
}

/// Result of one decoding step
#[derive(Debug, Clone)]
pub struct DecoderStep {
    pub state: DecoderState,
    pub output: Array1<f64>,
    pub cache: StepCache,
}

/// Forward activations of one decoded sequence
#[derive(Debug, Clone)]
pub struct DecoderTrace {
    latent: Array1<f64>,
    steps: Vec<(StepCache, Array1<f64>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoder {
    /// Latent to initial hidden state
    pub fc: Linear,
    pub lstm: LstmCell,
    /// Hidden state to output features
    pub output: Linear,
}

impl Decoder {
    pub fn new<R: Rng>(latent_size: usize, hidden_size: usize, output_size: usize, rng: &mut R) -> Self {
        Self {
            fc: Linear::new(latent_size, hidden_size, rng),
            lstm: LstmCell::new(hidden_size, hidden_size, rng),
            output: Linear::new(hidden_size, output_size, rng),
        }
    }

    pub fn latent_size(&self) -> usize {
        self.fc.input_size()
    }

    pub fn hidden_size(&self) -> usize {
        self.lstm.hidden_size()
    }

    pub fn output_size(&self) -> usize {
        self.output.output_size()
    }

    pub fn init_state(&self, latent: &Array1<f64>) -> DecoderState {
        DecoderState {
            hidden: self.fc.forward(latent),
            cell: Array1::zeros(self.hidden_size()),
            step: 0,
        }
    }

    pub fn step(&self, state: &DecoderState) -> DecoderStep {
        let input = state.next_input();
        let previous = LstmState {
            hidden: state.hidden.clone(),
            cell: state.cell.clone(),
        };
        let (next, cache) = self.lstm.forward(&input, &previous);
        let output = self.output.forward(&next.hidden);

        DecoderStep {
            state: DecoderState {
                hidden: next.hidden,
                cell: next.cell,
                step: state.step + 1,
            },
            output,
            cache,
        }
    }

    /// Decodes `seq_len` steps from one latent vector into (seq_len, output)
    pub fn decode(&self, latent: &Array1<f64>, seq_len: usize) -> Result<(Array2<f64>, DecoderTrace)> {
        if latent.len() != self.latent_size() {
            return Err(Error::ShapeMismatch {
                context: "decoder latent",
                expected: self.latent_size(),
                actual: latent.len(),
            });
        }

        let mut outputs = Array2::zeros((seq_len, self.output_size()));
        let mut steps = Vec::with_capacity(seq_len);
        let mut state = self.init_state(latent);
        while state.step < seq_len {
            let DecoderStep {
                state: next,
                output,
                cache,
            } = self.step(&state);
            outputs.row_mut(state.step).assign(&output);
            steps.push((cache, next.hidden.clone()));
            state = next;
        }

        Ok((
            outputs,
            DecoderTrace {
                latent: latent.clone(),
                steps,
            },
        ))
    }

    /// Decodes a (batch, latent) tensor into (batch, seq_len, output)
    pub fn forward(&self, latents: &Array2<f64>, seq_len: usize) -> Result<Array3<f64>> {
        let mut outputs = Array3::zeros((latents.nrows(), seq_len, self.output_size()));
        for (b, latent) in latents.outer_iter().enumerate() {
            let (decoded, _) = self.decode(&latent.to_owned(), seq_len)?;
            outputs.index_axis_mut(Axis(0), b).assign(&decoded);
        }
        Ok(outputs)
    }

    /// Backpropagates dL/doutputs of shape (seq_len, output) and returns
    /// dL/dlatent
    pub fn backward(&self, trace: &DecoderTrace, d_outputs: &Array2<f64>, grads: &mut Decoder) -> Array1<f64> {
        let hidden = self.hidden_size();
        let mut dh_recurrent = Array1::zeros(hidden);
        let mut dc = Array1::zeros(hidden);
        let mut d_fed_back = Array1::zeros(hidden);

        for (t, (cache, h)) in trace.steps.iter().enumerate().rev() {
            let dh = self.output.backward(h, &d_outputs.row(t).to_owned(), &mut grads.output)
                + &dh_recurrent
                + &d_fed_back;
            let (dx, dh_prev, dc_prev) = self.lstm.backward(cache, &dh, &dc, &mut grads.lstm);
            dh_recurrent = dh_prev;
            dc = dc_prev;
            // step 0 was fed constant zeros
            d_fed_back = if t > 0 { dx } else { Array1::zeros(hidden) };
        }

        self.fc.backward(&trace.latent, &dh_recurrent, &mut grads.fc)
    }
}

impl Parameters for Decoder {
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        let mut tensors = self.fc.tensors();
        tensors.extend(self.lstm.tensors());
        tensors.extend(self.output.tensors());
        tensors
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        let mut tensors = self.fc.tensors_mut();
        tensors.extend(self.lstm.tensors_mut());
        tensors.extend(self.output.tensors_mut());
        tensors
    }

    fn zeros_like(&self) -> Self {
        Self {
            fc: self.fc.zeros_like(),
            lstm: self.lstm.zeros_like(),
            output: self.output.zeros_like(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn decoder() -> Decoder {
        let mut rng = StdRng::seed_from_u64(5);
        Decoder::new(4, 6, 3, &mut rng)
    }

    #[test]
    fn test_state_machine_steps() {
        let decoder = decoder();
        let latent = Array1::from_elem(4, 0.3);

        let initial = decoder.init_state(&latent);
        assert_eq!(initial.step, 0);
        assert_eq!(initial.hidden, decoder.fc.forward(&latent));
        assert!(initial.cell.iter().all(|&c| c == 0.0));
        assert!(initial.next_input().iter().all(|&x| x == 0.0));

        let first = decoder.step(&initial);
        assert_eq!(first.state.step, 1);
        assert_eq!(first.output.len(), 3);
        assert_eq!(first.state.next_input(), first.state.hidden);

        // stepping is a pure function of the state
        let again = decoder.step(&initial);
        assert_eq!(first.state, again.state);
        assert_eq!(first.output, again.output);
    }

    #[test]
    fn test_decode_matches_manual_steps() {
        let decoder = decoder();
        let latent = Array1::from_elem(4, -0.2);

        let (outputs, _) = decoder.decode(&latent, 3).unwrap();
        assert_eq!(outputs.dim(), (3, 3));

        let mut state = decoder.init_state(&latent);
        for t in 0..3 {
            let step = decoder.step(&state);
            assert_eq!(outputs.row(t), step.output);
            state = step.state;
        }
        assert_eq!(state.step, 3);
    }

    #[test]
    fn test_batch_forward_shape() {
        let decoder = decoder();
        let outputs = decoder.forward(&Array2::zeros((2, 4)), 1).unwrap();
        assert_eq!(outputs.dim(), (2, 1, 3));
    }

    #[test]
    fn test_latent_size_checked() {
        let decoder = decoder();
        assert!(matches!(
            decoder.decode(&Array1::zeros(2), 1),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
