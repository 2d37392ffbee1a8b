//! LSTM cell with an explicit backward pass

use super::layers::{outer_product, Parameters};
use ndarray::{s, Array1, Array2, ArrayViewD, ArrayViewMutD};
use rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Hidden and cell state of one sequence
#[derive(Debug, Clone, PartialEq)]
pub struct LstmState {
    pub hidden: Array1<f64>,
    pub cell: Array1<f64>,
}

impl LstmState {
    pub fn zeros(hidden_size: usize) -> Self {
        Self {
            hidden: Array1::zeros(hidden_size),
            cell: Array1::zeros(hidden_size),
        }
    }
}

/// Activations of one step, kept for backpropagation
#[derive(Debug, Clone)]
pub struct StepCache {
    x: Array1<f64>,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    i: Array1<f64>,
    f: Array1<f64>,
    g: Array1<f64>,
    o: Array1<f64>,
    tanh_c: Array1<f64>,
}

/// LSTM cell.
///
/// The four gates are stacked row-wise in the order input, forget,
/// candidate, output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmCell {
    /// Input weights (4 * hidden_size x input_size)
    pub w_ih: Array2<f64>,
    /// Recurrent weights (4 * hidden_size x hidden_size)
    pub w_hh: Array2<f64>,
    /// Gate biases (4 * hidden_size)
    pub bias: Array1<f64>,
}

impl LstmCell {
    /// Uniform initialization in ±1/sqrt(hidden_size)
    pub fn new<R: Rng>(input_size: usize, hidden_size: usize, rng: &mut R) -> Self {
        let limit = 1.0 / (hidden_size.max(1) as f64).sqrt();
        let dist = Uniform::new(-limit, limit);
        Self {
            w_ih: Array2::random_using((4 * hidden_size, input_size), dist, rng),
            w_hh: Array2::random_using((4 * hidden_size, hidden_size), dist, rng),
            bias: Array1::random_using(4 * hidden_size, dist, rng),
        }
    }

    pub fn input_size(&self) -> usize {
        self.w_ih.ncols()
    }

    pub fn hidden_size(&self) -> usize {
        self.w_hh.ncols()
    }

    /// Advances one step
    pub fn forward(&self, x: &Array1<f64>, state: &LstmState) -> (LstmState, StepCache) {
        let h = self.hidden_size();
        let z = self.w_ih.dot(x) + self.w_hh.dot(&state.hidden) + &self.bias;

        let i = z.slice(s![0..h]).mapv(sigmoid);
        let f = z.slice(s![h..2 * h]).mapv(sigmoid);
        let g = z.slice(s![2 * h..3 * h]).mapv(f64::tanh);
        let o = z.slice(s![3 * h..4 * h]).mapv(sigmoid);

        let cell = &f * &state.cell + &i * &g;
        let tanh_c = cell.mapv(f64::tanh);
        let hidden = &o * &tanh_c;

        let cache = StepCache {
            x: x.clone(),
            h_prev: state.hidden.clone(),
            c_prev: state.cell.clone(),
            i,
            f,
            g,
            o,
            tanh_c,
        };
        (LstmState { hidden, cell }, cache)
    }

    /// Backpropagates one step.
    ///
    /// `dh` and `dc` are the gradients arriving at this step's outputs.
    /// Returns (dL/dx, dL/dh_prev, dL/dc_prev) and accumulates weight
    /// gradients into `grads`.
    pub fn backward(
        &self,
        cache: &StepCache,
        dh: &Array1<f64>,
        dc: &Array1<f64>,
        grads: &mut LstmCell,
    ) -> (Array1<f64>, Array1<f64>, Array1<f64>) {
        let h = self.hidden_size();

        let d_o = dh * &cache.tanh_c;
        let dc = dc + &(dh * &cache.o * &cache.tanh_c.mapv(|t| 1.0 - t * t));

        let d_i = &dc * &cache.g;
        let d_g = &dc * &cache.i;
        let d_f = &dc * &cache.c_prev;
        let dc_prev = &dc * &cache.f;

        let mut dz = Array1::zeros(4 * h);
        dz.slice_mut(s![0..h])
            .assign(&(&d_i * &cache.i.mapv(|v| v * (1.0 - v))));
        dz.slice_mut(s![h..2 * h])
            .assign(&(&d_f * &cache.f.mapv(|v| v * (1.0 - v))));
        dz.slice_mut(s![2 * h..3 * h])
            .assign(&(&d_g * &cache.g.mapv(|v| 1.0 - v * v)));
        dz.slice_mut(s![3 * h..4 * h])
            .assign(&(&d_o * &cache.o.mapv(|v| v * (1.0 - v))));

        grads.w_ih += &outer_product(&dz, &cache.x);
        grads.w_hh += &outer_product(&dz, &cache.h_prev);
        grads.bias += &dz;

        let dx = self.w_ih.t().dot(&dz);
        let dh_prev = self.w_hh.t().dot(&dz);
        (dx, dh_prev, dc_prev)
    }
}

impl Parameters for LstmCell {
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        vec![
            self.w_ih.view().into_dyn(),
            self.w_hh.view().into_dyn(),
            self.bias.view().into_dyn(),
        ]
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        vec![
            self.w_ih.view_mut().into_dyn(),
            self.w_hh.view_mut().into_dyn(),
            self.bias.view_mut().into_dyn(),
        ]
    }

    fn zeros_like(&self) -> Self {
        Self {
            w_ih: Array2::zeros(self.w_ih.dim()),
            w_hh: Array2::zeros(self.w_hh.dim()),
            bias: Array1::zeros(self.bias.len()),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
