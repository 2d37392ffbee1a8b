//! Linear layer and the parameter container trait

use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD};
use rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Anything holding trainable tensors.
///
/// Gradient accumulators are built with [`Parameters::zeros_like`] so that
/// `tensors()` of parameters and gradients line up one to one.
pub trait Parameters {
    /// Tensors in a fixed order
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>>;

    /// Mutable tensors in the same order as [`Parameters::tensors`]
    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>>;

    /// Same shapes, all zeros
    fn zeros_like(&self) -> Self
    where
        Self: Sized;

    /// Total number of scalars
    fn num_parameters(&self) -> usize {
        self.tensors().iter().map(|t| t.len()).sum()
    }
}

/// Fully connected layer: y = W x + b
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    /// Weight matrix (output_size x input_size)
    pub weight: Array2<f64>,
    /// Bias vector (output_size)
    pub bias: Array1<f64>,
}

impl Linear {
    /// Uniform initialization in ±1/sqrt(input_size)
    pub fn new<R: Rng>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        let limit = 1.0 / (input_size.max(1) as f64).sqrt();
        Self {
            weight: Array2::random_using((output_size, input_size), Uniform::new(-limit, limit), rng),
            bias: Array1::random_using(output_size, Uniform::new(-limit, limit), rng),
        }
    }

    pub fn input_size(&self) -> usize {
        self.weight.ncols()
    }

    pub fn output_size(&self) -> usize {
        self.weight.nrows()
    }

    pub fn forward(&self, x: &Array1<f64>) -> Array1<f64> {
        self.weight.dot(x) + &self.bias
    }

    /// Accumulates parameter gradients into `grads` and returns dL/dx
    pub fn backward(&self, x: &Array1<f64>, grad_output: &Array1<f64>, grads: &mut Linear) -> Array1<f64> {
        grads.weight += &outer_product(grad_output, x);
        grads.bias += grad_output;
        self.weight.t().dot(grad_output)
    }
}

impl Parameters for Linear {
    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        vec![self.weight.view().into_dyn(), self.bias.view().into_dyn()]
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        vec![self.weight.view_mut().into_dyn(), self.bias.view_mut().into_dyn()]
    }

    fn zeros_like(&self) -> Self {
        Self {
            weight: Array2::zeros(self.weight.dim()),
            bias: Array1::zeros(self.bias.len()),
        }
    }
}

/// Outer product a ⊗ b
pub(crate) fn outer_product(a: &Array1<f64>, b: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_linear_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        let layer = Linear::new(4, 3, &mut rng);
        assert_eq!(layer.weight.dim(), (3, 4));
        assert_eq!(layer.forward(&Array1::zeros(4)).len(), 3);
        assert_eq!(layer.num_parameters(), 15);
    }

    #[test]
    fn test_linear_backward() {
        let layer = Linear {
            weight: array![[1.0, 2.0], [3.0, 4.0]],
            bias: array![0.5, -0.5],
        };
        let x = array![1.0, -1.0];
        assert_eq!(layer.forward(&x), array![-0.5, -1.5]);

        let mut grads = layer.zeros_like();
        let dx = layer.backward(&x, &array![1.0, 0.0], &mut grads);

        assert_eq!(dx, array![1.0, 2.0]);
        assert_eq!(grads.weight, array![[1.0, -1.0], [0.0, 0.0]]);
        assert_eq!(grads.bias, array![1.0, 0.0]);
    }
}
