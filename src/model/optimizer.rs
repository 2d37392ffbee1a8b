//! Optimization algorithms
//!
//! Both optimizers update any [`Parameters`] container in place, walking its
//! tensors alongside a gradient container of the same layout.

use super::layers::Parameters;
use crate::error::{Error, Result};
use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Optimizer trait for parameter updates
pub trait Optimizer {
    /// Applies one update from accumulated gradients
    fn step<P: Parameters>(&mut self, params: &mut P, grads: &P) -> Result<()>;

    /// Reset optimizer state (for a new training run)
    fn reset(&mut self);

    fn learning_rate(&self) -> f64;
}

/// Stochastic gradient descent with optional momentum
#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
    velocity: Vec<ArrayD<f64>>,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            momentum: 0.0,
            velocity: Vec::new(),
        }
    }

    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }
}

impl Optimizer for Sgd {
    fn step<P: Parameters>(&mut self, params: &mut P, grads: &P) -> Result<()> {
        let grads = grads.tensors();
        let mut params = params.tensors_mut();
        check_layout(&params, &grads)?;

        if self.velocity.is_empty() {
            self.velocity = grads.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
        }

        let (lr, momentum) = (self.learning_rate, self.momentum);
        for ((p, g), v) in params.iter_mut().zip(&grads).zip(&mut self.velocity) {
            Zip::from(p).and(g).and(v).for_each(|p, &g, v| {
                *v = momentum * *v - lr * g;
                *p += *v;
            });
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.velocity.clear();
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

/// Adam optimizer (Adaptive Moment Estimation)
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: i32,
    m: Vec<ArrayD<f64>>,
    v: Vec<ArrayD<f64>>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    pub fn with_betas(mut self, beta1: f64, beta2: f64) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
        self
    }

    /// Number of updates applied so far
    pub fn steps(&self) -> i32 {
        self.t
    }
}

impl Optimizer for Adam {
    fn step<P: Parameters>(&mut self, params: &mut P, grads: &P) -> Result<()> {
        let grads = grads.tensors();
        let mut params = params.tensors_mut();
        check_layout(&params, &grads)?;

        if self.m.is_empty() {
            self.m = grads.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
            self.v = self.m.clone();
        }

        self.t += 1;
        let (b1, b2, eps, lr) = (self.beta1, self.beta2, self.epsilon, self.learning_rate);
        let correction1 = 1.0 - b1.powi(self.t);
        let correction2 = 1.0 - b2.powi(self.t);

        for (((p, g), m), v) in params
            .iter_mut()
            .zip(&grads)
            .zip(&mut self.m)
            .zip(&mut self.v)
        {
            Zip::from(p).and(g).and(m).and(v).for_each(|p, &g, m, v| {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                let m_hat = *m / correction1;
                let v_hat = *v / correction2;
                *p -= lr * m_hat / (v_hat.sqrt() + eps);
            });
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.t = 0;
        self.m.clear();
        self.v.clear();
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

fn check_layout(params: &[ArrayViewMutD<'_, f64>], grads: &[ArrayViewD<'_, f64>]) -> Result<()> {
    if params.len() != grads.len() {
        return Err(Error::ShapeMismatch {
            context: "optimizer tensors",
            expected: params.len(),
            actual: grads.len(),
        });
    }
    for (p, g) in params.iter().zip(grads) {
        if p.shape() != g.shape() {
            return Err(Error::ShapeMismatch {
                context: "optimizer tensor size",
                expected: p.len(),
                actual: g.len(),
            });
        }
    }
    Ok(())
}

/// Optimizer selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerKind::Adam => write!(f, "adam"),
            OptimizerKind::Sgd => write!(f, "sgd"),
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "adam" => Ok(OptimizerKind::Adam),
            "sgd" => Ok(OptimizerKind::Sgd),
            other => Err(Error::Config(format!("unknown optimizer: {other}"))),
        }
    }
}

/// Runtime choice between the two optimizers
#[derive(Debug, Clone)]
pub enum AnyOptimizer {
    Adam(Adam),
    Sgd(Sgd),
}

impl AnyOptimizer {
    pub fn new(kind: OptimizerKind, learning_rate: f64) -> Self {
        match kind {
            OptimizerKind::Adam => AnyOptimizer::Adam(Adam::new(learning_rate)),
            OptimizerKind::Sgd => AnyOptimizer::Sgd(Sgd::new(learning_rate).with_momentum(0.9)),
        }
    }
}

impl Optimizer for AnyOptimizer {
    fn step<P: Parameters>(&mut self, params: &mut P, grads: &P) -> Result<()> {
        match self {
            AnyOptimizer::Adam(opt) => opt.step(params, grads),
            AnyOptimizer::Sgd(opt) => opt.step(params, grads),
        }
    }

    fn reset(&mut self) {
        match self {
            AnyOptimizer::Adam(opt) => opt.reset(),
            AnyOptimizer::Sgd(opt) => opt.reset(),
        }
    }

    fn learning_rate(&self) -> f64 {
        match self {
            AnyOptimizer::Adam(opt) => opt.learning_rate(),
            AnyOptimizer::Sgd(opt) => opt.learning_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Linear;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn layer() -> Linear {
        Linear {
            weight: array![[1.0, -1.0]],
            bias: array![0.5],
        }
    }

    #[test]
    fn test_sgd_step() {
        let mut params = layer();
        let mut grads = params.zeros_like();
        grads.weight = array![[1.0, 2.0]];
        grads.bias = array![-1.0];

        let mut sgd = Sgd::new(0.1);
        sgd.step(&mut params, &grads).unwrap();

        assert_abs_diff_eq!(params.weight[[0, 0]], 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(params.weight[[0, 1]], -1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(params.bias[0], 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_adam_first_step_moves_by_learning_rate() {
        let mut params = layer();
        let mut grads = params.zeros_like();
        grads.weight = array![[3.0, -0.5]];
        grads.bias = array![0.0];

        let mut adam = Adam::new(0.001);
        adam.step(&mut params, &grads).unwrap();

        // bias-corrected first step is lr * sign(g)
        assert_abs_diff_eq!(params.weight[[0, 0]], 1.0 - 0.001, epsilon = 1e-8);
        assert_abs_diff_eq!(params.weight[[0, 1]], -1.0 + 0.001, epsilon = 1e-8);
        assert_abs_diff_eq!(params.bias[0], 0.5, epsilon = 1e-12);
        assert_eq!(adam.steps(), 1);

        adam.reset();
        assert_eq!(adam.steps(), 0);
    }

    #[test]
    fn test_mismatched_gradients_rejected() {
        let mut params = layer();
        let grads = Linear {
            weight: array![[1.0, 2.0, 3.0]],
            bias: array![0.0],
        };
        assert!(Adam::new(0.1).step(&mut params, &grads).is_err());
    }

    #[test]
    fn test_optimizer_kind_parsing() {
        assert_eq!("Adam".parse::<OptimizerKind>().unwrap(), OptimizerKind::Adam);
        assert_eq!("sgd".parse::<OptimizerKind>().unwrap(), OptimizerKind::Sgd);
        assert!("rmsprop".parse::<OptimizerKind>().is_err());
        assert_eq!(AnyOptimizer::new(OptimizerKind::Sgd, 0.01).learning_rate(), 0.01);
    }
}
