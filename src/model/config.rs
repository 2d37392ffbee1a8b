//! Encoder-decoder model configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HIDDEN_SIZE: usize = 64;
pub const DEFAULT_LATENT_SIZE: usize = 32;

/// Sizes of the encoder-decoder network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of input features (before and after quarter columns)
    pub input_size: usize,
    /// Hidden size shared by encoder and decoder
    pub hidden_size: usize,
    /// Size of the latent vector
    pub latent_size: usize,
    /// Number of reconstructed features per step
    pub output_size: usize,
    /// Seed for parameter initialization
    pub seed: u64,
}

impl ModelConfig {
    /// Creates a configuration with the default hidden and latent sizes
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            hidden_size: DEFAULT_HIDDEN_SIZE,
            latent_size: DEFAULT_LATENT_SIZE,
            output_size,
            seed: 42,
        }
    }

    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    pub fn with_latent_size(mut self, latent_size: usize) -> Self {
        self.latent_size = latent_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Small network for tests and quick experiments
    pub fn small(input_size: usize, output_size: usize) -> Self {
        Self::new(input_size, output_size)
            .with_hidden_size(8)
            .with_latent_size(4)
    }

    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("input_size", self.input_size),
            ("hidden_size", self.hidden_size),
            ("latent_size", self.latent_size),
            ("output_size", self.output_size),
        ];
        for (name, size) in sizes {
            if size == 0 {
                return Err(Error::Config(format!("model {name} must be positive")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ModelConfig::new(20, 10).with_hidden_size(16).with_seed(7);
        assert_eq!(config.hidden_size, 16);
        assert_eq!(config.latent_size, DEFAULT_LATENT_SIZE);
        assert_eq!(config.seed, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(ModelConfig::new(0, 10).validate().is_err());
        assert!(ModelConfig::new(4, 4).with_latent_size(0).validate().is_err());
    }
}
