//! Configuration management
//!
//! Every section falls back to its defaults when absent from the TOML file.

use crate::data::Category;
use crate::error::{Error, Result};
use crate::extraction::DEFAULT_COMPLETENESS_THRESHOLD;
use crate::model::{ModelConfig, OptimizerKind, DEFAULT_HIDDEN_SIZE, DEFAULT_LATENT_SIZE};
use crate::preprocessing::{FillMethod, TransformConfig, DEFAULT_EPSILON};
use crate::training::TrainingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Gap extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    /// A quarter is complete when fewer fields than this are missing
    pub completeness_threshold: usize,
    pub categories: Vec<Category>,
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            completeness_threshold: DEFAULT_COMPLETENESS_THRESHOLD,
            categories: Category::ALL.to_vec(),
        }
    }
}

/// Feature transformation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesSection {
    pub fill_method: FillMethod,
    pub log_compression: bool,
    pub percentage_change: bool,
    pub standardize: bool,
    pub epsilon: f64,
}

impl Default for FeaturesSection {
    fn default() -> Self {
        Self {
            fill_method: FillMethod::Zero,
            log_compression: true,
            percentage_change: true,
            standardize: true,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub hidden_size: usize,
    pub latent_size: usize,
    /// Decoded steps per sample
    pub seq_len: usize,
    pub seed: u64,
    /// Name under which the trained artifact is published
    pub artifact_name: String,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            hidden_size: DEFAULT_HIDDEN_SIZE,
            latent_size: DEFAULT_LATENT_SIZE,
            seq_len: 1,
            seed: 42,
            artifact_name: "encoder_decoder".to_string(),
        }
    }
}

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSection {
    pub epochs: usize,
    pub learning_rate: f64,
    pub optimizer: OptimizerKind,
}

impl Default for TrainingSection {
    fn default() -> Self {
        Self {
            epochs: 10,
            learning_rate: 0.001,
            optimizer: OptimizerKind::Adam,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionSection,
    pub features: FeaturesSection,
    pub model: ModelSection,
    pub training: TrainingSection,
    pub logging: LoggingSection,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, or the defaults when the file is absent.
    ///
    /// A file that exists but fails to parse or validate is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create default configuration file
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        Config::default().save(path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.completeness_threshold == 0 {
            return Err(Error::Config("completeness_threshold must be at least 1".into()));
        }
        if self.extraction.categories.is_empty() {
            return Err(Error::Config("at least one category is required".into()));
        }
        if !(self.features.epsilon > 0.0) {
            return Err(Error::Config("epsilon must be positive".into()));
        }
        if self.model.seq_len == 0 {
            return Err(Error::Config("seq_len must be positive".into()));
        }
        if self.model.hidden_size == 0 || self.model.latent_size == 0 {
            return Err(Error::Config("hidden_size and latent_size must be positive".into()));
        }
        if self.model.artifact_name.trim().is_empty() {
            return Err(Error::Config("artifact_name must not be empty".into()));
        }
        if !(self.training.learning_rate > 0.0 && self.training.learning_rate.is_finite()) {
            return Err(Error::Config("learning_rate must be positive".into()));
        }
        Ok(())
    }

    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig {
            categories: self.extraction.categories.clone(),
            fill_method: self.features.fill_method,
            log_compression: self.features.log_compression,
            percentage_change: self.features.percentage_change,
            standardize: self.features.standardize,
            epsilon: self.features.epsilon,
        }
    }

    /// Model configuration for the given feature counts
    pub fn model_config(&self, input_size: usize, output_size: usize) -> ModelConfig {
        ModelConfig::new(input_size, output_size)
            .with_hidden_size(self.model.hidden_size)
            .with_latent_size(self.model.latent_size)
            .with_seed(self.model.seed)
    }

    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            epochs: self.training.epochs,
            learning_rate: self.training.learning_rate,
            optimizer: self.training.optimizer,
            seq_len: self.model.seq_len,
        }
    }
}
