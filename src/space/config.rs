//! Stage configurations.
//!
//! Defaults mirror the hyperparameters the vector space was originally
//! derived with. Each config can be overridden from a TOML file (partial
//! files are fine, unset keys keep their defaults) and from CLI flags.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::Error;

/// Preprocessing options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Keep only SwissLipids rows at the "Isomeric subspecies" level;
    /// higher levels are aggregates of those.
    pub isomeric_only: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { isomeric_only: true }
    }
}

/// Skip-gram embedding hyperparameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Embedding dimensionality.
    pub vector_size: usize,
    /// Maximum context window, reduced randomly per position.
    pub window: usize,
    /// Tokens rarer than this are dropped from the vocabulary.
    pub min_count: usize,
    pub epochs: usize,
    /// Negative samples per positive pair.
    pub negative: usize,
    /// Initial learning rate, decayed linearly to `min_learning_rate`.
    pub learning_rate: f32,
    pub min_learning_rate: f32,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            vector_size: 100,
            window: 4,
            min_count: 1,
            epochs: 10,
            negative: 5,
            learning_rate: 0.025,
            min_learning_rate: 1e-4,
            seed: 42,
        }
    }
}

/// t-SNE reduction hyperparameters, shared by the 2D and 3D passes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReduceConfig {
    /// Target perplexity; capped at `(n - 1) / 3` for small inputs.
    pub perplexity: f64,
    pub iterations: usize,
    pub learning_rate: f64,
    /// Factor applied to the affinities during the early iterations.
    pub early_exaggeration: f64,
    /// Number of early-exaggeration iterations.
    pub exaggeration_iterations: usize,
    pub seed: u64,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            perplexity: 30.0,
            iterations: 1000,
            learning_rate: 200.0,
            early_exaggeration: 12.0,
            exaggeration_iterations: 250,
            seed: 42,
        }
    }
}

/// Packaging options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Maximum uncompressed CSV bytes per archive part. The default keeps
    /// every file under the 100 MB hosting limit the distribution targets.
    pub max_part_bytes: usize,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            max_part_bytes: 100 * 1024 * 1024,
        }
    }
}

/// Loads a config from an optional TOML file, falling back to defaults.
pub fn load_config<T: Default + DeserializeOwned>(path: Option<&Path>) -> Result<T, Error> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
            Ok(toml::from_str(&text)?)
        }
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_training_setup() {
        let config = TrainConfig::default();
        assert_eq!(config.vector_size, 100);
        assert_eq!(config.window, 4);
        assert_eq!(config.min_count, 1);
        assert_eq!(config.epochs, 10);
    }

    #[test]
    fn partial_toml_overrides_keep_defaults() {
        let config: TrainConfig = toml::from_str("vector_size = 16\nseed = 7").unwrap();
        assert_eq!(config.vector_size, 16);
        assert_eq!(config.seed, 7);
        assert_eq!(config.window, TrainConfig::default().window);
    }
}
