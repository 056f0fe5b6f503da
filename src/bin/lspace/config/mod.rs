//! Builds stage configurations from TOML files and CLI overrides.
//!
//! Precedence: built-in defaults, then the hyperparameter file, then
//! explicit flags.

use anyhow::{Context, Result};

use lipid_space::space::{
    load_config, PackageConfig, PreprocessConfig, ReduceConfig, TrainConfig,
};

use crate::cli::{InputOptions, PackageOptions, ReduceOptions, TrainOptions};

pub fn build_preprocess_config(input: &InputOptions) -> PreprocessConfig {
    PreprocessConfig {
        isomeric_only: !input.all_levels,
    }
}

pub fn build_train_config(options: &TrainOptions) -> Result<TrainConfig> {
    let mut config: TrainConfig = load_config(options.params.as_deref())
        .context("Failed to load training hyperparameters")?;

    if let Some(dim) = options.dim {
        config.vector_size = dim;
    }
    if let Some(window) = options.window {
        config.window = window;
    }
    if let Some(epochs) = options.epochs {
        config.epochs = epochs;
    }
    if let Some(seed) = options.seed {
        config.seed = seed;
    }

    Ok(config)
}

pub fn build_reduce_config(options: &ReduceOptions) -> Result<ReduceConfig> {
    let mut config: ReduceConfig = load_config(options.params.as_deref())
        .context("Failed to load reduction hyperparameters")?;

    if let Some(perplexity) = options.perplexity {
        config.perplexity = perplexity;
    }
    if let Some(iterations) = options.iterations {
        config.iterations = iterations;
    }
    if let Some(seed) = options.seed {
        config.seed = seed;
    }

    Ok(config)
}

pub fn build_package_config(options: &PackageOptions) -> PackageConfig {
    PackageConfig {
        max_part_bytes: options.max_part_mb * 1024 * 1024,
    }
}
