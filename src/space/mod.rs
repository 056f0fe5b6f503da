//! The pipeline stages that turn the raw database exports into the
//! packaged lipid vector space.
//!
//! Stages communicate through CSV artifacts in a shared working
//! directory (see [`files`]); each stage reads the artifacts of the
//! stages before it and writes its own.

pub mod config;
pub mod error;
pub mod package;
pub mod preprocess;
pub mod reduce;
pub mod train;

pub use config::{load_config, PackageConfig, PreprocessConfig, ReduceConfig, TrainConfig};
pub use error::Error;

/// Artifact file names within the working directory.
pub mod files {
    /// Unified record table (source, names, category, class, mass).
    pub const DATABASE: &str = "database.csv";
    /// Structure strings keyed by record id.
    pub const SMILES: &str = "smiles.csv";
    /// Space-joined nomenclature tokens keyed by record id.
    pub const TOKENS: &str = "tokens.csv";
    /// High-dimensional record embeddings.
    pub const VECTORS: &str = "vectors.csv";
    /// High-dimensional vocabulary token embeddings.
    pub const TOKEN_VECTORS: &str = "token_vectors.csv";
    /// 2D projection of the record embeddings.
    pub const VECTORS_2D: &str = "vectors_2d.csv";
    /// 3D projection of the record embeddings.
    pub const VECTORS_3D: &str = "vectors_3d.csv";
}
