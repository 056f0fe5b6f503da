//! Error type for the pipeline stages.
//!
//! Per-record problems (an unparseable name, a missing SMILES) are not
//! errors: they are logged and the record is skipped. This enum covers the
//! failures that abort a stage.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing one of the format streams failed.
    #[error(transparent)]
    Io(#[from] crate::io::Error),

    /// A stage input or output file could not be opened.
    #[error("cannot access '{path}': {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required artifact from an earlier stage is missing.
    #[error("missing stage artifact '{0}' (run the earlier stages first)")]
    MissingArtifact(PathBuf),

    /// A hyperparameter TOML file failed to parse.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Preprocessing produced no usable records.
    #[error("no records survived preprocessing; the corpus is empty")]
    EmptyCorpus,

    /// Too few vectors for a meaningful reduction.
    #[error("dimensionality reduction needs at least {needed} vectors, got {got}")]
    TooFewVectors { needed: usize, got: usize },

    /// The packaged key intersection is empty.
    #[error("no record key is present in all artifacts; nothing to package")]
    EmptyIntersection,
}

impl Error {
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}
