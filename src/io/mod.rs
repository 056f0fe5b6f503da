//! File I/O for the pipeline's external formats: the LMSD SDF export, the
//! SwissLipids TSV export, the CSV tables passed between stages, and the
//! packaged ZIP archives.

use std::fmt;

pub mod archive;
pub mod error;
pub mod sdf;
pub mod table;
pub mod tsv;

pub use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Sdf,
    Tsv,
    Csv,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Sdf => write!(f, "SDF"),
            Format::Tsv => write!(f, "TSV"),
            Format::Csv => write!(f, "CSV"),
        }
    }
}
