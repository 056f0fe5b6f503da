//! A pure Rust pipeline that builds a browsable vector space of the lipidome
//! from the LIPID MAPS (LMSD) and SwissLipids database exports.
//!
//! # Features
//!
//! - **Nomenclature parsing** — Lipid shorthand names (`PC 16:0/18:1`,
//!   `Cer(d18:1/24:0)`) are parsed into a class token plus chain tokens and
//!   normalized to a canonical rendering
//! - **Database preprocessing** — LMSD SDF and SwissLipids TSV exports are
//!   unified into one record table with deduplicated structures
//! - **Embedding** — Skip-gram embeddings trained on the token corpus; a
//!   record vector is the sum of its token vectors
//! - **Projection** — Exact t-SNE over cosine distances produces matched 2D
//!   and 3D coordinate tables
//! - **Packaging** — The distributable tables ship as single-entry ZIP
//!   archives, split into numbered parts under a size cap
//!
//! # Quick Start
//!
//! The stages live in [`space`] and communicate through CSV artifacts in a
//! working directory:
//!
//! ```no_run
//! use std::path::Path;
//! use lipid_space::space::{self, PreprocessConfig, TrainConfig, ReduceConfig, PackageConfig};
//!
//! let work = Path::new("output");
//! space::preprocess::run(
//!     Path::new("structures.sdf"),
//!     Path::new("lipids.tsv"),
//!     work,
//!     &PreprocessConfig::default(),
//! )?;
//! space::train::run(work, &TrainConfig::default())?;
//! space::reduce::run(work, &ReduceConfig::default())?;
//! space::package::run(work, work, &PackageConfig::default())?;
//! # Ok::<(), lipid_space::space::Error>(())
//! ```
//!
//! # Module Organization
//!
//! - [`model`] — Lipid names, records, and vector tables
//! - [`io`] — Readers and writers for the SDF, TSV, CSV, and ZIP formats
//! - [`space`] — The four pipeline stages and their configurations

mod model;

pub mod io;
pub mod space;

pub use model::name::{Chain, ChainLevel, Ether, LipidName, ParseLipidNameError};
pub use model::record::{MoleculeRecord, SourceDb};
pub use model::vectors::VectorTable;

pub use space::{PackageConfig, PreprocessConfig, ReduceConfig, TrainConfig};

pub use space::Error as SpaceError;
