//! Core data structures flowing through the pipeline:
//!
//! - [`name`] – Parsed lipid shorthand nomenclature and its token sequence.
//! - [`record`] – Molecule records read from the source databases.
//! - [`vectors`] – Key-aligned dense vector tables (embedding and projections).

pub mod name;
pub mod record;
pub mod vectors;
