use std::fmt;

use super::name::LipidName;

/// Source database a molecule record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceDb {
    Lmsd,
    SwissLipids,
}

impl SourceDb {
    /// The tag stored in the SOURCE column of the unified table.
    pub fn tag(&self) -> &'static str {
        match self {
            SourceDb::Lmsd => "LMSD",
            SourceDb::SwissLipids => "SwissLipids",
        }
    }

}

impl fmt::Display for SourceDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A molecule entry that survived preprocessing.
///
/// Immutable once created; one record per distinct database entry,
/// deduplicated by the structure string. The accession `id` is the key
/// every downstream table is joined on.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeRecord {
    pub id: String,
    pub source: SourceDb,
    pub original_name: String,
    pub name: LipidName,
    pub smiles: String,
    pub category: String,
    pub mass: Option<f64>,
}

impl MoleculeRecord {
    /// The nomenclature token sequence used as the training corpus unit.
    pub fn tokens(&self) -> Vec<String> {
        self.name.tokens()
    }
}
