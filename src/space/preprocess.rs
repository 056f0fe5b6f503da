//! Stage 1: parse the two database exports into a unified record table.
//!
//! Per-record failures (missing name, unparseable shorthand, missing
//! structure) are logged and skipped; the stage only fails when an input
//! file is missing or structurally unreadable.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, info, warn};

use crate::io::sdf::SdfEntry;
use crate::io::table::{write_table, KeyedTable};
use crate::io::tsv::{TsvRow, TsvTable};
use crate::io::{sdf, tsv};
use crate::model::name::LipidName;
use crate::model::record::{MoleculeRecord, SourceDb};

use super::config::PreprocessConfig;
use super::error::Error;
use super::files;

/// Per-source parse accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSummary {
    pub source: SourceDb,
    /// Entries read from the file.
    pub read: usize,
    /// Entries skipped by a level/format filter before parsing.
    pub filtered: usize,
    /// Entries that failed to yield a record.
    pub failed: usize,
    /// Entries dropped because their structure string was already seen.
    pub duplicates: usize,
    /// Records kept.
    pub kept: usize,
}

impl SourceSummary {
    fn new(source: SourceDb) -> Self {
        Self {
            source,
            read: 0,
            filtered: 0,
            failed: 0,
            duplicates: 0,
            kept: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreprocessSummary {
    pub sources: Vec<SourceSummary>,
    pub records: usize,
}

/// Runs preprocessing over the LMSD SDF and the SwissLipids TSV, writing
/// the unified database, SMILES, and token tables into `out_dir`.
pub fn run(
    sdf_path: &Path,
    tsv_path: &Path,
    out_dir: &Path,
    config: &PreprocessConfig,
) -> Result<PreprocessSummary, Error> {
    let mut records: Vec<MoleculeRecord> = Vec::new();
    let mut seen_smiles: HashSet<String> = HashSet::new();

    info!("Read LMSD SDF file: {}", sdf_path.display());
    let sdf_file = File::open(sdf_path).map_err(|e| Error::file(sdf_path, e))?;
    let entries = sdf::read(BufReader::new(sdf_file))?;
    let lmsd = collect_lmsd(&entries, &mut records, &mut seen_smiles);

    info!("Read SwissLipids TSV file: {}", tsv_path.display());
    let tsv_file = File::open(tsv_path).map_err(|e| Error::file(tsv_path, e))?;
    let table = tsv::read(BufReader::new(tsv_file))?;
    let swiss = collect_swisslipids(&table, config, &mut records, &mut seen_smiles)?;

    if records.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    write_outputs(out_dir, &records)?;

    info!(
        "Preprocessing kept {} records ({} LMSD, {} SwissLipids)",
        records.len(),
        lmsd.kept,
        swiss.kept
    );

    Ok(PreprocessSummary {
        records: records.len(),
        sources: vec![lmsd, swiss],
    })
}

fn collect_lmsd(
    entries: &[SdfEntry],
    records: &mut Vec<MoleculeRecord>,
    seen_smiles: &mut HashSet<String>,
) -> SourceSummary {
    let mut summary = SourceSummary::new(SourceDb::Lmsd);

    for entry in entries {
        summary.read += 1;
        match lmsd_record(entry) {
            Ok(record) => {
                if seen_smiles.insert(record.smiles.clone()) {
                    summary.kept += 1;
                    records.push(record);
                } else {
                    summary.duplicates += 1;
                    debug!("LMSD {}: duplicate structure, dropped", record_id(entry));
                }
            }
            Err(reason) => {
                summary.failed += 1;
                warn!(
                    "LMSD {} (line {}): {}",
                    record_id(entry),
                    entry.line,
                    reason
                );
            }
        }
    }

    summary
}

fn record_id(entry: &SdfEntry) -> &str {
    entry.get("LM_ID").unwrap_or("<no id>")
}

fn lmsd_record(entry: &SdfEntry) -> Result<MoleculeRecord, String> {
    let id = entry
        .get("LM_ID")
        .filter(|id| !id.is_empty())
        .ok_or("missing LM_ID")?;

    let smiles = entry
        .get("SMILES")
        .filter(|s| !s.is_empty())
        .ok_or("missing SMILES")?;

    // The NAME field carries the LIPID MAPS notation; fall back to the
    // shorthand ABBREVIATION when NAME does not parse.
    let name_field = entry.get("NAME").unwrap_or("");
    let abbreviation = entry.get("ABBREVIATION").unwrap_or("");
    let (name, original) = parse_with_fallback(name_field, abbreviation)?;

    let category = entry
        .get("CATEGORY")
        .map(lmsd_category_code)
        .unwrap_or("UNDEFINED");

    let mass = entry.get("EXACT_MASS").and_then(|m| m.parse::<f64>().ok());

    Ok(MoleculeRecord {
        id: id.to_string(),
        source: SourceDb::Lmsd,
        original_name: original.to_string(),
        name,
        smiles: smiles.to_string(),
        category: category.to_string(),
        mass,
    })
}

fn parse_with_fallback<'a>(
    name: &'a str,
    fallback: &'a str,
) -> Result<(LipidName, &'a str), String> {
    if name.is_empty() && fallback.is_empty() {
        return Err("missing name".to_string());
    }
    match name.parse::<LipidName>() {
        Ok(parsed) => Ok((parsed, name)),
        Err(primary) => match fallback.parse::<LipidName>() {
            Ok(parsed) => Ok((parsed, fallback)),
            Err(_) => Err(format!("name cannot be parsed: {}", primary)),
        },
    }
}

/// Maps the LMSD category display names to their two-letter codes.
fn lmsd_category_code(category: &str) -> &'static str {
    match category {
        "Fatty Acyls [FA]" => "FA",
        "Glycerolipids [GL]" => "GL",
        "Glycerophospholipids [GP]" => "GP",
        "Sphingolipids [SP]" => "SP",
        "Sterol Lipids [ST]" => "ST",
        "Prenol Lipids [PR]" => "PR",
        "Saccharolipids [SL]" => "SL",
        "Polyketides [PK]" => "PK",
        _ => "UNDEFINED",
    }
}

fn collect_swisslipids(
    table: &TsvTable,
    config: &PreprocessConfig,
    records: &mut Vec<MoleculeRecord>,
    seen_smiles: &mut HashSet<String>,
) -> Result<SourceSummary, Error> {
    let mut summary = SourceSummary::new(SourceDb::SwissLipids);

    let id_col = table.column("Lipid ID")?;
    let level_col = table.column("Level")?;
    let abbreviation_col = table.column("Abbreviation*")?;
    let smiles_col = table.column("SMILES (pH7.3)")?;
    let mass_col = table.column("Mass (pH7.3)").ok();

    for row in table.rows() {
        summary.read += 1;

        if config.isomeric_only && row.cell(level_col) != "Isomeric subspecies" {
            summary.filtered += 1;
            continue;
        }

        match swisslipids_record(row, id_col, abbreviation_col, smiles_col, mass_col) {
            Ok(record) => {
                if seen_smiles.insert(record.smiles.clone()) {
                    summary.kept += 1;
                    records.push(record);
                } else {
                    summary.duplicates += 1;
                    debug!("SwissLipids {}: duplicate structure, dropped", record.id);
                }
            }
            Err(reason) => {
                summary.failed += 1;
                warn!(
                    "SwissLipids {} (line {}): {}",
                    row.cell(id_col),
                    row.line,
                    reason
                );
            }
        }
    }

    Ok(summary)
}

fn swisslipids_record(
    row: &TsvRow,
    id_col: usize,
    abbreviation_col: usize,
    smiles_col: usize,
    mass_col: Option<usize>,
) -> Result<MoleculeRecord, String> {
    let id = row.cell(id_col).trim();
    if id.is_empty() {
        return Err("missing Lipid ID".to_string());
    }

    let smiles = row.cell(smiles_col).trim();
    if smiles.is_empty() {
        return Err("missing SMILES".to_string());
    }

    // The abbreviation field holds |-separated alternatives; the first
    // one is the curated shorthand.
    let abbreviation = row
        .cell(abbreviation_col)
        .split('|')
        .next()
        .unwrap_or("")
        .trim();
    if abbreviation.is_empty() {
        return Err("missing abbreviation".to_string());
    }

    let name = abbreviation
        .parse::<LipidName>()
        .map_err(|e| format!("name cannot be parsed: {}", e))?;

    let category = class_category(&name.class);
    let mass = mass_col.and_then(|col| row.cell(col).trim().parse::<f64>().ok());

    Ok(MoleculeRecord {
        id: id.to_string(),
        source: SourceDb::SwissLipids,
        original_name: abbreviation.to_string(),
        name,
        smiles: smiles.to_string(),
        category: category.to_string(),
        mass,
    })
}

/// Derives the lipid category code from a class token for sources that do
/// not carry an explicit category column.
fn class_category(class: &str) -> &'static str {
    const GP: &[&str] = &[
        "PC", "PE", "PS", "PI", "PG", "PA", "LPC", "LPE", "LPS", "LPI", "LPG", "LPA", "CL", "BMP",
        "PIP", "PIP2", "PIP3",
    ];
    const GL: &[&str] = &["TG", "DG", "MG", "MGDG", "DGDG", "SQDG"];
    const SP: &[&str] = &[
        "Cer", "CerP", "SM", "SPB", "SPBP", "HexCer", "Hex2Cer", "Hex3Cer", "SHexCer", "GM3",
        "GM1", "GD3",
    ];
    const ST: &[&str] = &["CE", "SE", "ST", "Chol", "Cholesterol"];
    const FA: &[&str] = &["FA", "FAL", "FOH", "CAR", "CoA", "NAE", "WE"];

    if GP.contains(&class) {
        "GP"
    } else if GL.contains(&class) {
        "GL"
    } else if SP.contains(&class) {
        "SP"
    } else if ST.contains(&class) {
        "ST"
    } else if FA.contains(&class) {
        "FA"
    } else {
        "UNDEFINED"
    }
}

fn write_outputs(out_dir: &Path, records: &[MoleculeRecord]) -> Result<(), Error> {
    let mut database = KeyedTable::new(
        ["SOURCE", "ORIGINAL_NAME", "NAME", "CATEGORY", "CLASS", "MASS"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    let mut smiles = KeyedTable::new(vec!["SMILES".to_string()]);
    let mut tokens = KeyedTable::new(vec!["TOKENS".to_string()]);

    for record in records {
        database.push(
            record.id.clone(),
            vec![
                record.source.tag().to_string(),
                record.original_name.clone(),
                record.name.to_string(),
                record.category.clone(),
                record.name.class.clone(),
                record.mass.map(|m| m.to_string()).unwrap_or_default(),
            ],
        );
        smiles.push(record.id.clone(), vec![record.smiles.clone()]);
        tokens.push(record.id.clone(), vec![record.tokens().join(" ")]);
    }

    for (file_name, table) in [
        (files::DATABASE, &database),
        (files::SMILES, &smiles),
        (files::TOKENS, &tokens),
    ] {
        let path = out_dir.join(file_name);
        let file = File::create(&path).map_err(|e| Error::file(&path, e))?;
        write_table(file, table)?;
        info!("Wrote {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::tsv;
    use std::io::Cursor;

    const SDF: &str = "\
LMGP01010005
  LIPDMAPS

M  END
> <LM_ID>
LMGP01010005

> <NAME>
PC(16:0/18:1(9Z))

> <CATEGORY>
Glycerophospholipids [GP]

> <SMILES>
CCCCCCCCCCCCCCCCCC

> <EXACT_MASS>
759.58

$$$$
LMFA00000001
  LIPDMAPS

M  END
> <LM_ID>
LMFA00000001

> <NAME>
some trivial name without shorthand

> <SMILES>
CCCC

$$$$
LMGP01010006
  LIPDMAPS

M  END
> <LM_ID>
LMGP01010006

> <NAME>
PC(16:0/18:1(11Z))

> <SMILES>
CCCCCCCCCCCCCCCCCC

$$$$
";

    #[test]
    fn lmsd_entries_parse_skip_and_dedup() {
        let entries = sdf::read(Cursor::new(SDF)).unwrap();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let summary = collect_lmsd(&entries, &mut records, &mut seen);

        assert_eq!(summary.read, 3);
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.duplicates, 1);

        let record = &records[0];
        assert_eq!(record.id, "LMGP01010005");
        assert_eq!(record.category, "GP");
        assert_eq!(record.name.to_string(), "PC 16:0/18:1");
        assert_eq!(record.mass, Some(759.58));
    }

    #[test]
    fn lmsd_abbreviation_is_a_fallback() {
        let entry_sdf = "\
mol

M  END
> <LM_ID>
LMST00000001

> <NAME>
cholest-5-en-3beta-ol ester

> <ABBREVIATION>
CE 18:2

> <SMILES>
CC(C)CCCC

$$$$
";
        let entries = sdf::read(Cursor::new(entry_sdf)).unwrap();
        let record = lmsd_record(&entries[0]).unwrap();
        assert_eq!(record.original_name, "CE 18:2");
        assert_eq!(record.name.class, "CE");
    }

    const TSV: &str = "Lipid ID\tLevel\tName\tAbbreviation*\tSMILES (pH7.3)\tMass (pH7.3)\n\
        SLM:000000002\tIsomeric subspecies\tname a\tPC(16:0/18:1)\tCCOP(=O)(O)OCC\t759.1\n\
        SLM:000000003\tClass\tphosphatidylcholines\tPC\t\t\n\
        SLM:000000004\tIsomeric subspecies\tname b\t\tCCC\t\n\
        SLM:000000005\tIsomeric subspecies\tname c\tCer(d18:1/24:0)\tCCCCN\t650.0\n";

    #[test]
    fn swisslipids_rows_filter_parse_and_keep() {
        let table = tsv::read(Cursor::new(TSV)).unwrap();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let summary =
            collect_swisslipids(&table, &PreprocessConfig::default(), &mut records, &mut seen)
                .unwrap();

        assert_eq!(summary.read, 4);
        assert_eq!(summary.filtered, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.kept, 2);

        assert_eq!(records[0].category, "GP");
        assert_eq!(records[1].category, "SP");
        assert_eq!(records[1].name.to_string(), "Cer 18:1;O2/24:0");
    }

    #[test]
    fn categories_follow_the_class_token() {
        assert_eq!(class_category("PC"), "GP");
        assert_eq!(class_category("TG"), "GL");
        assert_eq!(class_category("SM"), "SP");
        assert_eq!(class_category("CE"), "ST");
        assert_eq!(class_category("NoSuchClass"), "UNDEFINED");
    }
}
