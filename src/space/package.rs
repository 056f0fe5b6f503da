//! Stage 4: package the distributable artifacts as split ZIP archives.
//!
//! The database, SMILES, and projection tables are restricted to the
//! record keys present in all of them, then each table is zipped, split
//! into numbered parts when its CSV payload exceeds the size cap.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::io::archive::write_archives;
use crate::io::table::{read_table, write_table, KeyedTable};

use super::config::PackageConfig;
use super::error::Error;
use super::files;

/// The artifacts that ship, with their archive stems.
const ARTIFACTS: [(&str, &str); 4] = [
    (files::DATABASE, "database"),
    (files::SMILES, "smiles"),
    (files::VECTORS_2D, "vectors_2d"),
    (files::VECTORS_3D, "vectors_3d"),
];

#[derive(Debug, Clone)]
pub struct PackageSummary {
    /// Records present in every packaged table.
    pub rows: usize,
    /// Table rows dropped by the key intersection, summed over all tables.
    pub dropped: usize,
    /// Archive files written, in artifact and part order.
    pub archives: Vec<PathBuf>,
}

/// Runs the packaging stage: intersects the artifact tables on their keys
/// and writes one (possibly split) archive per artifact into `out_dir`.
pub fn run(
    work_dir: &Path,
    out_dir: &Path,
    config: &PackageConfig,
) -> Result<PackageSummary, Error> {
    let mut tables = Vec::with_capacity(ARTIFACTS.len());
    for (file_name, stem) in ARTIFACTS {
        let path = work_dir.join(file_name);
        if !path.exists() {
            return Err(Error::MissingArtifact(path));
        }
        let file = File::open(&path).map_err(|e| Error::file(&path, e))?;
        tables.push((stem, read_table(BufReader::new(file))?));
    }

    let keys = shared_keys(tables.iter().map(|(_, table)| table));
    if keys.is_empty() {
        return Err(Error::EmptyIntersection);
    }

    // Orphans on any side count: a key only present in a projection table
    // is just as dropped as one only present in the database table.
    let dropped: usize = tables
        .iter()
        .map(|(_, table)| table.len() - keys.len())
        .sum();
    if dropped > 0 {
        warn!(
            "{} table rows lack a key shared by every table and will not ship",
            dropped
        );
    }

    let mut archives = Vec::new();
    for (stem, table) in &mut tables {
        table.retain_keys(|key| keys.contains(key));

        let mut payload = Vec::new();
        write_table(&mut payload, table)?;

        let paths = write_archives(out_dir, stem, &payload, config.max_part_bytes)?;
        for path in &paths {
            info!("Wrote {}", path.display());
        }
        archives.extend(paths);
    }

    Ok(PackageSummary {
        rows: keys.len(),
        dropped,
        archives,
    })
}

/// Keys present in every table. Iteration order is irrelevant here; each
/// table keeps its own row order when filtered.
fn shared_keys<'a>(tables: impl Iterator<Item = &'a KeyedTable>) -> HashSet<String> {
    let mut shared: Option<HashSet<String>> = None;
    for table in tables {
        let keys: HashSet<String> = table.keys().map(String::from).collect();
        shared = Some(match shared {
            None => keys,
            Some(shared) => shared.intersection(&keys).cloned().collect(),
        });
    }
    shared.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table(keys: &[&str]) -> KeyedTable {
        let mut table = KeyedTable::new(vec!["VALUE".to_string()]);
        for key in keys {
            table.push(key.to_string(), vec![format!("v-{}", key)]);
        }
        table
    }

    #[test]
    fn shared_keys_is_the_intersection() {
        let tables = [
            table(&["a", "b", "c", "d"]),
            table(&["b", "c", "d"]),
            table(&["a", "b", "d"]),
        ];
        let keys = shared_keys(tables.iter());
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("b") && keys.contains("d"));
    }

    #[test]
    fn disjoint_tables_share_nothing() {
        let tables = [table(&["a"]), table(&["b"])];
        assert!(shared_keys(tables.iter()).is_empty());
    }

    #[test]
    fn end_to_end_packaging_intersects_and_archives() {
        let work_dir = std::env::temp_dir().join("lipid_space_package_test");
        std::fs::create_dir_all(&work_dir).unwrap();

        let write = |name: &str, table: &KeyedTable| {
            let file = File::create(work_dir.join(name)).unwrap();
            write_table(file, table).unwrap();
        };
        write(files::DATABASE, &table(&["a", "b", "c"]));
        write(files::SMILES, &table(&["a", "b", "c"]));
        write(files::VECTORS_2D, &table(&["a", "c"]));
        write(files::VECTORS_3D, &table(&["a", "b", "c", "d"]));

        let summary = run(&work_dir, &work_dir, &PackageConfig::default()).unwrap();
        assert_eq!(summary.rows, 2);
        // "b" orphaned in three tables, "d" only ever in the 3D table.
        assert_eq!(summary.dropped, 4);
        assert_eq!(summary.archives.len(), 4);

        // The shipped database keeps only the shared keys, in order.
        let mut archive =
            zip::ZipArchive::new(File::open(&summary.archives[0]).unwrap()).unwrap();
        let mut payload = Vec::new();
        std::io::Read::read_to_end(&mut archive.by_index(0).unwrap(), &mut payload).unwrap();
        let shipped = read_table(Cursor::new(payload)).unwrap();
        assert_eq!(shipped.keys().collect::<Vec<_>>(), ["a", "c"]);

        std::fs::remove_dir_all(&work_dir).ok();
    }
}
