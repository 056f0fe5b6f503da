//! ZIP packaging of the distributable tables.
//!
//! Each artifact becomes one archive holding a single CSV entry. Payloads
//! above the size cap are split at row boundaries into numbered parts,
//! one archive per part, with the CSV header only in the first part;
//! concatenating the part payloads reproduces the unsplit table.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::io::error::Error;

/// Splits a CSV payload into parts of at most `max_bytes` each, cutting
/// only at line boundaries. The first line (the header) stays in the
/// first part. A single line longer than the cap becomes its own part
/// rather than being truncated.
pub fn split_payload(payload: &[u8], max_bytes: usize) -> Vec<Vec<u8>> {
    if payload.len() <= max_bytes {
        return vec![payload.to_vec()];
    }

    let mut parts: Vec<Vec<u8>> = Vec::new();
    let mut current: Vec<u8> = Vec::new();

    for line in lines_inclusive(payload) {
        if !current.is_empty() && current.len() + line.len() > max_bytes {
            parts.push(std::mem::take(&mut current));
        }
        current.extend_from_slice(line);
    }
    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

/// Iterates over the lines of `payload` including their `\n` terminators.
fn lines_inclusive(payload: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = payload;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let end = rest
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(rest.len());
        let (line, tail) = rest.split_at(end);
        rest = tail;
        Some(line)
    })
}

/// Writes `payload` as one or more single-entry ZIP archives under `dir`,
/// returning the archive paths in part order.
///
/// An unsplit payload yields `<stem>.zip` containing `<stem>.csv`; a split
/// one yields `<stem>_part1.zip`, `<stem>_part2.zip`, ... with matching
/// entry names.
pub fn write_archives(
    dir: &Path,
    stem: &str,
    payload: &[u8],
    max_bytes: usize,
) -> Result<Vec<PathBuf>, Error> {
    let parts = split_payload(payload, max_bytes);
    let mut paths = Vec::with_capacity(parts.len());

    for (i, part) in parts.iter().enumerate() {
        let name = if parts.len() == 1 {
            stem.to_string()
        } else {
            format!("{}_part{}", stem, i + 1)
        };
        let path = dir.join(format!("{}.zip", name));
        write_archive(&path, &format!("{}.csv", name), part)?;
        paths.push(path);
    }

    Ok(paths)
}

fn write_archive(path: &Path, entry_name: &str, payload: &[u8]) -> Result<(), Error> {
    let file = File::create(path).map_err(|e| Error::Io { source: e })?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(entry_name, options)?;
    writer.write_all(payload).map_err(|e| Error::Io { source: e })?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn payload(rows: usize) -> Vec<u8> {
        let mut out = b"INDEX,NAME\n".to_vec();
        for i in 0..rows {
            out.extend_from_slice(format!("LM{:04},PC 16:0/18:{}\n", i, i % 7).as_bytes());
        }
        out
    }

    #[test]
    fn small_payload_is_not_split() {
        let data = payload(3);
        let parts = split_payload(&data, 1 << 20);
        assert_eq!(parts, vec![data]);
    }

    #[test]
    fn parts_concatenate_to_the_original() {
        let data = payload(100);
        let parts = split_payload(&data, 256);
        assert!(parts.len() > 1);
        for part in &parts {
            assert!(part.len() <= 256);
        }

        let joined: Vec<u8> = parts.concat();
        assert_eq!(joined, data);

        // Header appears exactly once, in the first part.
        assert!(parts[0].starts_with(b"INDEX,NAME\n"));
        for part in &parts[1..] {
            assert!(!part.windows(10).any(|w| w == b"INDEX,NAME"));
        }
    }

    #[test]
    fn oversized_single_line_becomes_its_own_part() {
        let long = format!("INDEX,NAME\nLM1,{}\nLM2,x\n", "C".repeat(64));
        let parts = split_payload(long.as_bytes(), 32);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts.concat(), long.as_bytes());
    }

    #[test]
    fn archives_round_trip() {
        let dir = std::env::temp_dir().join("lipid_space_archive_test");
        std::fs::create_dir_all(&dir).unwrap();

        let data = payload(50);
        let paths = write_archives(&dir, "database", &data, 300).expect("write archives");
        assert!(paths.len() > 1);
        assert!(paths[0].file_name().unwrap().to_str().unwrap().contains("part1"));

        let mut joined = Vec::new();
        for path in &paths {
            let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
            assert_eq!(archive.len(), 1);
            let mut entry = archive.by_index(0).unwrap();
            entry.read_to_end(&mut joined).unwrap();
        }
        assert_eq!(joined, data);

        std::fs::remove_dir_all(&dir).ok();
    }
}
