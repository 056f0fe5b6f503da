use std::io::Read;

use crate::io::{error::Error, Format};

/// A tab-separated table with a header row, as exported by SwissLipids.
///
/// Rows keep their source line number for error reporting. Short rows are
/// tolerated (missing trailing cells read as empty); the header must be
/// present and non-empty.
#[derive(Debug, Clone)]
pub struct TsvTable {
    headers: Vec<String>,
    rows: Vec<TsvRow>,
}

#[derive(Debug, Clone)]
pub struct TsvRow {
    pub line: usize,
    cells: Vec<String>,
}

impl TsvRow {
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

impl TsvTable {
    pub fn column(&self, name: &str) -> Result<usize, Error> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::missing_column(Format::Tsv, name))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[TsvRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn read<R: Read>(reader: R) -> Result<TsvTable, Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(Error::parse(Format::Tsv, 1, "missing header row"));
    }

    let mut rows = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let line = i + 2;
        let record = result?;
        rows.push(TsvRow {
            line,
            cells: record.iter().map(|c| c.to_string()).collect(),
        });
    }

    Ok(TsvTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "Lipid ID\tLevel\tName\tAbbreviation*\tSMILES (pH7.3)\n\
        SLM:000000002\tIsomeric subspecies\tsome name\tPC(16:0/18:1)\tCC(=O)O\n\
        SLM:000000003\tClass\tphosphatidylcholines\t\t\n";

    #[test]
    fn reads_header_and_rows() {
        let table = read(Cursor::new(SAMPLE)).expect("read tsv");
        assert_eq!(table.len(), 2);
        let id = table.column("Lipid ID").unwrap();
        let level = table.column("Level").unwrap();
        assert_eq!(table.rows()[0].cell(id), "SLM:000000002");
        assert_eq!(table.rows()[1].cell(level), "Class");
        assert_eq!(table.rows()[0].line, 2);
    }

    #[test]
    fn missing_column_is_reported() {
        let table = read(Cursor::new(SAMPLE)).expect("read tsv");
        assert!(table.column("Mass (pH7.3)").is_err());
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let table = read(Cursor::new("A\tB\tC\nx\ty\n")).expect("read tsv");
        assert_eq!(table.rows()[0].cell(2), "");
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert!(read(Cursor::new("")).is_err());
    }
}
