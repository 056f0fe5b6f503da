use std::io::Write;

use crate::io::error::Error;
use crate::model::vectors::VectorTable;

use super::{KeyedTable, INDEX_COLUMN};

pub fn write_table<W: Write>(writer: W, table: &KeyedTable) -> Result<(), Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(1 + table.columns().len());
    header.push(INDEX_COLUMN);
    header.extend(table.columns().iter().map(String::as_str));
    csv_writer.write_record(&header)?;

    for (key, cells) in table.rows() {
        let mut record = Vec::with_capacity(1 + cells.len());
        record.push(key.as_str());
        record.extend(cells.iter().map(String::as_str));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush().map_err(|e| Error::Io { source: e })?;
    Ok(())
}

/// Writes a vector table with the given value column names
/// (e.g. `V1..V100` or `TSNE1_2D, TSNE2_2D`).
pub fn write_vectors<W: Write>(
    writer: W,
    table: &VectorTable,
    columns: &[String],
) -> Result<(), Error> {
    debug_assert_eq!(columns.len(), table.dim());

    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(1 + columns.len());
    header.push(INDEX_COLUMN);
    header.extend(columns.iter().map(String::as_str));
    csv_writer.write_record(&header)?;

    for (key, vector) in table.iter() {
        let mut record = Vec::with_capacity(1 + vector.len());
        record.push(key.to_string());
        record.extend(vector.iter().map(|v| v.to_string()));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush().map_err(|e| Error::Io { source: e })?;
    Ok(())
}

/// Standard value column names for an embedding table of `dim` columns.
pub fn vector_columns(dim: usize) -> Vec<String> {
    (1..=dim).map(|i| format!("V{}", i)).collect()
}
