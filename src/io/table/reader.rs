use std::io::Read;

use crate::io::{error::Error, Format};
use crate::model::vectors::VectorTable;

use super::{KeyedTable, INDEX_COLUMN};

pub fn read_table<R: Read>(reader: R) -> Result<KeyedTable, Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    check_index_column(&headers)?;
    let columns: Vec<String> = headers.iter().skip(1).map(|h| h.to_string()).collect();

    let mut table = KeyedTable::new(columns);
    for (i, result) in csv_reader.records().enumerate() {
        let record = result?;
        let mut cells = record.iter().map(|c| c.to_string());
        let key = cells.next().unwrap_or_default();
        if !table.push(key, cells.collect()) {
            return Err(Error::parse(
                Format::Csv,
                i + 2,
                "row length does not match the header",
            ));
        }
    }

    Ok(table)
}

pub fn read_vectors<R: Read>(reader: R) -> Result<VectorTable, Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    check_index_column(&headers)?;
    let dim = headers.len() - 1;

    let mut table = VectorTable::new(dim);
    for (i, result) in csv_reader.records().enumerate() {
        let line = i + 2;
        let record = result?;
        let mut cells = record.iter();
        let key = cells
            .next()
            .ok_or_else(|| Error::parse(Format::Csv, line, "empty row"))?
            .to_string();
        let vector = cells
            .map(|c| {
                c.parse::<f32>()
                    .map_err(|_| Error::parse(Format::Csv, line, format!("invalid number '{}'", c)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !table.push(key, vector) {
            return Err(Error::parse(
                Format::Csv,
                line,
                "row length does not match the header",
            ));
        }
    }

    Ok(table)
}

fn check_index_column(headers: &csv::StringRecord) -> Result<(), Error> {
    match headers.get(0) {
        Some(INDEX_COLUMN) => Ok(()),
        _ => Err(Error::missing_column(Format::Csv, INDEX_COLUMN)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::table::writer::{vector_columns, write_table, write_vectors};
    use std::io::Cursor;

    #[test]
    fn table_round_trips_through_csv() {
        let mut table = KeyedTable::new(vec!["NAME".into(), "CATEGORY".into()]);
        table.push("LM1".into(), vec!["PC 16:0/18:1".into(), "GP".into()]);
        table.push("SLM:2".into(), vec!["TG 16:0_18:1_18:2".into(), "GL".into()]);

        let mut buf = Vec::new();
        write_table(&mut buf, &table).expect("write table");
        let read_back = read_table(Cursor::new(buf)).expect("read table");

        assert_eq!(read_back, table);
    }

    #[test]
    fn vectors_round_trip_through_csv() {
        let mut table = VectorTable::new(3);
        table.push("a".into(), vec![0.25, -1.5, 3.0e-7]);
        table.push("b".into(), vec![1.0, 2.0, 3.0]);

        let mut buf = Vec::new();
        write_vectors(&mut buf, &table, &vector_columns(3)).expect("write vectors");
        let read_back = read_vectors(Cursor::new(buf)).expect("read vectors");

        assert_eq!(read_back, table);
    }

    #[test]
    fn rejects_missing_index_column() {
        let csv = "ID,V1\na,1.0\n";
        assert!(read_vectors(Cursor::new(csv)).is_err());
    }

    #[test]
    fn rejects_non_numeric_vector_cells() {
        let csv = "INDEX,V1\na,notanumber\n";
        assert!(read_vectors(Cursor::new(csv)).is_err());
    }
}
