use crate::io::{error::Error, Format};
use std::io::BufRead;

/// One `$$$$`-delimited SDF record, reduced to its associated data fields.
///
/// The molfile connection table is not interpreted; the LMSD export carries
/// everything the pipeline needs (`LM_ID`, `NAME`, `SMILES`, ...) in the
/// `> <PROP>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdfEntry {
    /// Line number of the record's first line, for error reporting.
    pub line: usize,
    properties: Vec<(String, String)>,
}

impl SdfEntry {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Reads all records of an SDF stream.
///
/// A record with no data fields at all is still returned (the caller
/// decides whether that is a failure); a structurally broken stream
/// (data header without a field name, unterminated final record with
/// content) is a parse error.
pub fn read<R: BufRead>(reader: R) -> Result<Vec<SdfEntry>, Error> {
    let mut entries = Vec::new();
    let mut block: Vec<(usize, String)> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let content = line.map_err(|e| Error::Io { source: e })?;
        let ln = i + 1;
        if content.trim_end() == "$$$$" {
            entries.push(parse_block(&block)?);
            block.clear();
        } else {
            block.push((ln, content));
        }
    }

    // A trailing block without the $$$$ terminator still counts when it
    // has content (some exports omit the final delimiter).
    if block.iter().any(|(_, l)| !l.trim().is_empty()) {
        entries.push(parse_block(&block)?);
    }

    Ok(entries)
}

fn parse_block(lines: &[(usize, String)]) -> Result<SdfEntry, Error> {
    let first_line = lines.first().map(|(ln, _)| *ln).unwrap_or(1);
    let mut properties = Vec::new();

    let mut iter = lines.iter().peekable();
    while let Some((ln, line)) = iter.next() {
        if !line.starts_with('>') {
            continue;
        }
        let name = field_name(line)
            .ok_or_else(|| Error::parse(Format::Sdf, *ln, "data header without a field name"))?;

        // Field value: the lines up to the next blank line. LMSD values
        // are single-line; multi-line values are joined with newlines.
        let mut value_lines = Vec::new();
        while let Some((_, content)) = iter.peek() {
            if content.trim().is_empty() || content.starts_with('>') {
                break;
            }
            value_lines.push(iter.next().map(|(_, c)| c.trim_end()).unwrap_or(""));
        }
        properties.push((name.to_string(), value_lines.join("\n")));
    }

    Ok(SdfEntry {
        line: first_line,
        properties,
    })
}

/// Extracts the field name from a data header line, e.g. `> <LM_ID>`.
fn field_name(line: &str) -> Option<&str> {
    let open = line.find('<')?;
    let close = line[open..].find('>')? + open;
    let name = line[open + 1..close].trim();
    if name.is_empty() { None } else { Some(name) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
LMFA01010001
  LIPDMAPS

  0  0  0  0  0  0  0  0  0  0999 V2000
M  END
> <LM_ID>
LMFA01010001

> <NAME>
FA 16:0

> <SMILES>
CCCCCCCCCCCCCCCC(O)=O

$$$$
LMGP01010005
  LIPDMAPS

M  END
> <LM_ID>
LMGP01010005

> <NAME>
PC(16:0/18:1(9Z))

$$$$
";

    #[test]
    fn reads_property_blocks() {
        let entries = read(Cursor::new(SAMPLE)).expect("read sdf");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].get("LM_ID"), Some("LMFA01010001"));
        assert_eq!(entries[0].get("NAME"), Some("FA 16:0"));
        assert_eq!(entries[0].get("SMILES"), Some("CCCCCCCCCCCCCCCC(O)=O"));
        assert_eq!(entries[1].get("NAME"), Some("PC(16:0/18:1(9Z))"));
        assert_eq!(entries[1].get("SMILES"), None);
    }

    #[test]
    fn reads_trailing_block_without_delimiter() {
        let truncated = SAMPLE.trim_end().trim_end_matches("$$$$");
        let entries = read(Cursor::new(truncated)).expect("read sdf");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].get("LM_ID"), Some("LMGP01010005"));
    }

    #[test]
    fn rejects_nameless_data_header() {
        let bad = "mol\n\n\nM  END\n> <>\nvalue\n\n$$$$\n";
        assert!(read(Cursor::new(bad)).is_err());
    }

    #[test]
    fn empty_stream_yields_no_entries() {
        let entries = read(Cursor::new("")).expect("read sdf");
        assert!(entries.is_empty());
    }
}
