//! Delimited-text reading and writing.
//!
//! Import is lenient: short records are padded, blank or unparsable
//! fields become missing values, and the delimiter can be sniffed from
//! the first line. Export is strict and canonical: comma delimiter,
//! `.` decimal separator, display names as the header, missing values
//! as empty fields.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};

const SNIFF_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// How to interpret a delimited text file on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvFormat {
    /// Field delimiter. `None` means sniff it from the first line.
    pub delimiter: Option<u8>,
    /// Character separating the integer and fractional parts of numbers.
    pub decimal_separator: char,
    /// Digit-grouping character to strip before parsing, if any.
    pub thousands_separator: Option<char>,
    /// Index of the record holding column names, counted after
    /// `skip_rows`. `None` means the file has no header.
    pub header_row: Option<usize>,
    /// Lines at the top of the file to ignore entirely.
    pub skip_rows: usize,
}

impl Default for CsvFormat {
    fn default() -> Self {
        CsvFormat {
            delimiter: None,
            decimal_separator: '.',
            thousands_separator: Some(','),
            header_row: None,
            skip_rows: 0,
        }
    }
}

/// The raw result of reading a delimited file: column-major values with
/// one name per column, before any table bookkeeping is attached.
#[derive(Debug)]
pub struct ParsedCsv {
    pub names: Vec<String>,
    pub columns: Vec<Vec<f64>>,
    pub num_rows: usize,
}

/// Read a delimited text file according to `format`.
///
/// Fails with [`TableError::EmptyCsv`] when no data records remain after
/// skipping and header handling.
pub fn read_csv(path: &Path, format: &CsvFormat) -> Result<ParsedCsv> {
    let mut file = File::open(path)?;
    let delimiter = match format.delimiter {
        Some(d) => d,
        None => {
            let sniffed = sniff_delimiter(&mut file)?;
            file.seek(SeekFrom::Start(0))?;
            sniffed
        }
    };

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut records = Vec::new();
    for record in reader.records().skip(format.skip_rows) {
        records.push(record?);
    }

    let mut header = None;
    if let Some(h) = format.header_row {
        if h < records.len() {
            header = Some(records[h].clone());
        }
        records.drain(..records.len().min(h + 1));
    }

    let width = records.iter().map(|r| r.len()).max().unwrap_or(0);
    if width == 0 || records.is_empty() {
        return Err(TableError::EmptyCsv);
    }

    let names = column_names(header.as_ref(), width);
    let mut columns = vec![Vec::with_capacity(records.len()); width];
    for record in &records {
        for (index, column) in columns.iter_mut().enumerate() {
            let field = record.get(index).unwrap_or("");
            column.push(parse_number(field, format));
        }
    }

    Ok(ParsedCsv {
        names,
        num_rows: records.len(),
        columns,
    })
}

/// Write columns as canonical CSV: a header of display names, then one
/// record per row, with NaN rendered as an empty field.
pub fn write_csv(
    path: &Path,
    names: &[String],
    columns: &[&[f64]],
    num_rows: usize,
) -> Result<()> {
    let mut writer = ::csv::Writer::from_path(path)?;
    writer.write_record(names)?;
    let mut record = Vec::with_capacity(columns.len());
    for row in 0..num_rows {
        record.clear();
        for column in columns {
            let value = column.get(row).copied().unwrap_or(f64::NAN);
            record.push(if value.is_nan() {
                String::new()
            } else {
                value.to_string()
            });
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Pick the candidate delimiter occurring most often in the first
/// non-empty line; comma when nothing matches.
fn sniff_delimiter(file: &mut File) -> Result<u8> {
    let mut reader = BufReader::new(file);
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(b',');
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    let best = SNIFF_CANDIDATES
        .into_iter()
        .map(|c| (c, line.bytes().filter(|b| *b == c).count()))
        .max_by_key(|(_, count)| *count)
        .filter(|(_, count)| *count > 0);
    Ok(best.map(|(c, _)| c).unwrap_or(b','))
}

fn column_names(header: Option<&::csv::StringRecord>, width: usize) -> Vec<String> {
    (0..width)
        .map(|index| {
            let from_header = header
                .and_then(|h| h.get(index))
                .map(str::trim)
                .filter(|name| !name.is_empty());
            match from_header {
                Some(name) => name.to_string(),
                None => format!("_{}", index + 1),
            }
        })
        .collect()
}

/// Parse one field as f64 under the configured separators. Blank or
/// unparsable fields become NaN rather than errors.
fn parse_number(field: &str, format: &CsvFormat) -> f64 {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    let mut cleaned = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if Some(c) == format.thousands_separator {
            continue;
        }
        if c == format.decimal_separator {
            cleaned.push('.');
        } else {
            cleaned.push(c);
        }
    }
    cleaned.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    struct Cleanup(PathBuf);

    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn write_temp(name: &str, contents: &str) -> (PathBuf, Cleanup) {
        let path = std::env::temp_dir().join(format!(
            "columna_csv_{}_{}_{name}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let cleanup = Cleanup(path.clone());
        (path, cleanup)
    }

    #[test]
    fn test_read_headerless_defaults() {
        let (path, _guard) = write_temp("plain.csv", "1,2\n3,4\n");
        let parsed = read_csv(&path, &CsvFormat::default()).unwrap();
        assert_eq!(parsed.names, vec!["_1", "_2"]);
        assert_eq!(parsed.num_rows, 2);
        assert_eq!(parsed.columns[0], vec![1.0, 3.0]);
        assert_eq!(parsed.columns[1], vec![2.0, 4.0]);
    }

    #[test]
    fn test_read_with_header_and_skip() {
        let (path, _guard) = write_temp("hdr.csv", "# exported\ntime,U\n0,1.5\n1,2.5\n");
        let format = CsvFormat {
            skip_rows: 1,
            header_row: Some(0),
            ..CsvFormat::default()
        };
        let parsed = read_csv(&path, &format).unwrap();
        assert_eq!(parsed.names, vec!["time", "U"]);
        assert_eq!(parsed.columns[1], vec![1.5, 2.5]);
    }

    #[test]
    fn test_sniffs_semicolon_delimiter() {
        let (path, _guard) = write_temp("semi.csv", "1;2;3\n4;5;6\n");
        let parsed = read_csv(&path, &CsvFormat::default()).unwrap();
        assert_eq!(parsed.columns.len(), 3);
        assert_eq!(parsed.columns[2], vec![3.0, 6.0]);
    }

    #[test]
    fn test_european_number_format() {
        let (path, _guard) = write_temp("eur.csv", "1.234,5;7,5\n2.000,0;8,25\n");
        let format = CsvFormat {
            delimiter: Some(b';'),
            decimal_separator: ',',
            thousands_separator: Some('.'),
            ..CsvFormat::default()
        };
        let parsed = read_csv(&path, &format).unwrap();
        assert_eq!(parsed.columns[0], vec![1234.5, 2000.0]);
        assert_eq!(parsed.columns[1], vec![7.5, 8.25]);
    }

    #[test]
    fn test_blank_and_text_fields_become_missing() {
        let (path, _guard) = write_temp("gaps.csv", "1,\n,x\n");
        let format = CsvFormat {
            thousands_separator: None,
            ..CsvFormat::default()
        };
        let parsed = read_csv(&path, &format).unwrap();
        assert_eq!(parsed.columns[0][0], 1.0);
        assert!(parsed.columns[1][0].is_nan());
        assert!(parsed.columns[0][1].is_nan());
        assert!(parsed.columns[1][1].is_nan());
    }

    #[test]
    fn test_short_records_are_padded() {
        let (path, _guard) = write_temp("ragged.csv", "1,2,3\n4\n");
        let parsed = read_csv(&path, &CsvFormat::default()).unwrap();
        assert_eq!(parsed.columns.len(), 3);
        assert!(parsed.columns[1][1].is_nan());
        assert!(parsed.columns[2][1].is_nan());
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let (path, _guard) = write_temp("empty.csv", "");
        assert!(matches!(
            read_csv(&path, &CsvFormat::default()),
            Err(TableError::EmptyCsv)
        ));
    }

    #[test]
    fn test_header_only_file_is_an_error() {
        let (path, _guard) = write_temp("hdronly.csv", "a,b\n");
        let format = CsvFormat {
            header_row: Some(0),
            ..CsvFormat::default()
        };
        assert!(matches!(read_csv(&path, &format), Err(TableError::EmptyCsv)));
    }

    #[test]
    fn test_write_then_read_preserves_values_and_gaps() {
        let path = std::env::temp_dir().join(format!(
            "columna_csv_out_{}.csv",
            std::process::id()
        ));
        let _guard = Cleanup(path.clone());

        let names = vec!["x".to_string(), "y".to_string()];
        let x = [0.5, f64::NAN, 2.0];
        let y = [1.0, 2.0, 3.0];
        write_csv(&path, &names, &[&x, &y], 3).unwrap();

        let format = CsvFormat {
            header_row: Some(0),
            thousands_separator: None,
            ..CsvFormat::default()
        };
        let parsed = read_csv(&path, &format).unwrap();
        assert_eq!(parsed.names, names);
        assert_eq!(parsed.columns[0][0], 0.5);
        assert!(parsed.columns[0][1].is_nan());
        assert_eq!(parsed.columns[1], vec![1.0, 2.0, 3.0]);
    }
}
