use crate::error::{Error, Result};
use crate::table::{Table, first_duplicate};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Cell values read as missing.
const MISSING: &[&str] = &["", "NA", "NaN", "nan", "null", "None"];

/// Written for missing cells.
pub const MISSING_MARKER: &str = "NA";

/// Delimiter and compression of a table on disk, read off its extension:
/// `.csv` is comma-separated, `.tsv`/`.txt` tab-separated, and a trailing
/// `.gz` adds gzip on top of either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFormat {
    pub delimiter: u8,
    pub gzip: bool,
}

impl TableFormat {
    pub const CSV: TableFormat = TableFormat { delimiter: b',', gzip: false };
    pub const TSV: TableFormat = TableFormat { delimiter: b'\t', gzip: false };

    pub fn detect(path: &Path) -> Result<Self> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let (inner, gzip) = match name.strip_suffix(".gz") {
            Some(inner) => (inner, true),
            None => (name, false),
        };
        let delimiter = match inner.rsplit_once('.').map(|(_, ext)| ext) {
            Some("csv") => b',',
            Some("tsv") | Some("txt") => b'\t',
            _ => {
                return Err(Error::Config(format!(
                    "cannot tell the table format of {} from its extension (.csv, .tsv or .txt, optionally .gz)",
                    path.display()
                )));
            }
        };
        Ok(TableFormat { delimiter, gzip })
    }
}

/// Header line plus string records, before any numeric interpretation.
#[derive(Debug, Clone)]
pub struct StringTable {
    pub headers: Vec<String>,
    pub records: Vec<StringRecord>,
}

impl StringTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

fn open(path: &Path) -> Result<(Box<dyn Read>, TableFormat)> {
    let format = TableFormat::detect(path)?;
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader: Box<dyn Read> = if format.gzip {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok((reader, format))
}

/// Read a delimited file with a header line.
pub fn read_string_table(path: &Path) -> Result<StringTable> {
    let (reader, format) = open(path)?;
    parse_string_table(reader, format)
}

fn parse_string_table<R: Read>(reader: R, format: TableFormat) -> Result<StringTable> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(format.delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(|s| s.trim().to_string()).collect();
    let mut records = Vec::new();
    for result in csv_reader.records() {
        records.push(result?);
    }
    Ok(StringTable { headers, records })
}

/// Read a numeric table: first column is the row index, remaining columns
/// are numeric. Missing markers become `None`.
pub fn read_numeric_table(path: &Path) -> Result<Table> {
    let (reader, format) = open(path)?;
    let raw = parse_string_table(reader, format)?;
    let table = numeric_from_strings(raw, path)?;
    debug!(
        "Read {} x {} table from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

fn numeric_from_strings(raw: StringTable, path: &Path) -> Result<Table> {
    let Some((index_name, columns)) = raw.headers.split_first() else {
        return Err(Error::Parse {
            path: path.to_path_buf(),
            line: 1,
            message: "missing header line".into(),
        });
    };
    let columns = columns.to_vec();
    if let Some(dup) = first_duplicate(&columns) {
        return Err(Error::DuplicateRow {
            what: "column",
            id: dup.to_string(),
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::with_capacity(raw.records.len());
    let mut values = Vec::with_capacity(raw.records.len());
    for record in &raw.records {
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let mut fields = record.iter();
        let id = fields.next().unwrap_or_default().trim().to_string();
        let mut row = Vec::with_capacity(columns.len());
        for (col, cell) in columns.iter().zip(fields) {
            row.push(parse_cell(cell).map_err(|message| Error::Parse {
                path: path.to_path_buf(),
                line,
                message: format!("row '{}', column '{}': {}", id, col, message),
            })?);
        }
        rows.push(id);
        values.push(row);
    }
    if let Some(dup) = first_duplicate(&rows) {
        return Err(Error::DuplicateRow {
            what: "row",
            id: dup.to_string(),
            path: path.to_path_buf(),
        });
    }

    Ok(Table {
        index_name: index_name.clone(),
        rows,
        columns,
        values,
    })
}

fn parse_cell(cell: &str) -> std::result::Result<Option<f64>, String> {
    let cell = cell.trim();
    if MISSING.contains(&cell) {
        return Ok(None);
    }
    let v: f64 = cell.parse().map_err(|_| format!("not a number: {:?}", cell))?;
    Ok(if v.is_nan() { None } else { Some(v) })
}

/// Write a table with its index column first; missing cells as `NA`.
/// Parent directories are created.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let format = TableFormat::detect(path)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let sink: Box<dyn Write> = if format.gzip {
        Box::new(GzEncoder::new(BufWriter::new(file), Compression::default()))
    } else {
        Box::new(BufWriter::new(file))
    };
    write_to(table, sink, format)?;
    debug!("Wrote {} x {} table to {}", table.n_rows(), table.n_cols(), path.display());
    Ok(())
}

fn write_to<W: Write>(table: &Table, sink: W, format: TableFormat) -> Result<()> {
    let mut w = WriterBuilder::new().delimiter(format.delimiter).from_writer(sink);

    let mut header = Vec::with_capacity(table.n_cols() + 1);
    header.push(table.index_name.as_str());
    header.extend(table.columns.iter().map(String::as_str));
    w.write_record(&header)?;

    for (id, row) in table.rows.iter().zip(&table.values) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(id.clone());
        record.extend(row.iter().map(|v| match v {
            Some(x) => x.to_string(),
            None => MISSING_MARKER.to_string(),
        }));
        w.write_record(&record)?;
    }
    w.flush().map_err(csv::Error::from)?;
    Ok(())
}
