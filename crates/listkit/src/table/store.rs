use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ListkitError, TableError};
use crate::storage::OutputStorage;

use super::record::{Record, Table};
use super::schema::TableSchema;

const TABLE_EXTENSION: &str = "csv";

/// Reads a CSV file with a header row into a [`Table`].
///
/// Short rows (common after spreadsheet edits) are padded with empty
/// values; cells beyond the header are ignored.
pub fn read_table(path: &Path) -> Result<Table, TableError> {
    let file = std::fs::File::open(path).map_err(|e| TableError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let parse_err = |source: csv::Error| TableError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut table = Table::new(headers);
    for result in reader.records() {
        let raw = result.map_err(parse_err)?;
        let record: Record = table
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.as_str(), raw.get(i).unwrap_or("")))
            .collect();
        table.rows.push(record);
    }

    debug!(
        rows = table.rows.len(),
        columns = table.headers.len(),
        "Loaded table"
    );
    Ok(table)
}

/// Reads a table and validates it against `schema`.
pub fn load_table(path: &Path, schema: &TableSchema) -> Result<Table, TableError> {
    let table = read_table(path)?;
    schema.validate(path, &table)?;
    Ok(table)
}

/// Writes `headers` then every row's values in header order.
///
/// Fields a row lacks are written empty, so the header is always complete
/// regardless of which columns are populated.
pub fn write_table<W: Write>(
    writer: W,
    headers: &[String],
    rows: &[Record],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(headers)?;
    for row in rows {
        csv_writer.write_record(headers.iter().map(|h| row.get(h).unwrap_or("")))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the table to the first free `base[N].csv` in `storage`.
///
/// A failed write removes the file again, so no partial table is left
/// behind and the numbered name stays free.
pub fn write_table_numbered(
    storage: &OutputStorage,
    base: &str,
    headers: &[String],
    rows: &[Record],
) -> Result<PathBuf, ListkitError> {
    write_numbered_with(storage, base, headers, rows, std::io::BufWriter::new)
}

fn write_numbered_with<W: Write>(
    storage: &OutputStorage,
    base: &str,
    headers: &[String],
    rows: &[Record],
    wrap: impl FnOnce(File) -> W,
) -> Result<PathBuf, ListkitError> {
    let (path, file) = storage.create_numbered(base, TABLE_EXTENSION)?;
    if let Err(e) = write_table(wrap(file), headers, rows) {
        if let Err(remove) = std::fs::remove_file(&path) {
            warn!(path = %path.display(), error = %remove, "Failed to remove partial table");
        }
        return Err(TableError::Write { path, source: e }.into());
    }
    Ok(path)
}
