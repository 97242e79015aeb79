//! Comma-separated load/save for tables.
//!
//! The format is one header line followed by one line per row. With quoting
//! disabled (the default) fields are split on the delimiter and nothing is
//! escaped, so a field containing the delimiter does not survive a round
//! trip. Line breaks cannot be stored at all without quoting, so saving a
//! field that contains one fails. Enabling quoting switches to RFC 4180
//! quoting on both read and write.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{Result, Row, Table, TableError};

/// Delimiter and quoting used by the CSV reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field separator, a single ASCII byte.
    pub delimiter: char,
    /// Honour and emit `"` quoting.
    pub quoting: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quoting: false,
        }
    }
}

impl CsvOptions {
    fn delimiter_byte(&self) -> u8 {
        // Validated as ASCII when the configuration is loaded.
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }

    fn reader<R: Read>(&self, source: R) -> ::csv::Reader<R> {
        ::csv::ReaderBuilder::new()
            .delimiter(self.delimiter_byte())
            .quoting(self.quoting)
            .has_headers(false)
            .flexible(true)
            .from_reader(source)
    }

    fn writer<W: Write>(&self, sink: W) -> ::csv::Writer<W> {
        let style = if self.quoting {
            ::csv::QuoteStyle::Necessary
        } else {
            ::csv::QuoteStyle::Never
        };
        ::csv::WriterBuilder::new()
            .delimiter(self.delimiter_byte())
            .quote_style(style)
            .flexible(true)
            .from_writer(sink)
    }

    /// Fields of a parsed record.
    ///
    /// Without quoting the writer still emits `""` for a record holding a
    /// single empty field, so that record reads back as one empty field.
    fn fields(&self, record: &::csv::StringRecord) -> Row {
        if !self.quoting && record.len() == 1 && &record[0] == "\"\"" {
            return vec![String::new()];
        }
        record.iter().map(str::to_string).collect()
    }

    /// Check that every field can be written and read back.
    fn check_writable(&self, headers: &[String], rows: &[Row]) -> Result<()> {
        if self.quoting {
            return Ok(());
        }
        let lines = std::iter::once(headers).chain(rows.iter().map(Vec::as_slice));
        for (line, fields) in (1u64..).zip(lines) {
            if let Some(column) = fields.iter().position(|f| f.contains(['\n', '\r'])) {
                return Err(TableError::LineBreakInField { line, column });
            }
        }
        Ok(())
    }
}

impl Table {
    /// Parse a table from a CSV source.
    ///
    /// The first non-empty line holds the headers. Every following line must
    /// have exactly one field per header; a single trailing empty field (as
    /// left by a trailing delimiter) is tolerated and dropped.
    ///
    /// # Errors
    ///
    /// - `TableError::MissingHeader` if the source has no lines
    /// - `TableError::MalformedLine` if a line has the wrong field count
    /// - `TableError::Csv` on read or UTF-8 failures
    ///
    /// Files written by the legacy search export have no header line, so
    /// their first match is taken as the headers.
    pub fn from_csv<R: Read>(source: R, options: &CsvOptions) -> Result<Table> {
        let mut reader = options.reader(source);
        let mut records = reader.records();

        let headers: Vec<String> = match records.next() {
            Some(record) => options.fields(&record?),
            None => return Err(TableError::MissingHeader),
        };
        let width = headers.len();

        let mut rows: Vec<Row> = Vec::new();
        for record in records {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let mut row = options.fields(&record);

            if row.len() == width + 1 && row.last().is_some_and(|f| f.is_empty()) {
                warn!(line, "Dropping trailing delimiter");
                row.pop();
            }
            if row.len() != width {
                return Err(TableError::MalformedLine {
                    line,
                    expected: width,
                    found: row.len(),
                });
            }
            rows.push(row);
        }

        debug!(columns = width, rows = rows.len(), "Parsed CSV");
        Table::with_rows(headers, rows)
    }

    /// Replace this table's headers and rows with the contents of `source`.
    ///
    /// On error the table is left untouched.
    pub fn load_csv<R: Read>(&mut self, source: R, options: &CsvOptions) -> Result<()> {
        let loaded = Table::from_csv(source, options)?;
        self.replace(loaded);
        Ok(())
    }

    /// Write the header line and every row to `sink`.
    pub fn save_csv<W: Write>(&self, sink: W, options: &CsvOptions) -> Result<()> {
        save_rows(self.headers(), self.rows(), sink, options)
    }

    /// Load a table from a file.
    pub fn open(path: &Path, options: &CsvOptions) -> Result<Table> {
        let file = File::open(path)?;
        let table = Table::from_csv(file, options)?;
        info!(path = %path.display(), rows = table.len(), "Loaded table");
        Ok(table)
    }

    /// Replace this table with the contents of a file.
    pub fn load_path(&mut self, path: &Path, options: &CsvOptions) -> Result<()> {
        let loaded = Table::open(path, options)?;
        self.replace(loaded);
        Ok(())
    }

    /// Save this table to a file, replacing it atomically.
    pub fn save_path(&self, path: &Path, options: &CsvOptions) -> Result<()> {
        save_rows_to_path(path, self.headers(), self.rows(), options)?;
        info!(path = %path.display(), rows = self.len(), "Saved table");
        Ok(())
    }
}

/// Write a header line followed by `rows` to `sink`.
///
/// Fields are joined with the delimiter; no delimiter trails a line.
///
/// # Errors
///
/// Returns `TableError::LineBreakInField` before anything is written if
/// quoting is off and a field contains `\n` or `\r`.
pub fn save_rows<W: Write>(
    headers: &[String],
    rows: &[Row],
    sink: W,
    options: &CsvOptions,
) -> Result<()> {
    options.check_writable(headers, rows)?;
    let mut writer = options.writer(sink);
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `rows` to `path` through a temporary file in the same directory.
///
/// The target is only replaced once everything has been written, so a
/// failed save leaves any previous file intact. An existing target keeps
/// its permissions.
pub fn save_rows_to_path(
    path: &Path,
    headers: &[String],
    rows: &[Row],
    options: &CsvOptions,
) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    save_rows(headers, rows, tmp.as_file_mut(), options)?;
    tmp.as_file().sync_all()?;
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.persist(path).map_err(|e| TableError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(fields: &[&str]) -> Row {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn students() -> Table {
        let mut table = Table::new(["Reg No", "Name", "Course"]);
        table.insert(row(&["A1", "Alice", "CS"])).unwrap();
        table.insert(row(&["A2", "Bob", "EE"])).unwrap();
        table
    }

    fn to_string(table: &Table, options: &CsvOptions) -> String {
        let mut out = Vec::new();
        table.save_csv(&mut out, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_save_has_no_trailing_delimiter() {
        let text = to_string(&students(), &CsvOptions::default());
        assert_eq!(text, "Reg No,Name,Course\nA1,Alice,CS\nA2,Bob,EE\n");
    }

    #[test]
    fn test_load_parses_headers_and_rows() {
        let source = "id,name\n1,one\n2,two\n";
        let table = Table::from_csv(source.as_bytes(), &CsvOptions::default()).unwrap();

        assert_eq!(table.headers(), ["id", "name"]);
        assert_eq!(table.rows(), [row(&["1", "one"]), row(&["2", "two"])]);
    }

    #[test]
    fn test_round_trip() {
        let original = students();
        let options = CsvOptions::default();
        let text = to_string(&original, &options);

        let loaded = Table::from_csv(text.as_bytes(), &options).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_replaces_existing_table() {
        let mut table = students();
        table
            .load_csv("x,y\n1,2\n".as_bytes(), &CsvOptions::default())
            .unwrap();

        assert_eq!(table.headers(), ["x", "y"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_failed_load_keeps_table() {
        let mut table = students();
        let err = table
            .load_csv("x,y\n1,2\n3\n".as_bytes(), &CsvOptions::default())
            .unwrap_err();

        assert!(matches!(
            err,
            TableError::MalformedLine {
                line: 3,
                expected: 2,
                found: 1
            }
        ));
        assert_eq!(table, students());
    }

    #[test]
    fn test_empty_source() {
        let err = Table::from_csv("".as_bytes(), &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, TableError::MissingHeader));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table =
            Table::from_csv("a,b\n\n1,2\n\n".as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_trailing_delimiter_tolerated() {
        let table =
            Table::from_csv("a,b\n1,2,\n3,4\n".as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(table.rows(), [row(&["1", "2"]), row(&["3", "4"])]);
    }

    #[test]
    fn test_embedded_comma_without_quoting() {
        let mut table = Table::new(["name", "city"]);
        table.insert(row(&["Doe, Jane", "Oslo"])).unwrap();
        let options = CsvOptions::default();

        let text = to_string(&table, &options);
        assert_eq!(text, "name,city\nDoe, Jane,Oslo\n");
        assert!(Table::from_csv(text.as_bytes(), &options).is_err());
    }

    #[test]
    fn test_quotes_are_literal_without_quoting() {
        let table =
            Table::from_csv("a\n\"x\"\n".as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(table.rows()[0][0], "\"x\"");
    }

    #[test]
    fn test_embedded_comma_with_quoting() {
        let mut table = Table::new(["name", "city"]);
        table.insert(row(&["Doe, Jane", "Oslo"])).unwrap();
        let options = CsvOptions {
            quoting: true,
            ..CsvOptions::default()
        };

        let text = to_string(&table, &options);
        assert_eq!(text, "name,city\n\"Doe, Jane\",Oslo\n");
        assert_eq!(Table::from_csv(text.as_bytes(), &options).unwrap(), table);
    }

    #[test]
    fn test_custom_delimiter() {
        let options = CsvOptions {
            delimiter: ';',
            ..CsvOptions::default()
        };
        let table = Table::from_csv("a;b\n1;2\n".as_bytes(), &options).unwrap();
        assert_eq!(table.rows()[0], row(&["1", "2"]));
        assert_eq!(to_string(&table, &options), "a;b\n1;2\n");
    }

    #[test]
    fn test_save_rows_subset() {
        let table = students();
        let mut out = Vec::new();
        save_rows(table.headers(), &table.rows()[1..], &mut out, &CsvOptions::default())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Reg No,Name,Course\nA2,Bob,EE\n");
    }

    #[test]
    fn test_path_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("students.csv");
        let options = CsvOptions::default();

        students().save_path(&path, &options).unwrap();
        let loaded = Table::open(&path, &options).unwrap();
        assert_eq!(loaded, students());

        let mut other = Table::new(["x"]);
        other.load_path(&path, &options).unwrap();
        assert_eq!(other, students());
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content that is longer than the new file\n").unwrap();

        let table = Table::new(["a"]);
        table.save_path(&path, &CsvOptions::default()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_single_empty_field_round_trip() {
        let mut table = Table::new(["note"]);
        for note in ["a", "", "b"] {
            table.insert(row(&[note])).unwrap();
        }
        let options = CsvOptions::default();

        let text = to_string(&table, &options);
        assert_eq!(text, "note\na\n\"\"\nb\n");
        assert_eq!(Table::from_csv(text.as_bytes(), &options).unwrap(), table);
    }

    #[test]
    fn test_single_empty_field_round_trip_with_quoting() {
        let mut table = Table::new(["note"]);
        table.insert(row(&[""])).unwrap();
        let options = CsvOptions {
            quoting: true,
            ..CsvOptions::default()
        };

        let text = to_string(&table, &options);
        assert_eq!(Table::from_csv(text.as_bytes(), &options).unwrap(), table);
    }

    #[test]
    fn test_line_break_rejected_without_quoting() {
        let mut table = Table::new(["a", "b"]);
        table.insert(row(&["x\ny", "z"])).unwrap();

        let mut out = Vec::new();
        let err = table.save_csv(&mut out, &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, TableError::LineBreakInField { line: 2, column: 0 }));
        assert!(out.is_empty());

        let mut table = Table::new(["a", "b\r"]);
        table.insert(row(&["1", "2"])).unwrap();
        let err = table.save_csv(Vec::new(), &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, TableError::LineBreakInField { line: 1, column: 1 }));
    }

    #[test]
    fn test_line_break_round_trip_with_quoting() {
        let mut table = Table::new(["a", "b"]);
        table.insert(row(&["x\ny", "z"])).unwrap();
        let options = CsvOptions {
            quoting: true,
            ..CsvOptions::default()
        };

        let text = to_string(&table, &options);
        assert_eq!(Table::from_csv(text.as_bytes(), &options).unwrap(), table);
    }

    #[test]
    fn test_save_into_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("x.csv");

        let err = students().save_path(&path, &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_save_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("students.csv");
        std::fs::write(&path, "Reg No,Name,Course\nA1,Alice,CS\n").unwrap();

        let headers = students().headers().to_vec();
        let rows = vec![row(&["A2", "Bob\nby", "EE"])];
        let err = save_rows_to_path(&path, &headers, &rows, &CsvOptions::default()).unwrap_err();

        assert!(matches!(err, TableError::LineBreakInField { .. }));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Reg No,Name,Course\nA1,Alice,CS\n"
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.csv");
        std::fs::write(&path, "a\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        students().save_path(&path, &CsvOptions::default()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_headerless_export_is_not_a_table() {
        // Legacy search exports: no header line, trailing comma on every line.
        let table =
            Table::from_csv("A1,Alice,CS,\nA2,Bob,EE,\n".as_bytes(), &CsvOptions::default())
                .unwrap();
        assert_eq!(table.headers(), ["A1", "Alice", "CS", ""]);
        assert_eq!(table.rows(), [row(&["A2", "Bob", "EE", ""])]);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let err = Table::open(&dir.path().join("missing.csv"), &CsvOptions::default())
            .unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
    }
}
