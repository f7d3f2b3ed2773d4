use csv::{ReaderBuilder, StringRecord};
use std::{
    collections::HashSet,
    fs::File,
    io::{Cursor, Read},
    path::PathBuf,
};
use tracing::debug;

use super::{
    error::{JobError, JobResult},
    row::Dataset,
};

/// Where a [`JobStore`](super::JobStore) gets its rows from.
///
/// Implementations parse the whole source in one go; the store calls `load`
/// at most once per successful initialization.
pub trait JobSource: Send + Sync {
    /// Human-readable name used in errors and logs.
    fn name(&self) -> String;

    fn load(&self) -> JobResult<Dataset>;
}

/// CSV file on disk, first record is the header.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl JobSource for CsvFileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> JobResult<Dataset> {
        let file = File::open(&self.path)
            .map_err(|e| JobError::source_unavailable(self.name(), format!("opening: {}", e)))?;
        read_csv(&self.name(), file)
    }
}

/// CSV text held in memory. Handy for fixtures and embedded data.
#[derive(Debug, Clone)]
pub struct CsvTextSource {
    name: String,
    text: String,
}

impl CsvTextSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl JobSource for CsvTextSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> JobResult<Dataset> {
        read_csv(&self.name, Cursor::new(self.text.as_bytes()))
    }
}

/// Parse RFC-4180 CSV from `reader` into a [`Dataset`].
///
/// Every cell stays a string. The header must not repeat a column name. A blank
/// line between records is a one-field empty record, so it becomes an empty row
/// for a one-column header and a malformed row otherwise. A record whose field
/// count differs from the header fails the whole load.
pub fn read_csv<R: Read>(source_name: &str, reader: R) -> JobResult<Dataset> {
    // Header is read as an ordinary record so its position is tracked like the rest
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let parse_err =
        |e: csv::Error| JobError::source_unavailable(source_name, format!("parsing record: {}", e));

    let mut record = StringRecord::new();
    if !rdr.read_record(&mut record).map_err(parse_err)? || record_line(&record) != 1 {
        return Err(JobError::source_unavailable(source_name, "missing header row"));
    }
    let headers: Vec<String> = record.iter().map(str::to_string).collect();
    if headers.iter().all(String::is_empty) {
        return Err(JobError::source_unavailable(source_name, "missing header row"));
    }
    {
        let mut seen: HashSet<&str> = HashSet::with_capacity(headers.len());
        if let Some(dup) = headers.iter().find(|h| !seen.insert(h.as_str())) {
            return Err(JobError::source_unavailable(
                source_name,
                format!("duplicate column {:?} in header", dup),
            ));
        }
    }

    let width = headers.len();
    let mut dataset = Dataset::new(headers);
    let mut next_line = record_line(&record) + lines_spanned(&record);
    let malformed = |line: u64, found: usize| {
        JobError::source_unavailable(
            source_name,
            format!(
                "malformed row at line {}: expected {} fields, found {}",
                line, width, found
            ),
        )
    };

    while rdr.read_record(&mut record).map_err(parse_err)? {
        let line = record_line(&record);

        // The reader skips empty lines; each one is an empty single-field record
        for blank in next_line..line {
            dataset
                .push(vec![String::new()])
                .map_err(|rejected| malformed(blank, rejected.len()))?;
        }
        next_line = line + lines_spanned(&record);

        let values: Vec<String> = record.iter().map(str::to_string).collect();
        dataset
            .push(values)
            .map_err(|rejected| malformed(line, rejected.len()))?;
    }

    if dataset.is_empty() {
        debug!(source = source_name, "job csv has a header but no rows");
    }
    debug!(
        source = source_name,
        rows = dataset.len(),
        columns = dataset.headers().len(),
        "parsed job csv"
    );
    Ok(dataset)
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

/// Physical lines taken by `record`; quoted fields may carry newlines.
fn lines_spanned(record: &StringRecord) -> u64 {
    1 + record
        .iter()
        .map(|field| field.matches('\n').count() as u64)
        .sum::<u64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_quoted_fields_and_order() {
        let csv = "name,employer,location\n\
                   \"Junior Dev\",\"Enterprise Holdings, Inc.\",St. Louis\n\
                   \"Analyst \"\"II\"\"\",Foo Corp,\"Kansas City\"\n";
        let ds = CsvTextSource::new("inline", csv).load().unwrap();
        assert_eq!(ds.headers(), ["name", "employer", "location"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.rows()[0].get("employer"),
            Some("Enterprise Holdings, Inc.")
        );
        assert_eq!(ds.rows()[1].get("name"), Some("Analyst \"II\""));
    }

    #[test]
    fn test_short_row_is_rejected() {
        let csv = "employer,skill\nFoo Corp,SQL\nBar LLC\n";
        let err = CsvTextSource::new("inline", csv).load().unwrap_err();
        match err {
            JobError::SourceUnavailable { source_name, reason } => {
                assert_eq!(source_name, "inline");
                assert!(reason.contains("expected 2 fields"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_header_is_rejected() {
        let err = CsvTextSource::new("inline", "skill,skill\nJava,SQL\n")
            .load()
            .unwrap_err();
        match err {
            JobError::SourceUnavailable { reason, .. } => {
                assert!(reason.contains("duplicate column \"skill\""), "{}", reason)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_blank_line_in_multi_column_file_is_malformed() {
        let csv = "employer,skill\nFoo,SQL\n\nBar,Java\n";
        let err = CsvTextSource::new("inline", csv).load().unwrap_err();
        match err {
            JobError::SourceUnavailable { reason, .. } => {
                assert!(reason.contains("malformed row at line 3"), "{}", reason);
                assert!(reason.contains("found 1"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_blank_line_in_single_column_file_is_empty_row() {
        let ds = CsvTextSource::new("inline", "skill\nJava\n\n\nSQL\n")
            .load()
            .unwrap();
        let skills: Vec<_> = ds.rows().iter().map(|r| r.get("skill").unwrap()).collect();
        assert_eq!(skills, vec!["Java", "", "", "SQL"]);
    }

    #[test]
    fn test_multiline_quoted_field_is_not_a_blank_line() {
        let csv = "name,description\n\"Dev\",\"line one\n\nline three\"\nQA,short\n";
        let ds = CsvTextSource::new("inline", csv).load().unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows()[0].get("description"), Some("line one\n\nline three"));
        assert_eq!(ds.rows()[1].get("name"), Some("QA"));
    }

    #[test]
    fn test_blank_line_before_header() {
        let err = CsvTextSource::new("inline", "\nemployer,skill\nFoo,SQL\n")
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("missing header row"), "{}", err);
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let ds = CsvTextSource::new("inline", "employer,skill\n").load().unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.headers(), ["employer", "skill"]);
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let err = CsvTextSource::new("empty", "").load().unwrap_err();
        assert!(matches!(err, JobError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_file_source() -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "employer,skill\nFoo Corp,SQL\n")?;
        let ds = CsvFileSource::new(tmp.path()).load()?;
        assert_eq!(ds.rows()[0].get("skill"), Some("SQL"));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let src = CsvFileSource::new("does/not/exist.csv");
        let err = src.load().unwrap_err();
        assert!(err.to_string().contains("does/not/exist.csv"));
    }
}
