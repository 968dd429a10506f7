//! Delimited triple-file loading — the CLI-boundary replacement for
//! dataset-specific deserialization.

use std::path::Path;

use serde::Deserialize;

use crate::error::IoError;

#[derive(Debug, Deserialize)]
struct Row {
    subject: String,
    relation: String,
    object: String,
    timestamp: Option<f64>,
}

/// Read `subject,relation,object[,timestamp]` rows (comma- or tab-delimited,
/// sniffed from the file extension) into owned triples. Header-less; column
/// order is fixed.
pub fn read_triples_csv(path: impl AsRef<Path>) -> Result<Vec<(String, String, String, Option<f64>)>, IoError> {
    let path = path.as_ref();
    let delimiter = if path.extension().is_some_and(|ext| ext == "tsv") { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IoError::CsvRead { path: path.display().to_string(), source })?;

    let mut rows = Vec::new();
    for record in reader.deserialize::<Row>() {
        let row = record.map_err(|source| IoError::CsvRead { path: path.display().to_string(), source })?;
        rows.push((row.subject, row.relation, row.object, row.timestamp));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_comma_delimited_rows_without_timestamp() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a,r,b").unwrap();
        writeln!(file, "b,r,c").unwrap();
        let rows = read_triples_csv(file.path()).unwrap();
        assert_eq!(rows, vec![
            ("a".into(), "r".into(), "b".into(), None),
            ("b".into(), "r".into(), "c".into(), None),
        ]);
    }

    #[test]
    fn reads_rows_with_timestamp() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a,r,b,1.5").unwrap();
        let rows = read_triples_csv(file.path()).unwrap();
        assert_eq!(rows, vec![("a".into(), "r".into(), "b".into(), Some(1.5))]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = read_triples_csv("/nonexistent/path/does-not-exist.csv");
        assert!(matches!(result, Err(IoError::CsvRead { .. })));
    }
}
