use crate::domain::model::Row;
use crate::utils::error::Result;
use csv::{ReaderBuilder, StringRecordsIntoIter};
use std::fs::File;
use std::path::Path;

/// Lazily yields the data records of a comma-delimited file with a header line.
///
/// The header is consumed on `open` and only its width is kept. Records are not
/// checked against that width. The file handle is closed when the source is
/// dropped, whether or not it was read to the end.
pub struct CsvRowSource {
    header_len: usize,
    records: StringRecordsIntoIter<File>,
}

impl CsvRowSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        tracing::debug!("Opened source file: {}", path.display());

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);
        let header_len = reader.headers()?.len();

        Ok(Self {
            header_len,
            records: reader.into_records(),
        })
    }

    pub fn header_len(&self) -> usize {
        self.header_len
    }
}

impl Iterator for CsvRowSource {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let fields = record.iter().map(str::to_string).collect();
        Some(Ok(Row::new(line, fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_header_is_skipped() {
        let file = csv_file("id,name\n1,alpha\n2,beta\n");

        let source = CsvRowSource::open(file.path()).unwrap();
        assert_eq!(source.header_len(), 2);

        let rows: Vec<Row> = source.map(|r| r.unwrap()).collect();
        assert_eq!(
            rows,
            vec![
                Row::new(2, vec!["1".to_string(), "alpha".to_string()]),
                Row::new(3, vec!["2".to_string(), "beta".to_string()]),
            ]
        );
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let file = csv_file("id,location\n1,\"Austin, TX\"\n");

        let rows: Vec<Row> = CsvRowSource::open(file.path())
            .unwrap()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields, vec!["1", "Austin, TX"]);
    }

    #[test]
    fn test_rows_with_wrong_width_are_passed_through() {
        let file = csv_file("a,b,c\n1,2,3\n4,5\n6,7,8,9\n");

        let widths: Vec<usize> = CsvRowSource::open(file.path())
            .unwrap()
            .map(|r| r.unwrap().len())
            .collect();

        assert_eq!(widths, vec![3, 2, 4]);
    }

    #[test]
    fn test_header_only_file_yields_nothing() {
        let file = csv_file("transaction_id,account_id\n");

        let mut source = CsvRowSource::open(file.path()).unwrap();
        assert!(source.next().is_none());
    }

    #[test]
    fn test_empty_file_yields_nothing() {
        let file = csv_file("");

        let mut source = CsvRowSource::open(file.path()).unwrap();
        assert_eq!(source.header_len(), 0);
        assert!(source.next().is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = CsvRowSource::open("/definitely/not/here/activity_data.csv");
        assert!(matches!(result, Err(EtlError::IoError(_))));
    }

    #[test]
    fn test_invalid_utf8_surfaces_as_csv_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"id,name\n1,ok\n2,\xff\xfe\n").unwrap();

        let results: Vec<Result<Row>> = CsvRowSource::open(file.path()).unwrap().collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(EtlError::CsvError(_))));
    }
}
