use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use csv::{ReaderBuilder, StringRecord};
use flate2::read::MultiGzDecoder;

use crate::AnalysisError;

/// true if the file extension marks a gzip-compressed file
pub fn is_gzip<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// opens a file for buffered, sequential reading. gzip files are decoded
/// on the fly so that nothing beyond the read buffer is held in memory.
pub fn open_buffered(path: &Path) -> Result<Box<dyn BufRead + Send>, AnalysisError> {
    let file = File::open(path).map_err(|e| AnalysisError::SourceUnavailable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// builds a CSV reader with headers over any byte source.
pub fn csv_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(false)
        .from_reader(reader)
}

/// maps each header column name to its index.
pub fn header_lookup<R: Read>(
    reader: &mut csv::Reader<R>,
    source_name: &str,
) -> Result<HashMap<String, usize>, AnalysisError> {
    let headers = reader.headers().map_err(|e| AnalysisError::CorruptSource {
        source_name: source_name.to_string(),
        position: 0,
        message: format!("failure retrieving headers: {e}"),
    })?;
    let lookup = headers
        .iter()
        .enumerate()
        .map(|(idx, col)| (col.trim().to_string(), idx))
        .collect::<HashMap<_, _>>();
    Ok(lookup)
}

/// looks up the index of a required column.
pub fn require_column(
    lookup: &HashMap<String, usize>,
    column: &str,
    source_name: &str,
) -> Result<usize, AnalysisError> {
    lookup
        .get(column)
        .copied()
        .ok_or_else(|| AnalysisError::MissingColumn {
            source_name: source_name.to_string(),
            column: column.to_string(),
        })
}

/// parses a numeric cell. empty cells are absent values; anything else that
/// is not a number is an error for the caller to count.
pub fn parse_cell(record: &StringRecord, index: usize) -> Result<Option<f64>, String> {
    let cell = record.get(index).map(str::trim).unwrap_or_default();
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|e| format!("cannot read '{cell}' as a number: {e}"))
}

/// position of a CSV record for error messages, as a 1-based line number.
pub fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};

    #[test]
    fn test_is_gzip() {
        assert!(is_gzip("run.output_events.xml.gz"));
        assert!(!is_gzip("trip_stats.csv"));
    }

    #[test]
    fn test_open_buffered_decodes_gzip() {
        let dir = std::env::temp_dir().join(format!("dca-fs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("test invariant failed: cannot create temp dir");
        let path = dir.join("hello.txt.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello\nworld\n").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let reader = open_buffered(&path).expect("should open");
        let lines = reader.lines().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(lines, vec!["hello".to_string(), "world".to_string()]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_missing_file_is_source_unavailable() {
        let result = open_buffered(Path::new("/definitely/not/here.csv"));
        assert!(matches!(
            result,
            Err(AnalysisError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_parse_cell() {
        let record = StringRecord::from(vec!["1.5", "", "abc"]);
        assert_eq!(parse_cell(&record, 0), Ok(Some(1.5)));
        assert_eq!(parse_cell(&record, 1), Ok(None));
        assert!(parse_cell(&record, 2).is_err());
    }
}
