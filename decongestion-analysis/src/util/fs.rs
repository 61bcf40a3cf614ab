use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use csv::QuoteStyle;
use decongestion_analysis_core::util::fs::is_gzip;
use flate2::{write::GzEncoder, Compression};
use kdam::tqdm;
use serde::Serialize;

use crate::app::AppError;

/// helper function to "mkdir -p path" - make all directories along a path
pub fn create_dirs<P>(path: P) -> Result<(), AppError>
where
    P: AsRef<Path>,
{
    let dirspath = path.as_ref();
    if !dirspath.is_dir() {
        std::fs::create_dir_all(dirspath).map_err(|e| {
            let msg = format!(
                "error building output directory '{}': {e}",
                dirspath.to_str().unwrap_or_default()
            );
            AppError::InvalidUserInput(msg)
        })
    } else {
        Ok(())
    }
}

/// writes a header and rows of already formatted cells to a CSV file in the
/// output directory. returns the path written, or None if the file exists
/// and overwriting is disabled.
pub fn write_rows<I>(
    rows: I,
    header: &[String],
    filename: &str,
    output_directory: &Path,
    overwrite: bool,
    desc: &str,
) -> Result<Option<PathBuf>, AppError>
where
    I: IntoIterator<Item = Vec<String>>,
    I::IntoIter: ExactSizeIterator,
{
    let mut writer = match create_writer(output_directory, filename, overwrite)? {
        Some(writer) => writer,
        None => return Ok(None),
    };
    writer
        .write_record(header)
        .map_err(|e| AppError::CsvWriteError(format!("Failed to write to {filename}: {e}")))?;
    let iter = rows.into_iter();
    let total = iter.len();
    let bar_iter = tqdm!(iter, total = total, desc = desc);
    for row in bar_iter {
        writer
            .write_record(&row)
            .map_err(|e| AppError::CsvWriteError(format!("Failed to write to {filename}: {e}")))?;
    }
    eprintln!();
    writer
        .flush()
        .map_err(|e| AppError::CsvWriteError(format!("Failed to flush {filename}: {e}")))?;
    Ok(Some(output_directory.join(filename)))
}

/// serializes records with a derived header to a CSV file in the output
/// directory.
pub fn serialize_into_csv<I>(
    iterable: I,
    filename: &str,
    output_directory: &Path,
    overwrite: bool,
    desc: &str,
) -> Result<Option<PathBuf>, AppError>
where
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
    I::Item: Serialize,
{
    let mut writer = match create_writer(output_directory, filename, overwrite)? {
        Some(writer) => writer,
        None => return Ok(None),
    };
    let iter = iterable.into_iter();
    let total = iter.len();
    let bar_iter = tqdm!(iter, total = total, desc = desc);
    for element in bar_iter {
        writer
            .serialize(element)
            .map_err(|e| AppError::CsvWriteError(format!("Failed to write to {filename}: {e}")))?;
    }
    eprintln!();
    writer
        .flush()
        .map_err(|e| AppError::CsvWriteError(format!("Failed to flush {filename}: {e}")))?;
    Ok(Some(output_directory.join(filename)))
}

/// writes a JSON document to the output directory.
pub fn write_json<T: Serialize>(
    value: &T,
    filename: &str,
    output_directory: &Path,
    overwrite: bool,
) -> Result<Option<PathBuf>, AppError> {
    let filepath = output_directory.join(filename);
    if filepath.exists() && !overwrite {
        log::warn!("not overwriting existing file {}", filepath.to_string_lossy());
        return Ok(None);
    }
    let file = File::create(&filepath).map_err(|e| AppError::WriteError {
        path: filepath.clone(),
        message: e.to_string(),
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|e| {
        AppError::WriteError {
            path: filepath.clone(),
            message: e.to_string(),
        }
    })?;
    Ok(Some(filepath))
}

/// helper function to build a file writer for either .csv or .csv.gz files
/// while respecting the user's overwrite preferences.
fn create_writer(
    directory: &Path,
    filename: &str,
    overwrite: bool,
) -> Result<Option<csv::Writer<Box<dyn Write>>>, AppError> {
    let filepath = directory.join(filename);
    if filepath.exists() && !overwrite {
        log::warn!("not overwriting existing file {}", filepath.to_string_lossy());
        return Ok(None);
    }
    let file = File::create(&filepath).map_err(|e| AppError::WriteError {
        path: filepath.clone(),
        message: e.to_string(),
    })?;
    let buffer: Box<dyn Write> = if is_gzip(&filepath) {
        Box::new(GzEncoder::new(file, Compression::default()))
    } else {
        Box::new(BufWriter::new(file))
    };
    let writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(buffer);
    Ok(Some(writer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_rows_respects_overwrite() {
        let dir = std::env::temp_dir().join(format!("dca-write-{}", std::process::id()));
        create_dirs(&dir).unwrap();
        let header = vec![String::from("mode"), String::from("basecase")];
        let rows = vec![vec![String::from("car"), String::from("1.5")]];
        let written = write_rows(rows.clone(), &header, "t.csv", &dir, true, "test")
            .unwrap()
            .expect("file should be written");
        let contents = std::fs::read_to_string(&written).unwrap();
        assert_eq!(contents, "mode,basecase\ncar,1.5\n");

        let skipped = write_rows(rows, &header, "t.csv", &dir, false, "test").unwrap();
        assert!(skipped.is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
