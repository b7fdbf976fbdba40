//! Format detection and whole-table load/save
//!
//! Picks the table format from the file extension. A trailing `.gz` is
//! stripped first and the stream is gzip-(de)compressed transparently.

use crate::csv_table::{self, CsvOptions};
use crate::{jsonl, Error, Result};
use custdedup_core::Table;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

/// On-disk table format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Jsonl,
}

impl TableFormat {
    /// Detect the format and compression of `path`
    ///
    /// Supported extensions:
    /// - `.csv`
    /// - `.jsonl`, `.json` (JSON Lines)
    /// - any of the above followed by `.gz`
    pub fn detect(path: &Path) -> Result<(Self, bool)> {
        let extension = extension_of(path)?;
        let (extension, gzipped) = if extension == "gz" {
            let inner = path
                .file_stem()
                .map(Path::new)
                .ok_or_else(|| Error::UnsupportedFormat("No file extension found".to_string()))?;
            (extension_of(inner)?, true)
        } else {
            (extension, false)
        };

        let format = match extension.as_str() {
            "csv" => TableFormat::Csv,
            "jsonl" | "json" => TableFormat::Jsonl,
            other => {
                return Err(Error::UnsupportedFormat(format!(
                    "Unsupported file extension: {}",
                    other
                )))
            }
        };
        Ok((format, gzipped))
    }
}

fn extension_of(path: &Path) -> Result<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| Error::UnsupportedFormat("No file extension found".to_string()))
}

/// Load a whole table, detecting the format from the extension
pub fn open_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let (format, gzipped) = TableFormat::detect(path)?;
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    info!("Opening table: {:?} (format: {:?}, gzip: {})", path, format, gzipped);

    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = if gzipped {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    match format {
        TableFormat::Csv => csv_table::read_table(reader, &CsvOptions::default()),
        TableFormat::Jsonl => jsonl::read_table(reader),
    }
}

/// Write a whole table, choosing the format from the extension
pub fn save_table<P: AsRef<Path>>(path: P, table: &Table) -> Result<()> {
    let path = path.as_ref();
    let (format, gzipped) = TableFormat::detect(path)?;

    info!(
        "Writing {} rows to {:?} (format: {:?}, gzip: {})",
        table.len(),
        path,
        format,
        gzipped
    );

    let file = BufWriter::new(File::create(path)?);
    if gzipped {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_as(&mut encoder, format, table)?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        write_as(&mut file, format, table)?;
        file.flush()?;
    }
    Ok(())
}

fn write_as<W: Write>(writer: &mut W, format: TableFormat, table: &Table) -> Result<()> {
    match format {
        TableFormat::Csv => csv_table::write_table(writer, table, &CsvOptions::default()),
        TableFormat::Jsonl => jsonl::write_table(writer, table),
    }
}
