//! Directory-to-directory batch conversion.
//!
//! Every `*.xml` file in the input directory is parsed and exported to a CSV
//! file with the same stem in the output directory. Files are handled one at a
//! time and a failure in one file never affects another.

use crate::csv_format::{CsvExporter, ExportStatus, DEFAULT_DELIMITER};
use crate::error::{Error, Result};
use crate::pain008_format::XmlParser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};
use walkdir::WalkDir;

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory scanned for `.xml` files.
    pub input_dir: PathBuf,

    /// Directory receiving the CSV reports; created when missing.
    pub output_dir: PathBuf,

    /// CSV field delimiter.
    pub delimiter: u8,
}

impl BatchConfig {
    /// Create a configuration with the default `;` delimiter.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Counters for a finished batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// `.xml` files found in the input directory.
    pub files_found: usize,

    /// Files that produced a CSV report.
    pub files_exported: usize,

    /// Files without readings or whose report could not be written.
    pub files_skipped: usize,

    /// Data rows written across all reports.
    pub records_written: usize,
}

/// Convert every XML file in `config.input_dir`.
///
/// Only a missing input directory or an output directory that cannot be
/// created is reported as an error. Everything else is logged and skipped.
pub fn run_batch(config: &BatchConfig) -> Result<BatchSummary> {
    if !config.input_dir.is_dir() {
        return Err(Error::InputDirNotFound(config.input_dir.clone()));
    }

    fs::create_dir_all(&config.output_dir)?;

    let xml_files = find_xml_files(&config.input_dir);
    let mut summary = BatchSummary {
        files_found: xml_files.len(),
        ..BatchSummary::default()
    };

    if xml_files.is_empty() {
        warn!("No XML files found in {}", config.input_dir.display());
        return Ok(summary);
    }

    info!("Starting processing of {} files...", xml_files.len());

    let parser = XmlParser::new();
    let exporter = CsvExporter::with_delimiter(config.delimiter);

    for xml_file in &xml_files {
        let file_name = xml_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let _span = info_span!("file", name = %file_name).entered();

        let readings = parser.parse_file(xml_file);
        if readings.is_empty() {
            warn!("Skipping {} (no data or read error)", file_name);
            summary.files_skipped += 1;
            continue;
        }

        let output_path = output_path_for(xml_file, &config.output_dir);
        match exporter.export(&output_path, &readings) {
            ExportStatus::Written(rows) => {
                summary.files_exported += 1;
                summary.records_written += rows;
            }
            ExportStatus::Skipped | ExportStatus::Failed => summary.files_skipped += 1,
        }
    }

    info!(
        "Batch finished: {} exported, {} skipped, {} records written",
        summary.files_exported, summary.files_skipped, summary.records_written
    );
    Ok(summary)
}

/// List `*.xml` files directly inside `dir`, sorted by file name.
///
/// Never fails: entries that cannot be inspected are logged, and `*.xml`
/// ones among them are still listed so the per-file step can skip them.
pub fn find_xml_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && has_xml_extension(path) {
                    files.push(path.to_path_buf());
                }
            }
            // Dangling links and unreadable entries are handed to the parser,
            // which reports and skips them like any other unreadable file.
            Err(e) => match e.path() {
                Some(path) if has_xml_extension(path) => {
                    warn!("Cannot inspect {}: {}", path.display(), e);
                    files.push(path.to_path_buf());
                }
                _ => warn!("Ignoring directory entry in {}: {}", dir.display(), e),
            },
        }
    }

    debug!("Found {} XML files in {}", files.len(), dir.display());
    files
}

fn has_xml_extension(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("xml")
}

/// Report path for `xml_file`: same stem, `.csv` extension, inside `output_dir`.
pub fn output_path_for(xml_file: &Path, output_dir: &Path) -> PathBuf {
    let mut name = xml_file.file_stem().unwrap_or_default().to_os_string();
    name.push(".csv");
    output_dir.join(name)
}
