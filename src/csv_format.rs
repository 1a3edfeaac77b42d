//! CSV report writer.
//!
//! Reports are written for spreadsheet tools in Spanish locales: the file
//! starts with a UTF-8 byte-order mark, fields are separated by `;` by default
//! (amounts use a decimal comma), and records end with CRLF.

use crate::error::{Error, Result};
use crate::types::PropertyReading;
use csv::{Terminator, WriterBuilder};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{error, info, warn};

/// UTF-8 byte-order mark written at the start of every report.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b';';

/// One report column: its internal name and how to read it from a reading.
#[derive(Clone, Copy)]
pub struct Column {
    /// Internal column name, e.g. `lectura_ant`.
    pub name: &'static str,
    accessor: fn(&PropertyReading) -> Cow<'_, str>,
}

impl Column {
    /// Header label, e.g. `Lectura Ant`.
    pub fn label(&self) -> String {
        header_label(self.name)
    }

    /// Cell value for `reading`.
    pub fn value<'a>(&self, reading: &'a PropertyReading) -> Cow<'a, str> {
        (self.accessor)(reading)
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column").field("name", &self.name).finish()
    }
}

/// Report columns in output order.
pub const COLUMNS: &[Column] = &[
    Column {
        name: "archivo_origen",
        accessor: |r| Cow::Borrowed(r.source_file.as_str()),
    },
    Column {
        name: "cod_comunidad",
        accessor: |r| Cow::Borrowed(r.community_code.as_str()),
    },
    Column {
        name: "nombre_comunidad",
        accessor: |r| Cow::Borrowed(r.community_name.as_str()),
    },
    Column {
        name: "propiedad_codigo",
        accessor: |r| Cow::Borrowed(r.property_code.as_str()),
    },
    Column {
        name: "propiedad_nombre",
        accessor: |r| Cow::Borrowed(r.property_name.as_str()),
    },
    Column {
        name: "propietario",
        accessor: |r| Cow::Borrowed(r.owner_name.as_str()),
    },
    Column {
        name: "lectura_ant",
        accessor: |r| Cow::Owned(r.reading_previous.to_string()),
    },
    Column {
        name: "lectura_act",
        accessor: |r| Cow::Owned(r.reading_current.to_string()),
    },
    Column {
        name: "consumo",
        accessor: |r| Cow::Owned(r.consumption.to_string()),
    },
    Column {
        name: "importe_total",
        accessor: |r| Cow::Borrowed(r.total_amount.as_str()),
    },
];

/// Outcome of [`CsvExporter::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    /// File written with this many data rows.
    Written(usize),
    /// Nothing to export; no file created.
    Skipped,
    /// Writing failed; the error was logged.
    Failed,
}

/// Writes readings to CSV reports with a fixed column layout.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    delimiter: u8,
    columns: &'static [Column],
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvExporter {
    /// Create an exporter using `;` as delimiter.
    pub fn new() -> Self {
        Self::with_delimiter(DEFAULT_DELIMITER)
    }

    /// Create an exporter with a custom delimiter.
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter,
            columns: COLUMNS,
        }
    }

    /// Field delimiter in use.
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Columns in output order.
    pub fn columns(&self) -> &'static [Column] {
        self.columns
    }

    /// Formatted header row.
    pub fn header_labels(&self) -> Vec<String> {
        self.columns.iter().map(Column::label).collect()
    }

    /// Export readings to `path`, logging the outcome instead of returning errors.
    ///
    /// An empty slice writes nothing and leaves no file behind.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use community_readings::csv_format::CsvExporter;
    /// use community_readings::pain008_format::XmlParser;
    /// use std::path::Path;
    ///
    /// let readings = XmlParser::new().parse_file(Path::new("enero.xml"));
    /// CsvExporter::new().export(Path::new("enero.csv"), &readings);
    /// ```
    pub fn export(&self, path: &Path, readings: &[PropertyReading]) -> ExportStatus {
        match self.try_export(path, readings) {
            Ok(ExportStatus::Skipped) => {
                warn!("No data to export to {}", path.display());
                ExportStatus::Skipped
            }
            Ok(status) => {
                info!(
                    "Export successful: {} ({} records)",
                    path.display(),
                    readings.len()
                );
                status
            }
            Err(e) => {
                error!("Error writing CSV {}: {}", path.display(), e);
                ExportStatus::Failed
            }
        }
    }

    /// Export readings to `path`, returning I/O and CSV errors to the caller.
    pub fn try_export(&self, path: &Path, readings: &[PropertyReading]) -> Result<ExportStatus> {
        if readings.is_empty() {
            return Ok(ExportStatus::Skipped);
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer, readings)?;
        writer.flush()?;

        Ok(ExportStatus::Written(readings.len()))
    }

    /// Write a complete report (BOM, header, rows) to any `Write` destination.
    pub fn write_to<W: Write>(&self, writer: &mut W, readings: &[PropertyReading]) -> Result<()> {
        writer.write_all(UTF8_BOM)?;

        let mut csv_writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(Terminator::CRLF)
            .from_writer(writer);

        csv_writer.write_record(self.header_labels())?;
        for reading in readings {
            csv_writer.write_record(self.columns.iter().map(|c| c.value(reading).into_owned()))?;
        }

        csv_writer
            .flush()
            .map_err(Error::from)
    }
}

/// Turn an internal column name into a header label.
///
/// Underscores become spaces and every word is title-cased:
/// `lectura_ant` becomes `Lectura Ant`.
pub fn header_label(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
