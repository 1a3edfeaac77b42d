//! Community Readings Library
//!
//! Converts community meter-reading documents (XML in the ISO 20022 pain.008
//! namespace) into per-file CSV reports.
//!
//! # Components
//!
//! - **Parser** ([`pain008_format::XmlParser`]): one XML file to a list of
//!   [`PropertyReading`] records
//! - **Exporter** ([`csv_format::CsvExporter`]): records to a `;`-separated,
//!   BOM-prefixed CSV file
//! - **Batch** ([`batch::run_batch`]): every `*.xml` file of a directory, one
//!   report per file
//!
//! # Examples
//!
//! ## Converting a single file
//!
//! ```no_run
//! use community_readings::{CsvExporter, XmlParser};
//! use std::path::Path;
//!
//! let readings = XmlParser::new().parse_file(Path::new("data/input/enero.xml"));
//! CsvExporter::new().export(Path::new("data/output/enero.csv"), &readings);
//! ```
//!
//! ## Converting a directory
//!
//! ```no_run
//! use community_readings::batch::{run_batch, BatchConfig};
//!
//! let summary = run_batch(&BatchConfig::new("data/input", "data/output"))?;
//! println!("{} reports written", summary.files_exported);
//! # Ok::<(), community_readings::Error>(())
//! ```

pub mod batch;
pub mod csv_format;
pub mod error;
pub mod logging;
pub mod pain008_format;
pub mod types;
pub mod xml_tree;

// Re-export commonly used types
pub use csv_format::{CsvExporter, ExportStatus};
pub use error::{Error, Result};
pub use pain008_format::XmlParser;
pub use types::{CommunityHeader, PropertyReading};

/// Namespace URI of every element in a reading document.
pub const PAIN_008_NAMESPACE: &str = "urn:iso:std:iso:20022:tech:xsd:pain.008.001.02";
