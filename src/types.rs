//! Record types produced by the parser and consumed by the exporter.

/// Community identification taken from the `cabecera` section of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityHeader {
    /// Community code (`codcomunidad`).
    pub code: String,

    /// Community name (`comunidad`).
    pub name: String,
}

/// One meter reading for one property, i.e. one row of the CSV report.
///
/// Field order matches the report column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyReading {
    /// Name of the originating file (no directory part).
    pub source_file: String,

    /// Community code, repeated on every reading of a file.
    pub community_code: String,

    /// Community name, repeated on every reading of a file.
    pub community_name: String,

    /// Property identifier.
    pub property_code: String,

    /// Property label, e.g. "BAJO DER".
    pub property_name: String,

    /// Owner name.
    pub owner_name: String,

    /// Previous meter reading.
    pub reading_previous: i64,

    /// Current meter reading.
    pub reading_current: i64,

    /// Consumption for the period.
    pub consumption: i64,

    /// Total amount exactly as written in the source, e.g. "36,55".
    pub total_amount: String,
}
