//! Reader for community meter-reading documents.
//!
//! The documents reuse the ISO 20022 pain.008 namespace as a plain data
//! container:
//!
//! ```text
//! <Document xmlns="urn:iso:std:iso:20022:tech:xsd:pain.008.001.02">
//!   <cabecera>
//!     <codcomunidad>001</codcomunidad>
//!     <comunidad>TEST COMUNIDAD</comunidad>
//!   </cabecera>
//!   <body>
//!     <propiedad>
//!       <propiedad_codigo>01</propiedad_codigo>
//!       <propiedad_nombre>BAJO DER</propiedad_nombre>
//!       <propietario_nombre>JUAN TEST</propietario_nombre>
//!       <lectura_ant>100</lectura_ant>
//!       <lectura_act>110</lectura_act>
//!       <consumo>10</consumo>
//!       <importe_total>20,50</importe_total>
//!     </propiedad>
//!   </body>
//! </Document>
//! ```

use crate::error::{Error, Result};
use crate::types::{CommunityHeader, PropertyReading};
use crate::xml_tree::{self, Element};
use crate::PAIN_008_NAMESPACE;
use std::fs;
use std::path::Path;
use tracing::{debug, error, warn};

const HEADER_TAG: &str = "cabecera";
const COMMUNITY_CODE_TAG: &str = "codcomunidad";
const COMMUNITY_NAME_TAG: &str = "comunidad";
const BODY_TAG: &str = "body";
const PROPERTY_TAG: &str = "propiedad";

const PROPERTY_CODE_TAG: &str = "propiedad_codigo";
const PROPERTY_NAME_TAG: &str = "propiedad_nombre";
const OWNER_NAME_TAG: &str = "propietario_nombre";
const READING_PREVIOUS_TAG: &str = "lectura_ant";
const READING_CURRENT_TAG: &str = "lectura_act";
const CONSUMPTION_TAG: &str = "consumo";
const TOTAL_AMOUNT_TAG: &str = "importe_total";

/// Parser for reading documents in one fixed XML namespace.
#[derive(Debug, Clone)]
pub struct XmlParser {
    namespace: String,
}

impl Default for XmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlParser {
    /// Create a parser for the pain.008 namespace.
    pub fn new() -> Self {
        Self::with_namespace(PAIN_008_NAMESPACE)
    }

    /// Create a parser that qualifies every lookup with `namespace`.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Namespace URI used for all element lookups.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Parse one file into readings.
    ///
    /// Never fails: a missing file, malformed XML or a missing header is logged
    /// and yields an empty list, which callers treat as "skip this file".
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use community_readings::pain008_format::XmlParser;
    /// use std::path::Path;
    ///
    /// let readings = XmlParser::new().parse_file(Path::new("data/input/enero.xml"));
    /// println!("{} readings", readings.len());
    /// ```
    pub fn parse_file(&self, path: &Path) -> Vec<PropertyReading> {
        match self.try_parse_file(path) {
            Ok(readings) => readings,
            Err(e @ Error::FileNotFound(_)) => {
                error!("{}", e);
                Vec::new()
            }
            Err(e) => {
                error!("Error parsing XML {}: {}", file_name(path), e);
                Vec::new()
            }
        }
    }

    /// Parse one file into readings, reporting file-level failures as errors.
    ///
    /// Per-reading conversion failures are still absorbed: the offending
    /// `propiedad` is logged and left out.
    pub fn try_parse_file(&self, path: &Path) -> Result<Vec<PropertyReading>> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;
        let xml = xml_tree::decode_document(&bytes)?;

        self.parse_str(&file_name(path), &xml)
    }

    /// Parse an in-memory document. `source_file` is stored on every reading.
    pub fn parse_str(&self, source_file: &str, xml: &str) -> Result<Vec<PropertyReading>> {
        let root = xml_tree::parse_document(xml)?;
        let ns = self.namespace.as_str();

        let header = self.parse_header(&root)?;

        let body = match root.find(ns, BODY_TAG) {
            Some(body) => body,
            None => {
                warn!("No body section found in {}", source_file);
                return Ok(Vec::new());
            }
        };

        let mut readings = Vec::new();
        for (index, property) in body.find_all(ns, PROPERTY_TAG).enumerate() {
            match self.parse_property(property, source_file, &header) {
                Ok(reading) => readings.push(reading),
                Err(e) => error!(
                    "Data conversion error in {} (property #{}): {}",
                    source_file,
                    index + 1,
                    e
                ),
            }
        }

        debug!("Parsed {} readings from {}", readings.len(), source_file);
        Ok(readings)
    }

    fn parse_header(&self, root: &Element) -> Result<CommunityHeader> {
        let ns = self.namespace.as_str();
        let header = root
            .find(ns, HEADER_TAG)
            .ok_or(Error::MissingSection(HEADER_TAG))?;

        Ok(CommunityHeader {
            code: header.child_text(ns, COMMUNITY_CODE_TAG).to_string(),
            name: header.child_text(ns, COMMUNITY_NAME_TAG).to_string(),
        })
    }

    fn parse_property(
        &self,
        property: &Element,
        source_file: &str,
        header: &CommunityHeader,
    ) -> Result<PropertyReading> {
        let ns = self.namespace.as_str();
        let text = |tag: &str| property.child_text(ns, tag).to_string();
        let integer = |tag: &'static str| parse_integer(tag, property.child_text(ns, tag));

        Ok(PropertyReading {
            source_file: source_file.to_string(),
            community_code: header.code.clone(),
            community_name: header.name.clone(),
            property_code: text(PROPERTY_CODE_TAG),
            property_name: text(PROPERTY_NAME_TAG),
            owner_name: text(OWNER_NAME_TAG),
            reading_previous: integer(READING_PREVIOUS_TAG)?,
            reading_current: integer(READING_CURRENT_TAG)?,
            consumption: integer(CONSUMPTION_TAG)?,
            total_amount: text(TOTAL_AMOUNT_TAG),
        })
    }
}

/// Convert integer field text; empty text counts as zero.
fn parse_integer(field: &'static str, value: &str) -> Result<i64> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value.parse::<i64>().map_err(|_| Error::InvalidInteger {
        field,
        value: value.to_string(),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::test_support::capture;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pain.008.001.02">
    <cabecera>
        <codcomunidad>001</codcomunidad>
        <comunidad>TEST COMUNIDAD</comunidad>
    </cabecera>
    <body>
        <propiedad>
            <propiedad_codigo>01</propiedad_codigo>
            <propiedad_nombre>BAJO DER</propiedad_nombre>
            <propietario_nombre>JUAN TEST</propietario_nombre>
            <lectura_ant>100</lectura_ant>
            <lectura_act>110</lectura_act>
            <consumo>10</consumo>
            <importe_total>20,50</importe_total>
        </propiedad>
    </body>
</Document>
"#;

    fn document(body: &str) -> String {
        format!(
            r#"<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pain.008.001.02">
<cabecera><codcomunidad>002</codcomunidad><comunidad>Comunidad Peñón</comunidad></cabecera>
{}
</Document>"#,
            body
        )
    }

    fn property(code: &str, consumption: &str) -> String {
        format!(
            "<propiedad><propiedad_codigo>{}</propiedad_codigo><consumo>{}</consumo></propiedad>",
            code, consumption
        )
    }

    #[test]
    fn test_parse_sample_document() {
        let readings = XmlParser::new().parse_str("test.xml", SAMPLE).unwrap();

        assert_eq!(
            readings,
            vec![PropertyReading {
                source_file: "test.xml".into(),
                community_code: "001".into(),
                community_name: "TEST COMUNIDAD".into(),
                property_code: "01".into(),
                property_name: "BAJO DER".into(),
                owner_name: "JUAN TEST".into(),
                reading_previous: 100,
                reading_current: 110,
                consumption: 10,
                total_amount: "20,50".into(),
            }]
        );
    }

    #[test]
    fn test_readings_keep_document_order() {
        let body = format!(
            "<body>{}{}{}</body>",
            property("A", "1"),
            property("B", "2"),
            property("C", "3")
        );
        let readings = XmlParser::new().parse_str("f.xml", &document(&body)).unwrap();

        let codes: Vec<&str> = readings.iter().map(|r| r.property_code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
        assert!(readings.iter().all(|r| r.community_name == "Comunidad Peñón"));
    }

    #[test]
    fn test_missing_fields_default() {
        let body = "<body><propiedad><propiedad_codigo>07</propiedad_codigo><lectura_act></lectura_act></propiedad></body>";
        let readings = XmlParser::new().parse_str("f.xml", &document(body)).unwrap();

        assert_eq!(readings.len(), 1);
        let reading = &readings[0];
        assert_eq!(reading.property_code, "07");
        assert_eq!(reading.property_name, "");
        assert_eq!(reading.owner_name, "");
        assert_eq!(reading.reading_previous, 0);
        assert_eq!(reading.reading_current, 0);
        assert_eq!(reading.consumption, 0);
        assert_eq!(reading.total_amount, "");
    }

    #[test]
    fn test_invalid_integer_drops_only_that_property() {
        let body = format!(
            "<body>{}{}{}</body>",
            property("A", "5"),
            property("B", "diez"),
            property("C", "7")
        );
        let readings = XmlParser::new().parse_str("f.xml", &document(&body)).unwrap();

        let codes: Vec<&str> = readings.iter().map(|r| r.property_code.as_str()).collect();
        assert_eq!(codes, vec!["A", "C"]);
    }

    #[test]
    fn test_missing_body_yields_no_readings() {
        let readings = XmlParser::new().parse_str("f.xml", &document("")).unwrap();
        assert!(readings.is_empty());
    }

    #[test]
    fn test_missing_body_logs_warning() {
        let Some((out, readings)) =
            capture("info", || XmlParser::new().parse_str("f.xml", &document("")))
        else {
            return;
        };

        assert!(readings.unwrap().is_empty());
        let line = out.lines().find(|l| l.contains("WARN")).unwrap();
        assert!(line.ends_with("No body section found in f.xml"));
    }

    #[test]
    fn test_skipped_property_logs_file_and_position() {
        let body = format!(
            "<body>{}{}{}</body>",
            property("A", "5"),
            property("B", "diez"),
            property("C", "7")
        );
        let Some((out, readings)) =
            capture("info", || XmlParser::new().parse_str("f.xml", &document(&body)))
        else {
            return;
        };

        assert_eq!(readings.unwrap().len(), 2);
        let errors: Vec<&str> = out.lines().filter(|l| l.contains("ERROR")).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Data conversion error in f.xml (property #2)"));
        assert!(errors[0].contains("diez"));
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let xml = r#"<Document xmlns="urn:iso:std:iso:20022:tech:xsd:pain.008.001.02"><body/></Document>"#;
        let result = XmlParser::new().parse_str("f.xml", xml);
        assert!(matches!(result, Err(Error::MissingSection("cabecera"))));
    }

    #[test]
    fn test_elements_outside_namespace_are_ignored() {
        let xml = r#"<Document><cabecera/><body><propiedad/></body></Document>"#;
        let result = XmlParser::new().parse_str("f.xml", xml);
        assert!(matches!(result, Err(Error::MissingSection(_))));

        let parser = XmlParser::with_namespace("urn:other");
        let readings = parser.parse_str("f.xml", SAMPLE).unwrap_or_default();
        assert!(readings.is_empty());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("consumo", "").unwrap(), 0);
        assert_eq!(parse_integer("consumo", "  42 ").unwrap(), 42);
        assert_eq!(parse_integer("consumo", "-3").unwrap(), -3);
        assert!(matches!(
            parse_integer("consumo", "1,5"),
            Err(Error::InvalidInteger { field: "consumo", .. })
        ));
    }

    #[test]
    fn test_parse_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.xml");

        assert!(XmlParser::new().parse_file(&path).is_empty());
        assert!(matches!(
            XmlParser::new().try_parse_file(&path),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_parse_file_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<Document><cabecera></Document>").unwrap();

        assert!(XmlParser::new().parse_file(file.path()).is_empty());
        assert!(matches!(
            XmlParser::new().try_parse_file(file.path()),
            Err(Error::XmlError(_))
        ));
    }

    #[test]
    fn test_parse_file_honours_declared_encoding() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n\
<Document xmlns=\"urn:iso:std:iso:20022:tech:xsd:pain.008.001.02\">\
<cabecera><codcomunidad>003</codcomunidad><comunidad>PE\xD1ON</comunidad></cabecera>\
<body><propiedad><propiedad_codigo>1\xBA A</propiedad_codigo><consumo>4</consumo></propiedad></body>\
</Document>",
        )
        .unwrap();

        let readings = XmlParser::new().try_parse_file(file.path()).unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].community_name, "PEÑON");
        assert_eq!(readings[0].property_code, "1º A");
        assert_eq!(readings[0].consumption, 4);
    }

    #[test]
    fn test_parse_file_rejects_bytes_invalid_for_encoding() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<Document><cabecera>PE\xD1ON</cabecera></Document>")
            .unwrap();

        assert!(matches!(
            XmlParser::new().try_parse_file(file.path()),
            Err(Error::XmlError(_))
        ));
    }

    #[test]
    fn test_parse_file_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marzo.xml");
        std::fs::write(&path, SAMPLE).unwrap();

        let readings = XmlParser::new().parse_file(&path);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].source_file, "marzo.xml");
    }
}
