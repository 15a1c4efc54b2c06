//! SBOM XML Loader
//!
//! Parses a manufacturing bill-of-materials XML export into the
//! normalized [`SbomDocument`] structure. Pure transform: no validation
//! logic lives here beyond well-formedness of the byte stream.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

use crate::config::LimitsConfig;
use crate::error::{SourceKind, VeriloomError, VeriloomResult};
use veriloom_models::{AssemblyRecord, SbomDocument, Subassembly};

/// Attribute on a subassembly element naming its parent subassembly.
const PARENT_SUB_ATTR: &str = "parentsubid";

/// XML source loader.
///
/// The whole byte stream is read into memory before parsing; no handle is
/// kept open after `parse_bytes` returns.
pub struct XmlLoader {
    max_bytes: usize,
}

impl XmlLoader {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            max_bytes: limits.max_xml_bytes,
        }
    }

    /// Parse an XML export with a root holding repeated `sbom` elements.
    ///
    /// Fails with a parse error on malformed XML or oversized input;
    /// schema is not checked beyond element and attribute presence.
    pub fn parse_bytes(&self, data: &[u8]) -> VeriloomResult<SbomDocument> {
        if data.len() > self.max_bytes {
            return Err(VeriloomError::parse(
                SourceKind::Xml,
                format!(
                    "document of {} bytes exceeds limit of {} bytes",
                    data.len(),
                    self.max_bytes
                ),
            ));
        }

        let mut reader = Reader::from_reader(data);
        reader.trim_text(true);

        let mut document = SbomDocument::new();
        let mut current: Option<AssemblyRecord> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    self.handle_element(e, &mut document, &mut current, false)?;
                }
                Event::Empty(ref e) => {
                    self.handle_element(e, &mut document, &mut current, true)?;
                }
                Event::End(ref e) => {
                    if e.name().as_ref() == b"sbom" {
                        if let Some(record) = current.take() {
                            document.records.push(record);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        // An sbom element left open is already rejected by the reader as
        // malformed XML, so a dangling record here cannot happen; still,
        // never drop parsed data silently.
        if let Some(record) = current.take() {
            document.records.push(record);
        }

        tracing::debug!(
            records = document.records.len(),
            warnings = document.parse_warnings.len(),
            "Parsed SBOM XML document"
        );

        Ok(document)
    }

    fn handle_element(
        &self,
        e: &BytesStart<'_>,
        document: &mut SbomDocument,
        current: &mut Option<AssemblyRecord>,
        self_closing: bool,
    ) -> VeriloomResult<()> {
        match e.name().as_ref() {
            b"sbom" => {
                let record = AssemblyRecord {
                    attributes: attribute_map(e)?,
                    ..Default::default()
                };
                if self_closing {
                    document.records.push(record);
                } else {
                    *current = Some(record);
                }
            }
            b"sbomsubassembly" => {
                let attributes = attribute_map(e)?;
                match current {
                    Some(record) => {
                        let parent_id = attributes.get(PARENT_SUB_ATTR).cloned();
                        record.subassemblies.push(Subassembly {
                            attributes,
                            parent_id,
                        });
                    }
                    None => document
                        .parse_warnings
                        .push("sbomsubassembly element outside an sbom record".to_string()),
                }
            }
            b"costresult" => match current {
                Some(record) => record.cost_results.push(attribute_map(e)?),
                None => document
                    .parse_warnings
                    .push("costresult element outside an sbom record".to_string()),
            },
            b"bomelement" => match current {
                Some(record) => record.bom_elements.push(attribute_map(e)?),
                None => document
                    .parse_warnings
                    .push("bomelement element outside an sbom record".to_string()),
            },
            _ => {}
        }
        Ok(())
    }
}

impl Default for XmlLoader {
    fn default() -> Self {
        Self::new(&crate::config::AppConfig::default().limits)
    }
}

/// Collect all attributes of an element into a free-form string mapping.
fn attribute_map(e: &BytesStart<'_>) -> VeriloomResult<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| VeriloomError::parse(SourceKind::Xml, err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| VeriloomError::parse(SourceKind::Xml, err.to_string()))?
            .to_string();
        map.insert(key, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<export>
        <sbom workcenterplantreference="1200" workcenterproductionareareference="PA-7" workcenter_usesinglefinalassembly="true">
            <sbomsubassembly subid="1" name="45(2) CUT" quantity="120.5" unitofmeasure="Per Length"/>
            <sbomsubassembly subid="2" parentsubid="1" name="46(1) CUT" quantity="80.0" unitofmeasure="Length"/>
            <costs>
                <costresult description="Twist 45(2), 46(1), Pitch: 10.0, Untwist A: 5.0, Untwist B: 6.0, Twist length: 100.0"/>
            </costs>
            <bomelement partnumber="PN-100"/>
        </sbom>
        <sbom plant="second"/>
    </export>"#;

    #[test]
    fn test_parses_records_and_children() {
        let doc = XmlLoader::default().parse_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.records.len(), 2);

        let first = &doc.records[0];
        assert_eq!(
            first.attributes.get("workcenterplantreference").map(String::as_str),
            Some("1200")
        );
        assert_eq!(first.subassemblies.len(), 2);
        assert_eq!(first.subassemblies[0].parent_id, None);
        assert_eq!(first.subassemblies[1].parent_id.as_deref(), Some("1"));
        // costresult nested below a wrapper element still belongs to the record
        assert_eq!(first.cost_results.len(), 1);
        assert_eq!(first.bom_elements.len(), 1);
        assert!(doc.parse_warnings.is_empty());
    }

    #[test]
    fn test_malformed_xml_is_a_parse_error() {
        let err = XmlLoader::default()
            .parse_bytes(b"<export><sbom></export>")
            .unwrap_err();
        assert_eq!(err.error_code(), "PARSE_ERROR");
    }

    #[test]
    fn test_size_limit_enforced() {
        let loader = XmlLoader::new(&LimitsConfig {
            max_xml_bytes: 8,
            max_workbook_bytes: 8,
        });
        let err = loader.parse_bytes(b"<export></export>").unwrap_err();
        assert_eq!(err.error_code(), "PARSE_ERROR");
        assert!(err.to_string().contains("exceeds limit"));
    }

    #[test]
    fn test_stray_children_become_warnings() {
        let doc = XmlLoader::default()
            .parse_bytes(b"<export><costresult description=\"orphan\"/></export>")
            .unwrap();
        assert!(doc.records.is_empty());
        assert_eq!(doc.parse_warnings.len(), 1);
    }
}
