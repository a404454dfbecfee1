use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use xmltree::{Element, EmitterConfig, XMLNode};

use super::locator::FieldLocator;
use super::mapping::MappingTable;
use crate::error::{ReplaceError, Result};

/// One substitution applied to a candidate field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub original: String,
    pub replacement: String,
}

/// What happened to a single document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub modified: bool,
    /// Applied substitutions, in traversal order
    pub replacements: Vec<Replacement>,
    /// Every trimmed candidate value found, matched or not, in traversal order
    pub candidates: Vec<String>,
}

/// Result of transforming one document. `output` is present only when `report.modified` is set.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub output: Option<Vec<u8>>,
    pub report: ChangeReport,
}

pub trait Transformer {
    fn transform(&self, doc_bytes: &[u8], mapping: &MappingTable) -> Result<Transformed>;
}

/// Rewrites candidate fields of XML documents using a mapping table
pub struct XmlTransformer {
    locator: FieldLocator,
}

impl XmlTransformer {
    pub fn new(locator: FieldLocator) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &FieldLocator {
        &self.locator
    }

    /// Substitute matching candidates in place and report what changed
    pub fn apply(&self, root: &mut Element, mapping: &MappingTable) -> ChangeReport {
        let mut report = ChangeReport::default();

        self.locator.for_each_candidate(root, &mut |element: &mut Element| {
            let current = element
                .get_text()
                .map(|text| text.trim().to_string())
                .unwrap_or_default();

            if let Some(new_value) = mapping.get(&current) {
                debug!("Replaced {} with {}", current, new_value);
                set_text(element, new_value);
                report.replacements.push(Replacement {
                    original: current.clone(),
                    replacement: new_value.to_string(),
                });
                report.modified = true;
            }
            report.candidates.push(current);
        });

        debug!("Found candidate values: {:?}", report.candidates);
        report
    }
}

impl Transformer for XmlTransformer {
    fn transform(&self, doc_bytes: &[u8], mapping: &MappingTable) -> Result<Transformed> {
        let mut root = parse_document(doc_bytes)?;
        let report = self.apply(&mut root, mapping);

        if !report.modified {
            info!(
                "No changes made ({} candidate values, none in mapping)",
                report.candidates.len()
            );
            return Ok(Transformed { output: None, report });
        }

        let output = serialize_document(&root)?;
        info!("Applied {} replacements", report.replacements.len());
        Ok(Transformed {
            output: Some(output),
            report,
        })
    }
}

pub fn parse_document(doc_bytes: &[u8]) -> Result<Element> {
    Element::parse(doc_bytes).map_err(|e| ReplaceError::Format(e.to_string()))
}

/// Serialize with an XML declaration and UTF-8 encoding
pub fn serialize_document(root: &Element) -> Result<Vec<u8>> {
    let config = EmitterConfig::new()
        .perform_indent(true)
        .write_document_declaration(true);
    let mut output = Vec::new();
    root.write_with_config(&mut output, config)
        .map_err(|e| ReplaceError::Serialization(e.to_string()))?;
    Ok(output)
}

fn is_text(node: &XMLNode) -> bool {
    matches!(node, XMLNode::Text(_) | XMLNode::CData(_))
}

/// Replace the element's text, keeping child elements and comments where they are.
fn set_text(element: &mut Element, text: &str) {
    let position = element.children.iter().position(is_text).unwrap_or(0);
    element.children.retain(|node| !is_text(node));
    let position = position.min(element.children.len());
    element
        .children
        .insert(position, XMLNode::Text(text.to_string()));
}
