use std::io::Read;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use super::ingestion::InputDocument;
use super::processing::locator::FieldLocator;
use super::processing::mapping::MappingTable;
use super::processing::transform::{ChangeReport, Transformer, XmlTransformer};
use super::storage::ArtifactSink;
use crate::error::{ReplaceError, Result};

/// Why a single document failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub kind: String,
    pub message: String,
}

impl From<&ReplaceError> for DocumentFailure {
    fn from(e: &ReplaceError) -> Self {
        Self {
            kind: e.kind().to_string(),
            message: e.to_string(),
        }
    }
}

/// Exactly one outcome per input document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Serialized { report: ChangeReport, artifact: String },
    Skipped { report: ChangeReport },
    Failed { error: DocumentFailure },
}

impl DocumentOutcome {
    pub fn report(&self) -> Option<&ChangeReport> {
        match self {
            Self::Serialized { report, .. } | Self::Skipped { report } => Some(report),
            Self::Failed { .. } => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Serialized { .. } => "serialized",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentEntry {
    pub name: String,
    pub outcome: DocumentOutcome,
}

/// Result of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub locator: FieldLocator,
    pub mapping_keys: usize,
    pub documents: Vec<DocumentEntry>,
}

impl RunSummary {
    fn count(&self, label: &str) -> usize {
        self.documents
            .iter()
            .filter(|d| d.outcome.label() == label)
            .count()
    }

    pub fn serialized(&self) -> usize {
        self.count("serialized")
    }

    pub fn skipped(&self) -> usize {
        self.count("skipped")
    }

    pub fn failed(&self) -> usize {
        self.count("failed")
    }

    pub fn total_replacements(&self) -> usize {
        self.documents
            .iter()
            .filter_map(|d| d.outcome.report())
            .map(|r| r.replacements.len())
            .sum()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Builds the mapping once, then rewrites each document of a batch in order
pub struct Pipeline {
    mapping: MappingTable,
    transformer: XmlTransformer,
    prefix: String,
}

impl Pipeline {
    pub fn new(mapping: MappingTable, locator: FieldLocator) -> Self {
        Self {
            mapping,
            transformer: XmlTransformer::new(locator),
            prefix: String::new(),
        }
    }

    /// Fails with a schema or parse error before any document is touched
    pub fn from_csv_reader<R: Read>(reader: R, locator: FieldLocator) -> Result<Self> {
        Ok(Self::new(MappingTable::from_csv_reader(reader)?, locator))
    }

    pub fn from_csv_path(path: &Path, locator: FieldLocator) -> Result<Self> {
        Ok(Self::new(MappingTable::from_csv_path(path)?, locator))
    }

    /// Prefix prepended to the file name of every artifact
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn mapping(&self) -> &MappingTable {
        &self.mapping
    }

    pub fn artifact_name(&self, document_name: &str) -> String {
        format!("{}{}", self.prefix, document_name)
    }

    /// Fails with a config error when writing into `output_dir` would replace
    /// one of the batch's own input files
    pub fn ensure_inputs_preserved(&self, documents: &[InputDocument], output_dir: &Path) -> Result<()> {
        for document in documents {
            let Some(input) = document.path() else {
                continue;
            };
            let target = output_dir.join(self.artifact_name(&document.name));
            // A target that does not exist yet cannot be an input file
            let (Ok(input), Ok(target)) = (std::fs::canonicalize(input), std::fs::canonicalize(&target)) else {
                continue;
            };
            if input == target {
                return Err(ReplaceError::Config(format!(
                    "output {} would overwrite input file {}; use another output directory or a prefix",
                    target.display(),
                    input.display()
                )));
            }
        }
        Ok(())
    }

    /// Process one document. Errors are scoped to the document and returned as `Failed`.
    pub fn process_document(&self, document: &InputDocument, sink: &dyn ArtifactSink) -> DocumentOutcome {
        let span = tracing::info_span!("document", name = %document.name);
        let _enter = span.enter();

        info!("Processing file: {}", document.name);
        let outcome = match self.try_process(document, sink) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error processing file {}: {}", document.name, e);
                DocumentOutcome::Failed {
                    error: DocumentFailure::from(&e),
                }
            }
        };

        counter!("post_id_documents_total", "outcome" => outcome.label()).increment(1);
        if let Some(report) = outcome.report() {
            counter!("post_id_replacements_total").increment(report.replacements.len() as u64);
        }
        outcome
    }

    fn try_process(&self, document: &InputDocument, sink: &dyn ArtifactSink) -> Result<DocumentOutcome> {
        let bytes = document.read()?;
        let transformed = self.transformer.transform(&bytes, &self.mapping)?;

        match transformed.output {
            Some(output) => {
                let artifact = sink.store(&self.artifact_name(&document.name), &output)?;
                info!("Processed and saved {} to {}", document.name, artifact);
                Ok(DocumentOutcome::Serialized {
                    report: transformed.report,
                    artifact,
                })
            }
            None => {
                warn!(
                    "No changes made to the file: {}. Check if the {} values match the mapping keys.",
                    document.name,
                    self.transformer.locator()
                );
                Ok(DocumentOutcome::Skipped {
                    report: transformed.report,
                })
            }
        }
    }

    /// Run the whole batch. Always completes; per-document failures are in the summary.
    #[instrument(skip_all, fields(documents = documents.len(), locator = %self.transformer.locator()))]
    pub fn run(&self, documents: &[InputDocument], sink: &dyn ArtifactSink) -> RunSummary {
        let started_at = Utc::now();
        let timer = Instant::now();
        info!(
            "Starting run over {} documents with {} mapping keys",
            documents.len(),
            self.mapping.len()
        );
        debug!("Postnr values to match: {:?}", self.mapping.sorted_keys());

        let entries: Vec<DocumentEntry> = documents
            .iter()
            .map(|document| DocumentEntry {
                name: document.name.clone(),
                outcome: self.process_document(document, sink),
            })
            .collect();

        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            locator: self.transformer.locator().clone(),
            mapping_keys: self.mapping.len(),
            documents: entries,
        };

        histogram!("post_id_run_duration_seconds").record(timer.elapsed().as_secs_f64());
        info!(
            "Run finished: {} written, {} unchanged, {} failed, {} replacements",
            summary.serialized(),
            summary.skipped(),
            summary.failed(),
            summary.total_replacements()
        );
        summary
    }
}
