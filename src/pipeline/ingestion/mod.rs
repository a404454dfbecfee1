// Pipeline ingestion: collecting the document batch

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::constants::XML_EXTENSION;
use crate::error::Result;

#[derive(Debug, Clone)]
enum DocumentSource {
    File(PathBuf),
    Memory(Vec<u8>),
}

/// One document of the batch. Bytes are read lazily so that an unreadable
/// file fails only its own entry.
#[derive(Debug, Clone)]
pub struct InputDocument {
    pub name: String,
    source: DocumentSource,
}

impl InputDocument {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            source: DocumentSource::File(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source: DocumentSource::Memory(bytes.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            DocumentSource::File(path) => Some(path),
            DocumentSource::Memory(_) => None,
        }
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            DocumentSource::File(path) => Ok(fs::read(path)?),
            DocumentSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

fn has_xml_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(XML_EXTENSION))
        .unwrap_or(false)
}

/// Every `*.xml` file directly inside `dir`, sorted by file name
pub fn collect_from_dir(dir: &Path) -> Result<Vec<InputDocument>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_xml_extension(&path) {
            paths.push(path);
        } else {
            debug!("Skipping non-XML entry {}", path.display());
        }
    }
    paths.sort();

    info!("Found {} XML files in {}", paths.len(), dir.display());
    Ok(paths.into_iter().map(InputDocument::from_path).collect())
}

/// Explicit file list, kept in the order given
pub fn collect_from_paths(paths: &[PathBuf]) -> Vec<InputDocument> {
    paths.iter().cloned().map(InputDocument::from_path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_collect_from_dir_filters_and_sorts() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("b.xml"), "<B/>")?;
        fs::write(dir.path().join("a.XML"), "<A/>")?;
        fs::write(dir.path().join("notes.txt"), "ignore")?;
        fs::create_dir(dir.path().join("nested.xml"))?;

        let docs = collect_from_dir(dir.path())?;
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.XML", "b.xml"]);
        assert_eq!(docs[1].read()?, b"<B/>".to_vec());
        Ok(())
    }

    #[test]
    fn test_collect_from_missing_dir_fails() {
        assert!(collect_from_dir(Path::new("/nonexistent/input")).is_err());
    }

    #[test]
    fn test_unreadable_file_fails_on_read_only() {
        let docs = collect_from_paths(&[PathBuf::from("/nonexistent/file.xml")]);
        assert_eq!(docs[0].name, "file.xml");
        assert!(docs[0].read().is_err());
    }

    #[test]
    fn test_in_memory_document() {
        let doc = InputDocument::from_bytes("upload.xml", "<Root/>");
        assert!(doc.path().is_none());
        assert_eq!(doc.read().unwrap(), b"<Root/>".to_vec());
    }
}
