// Pipeline storage: where modified documents end up

pub mod in_memory;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{ReplaceError, Result};

pub use in_memory::InMemorySink;

/// Destination for modified documents
pub trait ArtifactSink {
    /// Store one artifact under `name` and return where it went.
    /// A name already stored through this sink is a `Collision` error.
    fn store(&self, name: &str, bytes: &[u8]) -> Result<String>;
}

/// Writes artifacts as files in a single output directory
pub struct FsSink {
    output_dir: PathBuf,
    written: Mutex<HashSet<PathBuf>>,
}

impl FsSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            written: Mutex::new(HashSet::new()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ArtifactSink for FsSink {
    fn store(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let path = self.output_dir.join(name);
        let mut written = self
            .written
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if written.contains(&path) {
            return Err(ReplaceError::Collision(format!(
                "{} was already written by an earlier document",
                path.display()
            )));
        }

        fs::create_dir_all(&self.output_dir)?;
        fs::write(&path, bytes)?;
        written.insert(path.clone());
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fs_sink_creates_output_dir() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("out").join("nested");
        let sink = FsSink::new(&out);

        let location = sink.store("modified_a.xml", b"<A/>")?;

        assert_eq!(PathBuf::from(&location), out.join("modified_a.xml"));
        assert_eq!(fs::read(out.join("modified_a.xml"))?, b"<A/>".to_vec());
        Ok(())
    }

    #[test]
    fn test_fs_sink_replaces_file_from_previous_run() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.xml"), b"old")?;
        let sink = FsSink::new(dir.path());
        sink.store("a.xml", b"new")?;
        assert_eq!(fs::read(dir.path().join("a.xml"))?, b"new".to_vec());
        Ok(())
    }

    #[test]
    fn test_fs_sink_rejects_second_write_of_same_name() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let sink = FsSink::new(dir.path());
        sink.store("x.xml", b"first")?;

        let err = sink.store("x.xml", b"second").unwrap_err();

        assert_eq!(err.kind(), "collision");
        assert_eq!(fs::read(dir.path().join("x.xml"))?, b"first".to_vec());
        Ok(())
    }
}
