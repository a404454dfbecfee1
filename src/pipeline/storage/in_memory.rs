use super::ArtifactSink;
use crate::error::{ReplaceError, Result};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// In-memory sink for library callers and tests
#[derive(Clone, Default)]
pub struct InMemorySink {
    artifacts: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored artifacts, in the order they were written
    pub fn artifacts(&self) -> Vec<(String, Vec<u8>)> {
        self.artifacts
            .lock()
            .map(|artifacts| artifacts.clone())
            .unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.artifacts()
            .into_iter()
            .find(|(stored, _)| stored == name)
            .map(|(_, bytes)| bytes)
    }

    pub fn len(&self) -> usize {
        self.artifacts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactSink for InMemorySink {
    fn store(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let mut artifacts = self
            .artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if artifacts.iter().any(|(stored, _)| stored == name) {
            return Err(ReplaceError::Collision(format!("memory:{} was already stored", name)));
        }
        artifacts.push((name.to_string(), bytes.to_vec()));
        debug!("Stored artifact {} ({} bytes)", name, bytes.len());
        Ok(format!("memory:{}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_get() {
        let sink = InMemorySink::new();
        assert!(sink.is_empty());

        let location = sink.store("a.xml", b"<A/>").unwrap();

        assert_eq!(location, "memory:a.xml");
        assert_eq!(sink.get("a.xml"), Some(b"<A/>".to_vec()));
        assert_eq!(sink.get("b.xml"), None);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let sink = InMemorySink::new();
        sink.store("a.xml", b"<A/>").unwrap();

        let err = sink.store("a.xml", b"<B/>").unwrap_err();

        assert_eq!(err.kind(), "collision");
        assert_eq!(sink.get("a.xml"), Some(b"<A/>".to_vec()));
    }
}
