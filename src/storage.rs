use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::{PkiError, Result};

/// Capability set for artifact persistence. The certificate core never
/// touches a filesystem path directly; everything goes through a store.
pub trait ArtifactStore {
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<()>;
    fn read(&self, name: &str) -> Result<Vec<u8>>;
}

/// Filesystem-backed store rooted at the output directory. Regeneration
/// overwrites existing artifacts unconditionally.
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open a store at `root`, creating the directory if absent.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| PkiError::Persistence {
            name: root.display().to_string(),
            source: e,
        })?;
        Ok(DirectoryStore { root })
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl ArtifactStore for DirectoryStore {
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        fs::write(self.root.join(name), bytes).map_err(|e| PkiError::Persistence {
            name: name.to_string(),
            source: e,
        })
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        fs::read(self.root.join(name)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PkiError::MissingArtifact(name.to_string()),
            _ => PkiError::Persistence {
                name: name.to_string(),
                source: e,
            },
        })
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    artifacts: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.artifacts.remove(name)
    }
}

impl ArtifactStore for MemoryStore {
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.artifacts.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.artifacts
            .get(name)
            .cloned()
            .ok_or_else(|| PkiError::MissingArtifact(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::create(dir.path().join("certs")).unwrap();

        store.write("server.crt", b"cert bytes").unwrap();
        assert_eq!(store.read("server.crt").unwrap(), b"cert bytes");
    }

    #[test]
    fn test_directory_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::create(dir.path()).unwrap();

        store.write("rootCA.crt", b"first").unwrap();
        store.write("rootCA.crt", b"second").unwrap();
        assert_eq!(store.read("rootCA.crt").unwrap(), b"second");
    }

    #[test]
    fn test_absent_artifact_is_missing_not_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::create(dir.path()).unwrap();

        match store.read("intermediateCA.crt") {
            Err(PkiError::MissingArtifact(name)) => assert_eq!(name, "intermediateCA.crt"),
            other => panic!("expected MissingArtifact, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_memory_store_round_trip_and_removal() {
        let mut store = MemoryStore::new();
        store.write("client.crt", b"pem").unwrap();
        assert_eq!(store.read("client.crt").unwrap(), b"pem");

        store.remove("client.crt");
        assert!(matches!(
            store.read("client.crt"),
            Err(PkiError::MissingArtifact(_))
        ));
    }
}
