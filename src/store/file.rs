//! store::file
//!
//! Site document on disk.
//!
//! # Design
//!
//! [`FileStore`] locks the document, loads it into a [`MemoryStore`], and
//! writes the whole document back on [`flush`](FileStore::flush). Writes are
//! atomic: a temp file next to the document is renamed over it.
//!
//! The lock is held until the store is dropped, so one CLI command owns the
//! site from load to flush.
//!
//! # Example
//!
//! ```no_run
//! use slugsync::store::FileStore;
//! use std::path::Path;
//!
//! let store = FileStore::open(Path::new("site.json")).unwrap();
//! // ... run the engine against store.memory() ...
//! store.flush().unwrap();
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::memory::MemoryStore;
use super::traits::StoreError;
use crate::core::ops::lock::SiteLock;
use crate::core::site::{parse_site, SiteDocument};

/// A locked, file-backed site.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    memory: MemoryStore,
    _lock: SiteLock,
}

impl FileStore {
    /// Lock and load an existing site document.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Lock`] if another process holds the site
    /// - [`StoreError::Io`] if the document cannot be read
    /// - [`StoreError::Schema`] if it fails to parse or validate
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let lock = SiteLock::acquire(path)?;
        let contents = fs::read_to_string(path).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let doc = parse_site(&contents)?;
        tracing::debug!(
            site = %path.display(),
            nodes = doc.nodes.len(),
            redirects = doc.redirects.len(),
            "loaded site document"
        );

        Ok(Self {
            path: path.to_path_buf(),
            memory: MemoryStore::from_document(doc),
            _lock: lock,
        })
    }

    /// Lock a path and start from the given document without reading.
    pub fn create(path: &Path, doc: SiteDocument) -> Result<Self, StoreError> {
        doc.validate()?;
        let lock = SiteLock::acquire(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            memory: MemoryStore::from_document(doc),
            _lock: lock,
        })
    }

    /// The in-memory view the engine works on.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Path of the site document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current state back atomically.
    pub fn flush(&self) -> Result<(), StoreError> {
        let doc = self.memory.to_document();
        let contents = doc.to_json_pretty()?;

        let temp_path = self.path.with_extension("json.tmp");
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| StoreError::Io { path, source }
        };

        let mut file = fs::File::create(&temp_path).map_err(io_err(&temp_path))?;
        file.write_all(contents.as_bytes())
            .map_err(io_err(&temp_path))?;
        file.write_all(b"\n").map_err(io_err(&temp_path))?;
        file.sync_all().map_err(io_err(&temp_path))?;
        fs::rename(&temp_path, &self.path).map_err(io_err(&self.path))?;

        tracing::debug!(site = %self.path.display(), "flushed site document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ops::CorrelationGroup;
    use crate::core::site::Node;
    use crate::core::types::NodeId;
    use crate::store::RecordStore;
    use tempfile::TempDir;

    fn seed(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("site.json");
        let mut doc = SiteDocument::new();
        doc.nodes.push(Node::new(1, 0, "Root").with_slug("/"));
        doc.nodes.push(Node::new(2, 1, "About").with_slug("/about"));
        fs::write(&path, doc.to_json_pretty().unwrap()).unwrap();
        path
    }

    #[test]
    fn open_and_flush_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = seed(&temp);

        {
            let store = FileStore::open(&path).unwrap();
            let group = CorrelationGroup::from_subject("00112233aabbccdd").unwrap();
            store
                .memory()
                .write_slug(NodeId::new(2), "/about-us", &group.slug)
                .unwrap();
            store.flush().unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.memory().slug_of(2).as_deref(), Some("/about-us"));
        assert_eq!(
            store
                .memory()
                .slug_history("00112233aabbccdd")
                .unwrap()
                .len(),
            1
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn second_open_is_locked_out() {
        let temp = TempDir::new().unwrap();
        let path = seed(&temp);

        let _first = FileStore::open(&path).unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Lock(_))));
    }

    #[test]
    fn missing_file() {
        let temp = TempDir::new().unwrap();
        let result = FileStore::open(&temp.path().join("absent.json"));
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn invalid_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("site.json");
        fs::write(&path, r#"{"kind": "something.else", "schema_version": 1}"#).unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Schema(_))
        ));
    }

    #[test]
    fn create_writes_on_flush() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("new.json");
        let store = FileStore::create(&path, SiteDocument::new()).unwrap();
        assert!(!path.exists());
        store.flush().unwrap();
        assert!(path.exists());
    }
}
